use std::fmt;

/// Platform-neutral key code.
///
/// ASCII letters are normalized to their uppercase code point so that `d`
/// and `D` (and a Caps Lock operator) produce the same code. Every other
/// single byte keeps its value, a multi-byte UTF-8 character becomes its
/// code point, and escape sequences collapse into
/// [`KeyCode::ESCAPE_SEQUENCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const SPACE: KeyCode = KeyCode(0x20);
    pub const D: KeyCode = KeyCode(b'D' as u32);
    pub const F: KeyCode = KeyCode(b'F' as u32);
    pub const J: KeyCode = KeyCode(b'J' as u32);
    pub const K: KeyCode = KeyCode(b'K' as u32);
    pub const ESCAPE: KeyCode = KeyCode(0x1b);
    /// CSI/SS3 sequences and Alt-prefixed keys (arrows, F-keys, Alt+x).
    pub const ESCAPE_SEQUENCE: KeyCode = KeyCode(0x0100_0000);

    pub fn from_byte(byte: u8) -> Self {
        KeyCode(u32::from(byte.to_ascii_uppercase()))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            KeyCode::SPACE => f.write_str("Space"),
            KeyCode::ESCAPE => f.write_str("Esc"),
            KeyCode::ESCAPE_SEQUENCE => f.write_str("EscSeq"),
            KeyCode(code) => match char::from_u32(code) {
                Some(c) if c.is_ascii_graphic() || (!c.is_ascii() && !c.is_control()) => {
                    write!(f, "{}", c)
                }
                _ => write!(f, "0x{:02X}", code),
            },
        }
    }
}
