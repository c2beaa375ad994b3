use crate::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    /// ESC received, waiting to see whether a sequence follows.
    Escape,
    /// Inside a CSI (`ESC [`) or SS3 (`ESC O`) sequence.
    Sequence,
    /// Inside a multi-byte UTF-8 character.
    Utf8 { code: u32, remaining: u8 },
}

/// Stands in for a truncated UTF-8 character.
const REPLACEMENT: KeyCode = KeyCode(0xFFFD);

/// Incremental decoder from raw tty bytes to key codes.
///
/// Sequences may be split across reads; the caller checks
/// [`has_pending`](Self::has_pending) and calls [`flush`](Self::flush) once
/// no further byte arrives within the ESC timeout.
#[derive(Debug)]
pub struct InputParser {
    state: State,
}

impl InputParser {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<KeyCode> {
        let mut keys = Vec::with_capacity(bytes.len());
        for &byte in bytes {
            match self.state {
                State::Ground => self.ground(byte, &mut keys),
                State::Escape => match byte {
                    b'[' | b'O' => self.state = State::Sequence,
                    0x1b => keys.push(KeyCode::ESCAPE),
                    _ => {
                        // Alt+key: never counts as the bare key
                        keys.push(KeyCode::ESCAPE_SEQUENCE);
                        self.state = State::Ground;
                    }
                },
                State::Sequence => {
                    if (0x40..=0x7e).contains(&byte) {
                        keys.push(KeyCode::ESCAPE_SEQUENCE);
                        self.state = State::Ground;
                    }
                }
                State::Utf8 { code, remaining } => {
                    if !is_continuation(byte) {
                        // Truncated character; the byte starts something new
                        keys.push(REPLACEMENT);
                        self.state = State::Ground;
                        self.ground(byte, &mut keys);
                        continue;
                    }
                    let code = (code << 6) | u32::from(byte & 0x3f);
                    if remaining == 1 {
                        keys.push(KeyCode(code));
                        self.state = State::Ground;
                    } else {
                        self.state = State::Utf8 {
                            code,
                            remaining: remaining - 1,
                        };
                    }
                }
            }
        }
        keys
    }

    fn ground(&mut self, byte: u8, keys: &mut Vec<KeyCode>) {
        if byte == 0x1b {
            self.state = State::Escape;
        } else if let Some(state) = utf8_lead(byte) {
            self.state = state;
        } else {
            keys.push(KeyCode::from_byte(byte));
        }
    }

    pub fn has_pending(&self) -> bool {
        self.state != State::Ground
    }

    pub fn flush(&mut self) -> Vec<KeyCode> {
        let key = match self.state {
            State::Ground => None,
            State::Escape => Some(KeyCode::ESCAPE),
            State::Sequence => Some(KeyCode::ESCAPE_SEQUENCE),
            State::Utf8 { .. } => Some(REPLACEMENT),
        };
        self.state = State::Ground;
        key.into_iter().collect()
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

/// Decoder state after a UTF-8 lead byte, or `None` for any other byte.
fn utf8_lead(byte: u8) -> Option<State> {
    let (code, remaining) = match byte {
        0xc2..=0xdf => (byte & 0x1f, 1),
        0xe0..=0xef => (byte & 0x0f, 2),
        0xf0..=0xf4 => (byte & 0x07, 3),
        _ => return None,
    };
    Some(State::Utf8 {
        code: u32::from(code),
        remaining,
    })
}

impl Default for InputParser {
    fn default() -> Self {
        Self::new()
    }
}
