use crate::event::KeyCode;
use crate::parser::InputParser;
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};
use std::time::Duration;

/// ESC timeout in milliseconds.
/// If ESC is received and no follow-up byte arrives within this time,
/// the ESC is emitted as a bare Escape key.
const ESC_TIMEOUT_MS: i32 = 2;

/// Terminal input reader: opens the tty and reads decoded key codes.
///
/// Uses `std::fs::File` for I/O and `select()` for readiness polling, so
/// a read never blocks longer than the timeout the caller passes in.
pub struct TtyReader {
    file: std::fs::File,
    parser: InputParser,
    pending: VecDeque<KeyCode>,
    buf: [u8; 256],
}

impl TtyReader {
    /// Open the terminal for reading.
    ///
    /// Prefers a duplicate of stdin if it is a tty, falling back to
    /// `/dev/tty` so input still works when stdin is redirected.
    pub fn open() -> io::Result<Self> {
        let file = Self::dup_stdin_if_tty().or_else(|_| Self::open_tty())?;
        // Set close-on-exec so the player child never inherits the tty fd
        unsafe {
            libc::fcntl(file.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC);
        }
        Ok(Self {
            file,
            parser: InputParser::new(),
            pending: VecDeque::new(),
            buf: [0u8; 256],
        })
    }

    fn open_tty() -> io::Result<std::fs::File> {
        OpenOptions::new().read(true).write(true).open("/dev/tty")
    }

    fn dup_stdin_if_tty() -> io::Result<std::fs::File> {
        let is_tty = unsafe { libc::isatty(libc::STDIN_FILENO) == 1 };
        if !is_tty {
            return Err(io::Error::new(io::ErrorKind::NotFound, "stdin is not a tty"));
        }
        let fd = unsafe { libc::dup(libc::STDIN_FILENO) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(unsafe { std::fs::File::from_raw_fd(fd) })
    }

    /// Read the next key, blocking up to `timeout`.
    ///
    /// Returns `Ok(None)` on timeout. Returns an `UnexpectedEof` error once
    /// the tty is closed.
    pub fn read(&mut self, timeout: Duration) -> io::Result<Option<KeyCode>> {
        if let Some(key) = self.pending.pop_front() {
            return Ok(Some(key));
        }

        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;
        if !self.select(timeout_ms)? {
            if self.parser.has_pending() {
                let keys = self.parser.flush();
                self.pending.extend(keys);
                return Ok(self.pending.pop_front());
            }
            return Ok(None);
        }

        // std::io::Read retries on EINTR
        let n = self.file.read(&mut self.buf)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "tty closed"));
        }
        let keys = self.parser.feed(&self.buf[..n]);
        self.pending.extend(keys);

        if self.parser.has_pending() {
            if !self.select(ESC_TIMEOUT_MS)? {
                let keys = self.parser.flush();
                self.pending.extend(keys);
            } else {
                let n = self.file.read(&mut self.buf)?;
                if n > 0 {
                    let keys = self.parser.feed(&self.buf[..n]);
                    self.pending.extend(keys);
                }
            }
        }

        Ok(self.pending.pop_front())
    }

    /// Raw file descriptor of the tty being read.
    pub fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    fn select(&self, timeout_ms: i32) -> io::Result<bool> {
        let fd = self.file.as_raw_fd();
        unsafe {
            let mut read_fds: libc::fd_set = std::mem::zeroed();
            libc::FD_ZERO(&mut read_fds);
            libc::FD_SET(fd, &mut read_fds);

            let mut tv = libc::timeval {
                tv_sec: (timeout_ms / 1000) as libc::time_t,
                tv_usec: ((timeout_ms % 1000) * 1000) as libc::suseconds_t,
            };

            loop {
                let ret = libc::select(
                    fd + 1,
                    &mut read_fds,
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    &mut tv,
                );
                if ret < 0 {
                    let err = io::Error::last_os_error();
                    if err.kind() == io::ErrorKind::Interrupted {
                        // select may have clobbered the set
                        libc::FD_ZERO(&mut read_fds);
                        libc::FD_SET(fd, &mut read_fds);
                        continue;
                    }
                    return Err(err);
                }
                return Ok(ret > 0);
            }
        }
    }
}
