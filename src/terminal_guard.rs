//! Scoped terminal line-discipline control.
//!
//! [`TerminalModeGuard`] captures the console mode once, switches off
//! canonical input and echo, and puts the captured mode back when released
//! or dropped. Signal generation (`ISIG`) is left alone so Ctrl+C still
//! reaches the process as SIGINT.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("Failed to read terminal mode: {0}")]
    Snapshot(#[source] io::Error),

    #[error("Failed to switch terminal to raw input: {0}")]
    Apply(#[source] io::Error),
}

/// A console device whose input mode can be read and written.
pub trait Console {
    type Mode: Clone;

    fn get_mode(&self) -> io::Result<Self::Mode>;

    fn set_mode(&mut self, mode: &Self::Mode) -> io::Result<()>;

    /// `mode` with line buffering and local echo disabled.
    fn without_line_discipline(mode: &Self::Mode) -> Self::Mode;
}

/// termios-backed console over a private duplicate of a tty descriptor.
#[derive(Clone)]
pub struct TermiosConsole {
    fd: Arc<OwnedFd>,
}

impl TermiosConsole {
    /// Duplicates `fd` so the console outlives whoever owns the original.
    pub fn from_fd(fd: RawFd) -> io::Result<Self> {
        let dup = unsafe { libc::dup(fd) };
        if dup < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self {
            fd: Arc::new(unsafe { OwnedFd::from_raw_fd(dup) }),
        })
    }
}

impl Console for TermiosConsole {
    type Mode = libc::termios;

    fn get_mode(&self) -> io::Result<libc::termios> {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(self.fd.as_raw_fd(), &mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(termios)
    }

    fn set_mode(&mut self, mode: &libc::termios) -> io::Result<()> {
        if unsafe { libc::tcsetattr(self.fd.as_raw_fd(), libc::TCSANOW, mode) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn without_line_discipline(mode: &libc::termios) -> libc::termios {
        let mut raw = *mode;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO);
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        raw
    }
}

/// Holds the console in key-by-key mode until released.
pub struct TerminalModeGuard<C: Console> {
    console: C,
    snapshot: C::Mode,
    restored: Arc<AtomicBool>,
}

impl<C: Console> TerminalModeGuard<C> {
    pub fn acquire(mut console: C) -> Result<Self, TerminalError> {
        let snapshot = console.get_mode().map_err(TerminalError::Snapshot)?;
        let raw = C::without_line_discipline(&snapshot);
        console.set_mode(&raw).map_err(TerminalError::Apply)?;
        Ok(Self {
            console,
            snapshot,
            restored: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The mode captured at acquire time.
    pub fn snapshot(&self) -> &C::Mode {
        &self.snapshot
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn is_released(&self) -> bool {
        self.restored.load(Ordering::SeqCst)
    }

    /// Restores the snapshot. Once a restore succeeds (here or in the
    /// panic hook) later calls do nothing; a failed one is retried on drop.
    pub fn release(&mut self) -> io::Result<()> {
        if self.restored.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.console.set_mode(&self.snapshot)?;
        self.restored.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl<C> TerminalModeGuard<C>
where
    C: Console + Clone + Send + 'static,
    C::Mode: Send + Sync + 'static,
{
    /// Restores the terminal before the default panic report is printed.
    pub fn install_panic_hook(&self) {
        let console = Mutex::new(self.console.clone());
        let snapshot = self.snapshot.clone();
        let restored = Arc::clone(&self.restored);
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if !restored.load(Ordering::SeqCst) && console.lock().set_mode(&snapshot).is_ok() {
                restored.store(true, Ordering::SeqCst);
            }
            default_hook(info);
        }));
    }
}

impl<C: Console> Drop for TerminalModeGuard<C> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            tracing::warn!("Failed to restore terminal mode: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct FakeMode {
        canonical: bool,
        echo: bool,
        other_bits: u32,
    }

    #[derive(Clone)]
    struct FakeConsole {
        mode: Arc<Mutex<FakeMode>>,
        writes: Arc<Mutex<usize>>,
        fail_set: Arc<AtomicBool>,
    }

    impl FakeConsole {
        fn new() -> Self {
            Self {
                mode: Arc::new(Mutex::new(FakeMode {
                    canonical: true,
                    echo: true,
                    other_bits: 0xA5A5,
                })),
                writes: Arc::new(Mutex::new(0)),
                fail_set: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl Console for FakeConsole {
        type Mode = FakeMode;

        fn get_mode(&self) -> io::Result<FakeMode> {
            Ok(*self.mode.lock())
        }

        fn set_mode(&mut self, mode: &FakeMode) -> io::Result<()> {
            if self.fail_set.load(Ordering::SeqCst) {
                return Err(io::Error::other("device gone"));
            }
            *self.mode.lock() = *mode;
            *self.writes.lock() += 1;
            Ok(())
        }

        fn without_line_discipline(mode: &FakeMode) -> FakeMode {
            FakeMode {
                canonical: false,
                echo: false,
                ..*mode
            }
        }
    }

    #[test]
    fn acquire_disables_canonical_and_echo_only() {
        let console = FakeConsole::new();
        let shared = Arc::clone(&console.mode);
        let _guard = TerminalModeGuard::acquire(console).unwrap();

        let mode = *shared.lock();
        assert!(!mode.canonical);
        assert!(!mode.echo);
        assert_eq!(mode.other_bits, 0xA5A5);
    }

    #[test]
    fn release_restores_snapshot_exactly() {
        let console = FakeConsole::new();
        let shared = Arc::clone(&console.mode);
        let original = *shared.lock();

        let mut guard = TerminalModeGuard::acquire(console).unwrap();
        assert_eq!(*guard.snapshot(), original);
        guard.release().unwrap();

        assert_eq!(*shared.lock(), original);
        assert!(guard.is_released());
    }

    #[test]
    fn drop_restores_snapshot() {
        let console = FakeConsole::new();
        let shared = Arc::clone(&console.mode);
        let original = *shared.lock();

        {
            let _guard = TerminalModeGuard::acquire(console).unwrap();
            assert_ne!(*shared.lock(), original);
        }

        assert_eq!(*shared.lock(), original);
    }

    #[test]
    fn release_then_drop_writes_once() {
        let console = FakeConsole::new();
        let writes = Arc::clone(&console.writes);

        let mut guard = TerminalModeGuard::acquire(console).unwrap();
        guard.release().unwrap();
        guard.release().unwrap();
        drop(guard);

        // one write for acquire, one for the single restore
        assert_eq!(*writes.lock(), 2);
    }

    #[test]
    fn failed_apply_is_reported() {
        let console = FakeConsole::new();
        console.fail_set.store(true, Ordering::SeqCst);
        let result = TerminalModeGuard::acquire(console);
        assert!(matches!(result, Err(TerminalError::Apply(_))));
    }

    #[test]
    fn failed_restore_is_retried_on_drop() {
        let console = FakeConsole::new();
        let shared = Arc::clone(&console.mode);
        let fail_set = Arc::clone(&console.fail_set);
        let original = *shared.lock();

        let mut guard = TerminalModeGuard::acquire(console).unwrap();
        fail_set.store(true, Ordering::SeqCst);
        assert!(guard.release().is_err());
        assert!(!guard.is_released());

        fail_set.store(false, Ordering::SeqCst);
        drop(guard);
        assert_eq!(*shared.lock(), original);
    }

    #[test]
    fn panic_hook_restores_before_unwinding() {
        let console = FakeConsole::new();
        let shared = Arc::clone(&console.mode);
        let original = *shared.lock();

        let guard = TerminalModeGuard::acquire(console).unwrap();
        assert_ne!(*shared.lock(), original);

        // Silence the report; the hook chains to whatever was installed
        std::panic::set_hook(Box::new(|_| {}));
        guard.install_panic_hook();
        let result = std::panic::catch_unwind(|| panic!("boom"));
        let _ = std::panic::take_hook();

        assert!(result.is_err());
        assert_eq!(*shared.lock(), original);
        assert!(guard.is_released());
    }
}
