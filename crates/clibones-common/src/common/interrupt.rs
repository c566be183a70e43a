//! Graceful interrupt handling.
//!
//! While an [`InterruptHandler`] is held, the first SIGINT/SIGTERM only sets a
//! flag that long-running work polls between steps. A second signal arriving
//! while the flag is still set terminates the process with status 130.
//! Registrations are removed when the handler is released or dropped.

use std::ffi::c_int;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use signal_hook::SigId;
use signal_hook::consts::SIGINT;
use signal_hook::consts::SIGTERM;
use thiserror::Error;
use tracing::debug;

const FORCED_EXIT_STATUS: c_int = 130;

#[derive(Error, Debug)]
#[error("Failed to register handler for signal {signal}: {source}")]
pub struct InterruptError {
    pub signal: c_int,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug)]
pub struct InterruptHandler {
    interrupted: Arc<AtomicBool>,
    registrations: Vec<SigId>,
    released: bool,
}

impl InterruptHandler {
    /// Capture SIGINT and SIGTERM.
    pub fn capture() -> Result<Self, InterruptError> {
        Self::capture_signals(&[SIGINT, SIGTERM])
    }

    pub fn capture_signals(signals: &[c_int]) -> Result<Self, InterruptError> {
        let interrupted = Arc::new(AtomicBool::new(false));
        let mut handler = Self {
            interrupted: Arc::clone(&interrupted),
            registrations: Vec::with_capacity(signals.len() * 2),
            released: false,
        };

        for &signal in signals {
            // Registered first so it observes the flag before this signal sets it.
            let shutdown = signal_hook::flag::register_conditional_shutdown(
                signal,
                FORCED_EXIT_STATUS,
                Arc::clone(&interrupted),
            )
            .map_err(|source| InterruptError { signal, source })?;
            handler.registrations.push(shutdown);

            let flag = signal_hook::flag::register(signal, Arc::clone(&interrupted))
                .map_err(|source| InterruptError { signal, source })?;
            handler.registrations.push(flag);
        }

        debug!(signals = ?signals, "Interrupt handler captured");
        Ok(handler)
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Remove the registrations. Returns `false` if already released.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        for id in self.registrations.drain(..) {
            signal_hook::low_level::unregister(id);
        }
        self.released = true;
        debug!("Interrupt handler released");
        true
    }
}

impl Drop for InterruptHandler {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use signal_hook::consts::SIGUSR1;
    use signal_hook::consts::SIGUSR2;

    #[test]
    fn test_signal_sets_flag() {
        let handler = InterruptHandler::capture_signals(&[SIGUSR1]).unwrap();
        assert!(!handler.is_interrupted());

        signal_hook::low_level::raise(SIGUSR1).unwrap();
        assert!(handler.is_interrupted());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut handler = InterruptHandler::capture_signals(&[SIGUSR2]).unwrap();
        assert!(handler.release());
        assert!(!handler.release());
        assert!(!handler.is_interrupted());
    }
}
