//! Operator interrupt handling.
//!
//! SIGINT and SIGTERM only flip an atomic flag. The handler is installed
//! without `SA_RESTART`, so a blocking receive returns early and the session
//! notices the request on its next loop turn.

use anyhow::{anyhow, Result};
use std::fmt;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Flag set by the signal handler to abort the running session.
static INTERRUPT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Returned when an operator signal stopped the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("session interrupted by operator")
    }
}

impl std::error::Error for Interrupted {}

/// Only uses atomic operations (async-signal-safe).
extern "C" fn handle_interrupt(_: libc::c_int) {
    INTERRUPT_RECEIVED.store(true, Ordering::SeqCst);
}

pub fn install_interrupt_handler() -> Result<()> {
    for signal in [libc::SIGINT, libc::SIGTERM] {
        unsafe {
            // SAFETY: handle_interrupt is an extern "C" handler that only stores to an
            // atomic; the sigaction struct is zero-initialized and fully populated here.
            let mut action: libc::sigaction = mem::zeroed();
            action.sa_sigaction = handle_interrupt as *const () as libc::sighandler_t;
            action.sa_flags = 0;
            libc::sigemptyset(&mut action.sa_mask);
            if libc::sigaction(signal, &action, ptr::null_mut()) != 0 {
                return Err(anyhow!(
                    "failed to install handler for signal {signal}: {}",
                    std::io::Error::last_os_error()
                ));
            }
        }
    }
    debug!("interrupt handlers installed");
    Ok(())
}

pub fn interrupt_requested() -> bool {
    INTERRUPT_RECEIVED.load(Ordering::SeqCst)
}

#[cfg(test)]
pub(crate) fn clear_interrupt() {
    INTERRUPT_RECEIVED.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};
    use std::thread;
    use std::time::Duration;

    fn flag_lock() -> &'static Mutex<()> {
        static FLAG_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        FLAG_LOCK.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn interrupt_handler_sets_flag() {
        let _guard = flag_lock().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        clear_interrupt();
        handle_interrupt(0);
        assert!(interrupt_requested());
        clear_interrupt();
        assert!(!interrupt_requested());
    }

    #[test]
    fn install_interrupt_handler_catches_sigterm() {
        let _guard = flag_lock().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        clear_interrupt();
        install_interrupt_handler().expect("install interrupt handler");
        unsafe {
            // SAFETY: raising SIGTERM in-process is used for test validation only;
            // the handler installed above replaces the default terminate action.
            libc::raise(libc::SIGTERM);
        }
        for _ in 0..20 {
            if interrupt_requested() {
                clear_interrupt();
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("SIGTERM was not received");
    }

    #[test]
    fn interrupted_error_is_downcastable() {
        let err: anyhow::Error = Interrupted.into();
        assert!(err.is::<Interrupted>());
        assert_eq!(err.to_string(), "session interrupted by operator");
    }
}
