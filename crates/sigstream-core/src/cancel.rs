//! Cooperative Cancellation Token
//!
//! A cloneable flag shared between the emission loop and whoever requests
//! shutdown (a Ctrl-C handler, a supervising thread, a test). The loop
//! polls the token at its suspension points; no OS signal handling happens
//! in this crate.
//!
//! ## Example
//!
//! ```rust
//! use sigstream_core::cancel::CancelToken;
//!
//! let token = CancelToken::new();
//! assert!(!token.is_cancelled());
//!
//! let remote = token.clone();
//! remote.cancel();
//! assert!(token.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Granularity of the interruptible sleep.
const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Cooperative cancellation flag.
///
/// All clones observe the same flag; cancelling any clone cancels them all.
/// Cancellation is one-way: there is no way to un-cancel a token.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, un-cancelled token.
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early if the token is cancelled.
    ///
    /// Returns `true` if the full duration elapsed, `false` if the sleep
    /// was cut short by cancellation. The sleep is sliced so cancellation
    /// is observed within ~10 ms.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}
