#![forbid(unsafe_code)]

//! Cooperative cancellation for subscriptions and one-shot timers.
//!
//! One [`CancellationSource`] is owned by the engine; every background
//! thread it spawns holds a [`CancellationToken`] clone and parks on
//! [`CancellationToken::wait_timeout`]. Cancelling the source wakes them
//! all, which is what makes engine teardown a single call with a guaranteed
//! release on every exit path.
//!
//! Dropping the source does **not** cancel outstanding tokens; teardown is
//! always an explicit `cancel()`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use web_time::{Duration, Instant};

struct Shared {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// Control side: triggers cancellation for every derived token.
pub struct CancellationSource {
    shared: Arc<Shared>,
}

/// Observer side: cheap to clone, safe to send across threads.
#[derive(Clone)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

impl CancellationSource {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                cancelled: AtomicBool::new(false),
                lock: Mutex::new(()),
                wake: Condvar::new(),
            }),
        }
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Signal cancellation; idempotent. Wakes every blocked `wait_timeout`.
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::Release);
        let _guard = self.shared.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.shared.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }

    /// Park until cancelled or `duration` elapses.
    ///
    /// Returns `true` if cancelled, `false` on timeout. Robust against
    /// spurious condvar wakeups.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self.shared.lock.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if self.is_cancelled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (next, _timeout) = self
                .shared
                .wake
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            guard = next;
        }
    }
}
