#![forbid(unsafe_code)]

//! One-shot timers.
//!
//! Each [`Effect::StartTimer`](crate::effect::Effect::StartTimer) spawns a
//! thread that parks on the engine's cancellation token and sends its
//! message unless teardown happens first. Timers are never individually
//! cancelled: the reducer stamps every timer with the cycle or epoch it was
//! armed under and ignores fires whose stamp is stale, which keeps the
//! race between the two completion arms (asset-ready vs timeout)
//! first-completes-wins without any bookkeeping here.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::cancellation::CancellationToken;

/// Spawns one-shot timer threads scoped to the engine's lifetime.
pub(crate) struct TimerPool<M: Send + 'static> {
    sender: mpsc::Sender<M>,
    token: CancellationToken,
}

impl<M: Send + 'static> TimerPool<M> {
    pub(crate) fn new(sender: mpsc::Sender<M>, token: CancellationToken) -> Self {
        Self { sender, token }
    }

    pub(crate) fn schedule(&self, after: Duration, msg: M) {
        let sender = self.sender.clone();
        let token = self.token.clone();
        thread::spawn(move || {
            if !token.wait_timeout(after) {
                let _ = sender.send(msg);
            }
        });
    }
}
