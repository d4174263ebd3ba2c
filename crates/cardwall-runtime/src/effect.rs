#![forbid(unsafe_code)]

//! Effects the reducer asks the engine to perform.
//!
//! The reducer itself is pure: it returns a list of effects instead of
//! doing I/O. The [`Engine`](crate::engine::Engine) executes fetches on
//! worker threads, forwards asset requests to the loader collaborator, and
//! arms one-shot timers. The deterministic
//! [`WallSimulator`](crate::simulator::WallSimulator) absorbs the same
//! effects into inspectable pending lists instead.

use std::time::Duration;

use cardwall_core::CardId;

use crate::msg::TimerKind;

/// A side effect requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch `limit` cards starting at `offset` (newest-first order).
    LoadPage { page: u64, offset: u64, limit: usize },
    /// Poll the authoritative card count.
    PollCount,
    /// Ask the asset loader to resolve this card's photo.
    RequestAsset(CardId),
    /// Arm a one-shot timer; delivery comes back as
    /// [`Msg::TimerFired`](crate::msg::Msg::TimerFired).
    StartTimer { kind: TimerKind, after: Duration },
}
