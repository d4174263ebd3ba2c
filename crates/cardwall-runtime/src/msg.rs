#![forbid(unsafe_code)]

//! The reducer's input alphabet.
//!
//! Every external stimulus - fetch completions, push arrivals, interval
//! ticks, presentation sinks, one-shot timer fires - is a [`Msg`] applied
//! through [`WallModel::update`](crate::model::WallModel::update). Timer
//! messages carry the cycle or epoch they were armed under so the reducer
//! can reject stale fires without any cancellation bookkeeping.

use cardwall_core::{Card, CardId, FetchError};

/// One-shot timer identity.
///
/// `cycle` stamps belong to the arrival queue (bumped per spotlight cycle),
/// `epoch` stamps to the carousel pause mechanism (bumped per user
/// interaction). A fired timer whose stamp no longer matches current state
/// is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Asset-wait ceiling for the card entering the spotlight.
    AssetWait { cycle: u64 },
    /// Fixed spotlight presentation envelope.
    SpotlightHold { cycle: u64 },
    /// Scroll burst settled; read the snap position.
    ScrollSettle { epoch: u64 },
    /// Quiet period elapsed; the carousel may resume.
    CarouselResume { epoch: u64 },
}

/// Everything the wall reducer can react to.
#[derive(Debug, Clone)]
pub enum Msg {
    /// A page fetch completed (page 0 is the initial snapshot).
    PageLoaded { page: u64, cards: Vec<Card> },
    PageFailed { page: u64, error: FetchError },
    /// The pagination sentinel entered view.
    SentinelVisible,
    /// Push feed delivered a newly created card.
    CardPushed(Card),
    /// Reconcile interval tick: poll the authoritative count.
    ReconcileTick,
    CountPolled { total: u64 },
    CountPollFailed { error: FetchError },
    /// Carousel interval tick: advance by one batch.
    CarouselTick,
    /// Asset loader resolved the card's photo.
    AssetReady(CardId),
    /// Asset loader gave up on the card's photo. Equivalent to ready for
    /// queue advancement.
    AssetFailed(CardId),
    TimerFired(TimerKind),
    /// User scrolled the card viewport; `offset` is a fractional card
    /// index.
    UserScroll { offset: f64 },
    DragStart { pointer_x: f64 },
    DragMove { pointer_x: f64 },
    DragEnd,
    ViewportResized { width: f64 },
}
