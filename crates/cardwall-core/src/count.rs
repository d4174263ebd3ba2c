#![forbid(unsafe_code)]

//! Monotonic total-count estimate and display numbering.
//!
//! The displayed total is the engine's best estimate of the authoritative
//! card count. Three inputs feed it: local increments from live arrivals,
//! the periodically polled authoritative count, and the loaded list length.
//! The estimate only ever takes the maximum, so a late or lossy input can
//! never make the number shrink on screen (which would read as cards
//! disappearing).
//!
//! The recount `version` is a cosmetic stamp: it bumps on every successful
//! poll so the presentation layer can replay its count-up animation. It is
//! not business state and is excluded from any equality reasoning.

/// Never-decreasing total card count estimate.
#[derive(Debug, Default)]
pub struct TotalCount {
    estimate: u64,
    version: u64,
}

impl TotalCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current estimate.
    pub fn get(&self) -> u64 {
        self.estimate
    }

    /// Cosmetic recount stamp, bumped once per successful poll.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Fold in an authoritative poll result: `max(current, polled)`.
    /// Bumps the recount version even when the value is unchanged.
    pub fn observe_poll(&mut self, polled: u64) {
        self.estimate = self.estimate.max(polled);
        self.version += 1;
    }

    /// One live arrival actually inserted locally.
    pub fn record_local_insert(&mut self) {
        self.estimate += 1;
    }

    /// The total can never be below what is already loaded.
    pub fn observe_local_len(&mut self, len: usize) {
        self.estimate = self.estimate.max(len as u64);
    }
}

/// Display number for the card at `position_index` (0 = newest loaded).
///
/// Never renders as 0 or negative, even when the local list is longer than
/// the current total estimate.
pub fn display_number(total: u64, position_index: usize) -> u64 {
    total.saturating_sub(position_index as u64).max(1)
}
