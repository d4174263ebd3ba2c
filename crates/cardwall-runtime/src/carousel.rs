#![forbid(unsafe_code)]

//! Carousel scheduler (wide viewports only).
//!
//! Auto-advances the horizontal card viewport by a fixed batch on a fixed
//! interval. Runs only while the viewport is classified wide, the
//! scheduler is enabled, and at least one card is loaded.
//!
//! Pausing is epoch-guarded: every user interaction (scroll burst, split
//! drag) disables the scheduler and bumps the pause epoch; resume and
//! settle timers carry the epoch they were armed under, so any interaction
//! that follows invalidates them and the quiet period effectively
//! restarts. Scroll pause and resize pause share the mechanism and differ
//! only in the resume delay the caller schedules.

use cardwall_core::WallConfig;

/// Outcome of one auto-advance tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Guard failed (narrow, disabled, or empty); nothing moved.
    Stayed,
    /// Moved forward one batch.
    Moved,
    /// Ran off the loaded end with more pages available: hold position and
    /// let the caller trigger pagination.
    NeedMore,
    /// Ran off the end of an exhausted feed; wrapped to the front.
    Wrapped,
}

#[derive(Debug)]
pub struct CarouselScheduler {
    position: usize,
    enabled: bool,
    wide: bool,
    batch: usize,
    pause_epoch: u64,
}

impl CarouselScheduler {
    pub fn new(config: &WallConfig) -> Self {
        Self {
            position: 0,
            enabled: true,
            wide: false,
            batch: config.carousel_batch.max(1),
            pause_epoch: 0,
        }
    }

    /// Whether interval ticks should be flowing at all.
    pub fn wants_ticks(&self, loaded: usize) -> bool {
        self.wide && self.enabled && loaded > 0
    }

    /// One interval tick against `loaded` cards.
    pub fn tick(&mut self, loaded: usize, has_more: bool) -> Advance {
        if !self.wants_ticks(loaded) {
            return Advance::Stayed;
        }
        let next = self.position + self.batch;
        if next >= loaded {
            if has_more {
                tracing::trace!(target: "cardwall.carousel", position = self.position, "holding for more cards");
                Advance::NeedMore
            } else {
                self.position = 0;
                Advance::Wrapped
            }
        } else {
            self.position = next;
            Advance::Moved
        }
    }

    /// Disable and invalidate any outstanding settle/resume timers.
    /// Returns the new epoch for the caller to stamp its timers with.
    pub fn pause(&mut self) -> u64 {
        self.enabled = false;
        self.pause_epoch += 1;
        self.pause_epoch
    }

    /// Re-enable, but only if no interaction happened since the timer that
    /// carries `epoch` was armed.
    pub fn resume(&mut self, epoch: u64) -> bool {
        if epoch != self.pause_epoch || self.enabled {
            return false;
        }
        self.enabled = true;
        tracing::debug!(target: "cardwall.carousel", "resumed after quiet period");
        true
    }

    /// Snap to the batch boundary nearest the user's actual scroll offset
    /// (`offset` is a fractional card index).
    pub fn snap_to(&mut self, offset: f64, loaded: usize) {
        let batch = self.batch as f64;
        let snapped = ((offset.max(0.0) / batch).round() * batch) as usize;
        let ceiling = if loaded == 0 {
            0
        } else {
            ((loaded - 1) / self.batch) * self.batch
        };
        self.position = snapped.min(ceiling);
    }

    /// A spotlight just finished; jump home so the new card is visible.
    pub fn spotlight_completed(&mut self) {
        self.position = 0;
    }

    pub fn set_wide(&mut self, wide: bool) {
        self.wide = wide;
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn pause_epoch(&self) -> u64 {
        self.pause_epoch
    }
}
