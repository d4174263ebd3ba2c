#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! Every tunable interval, size, and bound lives here so tests can shrink
//! the timings and embedders can retune without touching engine code.

use std::time::Duration;

/// Cards per page, initial snapshot included.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Full-emphasis presentation time for one spotlighted card.
pub const DEFAULT_SPOTLIGHT_HOLD: Duration = Duration::from_secs(3);

/// Upper bound on waiting for a card's asset before spotlighting anyway.
pub const DEFAULT_ASSET_WAIT: Duration = Duration::from_secs(10);

/// Authoritative count poll interval.
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(10);

/// Carousel auto-advance interval.
pub const DEFAULT_CAROUSEL_INTERVAL: Duration = Duration::from_secs(5);

/// Cards the carousel advances per step.
pub const DEFAULT_CAROUSEL_BATCH: usize = 3;

/// Scroll-burst settle window before the position snap is read.
pub const DEFAULT_SCROLL_SETTLE: Duration = Duration::from_millis(150);

/// Quiet period after user scroll before the carousel resumes.
pub const DEFAULT_SCROLL_QUIET: Duration = Duration::from_secs(10);

/// Shorter quiet period after a split-drag ends.
pub const DEFAULT_RESIZE_QUIET: Duration = Duration::from_secs(3);

/// Side-panel width as a fraction of total width.
pub const DEFAULT_SPLIT_RATIO: f64 = 0.25;
pub const DEFAULT_SPLIT_MIN: f64 = 0.15;
pub const DEFAULT_SPLIT_MAX: f64 = 0.5;

/// Viewport width at or above which the carousel applies.
pub const DEFAULT_WIDE_BREAKPOINT: f64 = 1024.0;

/// Configuration for the wall engine.
#[derive(Debug, Clone)]
pub struct WallConfig {
    pub page_size: usize,
    pub spotlight_hold: Duration,
    pub asset_wait: Duration,
    pub reconcile_interval: Duration,
    pub carousel_interval: Duration,
    pub carousel_batch: usize,
    pub scroll_settle: Duration,
    pub scroll_quiet: Duration,
    pub resize_quiet: Duration,
    pub split_ratio: f64,
    pub split_min: f64,
    pub split_max: f64,
    pub wide_breakpoint: f64,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            spotlight_hold: DEFAULT_SPOTLIGHT_HOLD,
            asset_wait: DEFAULT_ASSET_WAIT,
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            carousel_interval: DEFAULT_CAROUSEL_INTERVAL,
            carousel_batch: DEFAULT_CAROUSEL_BATCH,
            scroll_settle: DEFAULT_SCROLL_SETTLE,
            scroll_quiet: DEFAULT_SCROLL_QUIET,
            resize_quiet: DEFAULT_RESIZE_QUIET,
            split_ratio: DEFAULT_SPLIT_RATIO,
            split_min: DEFAULT_SPLIT_MIN,
            split_max: DEFAULT_SPLIT_MAX,
            wide_breakpoint: DEFAULT_WIDE_BREAKPOINT,
        }
    }
}

impl WallConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the spotlight envelope: hold duration and asset-wait ceiling.
    pub fn with_spotlight_timing(mut self, hold: Duration, asset_wait: Duration) -> Self {
        self.spotlight_hold = hold;
        self.asset_wait = asset_wait;
        self
    }

    pub fn with_reconcile_interval(mut self, interval: Duration) -> Self {
        self.reconcile_interval = interval;
        self
    }

    pub fn with_carousel(mut self, interval: Duration, batch: usize) -> Self {
        self.carousel_interval = interval;
        self.carousel_batch = batch.max(1);
        self
    }

    /// Set the scroll settle window and both quiet periods.
    pub fn with_quiet_periods(
        mut self,
        scroll_settle: Duration,
        scroll_quiet: Duration,
        resize_quiet: Duration,
    ) -> Self {
        self.scroll_settle = scroll_settle;
        self.scroll_quiet = scroll_quiet;
        self.resize_quiet = resize_quiet;
        self
    }

    pub fn with_split(mut self, min: f64, max: f64, initial: f64) -> Self {
        self.split_min = min;
        self.split_max = max;
        self.split_ratio = initial.clamp(min, max);
        self
    }

    pub fn with_wide_breakpoint(mut self, breakpoint: f64) -> Self {
        self.wide_breakpoint = breakpoint;
        self
    }
}
