#![forbid(unsafe_code)]

//! Pagination bookkeeping.
//!
//! Pulls older pages on demand and tracks exhaustion. The loader reacts to
//! a boundary-crossing signal (the presentation's sentinel entering view);
//! it never polls, and at most one fetch is outstanding at a time. A failed
//! fetch leaves `page` and `has_more` untouched so the next trigger retries
//! the same range.

use cardwall_core::WallConfig;

use crate::effect::Effect;

#[derive(Debug)]
pub struct PaginationLoader {
    page_size: usize,
    /// Next page to fetch; 1-indexed after the initial page 0.
    next_page: u64,
    in_flight: bool,
    has_more: bool,
}

impl PaginationLoader {
    pub fn new(config: &WallConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            next_page: 1,
            in_flight: false,
            has_more: true,
        }
    }

    /// The startup fetch for page 0 (the initial snapshot).
    pub fn initial_request(&mut self) -> Effect {
        self.in_flight = true;
        Effect::LoadPage {
            page: 0,
            offset: 0,
            limit: self.page_size,
        }
    }

    /// Sentinel-triggered load. No-op while a load is outstanding or the
    /// feed is exhausted.
    pub fn request_next(&mut self) -> Option<Effect> {
        if self.in_flight || !self.has_more {
            return None;
        }
        self.in_flight = true;
        let page = self.next_page;
        tracing::debug!(target: "cardwall.pagination", page, "requesting page");
        Some(Effect::LoadPage {
            page,
            offset: page * self.page_size as u64,
            limit: self.page_size,
        })
    }

    pub fn on_loaded(&mut self, page: u64, received: usize) {
        self.in_flight = false;
        self.has_more = received >= self.page_size;
        self.next_page = page + 1;
        tracing::debug!(
            target: "cardwall.pagination",
            page,
            received,
            has_more = self.has_more,
            "page loaded"
        );
    }

    /// Failure leaves pagination state unchanged apart from clearing the
    /// in-flight flag; no partial page increment.
    pub fn on_failed(&mut self) {
        self.in_flight = false;
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }
}
