#![forbid(unsafe_code)]

//! Deterministic harness around the reducer.
//!
//! [`WallSimulator`] drives a [`WallModel`] on a virtual clock with no
//! threads: fetch effects land in an inspectable pending list for the test
//! to resolve or fail, asset requests are recorded, and timers fire in
//! deadline order when the clock is advanced. Every interleaving the live
//! engine could produce can be scripted here exactly once.

use std::collections::VecDeque;
use std::time::Duration;

use cardwall_core::{Card, CardId, FetchError, WallConfig};

use crate::effect::Effect;
use crate::model::{WallModel, WallSnapshot};
use crate::msg::{Msg, TimerKind};

/// An outstanding fetch the reducer asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Page { page: u64, offset: u64, limit: usize },
    Count,
}

#[derive(Debug)]
struct PendingTimer {
    due: Duration,
    /// Arm order; ties on `due` fire in arm order.
    seq: u64,
    kind: TimerKind,
}

pub struct WallSimulator {
    model: WallModel,
    now: Duration,
    timers: Vec<PendingTimer>,
    next_seq: u64,
    fetches: VecDeque<FetchRequest>,
    asset_requests: Vec<CardId>,
}

impl WallSimulator {
    /// Build the model and absorb its startup effects.
    pub fn new(config: WallConfig) -> Self {
        let mut sim = Self {
            model: WallModel::new(config),
            now: Duration::ZERO,
            timers: Vec::new(),
            next_seq: 0,
            fetches: VecDeque::new(),
            asset_requests: Vec::new(),
        };
        let effects = sim.model.init();
        sim.absorb(effects);
        sim
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let effects = self.model.update(msg);
        self.absorb(effects);
    }

    fn absorb(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadPage { page, offset, limit } => {
                    self.fetches.push_back(FetchRequest::Page { page, offset, limit });
                }
                Effect::PollCount => self.fetches.push_back(FetchRequest::Count),
                Effect::RequestAsset(id) => self.asset_requests.push(id),
                Effect::StartTimer { kind, after } => {
                    self.timers.push(PendingTimer {
                        due: self.now + after,
                        seq: self.next_seq,
                        kind,
                    });
                    self.next_seq += 1;
                }
            }
        }
    }

    /// Advance the virtual clock, firing due timers in deadline order.
    /// Timers armed by a fire are themselves eligible within the window.
    pub fn advance(&mut self, delta: Duration) {
        let target = self.now + delta;
        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= target)
                .min_by_key(|(_, t)| (t.due, t.seq))
                .map(|(i, _)| i);
            let Some(index) = next else { break };
            let timer = self.timers.swap_remove(index);
            self.now = self.now.max(timer.due);
            self.dispatch(Msg::TimerFired(timer.kind));
        }
        self.now = target;
    }

    /// Complete the oldest outstanding page fetch with `cards`.
    /// Returns `false` when no page fetch is pending.
    pub fn resolve_next_page(&mut self, cards: Vec<Card>) -> bool {
        let Some(page) = self.take_page_fetch() else {
            return false;
        };
        self.dispatch(Msg::PageLoaded { page, cards });
        true
    }

    pub fn fail_next_page(&mut self, error: FetchError) -> bool {
        let Some(page) = self.take_page_fetch() else {
            return false;
        };
        self.dispatch(Msg::PageFailed { page, error });
        true
    }

    fn take_page_fetch(&mut self) -> Option<u64> {
        let index = self
            .fetches
            .iter()
            .position(|f| matches!(f, FetchRequest::Page { .. }))?;
        match self.fetches.remove(index) {
            Some(FetchRequest::Page { page, .. }) => Some(page),
            _ => None,
        }
    }

    /// Complete the oldest outstanding count poll.
    pub fn resolve_count(&mut self, total: u64) -> bool {
        if !self.take_count_fetch() {
            return false;
        }
        self.dispatch(Msg::CountPolled { total });
        true
    }

    pub fn fail_count(&mut self, error: FetchError) -> bool {
        if !self.take_count_fetch() {
            return false;
        }
        self.dispatch(Msg::CountPollFailed { error });
        true
    }

    fn take_count_fetch(&mut self) -> bool {
        match self.fetches.iter().position(|f| *f == FetchRequest::Count) {
            Some(index) => {
                self.fetches.remove(index);
                true
            }
            None => false,
        }
    }

    // Presentation sinks, mirroring WallHandle.

    pub fn push_card(&mut self, card: Card) {
        self.dispatch(Msg::CardPushed(card));
    }

    pub fn asset_ready(&mut self, id: CardId) {
        self.dispatch(Msg::AssetReady(id));
    }

    pub fn asset_failed(&mut self, id: CardId) {
        self.dispatch(Msg::AssetFailed(id));
    }

    pub fn sentinel_visible(&mut self) {
        self.dispatch(Msg::SentinelVisible);
    }

    pub fn scroll(&mut self, offset: f64) {
        self.dispatch(Msg::UserScroll { offset });
    }

    pub fn drag_start(&mut self, pointer_x: f64) {
        self.dispatch(Msg::DragStart { pointer_x });
    }

    pub fn drag_move(&mut self, pointer_x: f64) {
        self.dispatch(Msg::DragMove { pointer_x });
    }

    pub fn drag_end(&mut self) {
        self.dispatch(Msg::DragEnd);
    }

    pub fn resize(&mut self, width: f64) {
        self.dispatch(Msg::ViewportResized { width });
    }

    /// Fire the ticks the live engine's interval subscriptions would send.
    pub fn reconcile_tick(&mut self) {
        self.dispatch(Msg::ReconcileTick);
    }

    pub fn carousel_tick(&mut self) {
        if self.model.wants_carousel_ticks() {
            self.dispatch(Msg::CarouselTick);
        }
    }

    pub fn snapshot(&self) -> WallSnapshot {
        self.model.snapshot()
    }

    pub fn model(&self) -> &WallModel {
        &self.model
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_fetches(&self) -> impl Iterator<Item = &FetchRequest> {
        self.fetches.iter()
    }

    /// Cards the reducer asked the asset loader about, in request order.
    pub fn asset_requests(&self) -> &[CardId] {
        &self.asset_requests
    }
}
