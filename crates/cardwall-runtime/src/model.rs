#![forbid(unsafe_code)]

//! The wall reducer.
//!
//! [`WallModel`] owns every piece of engine state and advances it one
//! [`Msg`] at a time: `update` mutates the model and returns the effects
//! the runtime should perform. No I/O happens here, which is what makes
//! the whole orchestration testable under the deterministic simulator.
//!
//! Concurrency collapses into sequencing: the engine feeds messages
//! through a single channel, so reducer steps never interleave. Races
//! between timers and real signals resolve by stamp comparison (spotlight
//! `cycle`, carousel pause `epoch`) instead of cancellation.

use ahash::AHashSet;

use cardwall_core::{
    display_number, Card, CardId, CardStore, FetchError, MergeMode, TotalCount, WallConfig,
};

use crate::arrival::ArrivalQueue;
use crate::carousel::{Advance, CarouselScheduler};
use crate::effect::Effect;
use crate::msg::{Msg, TimerKind};
use crate::pagination::PaginationLoader;
use crate::splitter::ViewportSplitter;

/// Complete engine state: the single mutation target for every message.
#[derive(Debug)]
pub struct WallModel {
    config: WallConfig,
    store: CardStore,
    total: TotalCount,
    pagination: PaginationLoader,
    arrival: ArrivalQueue,
    carousel: CarouselScheduler,
    splitter: ViewportSplitter,
    viewport_width: f64,
    last_scroll_offset: f64,
    count_in_flight: bool,
    last_fetch_error: Option<FetchError>,
    failed_assets: AHashSet<CardId>,
}

impl WallModel {
    pub fn new(config: WallConfig) -> Self {
        Self {
            pagination: PaginationLoader::new(&config),
            arrival: ArrivalQueue::new(&config),
            carousel: CarouselScheduler::new(&config),
            splitter: ViewportSplitter::new(&config),
            config,
            store: CardStore::new(),
            total: TotalCount::new(),
            viewport_width: 0.0,
            last_scroll_offset: 0.0,
            count_in_flight: false,
            last_fetch_error: None,
            failed_assets: AHashSet::new(),
        }
    }

    /// Startup effects: the initial page snapshot plus a first count poll.
    pub fn init(&mut self) -> Vec<Effect> {
        self.count_in_flight = true;
        vec![self.pagination.initial_request(), Effect::PollCount]
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::PageLoaded { page, cards } => {
                let received = cards.len();
                self.store.merge(cards, MergeMode::Append);
                self.pagination.on_loaded(page, received);
                self.total.observe_local_len(self.store.len());
                self.last_fetch_error = None;
                Vec::new()
            }
            Msg::PageFailed { page, error } => {
                tracing::warn!(target: "cardwall.model", page, %error, "page fetch failed");
                self.pagination.on_failed();
                self.last_fetch_error = Some(error);
                Vec::new()
            }
            Msg::SentinelVisible => self.pagination.request_next().into_iter().collect(),
            Msg::CardPushed(card) => {
                let id = card.id.clone();
                let inserted = self.store.merge(vec![card], MergeMode::Prepend);
                if inserted.is_empty() {
                    tracing::debug!(target: "cardwall.model", card = %id, "duplicate push absorbed");
                    return Vec::new();
                }
                self.total.record_local_insert();
                self.arrival.enqueue(id)
            }
            Msg::ReconcileTick => {
                if self.count_in_flight {
                    return Vec::new();
                }
                self.count_in_flight = true;
                vec![Effect::PollCount]
            }
            Msg::CountPolled { total } => {
                self.count_in_flight = false;
                self.total.observe_poll(total);
                Vec::new()
            }
            Msg::CountPollFailed { error } => {
                tracing::warn!(target: "cardwall.model", %error, "count poll failed");
                self.count_in_flight = false;
                Vec::new()
            }
            Msg::CarouselTick => {
                let advance = self.carousel.tick(self.store.len(), self.pagination.has_more());
                if advance == Advance::NeedMore {
                    self.pagination.request_next().into_iter().collect()
                } else {
                    Vec::new()
                }
            }
            Msg::AssetReady(id) => self.arrival.asset_settled(&id),
            Msg::AssetFailed(id) => {
                tracing::debug!(target: "cardwall.model", card = %id, "asset failed; treating as settled");
                self.failed_assets.insert(id.clone());
                self.arrival.asset_settled(&id)
            }
            Msg::TimerFired(kind) => self.on_timer(kind),
            Msg::UserScroll { offset } => {
                self.last_scroll_offset = offset;
                let epoch = self.carousel.pause();
                vec![
                    Effect::StartTimer {
                        kind: TimerKind::ScrollSettle { epoch },
                        after: self.config.scroll_settle,
                    },
                    Effect::StartTimer {
                        kind: TimerKind::CarouselResume { epoch },
                        after: self.config.scroll_quiet,
                    },
                ]
            }
            Msg::DragStart { pointer_x } => {
                self.splitter.begin(pointer_x);
                self.carousel.pause();
                Vec::new()
            }
            Msg::DragMove { pointer_x } => {
                self.splitter.update(pointer_x, self.viewport_width);
                Vec::new()
            }
            Msg::DragEnd => {
                if !self.splitter.finish() {
                    return Vec::new();
                }
                vec![Effect::StartTimer {
                    kind: TimerKind::CarouselResume {
                        epoch: self.carousel.pause_epoch(),
                    },
                    after: self.config.resize_quiet,
                }]
            }
            Msg::ViewportResized { width } => {
                self.viewport_width = width;
                self.carousel.set_wide(width >= self.config.wide_breakpoint);
                Vec::new()
            }
        }
    }

    fn on_timer(&mut self, kind: TimerKind) -> Vec<Effect> {
        match kind {
            TimerKind::AssetWait { cycle } => self.arrival.wait_timed_out(cycle),
            TimerKind::SpotlightHold { cycle } => match self.arrival.hold_elapsed(cycle) {
                Some((_done, effects)) => {
                    self.carousel.spotlight_completed();
                    effects
                }
                None => Vec::new(),
            },
            TimerKind::ScrollSettle { epoch } => {
                if epoch == self.carousel.pause_epoch() {
                    self.carousel
                        .snap_to(self.last_scroll_offset, self.store.len());
                }
                Vec::new()
            }
            TimerKind::CarouselResume { epoch } => {
                // A quiet period elapsing mid-drag must not re-enable the
                // scheduler; DragEnd arms its own resume.
                if !self.splitter.is_dragging() {
                    self.carousel.resume(epoch);
                }
                Vec::new()
            }
        }
    }

    /// Whether the carousel interval subscription should be running.
    pub fn wants_carousel_ticks(&self) -> bool {
        self.carousel.wants_ticks(self.store.len())
    }

    pub fn config(&self) -> &WallConfig {
        &self.config
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.store.get(id)
    }

    /// Display number for the loaded card at `index` (0 = newest).
    pub fn card_number(&self, index: usize) -> u64 {
        display_number(self.total.get(), index)
    }

    /// Everything a presentation layer needs for one frame.
    pub fn snapshot(&self) -> WallSnapshot {
        WallSnapshot {
            cards: self.store.cards().to_vec(),
            total_count: self.total.get(),
            count_version: self.total.version(),
            spotlight_card_id: self.arrival.active().cloned(),
            spotlight_seq: self.arrival.cycle(),
            queue_depth: self.arrival.depth(),
            carousel_position: self.carousel.position(),
            carousel_enabled: self.carousel.enabled(),
            split_ratio: self.splitter.ratio(),
            loading: self.pagination.is_loading(),
            has_more: self.pagination.has_more(),
            last_fetch_error: self.last_fetch_error.clone(),
            failed_assets: self.failed_assets.iter().cloned().collect(),
        }
    }
}

/// Owned view of the model for one render pass.
#[derive(Debug, Clone)]
pub struct WallSnapshot {
    /// Loaded cards, newest first.
    pub cards: Vec<Card>,
    pub total_count: u64,
    /// Bumps on every successful count poll; drives the recount animation.
    pub count_version: u64,
    /// Card currently owning the spotlight slot, if any.
    pub spotlight_card_id: Option<CardId>,
    /// Spotlight cycle stamp; remount the spotlight when it changes.
    pub spotlight_seq: u64,
    /// Cards waiting behind the spotlighted one.
    pub queue_depth: usize,
    pub carousel_position: usize,
    pub carousel_enabled: bool,
    pub split_ratio: f64,
    pub loading: bool,
    pub has_more: bool,
    pub last_fetch_error: Option<FetchError>,
    /// Cards whose photo never resolved; render their fallback.
    pub failed_assets: Vec<CardId>,
}

impl WallSnapshot {
    /// Display number for `cards[index]`.
    pub fn card_number(&self, index: usize) -> u64 {
        display_number(self.total_count, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn card(id: &str, minute: u32) -> Card {
        Card {
            id: CardId::from(id),
            display_name: format!("author-{id}"),
            message: "thanks".into(),
            photo_ref: Some(format!("photos/{id}.jpg")),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, minute, 0).unwrap(),
        }
    }

    fn page(ids: &[&str]) -> Vec<Card> {
        ids.iter()
            .enumerate()
            .map(|(n, id)| card(id, 59 - n as u32))
            .collect()
    }

    fn started() -> WallModel {
        let mut m = WallModel::new(WallConfig::default());
        m.init();
        m
    }

    /// Model with the first page loaded and the count polled.
    fn loaded(total: u64) -> WallModel {
        let mut m = started();
        let ids: Vec<String> = (0..12).map(|n| format!("p{n}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        m.update(Msg::PageLoaded {
            page: 0,
            cards: page(&refs),
        });
        m.update(Msg::CountPolled { total });
        m
    }

    fn wide(mut m: WallModel) -> WallModel {
        m.update(Msg::ViewportResized { width: 1280.0 });
        m
    }

    #[test]
    fn init_requests_snapshot_and_count() {
        let mut m = WallModel::new(WallConfig::default());
        let effects = m.init();
        assert_eq!(
            effects,
            vec![
                Effect::LoadPage {
                    page: 0,
                    offset: 0,
                    limit: 12
                },
                Effect::PollCount,
            ]
        );
        assert!(m.snapshot().loading);
    }

    #[test]
    fn initial_page_numbers_newest_down() {
        let m = loaded(40);
        let snap = m.snapshot();
        assert_eq!(snap.cards.len(), 12);
        assert_eq!(snap.card_number(0), 40);
        assert_eq!(snap.card_number(11), 29);
        assert!(!snap.loading);
    }

    #[test]
    fn page_failure_records_error_and_allows_retry() {
        let mut m = started();
        m.update(Msg::PageFailed {
            page: 0,
            error: FetchError::Timeout,
        });
        let snap = m.snapshot();
        assert_eq!(snap.last_fetch_error, Some(FetchError::Timeout));
        assert!(!snap.loading);
        // Next load success clears the sticky error.
        m.update(Msg::PageLoaded {
            page: 0,
            cards: page(&["a"]),
        });
        assert!(m.snapshot().last_fetch_error.is_none());
    }

    #[test]
    fn sentinel_loads_one_page_at_a_time() {
        let mut m = loaded(40);
        let first = m.update(Msg::SentinelVisible);
        assert_eq!(
            first,
            vec![Effect::LoadPage {
                page: 1,
                offset: 12,
                limit: 12
            }]
        );
        assert!(m.update(Msg::SentinelVisible).is_empty());
    }

    #[test]
    fn pushed_card_prepends_counts_and_spotlights() {
        let mut m = loaded(40);
        let effects = m.update(Msg::CardPushed(card("live", 0)));
        assert_eq!(effects[0], Effect::RequestAsset(CardId::from("live")));

        let snap = m.snapshot();
        assert_eq!(snap.cards[0].id.as_str(), "live");
        assert_eq!(snap.total_count, 41);
        assert_eq!(snap.card_number(0), 41);
        assert_eq!(snap.spotlight_card_id, Some(CardId::from("live")));
        assert_eq!(snap.queue_depth, 0);
    }

    #[test]
    fn duplicate_push_changes_nothing() {
        let mut m = loaded(40);
        m.update(Msg::CardPushed(card("live", 0)));
        let effects = m.update(Msg::CardPushed(card("live", 0)));
        assert!(effects.is_empty());
        let snap = m.snapshot();
        assert_eq!(snap.total_count, 41);
        assert_eq!(snap.queue_depth, 0);
        assert_eq!(snap.cards.iter().filter(|c| c.id.as_str() == "live").count(), 1);
    }

    #[test]
    fn spotlight_full_cycle_resets_carousel_home() {
        let mut m = wide(loaded(40));
        m.update(Msg::CarouselTick);
        assert_eq!(m.snapshot().carousel_position, 3);

        m.update(Msg::CardPushed(card("live", 0)));
        let seq = m.snapshot().spotlight_seq;
        m.update(Msg::AssetReady(CardId::from("live")));
        m.update(Msg::TimerFired(TimerKind::SpotlightHold { cycle: seq }));

        let snap = m.snapshot();
        assert_eq!(snap.spotlight_card_id, None);
        assert_eq!(snap.carousel_position, 0);
    }

    #[test]
    fn asset_failure_still_advances_and_is_reported() {
        let mut m = loaded(40);
        m.update(Msg::CardPushed(card("broken", 0)));
        m.update(Msg::AssetFailed(CardId::from("broken")));
        let snap = m.snapshot();
        // Failed load behaves like ready: the hold timer is now running.
        assert_eq!(snap.spotlight_card_id, Some(CardId::from("broken")));
        assert_eq!(snap.failed_assets, vec![CardId::from("broken")]);
    }

    #[test]
    fn reconcile_tick_skips_while_a_poll_is_outstanding() {
        let mut m = started();
        // init left a poll in flight.
        assert!(m.update(Msg::ReconcileTick).is_empty());
        m.update(Msg::CountPolled { total: 10 });
        assert_eq!(m.update(Msg::ReconcileTick), vec![Effect::PollCount]);
    }

    #[test]
    fn count_never_decreases_across_polls() {
        let mut m = loaded(40);
        m.update(Msg::CountPollFailed {
            error: FetchError::Timeout,
        });
        m.update(Msg::ReconcileTick);
        m.update(Msg::CountPolled { total: 35 });
        assert_eq!(m.snapshot().total_count, 40);
    }

    #[test]
    fn carousel_hold_triggers_pagination_then_wraps_when_exhausted() {
        let mut m = wide(loaded(40));
        // 12 loaded: positions 0, 3, 6, 9, then the end.
        for _ in 0..3 {
            m.update(Msg::CarouselTick);
        }
        assert_eq!(m.snapshot().carousel_position, 9);
        let effects = m.update(Msg::CarouselTick);
        assert_eq!(
            effects,
            vec![Effect::LoadPage {
                page: 1,
                offset: 12,
                limit: 12
            }]
        );
        assert_eq!(m.snapshot().carousel_position, 9);

        // Short page: the feed is exhausted, so the next overrun wraps.
        m.update(Msg::PageLoaded {
            page: 1,
            cards: page(&["q0"]),
        });
        m.update(Msg::CarouselTick);
        m.update(Msg::CarouselTick);
        assert_eq!(m.snapshot().carousel_position, 0);
    }

    #[test]
    fn scroll_pauses_carousel_and_quiet_period_resumes_it() {
        let mut m = wide(loaded(40));
        let effects = m.update(Msg::UserScroll { offset: 5.0 });
        assert!(!m.snapshot().carousel_enabled);
        let (settle_epoch, resume_epoch) = match (&effects[0], &effects[1]) {
            (
                Effect::StartTimer {
                    kind: TimerKind::ScrollSettle { epoch: a },
                    ..
                },
                Effect::StartTimer {
                    kind: TimerKind::CarouselResume { epoch: b },
                    ..
                },
            ) => (*a, *b),
            other => panic!("unexpected effects {other:?}"),
        };
        assert_eq!(settle_epoch, resume_epoch);

        m.update(Msg::TimerFired(TimerKind::ScrollSettle { epoch: settle_epoch }));
        assert_eq!(m.snapshot().carousel_position, 6);

        m.update(Msg::TimerFired(TimerKind::CarouselResume { epoch: resume_epoch }));
        assert!(m.snapshot().carousel_enabled);
    }

    #[test]
    fn renewed_scroll_invalidates_the_earlier_quiet_period() {
        let mut m = wide(loaded(40));
        m.update(Msg::UserScroll { offset: 3.0 });
        m.update(Msg::UserScroll { offset: 6.0 });

        // The first burst's timers (epoch 1) fire late: both are stale now.
        m.update(Msg::TimerFired(TimerKind::ScrollSettle { epoch: 1 }));
        m.update(Msg::TimerFired(TimerKind::CarouselResume { epoch: 1 }));
        assert!(!m.snapshot().carousel_enabled);
        assert_eq!(m.snapshot().carousel_position, 0);
    }

    #[test]
    fn drag_updates_ratio_and_resumes_after_quiet() {
        let mut m = wide(loaded(40));
        m.update(Msg::DragStart { pointer_x: 1000.0 });
        assert!(!m.snapshot().carousel_enabled);
        m.update(Msg::DragMove { pointer_x: 872.0 });
        assert!((m.snapshot().split_ratio - 0.35).abs() < 1e-9);

        let effects = m.update(Msg::DragEnd);
        let epoch = match effects.as_slice() {
            [Effect::StartTimer {
                kind: TimerKind::CarouselResume { epoch },
                after,
            }] => {
                assert_eq!(*after, Duration::from_secs(3));
                *epoch
            }
            other => panic!("unexpected effects {other:?}"),
        };
        m.update(Msg::TimerFired(TimerKind::CarouselResume { epoch }));
        assert!(m.snapshot().carousel_enabled);
    }

    #[test]
    fn scroll_quiet_period_cannot_resume_mid_drag() {
        let mut m = wide(loaded(40));
        m.update(Msg::DragStart { pointer_x: 1000.0 });
        let effects = m.update(Msg::UserScroll { offset: 3.0 });
        let epoch = match &effects[1] {
            Effect::StartTimer {
                kind: TimerKind::CarouselResume { epoch },
                ..
            } => *epoch,
            other => panic!("unexpected effect {other:?}"),
        };

        // The scroll's quiet period elapses while the divider is still
        // held: the resume must not land.
        m.update(Msg::TimerFired(TimerKind::CarouselResume { epoch }));
        assert!(!m.snapshot().carousel_enabled);

        // Releasing the drag arms its own resume at the same epoch.
        m.update(Msg::DragEnd);
        m.update(Msg::TimerFired(TimerKind::CarouselResume { epoch }));
        assert!(m.snapshot().carousel_enabled);
    }

    #[test]
    fn drag_end_without_a_drag_schedules_nothing() {
        let mut m = wide(loaded(40));
        assert!(m.update(Msg::DragEnd).is_empty());
    }

    #[test]
    fn narrow_viewport_disables_ticks() {
        let mut m = loaded(40);
        m.update(Msg::ViewportResized { width: 800.0 });
        assert!(!m.wants_carousel_ticks());
        m.update(Msg::ViewportResized { width: 1024.0 });
        assert!(m.wants_carousel_ticks());
    }
}
