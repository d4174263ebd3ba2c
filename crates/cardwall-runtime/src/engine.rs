#![forbid(unsafe_code)]

//! The live engine: reducer plus effect execution.
//!
//! [`Engine`] wraps a [`WallModel`] with the machinery the reducer is pure
//! about: fetches run on worker threads, one-shot timers on the
//! [`TimerPool`](crate::timer), continuous sources under the
//! [`SubscriptionManager`](crate::subscription). All of it funnels into a
//! single message channel, so reducer steps are strictly sequential no
//! matter how many threads produce.
//!
//! The embedder drives the loop: call [`Engine::pump`] (or
//! [`Engine::pump_wait`]) from the render/update loop, read
//! [`Engine::snapshot`], feed presentation events back through a
//! [`WallHandle`]. [`Engine::shutdown`] cancels every background thread
//! and is idempotent; `Drop` calls it.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use cardwall_core::WallConfig;

use crate::cancellation::CancellationSource;
use crate::effect::Effect;
use crate::model::{WallModel, WallSnapshot};
use crate::msg::Msg;
use crate::persistence::{AssetLoader, NullAssetLoader, Persistence};
use crate::subscription::{
    Every, PushFeed, Subscription, SubscriptionManager, SUB_CAROUSEL, SUB_RECONCILE,
};
use crate::timer::TimerPool;

/// Clonable sink for presentation-layer events.
///
/// Safe to use from any thread; sends after shutdown are silently dropped.
#[derive(Clone)]
pub struct WallHandle {
    sender: mpsc::Sender<Msg>,
}

impl WallHandle {
    pub fn report_asset_ready(&self, id: cardwall_core::CardId) {
        let _ = self.sender.send(Msg::AssetReady(id));
    }

    pub fn report_asset_failed(&self, id: cardwall_core::CardId) {
        let _ = self.sender.send(Msg::AssetFailed(id));
    }

    /// `offset` is a fractional card index into the wall viewport.
    pub fn report_user_scroll(&self, offset: f64) {
        let _ = self.sender.send(Msg::UserScroll { offset });
    }

    pub fn report_drag_start(&self, pointer_x: f64) {
        let _ = self.sender.send(Msg::DragStart { pointer_x });
    }

    pub fn report_drag_move(&self, pointer_x: f64) {
        let _ = self.sender.send(Msg::DragMove { pointer_x });
    }

    pub fn report_drag_end(&self) {
        let _ = self.sender.send(Msg::DragEnd);
    }

    pub fn report_sentinel_visible(&self) {
        let _ = self.sender.send(Msg::SentinelVisible);
    }

    pub fn report_viewport_resized(&self, width: f64) {
        let _ = self.sender.send(Msg::ViewportResized { width });
    }
}

pub struct Engine<P: Persistence + 'static> {
    model: WallModel,
    persistence: Arc<P>,
    assets: Arc<dyn AssetLoader>,
    sender: mpsc::Sender<Msg>,
    receiver: mpsc::Receiver<Msg>,
    subs: SubscriptionManager<Msg>,
    timers: TimerPool<Msg>,
    cancel: CancellationSource,
    fetch_workers: Vec<thread::JoinHandle<()>>,
    running: bool,
}

impl<P: Persistence + 'static> Engine<P> {
    pub fn new(persistence: Arc<P>, config: WallConfig) -> Self {
        Self::with_asset_loader(persistence, Arc::new(NullAssetLoader), config)
    }

    pub fn with_asset_loader(
        persistence: Arc<P>,
        assets: Arc<dyn AssetLoader>,
        config: WallConfig,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        let cancel = CancellationSource::new();
        let timers = TimerPool::new(sender.clone(), cancel.token());
        let subs = SubscriptionManager::new(sender.clone());
        Self {
            model: WallModel::new(config),
            persistence,
            assets,
            sender,
            receiver,
            subs,
            timers,
            cancel,
            fetch_workers: Vec::new(),
            running: false,
        }
    }

    /// Kick off the initial snapshot fetch, the first count poll, and the
    /// continuous subscriptions. Idempotent.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        tracing::info!(target: "cardwall.engine", "engine starting");
        let effects = self.model.init();
        self.run_effects(effects);
        self.reconcile_subscriptions();
    }

    /// Drain and apply every queued message without blocking. Returns the
    /// number of messages processed.
    pub fn pump(&mut self) -> usize {
        if !self.running {
            return 0;
        }
        let processed = self.drain();
        if processed > 0 {
            self.reconcile_subscriptions();
        }
        processed
    }

    /// Like [`pump`](Self::pump), but blocks up to `timeout` for the first
    /// message.
    pub fn pump_wait(&mut self, timeout: Duration) -> usize {
        if !self.running {
            return 0;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(msg) => {
                self.dispatch(msg);
                let processed = 1 + self.drain();
                self.reconcile_subscriptions();
                processed
            }
            Err(_) => 0,
        }
    }

    fn drain(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(msg) = self.receiver.try_recv() {
            self.dispatch(msg);
            processed += 1;
        }
        processed
    }

    fn dispatch(&mut self, msg: Msg) {
        let effects = self.model.update(msg);
        self.run_effects(effects);
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadPage { page, offset, limit } => {
                    let persistence = Arc::clone(&self.persistence);
                    let sender = self.sender.clone();
                    let token = self.cancel.token();
                    self.spawn_fetch_worker(move || {
                        if token.is_cancelled() {
                            return;
                        }
                        let msg = match persistence.list_cards(offset, limit) {
                            Ok(cards) => Msg::PageLoaded { page, cards },
                            Err(error) => Msg::PageFailed { page, error },
                        };
                        let _ = sender.send(msg);
                    });
                }
                Effect::PollCount => {
                    let persistence = Arc::clone(&self.persistence);
                    let sender = self.sender.clone();
                    let token = self.cancel.token();
                    self.spawn_fetch_worker(move || {
                        if token.is_cancelled() {
                            return;
                        }
                        let msg = match persistence.count_cards() {
                            Ok(total) => Msg::CountPolled { total },
                            Err(error) => Msg::CountPollFailed { error },
                        };
                        let _ = sender.send(msg);
                    });
                }
                Effect::RequestAsset(id) => {
                    if let Some(card) = self.model.card(&id) {
                        self.assets.request(card);
                    }
                }
                Effect::StartTimer { kind, after } => {
                    self.timers.schedule(after, Msg::TimerFired(kind));
                }
            }
        }
    }

    /// Fetch effects run on short-lived worker threads; the handles are
    /// kept so shutdown can join whatever is still in flight.
    fn spawn_fetch_worker(&mut self, work: impl FnOnce() + Send + 'static) {
        self.fetch_workers.retain(|handle| !handle.is_finished());
        self.fetch_workers.push(thread::spawn(work));
    }

    /// Declare the subscription set the current state wants.
    fn reconcile_subscriptions(&mut self) {
        let config = self.model.config();
        let mut wanted: Vec<Box<dyn Subscription<Msg>>> = vec![
            Box::new(Every::new(SUB_RECONCILE, config.reconcile_interval, || {
                Msg::ReconcileTick
            })),
            Box::new(PushFeed::new(
                Arc::clone(&self.persistence) as Arc<dyn Persistence>,
                Msg::CardPushed,
            )),
        ];
        if self.model.wants_carousel_ticks() {
            wanted.push(Box::new(Every::new(
                SUB_CAROUSEL,
                config.carousel_interval,
                || Msg::CarouselTick,
            )));
        }
        self.subs.reconcile(wanted);
    }

    pub fn handle(&self) -> WallHandle {
        WallHandle {
            sender: self.sender.clone(),
        }
    }

    pub fn snapshot(&self) -> WallSnapshot {
        self.model.snapshot()
    }

    pub fn model(&self) -> &WallModel {
        &self.model
    }

    /// Stop every background thread. Idempotent; `Drop` calls it too.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        tracing::info!(target: "cardwall.engine", "engine shutting down");
        self.cancel.cancel();
        self.subs.stop_all();
        for handle in self.fetch_workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl<P: Persistence + 'static> Drop for Engine<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
