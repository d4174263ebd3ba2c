#![forbid(unsafe_code)]

//! Declarative continuous event sources.
//!
//! The engine does not start and stop its intervals imperatively. After
//! each batch of updates it declares the set of subscriptions the current
//! state wants (reconcile poll always, push feed always, carousel ticks
//! only while wide, enabled, and non-empty) and the
//! [`SubscriptionManager`] reconciles that set against what is running:
//! new ids start, missing ids stop, unchanged ids keep their thread and
//! their phase.
//!
//! Every subscription thread parks on the engine's
//! [`CancellationToken`]; teardown is one cancel plus a join.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use cardwall_core::Card;

use crate::cancellation::{CancellationSource, CancellationToken};
use crate::persistence::Persistence;

/// Stable subscription identity used for reconciliation.
pub type SubId = u64;

pub const SUB_RECONCILE: SubId = 1;
pub const SUB_CAROUSEL: SubId = 2;
pub const SUB_PUSH_FEED: SubId = 3;

/// A continuous source of messages running on its own thread.
pub trait Subscription<M: Send + 'static>: Send {
    /// Identity for reconciliation; equal ids are the same subscription.
    fn id(&self) -> SubId;

    /// Produce messages until the channel closes or `stop` fires.
    fn run(self: Box<Self>, sender: mpsc::Sender<M>, stop: CancellationToken);
}

struct Running {
    id: SubId,
    source: CancellationSource,
    thread: Option<thread::JoinHandle<()>>,
}

impl Running {
    fn stop(mut self) {
        self.source.cancel();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        // Signal without joining; joining in drop could block teardown.
        self.source.cancel();
    }
}

/// Owns the running subscription threads for one engine.
pub(crate) struct SubscriptionManager<M: Send + 'static> {
    active: Vec<Running>,
    sender: mpsc::Sender<M>,
}

impl<M: Send + 'static> SubscriptionManager<M> {
    pub(crate) fn new(sender: mpsc::Sender<M>) -> Self {
        Self {
            active: Vec::new(),
            sender,
        }
    }

    /// Reconcile the declared set against the running set.
    pub(crate) fn reconcile(&mut self, wanted: Vec<Box<dyn Subscription<M>>>) {
        let wanted_ids: HashSet<SubId> = wanted.iter().map(|s| s.id()).collect();

        let mut kept = Vec::with_capacity(self.active.len());
        for running in self.active.drain(..) {
            if wanted_ids.contains(&running.id) {
                kept.push(running);
            } else {
                tracing::debug!(target: "cardwall.subs", sub_id = running.id, "stopping subscription");
                running.stop();
            }
        }
        self.active = kept;

        let mut running_ids: HashSet<SubId> = self.active.iter().map(|r| r.id).collect();
        for sub in wanted {
            let id = sub.id();
            if !running_ids.insert(id) {
                continue;
            }
            tracing::debug!(target: "cardwall.subs", sub_id = id, "starting subscription");
            let source = CancellationSource::new();
            let token = source.token();
            let sender = self.sender.clone();
            let thread = thread::spawn(move || sub.run(sender, token));
            self.active.push(Running {
                id,
                source,
                thread: Some(thread),
            });
        }
    }

    pub(crate) fn stop_all(&mut self) {
        for running in self.active.drain(..) {
            running.stop();
        }
    }
}

impl<M: Send + 'static> Drop for SubscriptionManager<M> {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Fires a message at a fixed interval until stopped.
pub struct Every<M: Send + 'static> {
    id: SubId,
    interval: Duration,
    make_msg: Box<dyn Fn() -> M + Send + Sync>,
}

impl<M: Send + 'static> Every<M> {
    pub fn new(id: SubId, interval: Duration, make_msg: impl Fn() -> M + Send + Sync + 'static) -> Self {
        Self {
            id,
            interval,
            make_msg: Box::new(make_msg),
        }
    }
}

impl<M: Send + 'static> Subscription<M> for Every<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn run(self: Box<Self>, sender: mpsc::Sender<M>, stop: CancellationToken) {
        loop {
            if stop.wait_timeout(self.interval) {
                break;
            }
            if sender.send((self.make_msg)()).is_err() {
                break;
            }
        }
    }
}

/// Bridges the persistence push feed into the message channel.
///
/// Subscribes once on start; the guard is dropped - and with it the
/// upstream registration - when the subscription stops, unconditionally
/// and exactly once, whether or not any event ever arrived.
pub struct PushFeed<M: Send + 'static> {
    persistence: Arc<dyn Persistence>,
    make_msg: Arc<dyn Fn(Card) -> M + Send + Sync>,
}

impl<M: Send + 'static> PushFeed<M> {
    pub fn new(
        persistence: Arc<dyn Persistence>,
        make_msg: impl Fn(Card) -> M + Send + Sync + 'static,
    ) -> Self {
        Self {
            persistence,
            make_msg: Arc::new(make_msg),
        }
    }
}

impl<M: Send + 'static> Subscription<M> for PushFeed<M> {
    fn id(&self) -> SubId {
        SUB_PUSH_FEED
    }

    fn run(self: Box<Self>, sender: mpsc::Sender<M>, stop: CancellationToken) {
        let make_msg = Arc::clone(&self.make_msg);
        let guard = self.persistence.subscribe_on_insert(Arc::new(move |card| {
            let _ = sender.send(make_msg(card));
        }));
        // Park until teardown; delivery happens on the callback.
        loop {
            if stop.wait_timeout(Duration::from_millis(250)) {
                break;
            }
        }
        guard.unsubscribe();
        tracing::debug!(target: "cardwall.subs", "push feed unsubscribed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryPersistence;
    use cardwall_core::NewCard;

    #[derive(Debug, Clone, PartialEq)]
    enum TestMsg {
        Tick,
        Pushed(String),
    }

    #[test]
    fn every_fires_until_stopped() {
        let (tx, rx) = mpsc::channel();
        let source = CancellationSource::new();
        let token = source.token();
        let sub: Box<dyn Subscription<TestMsg>> =
            Box::new(Every::new(9, Duration::from_millis(5), || TestMsg::Tick));
        let handle = thread::spawn(move || sub.run(tx, token));

        thread::sleep(Duration::from_millis(40));
        source.cancel();
        handle.join().unwrap();

        let ticks: Vec<_> = rx.try_iter().collect();
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|m| *m == TestMsg::Tick));
    }

    #[test]
    fn manager_reconciles_by_id() {
        let (tx, rx) = mpsc::channel::<TestMsg>();
        let mut mgr = SubscriptionManager::new(tx);

        mgr.reconcile(vec![Box::new(Every::new(1, Duration::from_millis(5), || {
            TestMsg::Tick
        }))]);
        thread::sleep(Duration::from_millis(30));
        assert!(rx.try_iter().count() > 0);

        // Remove it; after the stop no further ticks arrive.
        mgr.reconcile(vec![]);
        let _ = rx.try_iter().count();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn manager_dedupes_equal_ids() {
        let (tx, rx) = mpsc::channel::<TestMsg>();
        let mut mgr = SubscriptionManager::new(tx);
        mgr.reconcile(vec![
            Box::new(Every::new(7, Duration::from_millis(500), || TestMsg::Tick)),
            Box::new(Every::new(7, Duration::from_millis(1), || TestMsg::Tick)),
        ]);
        // Only the first id-7 subscription runs; the 1ms duplicate was
        // never started, so a short window produces no burst.
        thread::sleep(Duration::from_millis(50));
        assert_eq!(rx.try_iter().count(), 0);
        mgr.stop_all();
    }

    #[test]
    fn push_feed_delivers_and_unsubscribes() {
        let persistence = Arc::new(InMemoryPersistence::new());
        let (tx, rx) = mpsc::channel();
        let source = CancellationSource::new();
        let token = source.token();

        let feed: Box<dyn Subscription<TestMsg>> = Box::new(PushFeed::new(
            Arc::clone(&persistence) as Arc<dyn Persistence>,
            |card| TestMsg::Pushed(card.id.to_string()),
        ));
        let handle = thread::spawn(move || feed.run(tx, token));

        // Wait for the registration before inserting.
        let deadline = std::time::Instant::now() + Duration::from_secs(1);
        while persistence.listener_count() == 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        let card = persistence
            .create_card(NewCard::new("Mina", "hi", None).unwrap())
            .unwrap();

        let got = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(got, TestMsg::Pushed(card.id.to_string()));

        source.cancel();
        handle.join().unwrap();
        assert_eq!(persistence.listener_count(), 0);
    }
}
