#![forbid(unsafe_code)]

//! Arrival queue: one spotlight at a time, strict FIFO.
//!
//! Newly arrived cards are presented one by one. Each cycle first waits for
//! the card's asset with a bounded ceiling (whichever of asset-ready or
//! timeout comes first wins), then holds the spotlight for a fixed
//! envelope, then pops the card and starts the next cycle with no gap.
//!
//! ```text
//! Idle ──front exists──▶ Waiting ──ready | timeout──▶ Spotlighting ──hold──▶ Idle
//! ```
//!
//! # Key Invariants
//!
//! 1. At most one id is in `Waiting`/`Spotlighting` at a time.
//! 2. Presentation order is strict FIFO: a later card's asset resolving
//!    first never advances the queue.
//! 3. Removal happens only from the front, only after the front card's own
//!    cycle completes or times out.
//! 4. No broken image can stall the queue: the timeout arm always runs.
//!
//! Both timer arms carry the `cycle` stamp they were armed under; a fire
//! whose stamp or phase no longer matches is stale and ignored. That makes
//! the transition table exhaustive without cancelling anything.

use std::collections::VecDeque;
use std::time::Duration;

use cardwall_core::{CardId, WallConfig};

use crate::effect::Effect;
use crate::msg::TimerKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Waiting,
    Spotlighting,
}

#[derive(Debug)]
pub struct ArrivalQueue {
    queue: VecDeque<CardId>,
    phase: Phase,
    /// Bumped each time a card enters `Waiting`; doubles as the animation
    /// key the presentation uses to force-remount the spotlight.
    cycle: u64,
    asset_wait: Duration,
    spotlight_hold: Duration,
}

impl ArrivalQueue {
    pub fn new(config: &WallConfig) -> Self {
        Self {
            queue: VecDeque::new(),
            phase: Phase::Idle,
            cycle: 0,
            asset_wait: config.asset_wait,
            spotlight_hold: config.spotlight_hold,
        }
    }

    /// Append an arrival; starts a cycle immediately if the queue was idle.
    pub fn enqueue(&mut self, id: CardId) -> Vec<Effect> {
        self.queue.push_back(id);
        if self.phase == Phase::Idle {
            self.begin_next()
        } else {
            Vec::new()
        }
    }

    fn begin_next(&mut self) -> Vec<Effect> {
        let Some(id) = self.queue.front().cloned() else {
            return Vec::new();
        };
        self.cycle += 1;
        self.phase = Phase::Waiting;
        tracing::debug!(target: "cardwall.arrival", card = %id, cycle = self.cycle, "asset wait started");
        vec![
            Effect::RequestAsset(id),
            Effect::StartTimer {
                kind: TimerKind::AssetWait { cycle: self.cycle },
                after: self.asset_wait,
            },
        ]
    }

    /// Asset resolved (or definitively failed) for `id`. Only the card at
    /// the front of an active wait advances the machine.
    pub fn asset_settled(&mut self, id: &CardId) -> Vec<Effect> {
        if self.phase != Phase::Waiting || self.queue.front() != Some(id) {
            return Vec::new();
        }
        self.enter_spotlight()
    }

    /// The asset-wait ceiling fired.
    pub fn wait_timed_out(&mut self, cycle: u64) -> Vec<Effect> {
        if self.phase != Phase::Waiting || cycle != self.cycle {
            return Vec::new();
        }
        tracing::warn!(
            target: "cardwall.arrival",
            cycle,
            "asset wait timed out; spotlighting without it"
        );
        self.enter_spotlight()
    }

    fn enter_spotlight(&mut self) -> Vec<Effect> {
        self.phase = Phase::Spotlighting;
        vec![Effect::StartTimer {
            kind: TimerKind::SpotlightHold { cycle: self.cycle },
            after: self.spotlight_hold,
        }]
    }

    /// The spotlight envelope elapsed. Returns the finished card and the
    /// effects that start the next cycle, if any.
    pub fn hold_elapsed(&mut self, cycle: u64) -> Option<(CardId, Vec<Effect>)> {
        if self.phase != Phase::Spotlighting || cycle != self.cycle {
            return None;
        }
        let done = self.queue.pop_front()?;
        self.phase = Phase::Idle;
        tracing::debug!(target: "cardwall.arrival", card = %done, cycle, "spotlight finished");
        let effects = self.begin_next();
        Some((done, effects))
    }

    /// The card currently owning the spotlight slot (waiting or shown).
    pub fn active(&self) -> Option<&CardId> {
        if self.phase == Phase::Idle {
            None
        } else {
            self.queue.front()
        }
    }

    /// Cards waiting behind the active one ("N more waiting" badge).
    pub fn depth(&self) -> usize {
        self.queue.len() - usize::from(self.active().is_some())
    }

    /// Monotonic cycle stamp; bumps each time a new spotlight begins.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}
