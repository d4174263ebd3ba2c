#![forbid(unsafe_code)]

//! Ordered, de-duplicated card collection.
//!
//! The store is the single mutation target for every producer in the
//! engine: the pagination loader appends older pages to the back, the live
//! ingestor prepends fresh arrivals to the front. Both paths funnel through
//! [`CardStore::merge`], which is where the duplicate check lives.
//!
//! # Ordering
//!
//! The list is newest-first. Pages arrive already sorted by `created_at`
//! descending; live arrivals go to the front in arrival order regardless of
//! their own timestamp. Recency of arrival, not timestamp, governs the
//! front of the list.
//!
//! # Invariant
//!
//! No two entries share an id. `merge` reports the ids it actually
//! inserted so callers can gate follow-up work (queue enqueues, local count
//! increments) on real insertions.

use ahash::AHashSet;

use crate::card::{Card, CardId};

/// Where a merge attaches incoming cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Pagination: drop known ids, concatenate the rest to the back.
    Append,
    /// Live arrival: drop known ids, insert the rest at the front in
    /// arrival order. Idempotent against duplicate push delivery.
    Prepend,
}

/// Newest-first card list with an id index for O(1) duplicate checks.
#[derive(Debug, Default)]
pub struct CardStore {
    cards: Vec<Card>,
    ids: AHashSet<CardId>,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.id == id)
    }

    /// Position of a card in the list, 0 = newest currently loaded.
    pub fn position(&self, id: &CardId) -> Option<usize> {
        self.cards.iter().position(|c| &c.id == id)
    }

    /// Merge `incoming` into the store, returning the ids actually
    /// inserted (duplicates are silently absorbed).
    pub fn merge(&mut self, incoming: Vec<Card>, mode: MergeMode) -> Vec<CardId> {
        let mut fresh = Vec::with_capacity(incoming.len());
        for card in incoming {
            if self.ids.insert(card.id.clone()) {
                fresh.push(card);
            } else {
                tracing::debug!(
                    target: "cardwall.store",
                    card = %card.id,
                    ?mode,
                    "duplicate card absorbed"
                );
            }
        }

        let inserted: Vec<CardId> = fresh.iter().map(|c| c.id.clone()).collect();
        if !inserted.is_empty() {
            match mode {
                MergeMode::Append => self.cards.extend(fresh),
                MergeMode::Prepend => {
                    self.cards.splice(0..0, fresh);
                }
            }
            tracing::debug!(
                target: "cardwall.store",
                inserted = inserted.len(),
                total = self.cards.len(),
                ?mode,
                "cards merged"
            );
        }
        inserted
    }
}
