#![forbid(unsafe_code)]

//! In-memory persistence with live insert fan-out.
//!
//! Backs tests and demos: cards live in a newest-first vector, pagination
//! slices it, and `create_card` fires every registered insert listener the
//! way a realtime channel would. A failure switch simulates transient
//! outages for the error-handling paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cardwall_core::{Card, CardId, FetchError, NewCard};
use chrono::Utc;

use crate::persistence::{InsertCallback, Persistence, Unsubscribe};

#[derive(Default)]
struct Inner {
    /// Newest first, like the backing query's `created_at desc`.
    cards: Vec<Card>,
    next_id: u64,
    next_listener: u64,
    listeners: HashMap<u64, InsertCallback>,
    fail_fetches: bool,
}

/// Thread-safe in-memory [`Persistence`] implementation.
pub struct InMemoryPersistence {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Start with existing cards; they are sorted newest-first.
    pub fn seeded(mut cards: Vec<Card>) -> Self {
        cards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let store = Self::new();
        store.lock().cards = cards;
        store
    }

    /// Make subsequent `list_cards`/`count_cards` calls fail.
    pub fn set_fail_fetches(&self, fail: bool) {
        self.lock().fail_fetches = fail;
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

impl Persistence for InMemoryPersistence {
    fn list_cards(&self, offset: u64, limit: usize) -> Result<Vec<Card>, FetchError> {
        let inner = self.lock();
        if inner.fail_fetches {
            return Err(FetchError::unavailable("simulated outage"));
        }
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(inner.cards.len());
        let end = start.saturating_add(limit).min(inner.cards.len());
        Ok(inner.cards[start..end].to_vec())
    }

    fn count_cards(&self) -> Result<u64, FetchError> {
        let inner = self.lock();
        if inner.fail_fetches {
            return Err(FetchError::unavailable("simulated outage"));
        }
        Ok(inner.cards.len() as u64)
    }

    fn create_card(&self, input: NewCard) -> Result<Card, FetchError> {
        let (card, listeners) = {
            let mut inner = self.lock();
            inner.next_id += 1;
            let id = CardId::new(format!("card-{}", inner.next_id));
            let card = input.into_card(id, Utc::now());
            inner.cards.insert(0, card.clone());
            let listeners: Vec<InsertCallback> = inner.listeners.values().cloned().collect();
            (card, listeners)
        };
        // Fan out without holding the lock; a listener may call back in.
        for listener in listeners {
            listener(card.clone());
        }
        Ok(card)
    }

    fn subscribe_on_insert(&self, callback: InsertCallback) -> Unsubscribe {
        let key = {
            let mut inner = self.lock();
            inner.next_listener += 1;
            let key = inner.next_listener;
            inner.listeners.insert(key, callback);
            key
        };
        let inner = Arc::clone(&self.inner);
        Unsubscribe::new(move || {
            inner
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .listeners
                .remove(&key);
        })
    }
}
