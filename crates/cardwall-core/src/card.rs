#![forbid(unsafe_code)]

//! Card identity and record types.
//!
//! A [`Card`] is one testimonial record: author name, a short message, an
//! optional photo reference, and a creation timestamp. Cards are immutable
//! once created and are owned by the [`CardStore`](crate::store::CardStore)
//! after ingestion; everything downstream holds clones or borrows.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Maximum message length in display characters (grapheme clusters, not
/// bytes - a composed emoji counts as one).
pub const MAX_MESSAGE_GRAPHEMES: usize = 50;

/// Opaque, stable card identifier.
///
/// The engine never interprets the contents; it only compares ids for
/// equality and uses them as map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One testimonial card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub display_name: String,
    pub message: String,
    /// Photo reference resolvable by the asset-loader collaborator.
    /// `None` renders with the default image.
    pub photo_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a card.
///
/// Construction is the validation point: a `NewCard` that exists is a
/// `NewCard` that passed the length and emptiness checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
    display_name: String,
    message: String,
    photo_ref: Option<String>,
}

impl NewCard {
    pub fn new(
        display_name: impl Into<String>,
        message: impl Into<String>,
        photo_ref: Option<String>,
    ) -> Result<Self, InvalidCard> {
        let display_name = display_name.into();
        let message = message.into();

        if display_name.trim().is_empty() {
            return Err(InvalidCard::EmptyName);
        }
        let graphemes = message.graphemes(true).count();
        if graphemes > MAX_MESSAGE_GRAPHEMES {
            return Err(InvalidCard::MessageTooLong(graphemes));
        }

        Ok(Self {
            display_name,
            message,
            photo_ref,
        })
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn photo_ref(&self) -> Option<&str> {
        self.photo_ref.as_deref()
    }

    /// Materialize the card once persistence has assigned identity.
    pub fn into_card(self, id: CardId, created_at: DateTime<Utc>) -> Card {
        Card {
            id,
            display_name: self.display_name,
            message: self.message,
            photo_ref: self.photo_ref,
            created_at,
        }
    }
}

/// Rejected card input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCard {
    #[error("message exceeds {MAX_MESSAGE_GRAPHEMES} display characters (got {0})")]
    MessageTooLong(usize),
    #[error("display name is empty")]
    EmptyName,
}
