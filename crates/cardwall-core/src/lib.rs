#![forbid(unsafe_code)]

//! Cardwall domain model.
//!
//! This crate holds the pure data model for the cardwall feed engine: card
//! records, the ordered de-duplicated [`CardStore`], the monotonic
//! [`TotalCount`] estimate, display numbering, configuration, and the error
//! taxonomy. There is no I/O here and nothing spawns a thread or arms a
//! timer; all of that lives in `cardwall-runtime`.
//!
//! # Key Components
//!
//! - [`Card`] / [`CardId`] / [`NewCard`] - testimonial records and validated
//!   creation input
//! - [`CardStore`] - newest-first, duplicate-free card list with
//!   append/prepend merge semantics
//! - [`TotalCount`] - never-decreasing total estimate with a cosmetic
//!   recount version stamp
//! - [`WallConfig`] - every tunable interval, size, and bound in one place
//! - [`FetchError`] - the transient-failure taxonomy for persistence calls

pub mod card;
pub mod config;
pub mod count;
pub mod error;
pub mod store;

pub use card::{Card, CardId, InvalidCard, NewCard, MAX_MESSAGE_GRAPHEMES};
pub use config::WallConfig;
pub use count::{display_number, TotalCount};
pub use error::FetchError;
pub use store::{CardStore, MergeMode};
