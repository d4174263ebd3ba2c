#![forbid(unsafe_code)]

//! Error taxonomy.
//!
//! Only transient persistence failures surface as errors. Asset failures
//! and duplicate arrivals are alternate signals, not errors, and nothing in
//! the engine is fatal: every failure degrades to a stale-but-consistent
//! state.

use thiserror::Error;

/// A transient persistence failure (page fetch or count poll).
///
/// State is left unchanged by the failed operation; the caller may retry on
/// its next trigger. The engine never retries automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("persistence unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("persistence request timed out")]
    Timeout,
}

impl FetchError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}
