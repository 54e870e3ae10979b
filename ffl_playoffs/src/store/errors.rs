//! Bracket store error types.

use crate::bracket::{BracketId, LeagueId};
use thiserror::Error;

use super::repository::Version;

/// Errors raised by a bracket repository
#[derive(Debug, Error)]
pub enum StoreError {
    /// No bracket stored under this ID
    #[error("Bracket not found: {0}")]
    NotFound(BracketId),

    /// The stored bracket moved on since it was loaded
    #[error("Version conflict for bracket {bracket_id}: expected {expected}, found {actual}")]
    VersionConflict {
        bracket_id: BracketId,
        expected: Version,
        actual: Version,
    },

    /// A different bracket is already stored for the league
    #[error("League {0} already has a playoff bracket")]
    DuplicateLeague(LeagueId),

    /// Failed to encode a bracket snapshot
    #[error("Failed to encode bracket: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// Failed to decode a bracket snapshot
    #[error("Failed to decode bracket: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
