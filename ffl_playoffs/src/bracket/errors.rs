//! Bracket error types.

use super::models::{MatchupStatus, PlayerId, PlayoffRound};
use thiserror::Error;

/// Broad classification of a [`BracketError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed a value the bracket can never accept
    InvalidArgument,
    /// The request is valid in general but not in the current state
    InvalidState,
    /// A looked-up player or matchup does not exist
    NotFound,
}

/// Bracket errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    /// Player registered twice
    #[error("Player already in bracket: {0}")]
    DuplicatePlayer(PlayerId),

    /// Seeds start at 1
    #[error("Invalid seed {0}: seeds start at 1")]
    InvalidSeed(u32),

    /// Co-winners outcome outside the championship
    #[error("Co-winners can only be declared in the super bowl, not the {0}")]
    CoWinnersOutsideFinal(PlayoffRound),

    /// Bracket generation with no entries
    #[error("Cannot generate bracket without players")]
    NoPlayers,

    /// Bracket generation after scores reached a matchup
    #[error("Cannot regenerate bracket: the {0} is already in play")]
    AlreadyInPlay(PlayoffRound),

    /// Mutation attempted on a decided matchup
    #[error("Cannot modify completed matchup {matchup_number} in the {round}")]
    MatchupCompleted {
        round: PlayoffRound,
        matchup_number: u32,
    },

    /// Tiebreaker applied to a matchup that is not tied
    #[error("Cannot apply tiebreaker - matchup is {status}, not tied")]
    NotTied { status: MatchupStatus },

    /// Player not in bracket
    #[error("Player not found in bracket: {0}")]
    PlayerNotFound(PlayerId),

    /// Player has no matchup in the round
    #[error("No {round} matchup found for player {player_id}")]
    MatchupNotFound {
        round: PlayoffRound,
        player_id: PlayerId,
    },

    /// No matchup with this number in the round
    #[error("Matchup {matchup_number} not found in the {round}")]
    MatchupNumberNotFound {
        round: PlayoffRound,
        matchup_number: u32,
    },

    /// Player does not occupy either slot of the matchup
    #[error("Player {player_id} is not part of matchup {matchup_number}")]
    PlayerNotInMatchup {
        player_id: PlayerId,
        matchup_number: u32,
    },
}

impl BracketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BracketError::DuplicatePlayer(_)
            | BracketError::InvalidSeed(_)
            | BracketError::CoWinnersOutsideFinal(_) => ErrorKind::InvalidArgument,
            BracketError::NoPlayers
            | BracketError::AlreadyInPlay(_)
            | BracketError::MatchupCompleted { .. }
            | BracketError::NotTied { .. } => ErrorKind::InvalidState,
            BracketError::PlayerNotFound(_)
            | BracketError::MatchupNotFound { .. }
            | BracketError::MatchupNumberNotFound { .. }
            | BracketError::PlayerNotInMatchup { .. } => ErrorKind::NotFound,
        }
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
