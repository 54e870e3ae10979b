//! Playoff bracket module.
//!
//! This module implements:
//! - Seeding and first-round pairing (best seed against worst)
//! - Score ingestion with replace-by-player semantics
//! - Round result processing, elimination and re-seeded advancement
//! - Tiebreaker cascades behind the [`TiebreakPolicy`] seam
//! - Per-round and cumulative rankings with shared ranks on ties
//!
//! ## Example
//!
//! ```
//! use ffl_playoffs::bracket::{PlayoffBracket, PlayoffRound, RoundScore};
//! use rust_decimal::Decimal;
//! use uuid::Uuid;
//!
//! let mut bracket = PlayoffBracket::new(Uuid::new_v4(), "Sunday League");
//! let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
//! bracket.add_player(alice, "Alice", 1, Decimal::from(1450)).unwrap();
//! bracket.add_player(bob, "Bob", 2, Decimal::from(1390)).unwrap();
//! bracket.generate_bracket().unwrap();
//!
//! let round = PlayoffRound::WildCard;
//! bracket.record_score(RoundScore::new(alice, "Alice", round, Decimal::new(1105, 1), true)).unwrap();
//! bracket.record_score(RoundScore::new(bob, "Bob", round, Decimal::new(982, 1), true)).unwrap();
//!
//! let eliminated = bracket.process_round_results(round).unwrap();
//! assert_eq!(eliminated, vec![bob]);
//! ```

pub mod aggregate;
pub mod config;
pub mod errors;
pub mod matchup;
pub mod models;
pub mod ranking;
pub mod tiebreaker;

pub use aggregate::{LeagueId, PlayoffBracket};
pub use config::{ConfigError, TIEBREAKER_CASCADE_VAR, TiebreakerConfiguration};
pub use errors::{BracketError, BracketResult, ErrorKind};
pub use matchup::{MatchupSlot, PlayoffMatchup};
pub use models::{
    BracketEntry, BracketId, MatchupStatus, PlayerId, PlayerPlayoffStatus, PlayoffRanking,
    PlayoffRound, RoundScore,
};
pub use ranking::competition_ranks;
pub use tiebreaker::{
    TiebreakPolicy, TiebreakerMethod, TiebreakerResolver, TiebreakerResult, TiedSide,
};
