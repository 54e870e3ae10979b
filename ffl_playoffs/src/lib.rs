//! # FFL Playoffs
//!
//! A fantasy football playoff bracket engine.
//!
//! A league's playoffs are modelled as a single [`PlayoffBracket`] aggregate
//! that moves through a fixed sequence of elimination rounds:
//!
//! - **Wild Card** (week 1)
//! - **Divisional** (week 2)
//! - **Conference** (week 3)
//! - **Super Bowl** (week 4, the final)
//!
//! Players are seeded into the first round best against worst. Each round,
//! roster scores are recorded, matchups are decided on total score (ties go
//! through a configurable tiebreaker cascade), losers are eliminated, and the
//! winners are re-seeded into the next round until a champion is crowned.
//!
//! ## Core Modules
//!
//! - [`bracket`]: Bracket aggregate, matchups, tiebreakers and rankings
//! - [`store`]: Whole-bracket persistence with optimistic versioning
//! - [`advancement`]: Load, decide and save a round in one step
//!
//! ## Example
//!
//! ```
//! use ffl_playoffs::{PlayoffBracket, PlayoffRound};
//! use rust_decimal::Decimal;
//! use uuid::Uuid;
//!
//! let mut bracket = PlayoffBracket::new(Uuid::new_v4(), "Sunday League");
//! for seed in 1..=8 {
//!     bracket
//!         .add_player(Uuid::new_v4(), format!("Team {seed}"), seed, Decimal::ZERO)
//!         .unwrap();
//! }
//! bracket.generate_bracket().unwrap();
//!
//! assert_eq!(bracket.matchups_for_round(PlayoffRound::WildCard).len(), 4);
//! ```

/// Bracket aggregate, matchups, tiebreakers and rankings.
pub mod bracket;
pub use bracket::{
    BracketEntry, BracketError, BracketResult, ErrorKind, MatchupStatus, PlayerId,
    PlayerPlayoffStatus, PlayoffBracket, PlayoffMatchup, PlayoffRanking, PlayoffRound,
    RoundScore, TiebreakPolicy, TiebreakerConfiguration, TiebreakerMethod, TiebreakerResolver,
    TiebreakerResult,
};

/// Whole-bracket persistence.
pub mod store;
pub use store::{BracketRepository, InMemoryBracketRepository, StoreError, StoreResult};

/// Round advancement service.
pub mod advancement;
pub use advancement::{
    AdvancementError, AdvancementReport, AdvancementResult, BracketAdvancementService,
    MatchupResult,
};
