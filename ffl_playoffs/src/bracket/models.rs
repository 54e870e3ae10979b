//! Playoff data models: rounds, statuses, entries, scores and rankings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// League player ID type
pub type PlayerId = Uuid;

/// Bracket ID type
pub type BracketId = Uuid;

/// Elimination stage of the playoffs, in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayoffRound {
    WildCard,
    Divisional,
    Conference,
    SuperBowl,
}

impl PlayoffRound {
    /// Every round, first to last.
    pub const ALL: [PlayoffRound; 4] = [
        PlayoffRound::WildCard,
        PlayoffRound::Divisional,
        PlayoffRound::Conference,
        PlayoffRound::SuperBowl,
    ];

    /// Round the bracket is seeded into.
    pub const fn first() -> Self {
        PlayoffRound::WildCard
    }

    /// Championship round.
    pub const fn final_round() -> Self {
        PlayoffRound::SuperBowl
    }

    /// Playoff week this round is played in (1-indexed)
    pub const fn week_number(self) -> u32 {
        match self {
            PlayoffRound::WildCard => 1,
            PlayoffRound::Divisional => 2,
            PlayoffRound::Conference => 3,
            PlayoffRound::SuperBowl => 4,
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            PlayoffRound::WildCard => Some(PlayoffRound::Divisional),
            PlayoffRound::Divisional => Some(PlayoffRound::Conference),
            PlayoffRound::Conference => Some(PlayoffRound::SuperBowl),
            PlayoffRound::SuperBowl => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            PlayoffRound::WildCard => None,
            PlayoffRound::Divisional => Some(PlayoffRound::WildCard),
            PlayoffRound::Conference => Some(PlayoffRound::Divisional),
            PlayoffRound::SuperBowl => Some(PlayoffRound::Conference),
        }
    }

    pub const fn is_final(self) -> bool {
        matches!(self, PlayoffRound::SuperBowl)
    }
}

impl fmt::Display for PlayoffRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            PlayoffRound::WildCard => "wild card round",
            PlayoffRound::Divisional => "divisional round",
            PlayoffRound::Conference => "conference round",
            PlayoffRound::SuperBowl => "super bowl",
        };
        write!(f, "{repr}")
    }
}

/// Where a player stands in the playoffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerPlayoffStatus {
    Active,
    Eliminated,
    Champion,
    CoChampion,
}

impl PlayerPlayoffStatus {
    /// Whether the player is still alive in the bracket (champions included).
    pub const fn is_competing(self) -> bool {
        !matches!(self, PlayerPlayoffStatus::Eliminated)
    }
}

impl fmt::Display for PlayerPlayoffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerPlayoffStatus::Active => write!(f, "active"),
            PlayerPlayoffStatus::Eliminated => write!(f, "eliminated"),
            PlayerPlayoffStatus::Champion => write!(f, "champion"),
            PlayerPlayoffStatus::CoChampion => write!(f, "co-champion"),
        }
    }
}

/// Matchup lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchupStatus {
    /// No scores attached yet
    Scheduled,
    /// At least one score attached
    InProgress,
    /// Equal final totals, waiting on a tiebreaker
    Tied,
    /// Decided; no further changes allowed
    Completed,
}

impl fmt::Display for MatchupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchupStatus::Scheduled => write!(f, "scheduled"),
            MatchupStatus::InProgress => write!(f, "in progress"),
            MatchupStatus::Tied => write!(f, "tied"),
            MatchupStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A player's seeding and elimination record within one bracket.
///
/// Status only ever moves away from [`PlayerPlayoffStatus::Active`]; the
/// bracket is the only writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketEntry {
    player_id: PlayerId,
    player_name: String,
    seed: u32,
    regular_season_score: Decimal,
    status: PlayerPlayoffStatus,
    eliminated_in_round: Option<PlayoffRound>,
    eliminated_by_player_id: Option<PlayerId>,
    eliminated_at: Option<DateTime<Utc>>,
}

impl BracketEntry {
    pub(crate) fn new(
        player_id: PlayerId,
        player_name: String,
        seed: u32,
        regular_season_score: Decimal,
    ) -> Self {
        Self {
            player_id,
            player_name,
            seed,
            regular_season_score,
            status: PlayerPlayoffStatus::Active,
            eliminated_in_round: None,
            eliminated_by_player_id: None,
            eliminated_at: None,
        }
    }

    /// Knock the player out. Returns false if they were no longer active.
    pub(crate) fn eliminate(&mut self, round: PlayoffRound, eliminated_by: PlayerId) -> bool {
        if self.status != PlayerPlayoffStatus::Active {
            return false;
        }
        self.status = PlayerPlayoffStatus::Eliminated;
        self.eliminated_in_round = Some(round);
        self.eliminated_by_player_id = Some(eliminated_by);
        self.eliminated_at = Some(Utc::now());
        true
    }

    /// Promote an active player to champion or co-champion.
    pub(crate) fn crown(&mut self, status: PlayerPlayoffStatus) -> bool {
        if self.status != PlayerPlayoffStatus::Active
            || !matches!(
                status,
                PlayerPlayoffStatus::Champion | PlayerPlayoffStatus::CoChampion
            )
        {
            return false;
        }
        self.status = status;
        true
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn regular_season_score(&self) -> Decimal {
        self.regular_season_score
    }

    pub fn status(&self) -> PlayerPlayoffStatus {
        self.status
    }

    pub fn eliminated_in_round(&self) -> Option<PlayoffRound> {
        self.eliminated_in_round
    }

    pub fn eliminated_by_player_id(&self) -> Option<PlayerId> {
        self.eliminated_by_player_id
    }

    pub fn eliminated_at(&self) -> Option<DateTime<Utc>> {
        self.eliminated_at
    }
}

/// A roster's score for one round, as supplied by the scoring service.
///
/// Only `total_score` and `is_complete` drive matchup results. The remaining
/// statistics feed the tiebreaker cascade and default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundScore {
    pub player_id: PlayerId,
    pub player_name: String,
    pub round: PlayoffRound,
    pub total_score: Decimal,
    /// False while any rostered game is still being played
    pub is_complete: bool,
    pub highest_position_score: Decimal,
    pub second_highest_position_score: Decimal,
    pub total_touchdowns: u32,
    pub total_turnovers: u32,
    pub calculated_at: DateTime<Utc>,
}

impl RoundScore {
    pub fn new(
        player_id: PlayerId,
        player_name: impl Into<String>,
        round: PlayoffRound,
        total_score: Decimal,
        is_complete: bool,
    ) -> Self {
        Self {
            player_id,
            player_name: player_name.into(),
            round,
            total_score,
            is_complete,
            highest_position_score: Decimal::ZERO,
            second_highest_position_score: Decimal::ZERO,
            total_touchdowns: 0,
            total_turnovers: 0,
            calculated_at: Utc::now(),
        }
    }

    /// Attach the best and second-best single position scores
    pub fn with_position_scores(mut self, highest: Decimal, second_highest: Decimal) -> Self {
        self.highest_position_score = highest;
        self.second_highest_position_score = second_highest;
        self
    }

    /// Attach touchdown and turnover totals
    pub fn with_touchdowns_and_turnovers(mut self, touchdowns: u32, turnovers: u32) -> Self {
        self.total_touchdowns = touchdowns;
        self.total_turnovers = turnovers;
        self
    }
}

/// One line of a round or cumulative leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffRanking {
    pub player_id: PlayerId,
    pub player_name: String,
    /// Standard competition rank (1-indexed, ties share a rank)
    pub rank: u32,
    /// Rank in the preceding round's snapshot, 0 if unranked
    pub previous_rank: u32,
    pub score: Decimal,
    pub round: PlayoffRound,
    pub is_cumulative: bool,
    pub rounds_survived: u32,
    pub status: PlayerPlayoffStatus,
}

impl PlayoffRanking {
    /// Places gained since the previous round (negative when dropping).
    ///
    /// Zero when there is no previous rank to compare against.
    pub fn rank_change(&self) -> i64 {
        if self.previous_rank == 0 {
            0
        } else {
            i64::from(self.previous_rank) - i64::from(self.rank)
        }
    }
}
