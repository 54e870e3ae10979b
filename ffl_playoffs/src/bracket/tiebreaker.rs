//! Tiebreaker methods, results, and the default cascading resolver.

use super::config::TiebreakerConfiguration;
use super::matchup::{MatchupSlot, PlayoffMatchup};
use super::models::{PlayerId, RoundScore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Ways a tied matchup can be broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TiebreakerMethod {
    /// Best single roster position score wins
    HighestSinglePositionScore,
    /// Second-best single roster position score wins
    SecondHighestPositionScore,
    MostTouchdowns,
    FewerTurnovers,
    /// Lower seed number wins
    HigherSeed,
    /// Nobody wins outright; only valid in the championship
    CoWinners,
}

impl TiebreakerMethod {
    pub const fn name(self) -> &'static str {
        match self {
            TiebreakerMethod::HighestSinglePositionScore => "highest_single_position_score",
            TiebreakerMethod::SecondHighestPositionScore => "second_highest_position_score",
            TiebreakerMethod::MostTouchdowns => "most_touchdowns",
            TiebreakerMethod::FewerTurnovers => "fewer_turnovers",
            TiebreakerMethod::HigherSeed => "higher_seed",
            TiebreakerMethod::CoWinners => "co_winners",
        }
    }
}

impl fmt::Display for TiebreakerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TiebreakerMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "highest_single_position_score" => Ok(TiebreakerMethod::HighestSinglePositionScore),
            "second_highest_position_score" => Ok(TiebreakerMethod::SecondHighestPositionScore),
            "most_touchdowns" => Ok(TiebreakerMethod::MostTouchdowns),
            "fewer_turnovers" => Ok(TiebreakerMethod::FewerTurnovers),
            "higher_seed" => Ok(TiebreakerMethod::HigherSeed),
            "co_winners" => Ok(TiebreakerMethod::CoWinners),
            other => Err(format!("unknown tiebreaker method '{other}'")),
        }
    }
}

/// Outcome of running a tiebreaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiebreakerResult {
    pub method_used: TiebreakerMethod,
    pub winner_id: Option<PlayerId>,
    pub loser_id: Option<PlayerId>,
    /// Value the decision was made on, e.g. "8" touchdowns or "Seed 2"
    pub winner_value: Option<String>,
    pub loser_value: Option<String>,
    /// Both players when the result is [`TiebreakerMethod::CoWinners`]
    pub co_winner_ids: Vec<PlayerId>,
}

impl TiebreakerResult {
    pub fn resolved(
        winner_id: PlayerId,
        loser_id: PlayerId,
        method: TiebreakerMethod,
        winner_value: impl Into<String>,
        loser_value: impl Into<String>,
    ) -> Self {
        Self {
            method_used: method,
            winner_id: Some(winner_id),
            loser_id: Some(loser_id),
            winner_value: Some(winner_value.into()),
            loser_value: Some(loser_value.into()),
            co_winner_ids: Vec::new(),
        }
    }

    /// The method ran but both sides had the same value
    pub fn still_tied(method: TiebreakerMethod, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            method_used: method,
            winner_id: None,
            loser_id: None,
            winner_value: Some(value.clone()),
            loser_value: Some(value),
            co_winner_ids: Vec::new(),
        }
    }

    pub fn co_winners(player1_id: PlayerId, player2_id: PlayerId) -> Self {
        Self {
            method_used: TiebreakerMethod::CoWinners,
            winner_id: None,
            loser_id: None,
            winner_value: None,
            loser_value: None,
            co_winner_ids: vec![player1_id, player2_id],
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.winner_id.is_some() && self.loser_id.is_some()
    }

    pub fn is_co_winners(&self) -> bool {
        self.method_used == TiebreakerMethod::CoWinners
    }

    pub fn is_tied(&self) -> bool {
        !self.is_resolved() && !self.is_co_winners()
    }
}

/// Decides tied matchups.
///
/// The bracket never breaks ties itself; it applies whatever the policy
/// returns.
pub trait TiebreakPolicy {
    fn resolve(&self, matchup: &PlayoffMatchup) -> TiebreakerResult;
}

/// One side of a tied matchup, as seen by the resolver
#[derive(Debug, Clone, Copy)]
pub struct TiedSide<'a> {
    pub player_id: PlayerId,
    pub seed: u32,
    pub score: Option<&'a RoundScore>,
}

impl<'a> TiedSide<'a> {
    pub fn new(slot: &MatchupSlot, score: Option<&'a RoundScore>) -> Self {
        Self {
            player_id: slot.player_id,
            seed: slot.seed,
            score,
        }
    }

    fn highest_position_score(&self) -> Decimal {
        self.score
            .map_or(Decimal::ZERO, |s| s.highest_position_score)
    }

    fn second_highest_position_score(&self) -> Decimal {
        self.score
            .map_or(Decimal::ZERO, |s| s.second_highest_position_score)
    }

    fn touchdowns(&self) -> u32 {
        self.score.map_or(0, |s| s.total_touchdowns)
    }

    fn turnovers(&self) -> u32 {
        self.score.map_or(0, |s| s.total_turnovers)
    }
}

/// Runs a [`TiebreakerConfiguration`] cascade, falling back to co-winners
/// when every method is exhausted.
#[derive(Debug, Clone, Default)]
pub struct TiebreakerResolver {
    configuration: TiebreakerConfiguration,
}

impl TiebreakerResolver {
    pub fn new(configuration: TiebreakerConfiguration) -> Self {
        Self { configuration }
    }

    pub fn configuration(&self) -> &TiebreakerConfiguration {
        &self.configuration
    }

    /// Try each configured method in order until one decides the tie
    pub fn resolve_tie(&self, first: TiedSide<'_>, second: TiedSide<'_>) -> TiebreakerResult {
        for &method in self.configuration.cascade() {
            let result = self.apply_tiebreaker(method, first, second);
            if result.is_resolved() {
                log::debug!(
                    "Tie between {} and {} broken by {}",
                    first.player_id,
                    second.player_id,
                    method
                );
                return result;
            }
        }

        TiebreakerResult::co_winners(first.player_id, second.player_id)
    }

    /// Apply a single method
    pub fn apply_tiebreaker(
        &self,
        method: TiebreakerMethod,
        first: TiedSide<'_>,
        second: TiedSide<'_>,
    ) -> TiebreakerResult {
        match method {
            TiebreakerMethod::HighestSinglePositionScore => higher_wins(
                method,
                (first, first.highest_position_score()),
                (second, second.highest_position_score()),
            ),
            TiebreakerMethod::SecondHighestPositionScore => higher_wins(
                method,
                (first, first.second_highest_position_score()),
                (second, second.second_highest_position_score()),
            ),
            TiebreakerMethod::MostTouchdowns => higher_wins(
                method,
                (first, first.touchdowns()),
                (second, second.touchdowns()),
            ),
            // Fewer turnovers wins, so compare with the sides swapped
            TiebreakerMethod::FewerTurnovers => {
                let (a, b) = (first.turnovers(), second.turnovers());
                if a < b {
                    TiebreakerResult::resolved(
                        first.player_id,
                        second.player_id,
                        method,
                        a.to_string(),
                        b.to_string(),
                    )
                } else if b < a {
                    TiebreakerResult::resolved(
                        second.player_id,
                        first.player_id,
                        method,
                        b.to_string(),
                        a.to_string(),
                    )
                } else {
                    TiebreakerResult::still_tied(method, a.to_string())
                }
            }
            TiebreakerMethod::HigherSeed => {
                if first.seed < second.seed {
                    TiebreakerResult::resolved(
                        first.player_id,
                        second.player_id,
                        method,
                        format!("Seed {}", first.seed),
                        format!("Seed {}", second.seed),
                    )
                } else if second.seed < first.seed {
                    TiebreakerResult::resolved(
                        second.player_id,
                        first.player_id,
                        method,
                        format!("Seed {}", second.seed),
                        format!("Seed {}", first.seed),
                    )
                } else {
                    TiebreakerResult::still_tied(method, format!("Seed {}", first.seed))
                }
            }
            TiebreakerMethod::CoWinners => {
                TiebreakerResult::co_winners(first.player_id, second.player_id)
            }
        }
    }
}

impl TiebreakPolicy for TiebreakerResolver {
    fn resolve(&self, matchup: &PlayoffMatchup) -> TiebreakerResult {
        self.resolve_tie(
            TiedSide::new(matchup.player1(), matchup.player1_score()),
            TiedSide::new(matchup.player2(), matchup.player2_score()),
        )
    }
}

fn higher_wins<T: PartialOrd + fmt::Display>(
    method: TiebreakerMethod,
    (first, a): (TiedSide<'_>, T),
    (second, b): (TiedSide<'_>, T),
) -> TiebreakerResult {
    if a > b {
        TiebreakerResult::resolved(
            first.player_id,
            second.player_id,
            method,
            a.to_string(),
            b.to_string(),
        )
    } else if b > a {
        TiebreakerResult::resolved(
            second.player_id,
            first.player_id,
            method,
            b.to_string(),
            a.to_string(),
        )
    } else {
        TiebreakerResult::still_tied(method, a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::models::PlayoffRound;
    use uuid::Uuid;

    fn p1() -> PlayerId {
        Uuid::from_u128(1)
    }

    fn p2() -> PlayerId {
        Uuid::from_u128(2)
    }

    fn score(player_id: PlayerId, highest: i64, second: i64) -> RoundScore {
        RoundScore::new(player_id, "Player", PlayoffRound::WildCard, Decimal::from(100), true)
            .with_position_scores(Decimal::new(highest, 1), Decimal::new(second, 1))
    }

    fn side(player_id: PlayerId, seed: u32, score: &RoundScore) -> TiedSide<'_> {
        TiedSide {
            player_id,
            seed,
            score: Some(score),
        }
    }

    #[test]
    fn test_highest_position_score() {
        let s1 = score(p1(), 325, 200);
        let s2 = score(p2(), 280, 245);
        let resolver = TiebreakerResolver::default();

        let result = resolver.apply_tiebreaker(
            TiebreakerMethod::HighestSinglePositionScore,
            side(p1(), 1, &s1),
            side(p2(), 2, &s2),
        );

        assert!(result.is_resolved());
        assert_eq!(result.winner_id, Some(p1()));
        assert_eq!(result.loser_id, Some(p2()));
        assert_eq!(result.winner_value.as_deref(), Some("32.5"));
        assert_eq!(result.method_used, TiebreakerMethod::HighestSinglePositionScore);
    }

    #[test]
    fn test_equal_highest_scores_stay_tied() {
        let s1 = score(p1(), 300, 200);
        let s2 = score(p2(), 300, 200);
        let result = TiebreakerResolver::default().apply_tiebreaker(
            TiebreakerMethod::HighestSinglePositionScore,
            side(p1(), 1, &s1),
            side(p2(), 2, &s2),
        );
        assert!(result.is_tied());
        assert!(!result.is_co_winners());
    }

    #[test]
    fn test_most_touchdowns() {
        let s1 = score(p1(), 0, 0).with_touchdowns_and_turnovers(6, 0);
        let s2 = score(p2(), 0, 0).with_touchdowns_and_turnovers(8, 0);
        let result = TiebreakerResolver::default().apply_tiebreaker(
            TiebreakerMethod::MostTouchdowns,
            side(p1(), 1, &s1),
            side(p2(), 2, &s2),
        );
        assert_eq!(result.winner_id, Some(p2()));
        assert_eq!(result.winner_value.as_deref(), Some("8"));
        assert_eq!(result.loser_value.as_deref(), Some("6"));
    }

    #[test]
    fn test_fewer_turnovers() {
        let s1 = score(p1(), 0, 0).with_touchdowns_and_turnovers(0, 3);
        let s2 = score(p2(), 0, 0).with_touchdowns_and_turnovers(0, 1);
        let result = TiebreakerResolver::default().apply_tiebreaker(
            TiebreakerMethod::FewerTurnovers,
            side(p1(), 1, &s1),
            side(p2(), 2, &s2),
        );
        assert_eq!(result.winner_id, Some(p2()));
        assert_eq!(result.loser_id, Some(p1()));
    }

    #[test]
    fn test_higher_seed_means_lower_number() {
        let s1 = score(p1(), 0, 0);
        let s2 = score(p2(), 0, 0);
        let result = TiebreakerResolver::default().apply_tiebreaker(
            TiebreakerMethod::HigherSeed,
            side(p1(), 5, &s1),
            side(p2(), 2, &s2),
        );
        assert_eq!(result.winner_id, Some(p2()));
        assert_eq!(result.winner_value.as_deref(), Some("Seed 2"));
    }

    #[test]
    fn test_cascade_falls_through_to_second_method() {
        let s1 = score(p1(), 300, 250);
        let s2 = score(p2(), 300, 200);
        let result = TiebreakerResolver::default().resolve_tie(side(p1(), 2, &s1), side(p2(), 1, &s2));

        assert_eq!(result.method_used, TiebreakerMethod::SecondHighestPositionScore);
        assert_eq!(result.winner_id, Some(p1()));
    }

    #[test]
    fn test_exhausted_cascade_declares_co_winners() {
        let s1 = score(p1(), 300, 200);
        let s2 = score(p2(), 300, 200);
        let resolver = TiebreakerResolver::new(TiebreakerConfiguration::new(vec![
            TiebreakerMethod::HighestSinglePositionScore,
        ]));

        let result = resolver.resolve_tie(side(p1(), 1, &s1), side(p2(), 1, &s2));

        assert!(result.is_co_winners());
        assert!(!result.is_resolved());
        assert_eq!(result.co_winner_ids, vec![p1(), p2()]);
    }

    #[test]
    fn test_missing_scores_count_as_zero() {
        let resolver = TiebreakerResolver::default();
        let first = TiedSide {
            player_id: p1(),
            seed: 3,
            score: None,
        };
        let second = TiedSide {
            player_id: p2(),
            seed: 6,
            score: None,
        };

        // Every stat ties at zero so the seed decides
        let result = resolver.resolve_tie(first, second);
        assert_eq!(result.method_used, TiebreakerMethod::HigherSeed);
        assert_eq!(result.winner_id, Some(p1()));
    }

    #[test]
    fn test_method_names_round_trip_through_from_str() {
        for method in [
            TiebreakerMethod::HighestSinglePositionScore,
            TiebreakerMethod::SecondHighestPositionScore,
            TiebreakerMethod::MostTouchdowns,
            TiebreakerMethod::FewerTurnovers,
            TiebreakerMethod::HigherSeed,
            TiebreakerMethod::CoWinners,
        ] {
            assert_eq!(method.name().parse::<TiebreakerMethod>(), Ok(method));
        }
        assert!("coin_flip".parse::<TiebreakerMethod>().is_err());
    }
}
