//! A single head-to-head playoff matchup.

use super::errors::{BracketError, BracketResult};
use super::models::{BracketId, MatchupStatus, PlayerId, PlayoffRound, RoundScore};
use super::tiebreaker::TiebreakerResult;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A player occupying one side of a matchup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupSlot {
    pub player_id: PlayerId,
    pub player_name: String,
    pub seed: u32,
}

impl MatchupSlot {
    pub fn new(player_id: PlayerId, player_name: impl Into<String>, seed: u32) -> Self {
        Self {
            player_id,
            player_name: player_name.into(),
            seed,
        }
    }
}

/// One pairing within a round.
///
/// Once the matchup reaches [`MatchupStatus::Completed`] every mutator
/// returns [`BracketError::MatchupCompleted`] and leaves it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffMatchup {
    id: Uuid,
    bracket_id: BracketId,
    round: PlayoffRound,
    /// 1-indexed position within the round
    matchup_number: u32,
    player1: MatchupSlot,
    player2: MatchupSlot,
    player1_score: Option<RoundScore>,
    player2_score: Option<RoundScore>,
    status: MatchupStatus,
    winner_id: Option<PlayerId>,
    loser_id: Option<PlayerId>,
    margin_of_victory: Option<Decimal>,
    is_upset: bool,
    tiebreaker_result: Option<TiebreakerResult>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl PlayoffMatchup {
    pub fn new(
        bracket_id: BracketId,
        round: PlayoffRound,
        matchup_number: u32,
        player1: MatchupSlot,
        player2: MatchupSlot,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            bracket_id,
            round,
            matchup_number,
            player1,
            player2,
            player1_score: None,
            player2_score: None,
            status: MatchupStatus::Scheduled,
            winner_id: None,
            loser_id: None,
            margin_of_victory: None,
            is_upset: false,
            tiebreaker_result: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn set_player1(&mut self, slot: MatchupSlot) -> BracketResult<()> {
        self.ensure_not_completed()?;
        self.player1 = slot;
        Ok(())
    }

    pub fn set_player2(&mut self, slot: MatchupSlot) -> BracketResult<()> {
        self.ensure_not_completed()?;
        self.player2 = slot;
        Ok(())
    }

    pub fn update_player1_score(&mut self, score: RoundScore) -> BracketResult<()> {
        self.ensure_not_completed()?;
        self.player1_score = Some(score);
        self.update_status();
        Ok(())
    }

    pub fn update_player2_score(&mut self, score: RoundScore) -> BracketResult<()> {
        self.ensure_not_completed()?;
        self.player2_score = Some(score);
        self.update_status();
        Ok(())
    }

    /// Attach a score to whichever slot the scored player occupies
    pub fn update_score(&mut self, score: RoundScore) -> BracketResult<()> {
        if score.player_id == self.player1.player_id {
            self.update_player1_score(score)
        } else if score.player_id == self.player2.player_id {
            self.update_player2_score(score)
        } else {
            Err(BracketError::PlayerNotInMatchup {
                player_id: score.player_id,
                matchup_number: self.matchup_number,
            })
        }
    }

    /// Both scores are attached and final
    pub fn is_ready_for_result(&self) -> bool {
        matches!(
            (&self.player1_score, &self.player2_score),
            (Some(s1), Some(s2)) if s1.is_complete && s2.is_complete
        )
    }

    /// Decide the matchup on total score.
    ///
    /// Returns `Ok(true)` when a winner was set and `Ok(false)` when a score
    /// is missing or the totals are equal (the matchup is then
    /// [`MatchupStatus::Tied`]).
    pub fn determine_winner(&mut self) -> BracketResult<bool> {
        self.ensure_not_completed()?;

        let (Some(s1), Some(s2)) = (&self.player1_score, &self.player2_score) else {
            return Ok(false);
        };
        let (score1, score2) = (s1.total_score, s2.total_score);

        if score1 > score2 {
            self.tiebreaker_result = None;
            self.set_winner(self.player1.player_id, self.player2.player_id, score1 - score2);
            Ok(true)
        } else if score2 > score1 {
            self.tiebreaker_result = None;
            self.set_winner(self.player2.player_id, self.player1.player_id, score2 - score1);
            Ok(true)
        } else {
            self.status = MatchupStatus::Tied;
            Ok(false)
        }
    }

    /// Apply an externally decided tiebreaker.
    ///
    /// A resolved result sets the winner with a zero margin. A co-winners
    /// result completes the matchup with no winner and is only accepted in
    /// the final round. An unresolved result is recorded and the matchup
    /// stays tied.
    pub fn apply_tiebreaker_result(&mut self, result: TiebreakerResult) -> BracketResult<()> {
        if self.status != MatchupStatus::Tied {
            if self.status == MatchupStatus::Completed {
                return Err(BracketError::MatchupCompleted {
                    round: self.round,
                    matchup_number: self.matchup_number,
                });
            }
            return Err(BracketError::NotTied {
                status: self.status,
            });
        }

        match (result.winner_id, result.loser_id) {
            (Some(winner), Some(loser)) => {
                for player_id in [winner, loser] {
                    if !self.has_player(player_id) {
                        return Err(BracketError::PlayerNotInMatchup {
                            player_id,
                            matchup_number: self.matchup_number,
                        });
                    }
                }
                self.tiebreaker_result = Some(result);
                self.set_winner(winner, loser, Decimal::ZERO);
            }
            _ if result.is_co_winners() => {
                if !self.round.is_final() {
                    return Err(BracketError::CoWinnersOutsideFinal(self.round));
                }
                self.tiebreaker_result = Some(result);
                self.status = MatchupStatus::Completed;
                self.completed_at = Some(Utc::now());
            }
            _ => {
                self.tiebreaker_result = Some(result);
            }
        }

        Ok(())
    }

    fn set_winner(&mut self, winner_id: PlayerId, loser_id: PlayerId, margin: Decimal) {
        self.winner_id = Some(winner_id);
        self.loser_id = Some(loser_id);
        self.margin_of_victory = Some(margin.abs());
        self.status = MatchupStatus::Completed;
        self.completed_at = Some(Utc::now());

        // Upset: the worse (numerically larger) seed won
        self.is_upset = if winner_id == self.player1.player_id {
            self.player1.seed > self.player2.seed
        } else {
            self.player2.seed > self.player1.seed
        };
    }

    fn update_status(&mut self) {
        // A corrected score on a tied matchup keeps it tied until re-decided
        if self.status == MatchupStatus::Tied && self.is_ready_for_result() {
            return;
        }
        if self.player1_score.is_some() || self.player2_score.is_some() {
            self.status = MatchupStatus::InProgress;
            // An unresolved tiebreak only describes the tie it was run on
            self.tiebreaker_result = None;
        }
    }

    fn ensure_not_completed(&self) -> BracketResult<()> {
        if self.status == MatchupStatus::Completed {
            return Err(BracketError::MatchupCompleted {
                round: self.round,
                matchup_number: self.matchup_number,
            });
        }
        Ok(())
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.player1.player_id == player_id || self.player2.player_id == player_id
    }

    pub fn score_for_player(&self, player_id: PlayerId) -> Option<&RoundScore> {
        if self.player1.player_id == player_id {
            self.player1_score.as_ref()
        } else if self.player2.player_id == player_id {
            self.player2_score.as_ref()
        } else {
            None
        }
    }

    /// The slot a player occupies
    pub fn slot_for(&self, player_id: PlayerId) -> BracketResult<&MatchupSlot> {
        if self.player1.player_id == player_id {
            Ok(&self.player1)
        } else if self.player2.player_id == player_id {
            Ok(&self.player2)
        } else {
            Err(BracketError::PlayerNotInMatchup {
                player_id,
                matchup_number: self.matchup_number,
            })
        }
    }

    /// The slot facing a player
    pub fn opponent_of(&self, player_id: PlayerId) -> Option<&MatchupSlot> {
        if self.player1.player_id == player_id {
            Some(&self.player2)
        } else if self.player2.player_id == player_id {
            Some(&self.player1)
        } else {
            None
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bracket_id(&self) -> BracketId {
        self.bracket_id
    }

    pub fn round(&self) -> PlayoffRound {
        self.round
    }

    pub fn matchup_number(&self) -> u32 {
        self.matchup_number
    }

    pub fn player1(&self) -> &MatchupSlot {
        &self.player1
    }

    pub fn player2(&self) -> &MatchupSlot {
        &self.player2
    }

    pub fn player1_score(&self) -> Option<&RoundScore> {
        self.player1_score.as_ref()
    }

    pub fn player2_score(&self) -> Option<&RoundScore> {
        self.player2_score.as_ref()
    }

    pub fn status(&self) -> MatchupStatus {
        self.status
    }

    pub fn winner_id(&self) -> Option<PlayerId> {
        self.winner_id
    }

    pub fn loser_id(&self) -> Option<PlayerId> {
        self.loser_id
    }

    pub fn margin_of_victory(&self) -> Option<Decimal> {
        self.margin_of_victory
    }

    pub fn is_upset(&self) -> bool {
        self.is_upset
    }

    pub fn tiebreaker_result(&self) -> Option<&TiebreakerResult> {
        self.tiebreaker_result.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::tiebreaker::TiebreakerMethod;

    fn alice() -> MatchupSlot {
        MatchupSlot::new(Uuid::from_u128(1), "Alice", 1)
    }

    fn bob() -> MatchupSlot {
        MatchupSlot::new(Uuid::from_u128(2), "Bob", 8)
    }

    fn matchup(round: PlayoffRound) -> PlayoffMatchup {
        PlayoffMatchup::new(Uuid::from_u128(99), round, 1, alice(), bob())
    }

    fn score(slot: &MatchupSlot, round: PlayoffRound, total: Decimal, complete: bool) -> RoundScore {
        RoundScore::new(slot.player_id, slot.player_name.clone(), round, total, complete)
    }

    fn scored(round: PlayoffRound, total1: Decimal, total2: Decimal) -> PlayoffMatchup {
        let mut m = matchup(round);
        m.update_player1_score(score(&alice(), round, total1, true)).unwrap();
        m.update_player2_score(score(&bob(), round, total2, true)).unwrap();
        m
    }

    #[test]
    fn test_new_matchup_is_scheduled() {
        let m = matchup(PlayoffRound::WildCard);
        assert_eq!(m.status(), MatchupStatus::Scheduled);
        assert!(!m.is_ready_for_result());
        assert_eq!(m.winner_id(), None);
        assert_eq!(m.margin_of_victory(), None);
    }

    #[test]
    fn test_partial_scores_move_to_in_progress() {
        let mut m = matchup(PlayoffRound::WildCard);
        m.update_player1_score(score(&alice(), PlayoffRound::WildCard, Decimal::from(90), true))
            .unwrap();
        assert_eq!(m.status(), MatchupStatus::InProgress);
        assert!(!m.is_ready_for_result());

        m.update_player2_score(score(&bob(), PlayoffRound::WildCard, Decimal::from(80), false))
            .unwrap();
        assert_eq!(m.status(), MatchupStatus::InProgress);
        assert!(!m.is_ready_for_result());
    }

    #[test]
    fn test_determine_winner_higher_total_wins() {
        let mut m = scored(PlayoffRound::WildCard, Decimal::new(1105, 1), Decimal::new(982, 1));
        assert!(m.is_ready_for_result());

        assert!(m.determine_winner().unwrap());
        assert_eq!(m.status(), MatchupStatus::Completed);
        assert_eq!(m.winner_id(), Some(alice().player_id));
        assert_eq!(m.loser_id(), Some(bob().player_id));
        assert_eq!(m.margin_of_victory(), Some(Decimal::new(123, 1)));
        assert!(!m.is_upset());
        assert!(m.completed_at().is_some());
    }

    #[test]
    fn test_worse_seed_winning_is_an_upset() {
        let mut m = scored(PlayoffRound::WildCard, Decimal::from(70), Decimal::from(95));
        assert!(m.determine_winner().unwrap());
        assert_eq!(m.winner_id(), Some(bob().player_id));
        assert_eq!(m.margin_of_victory(), Some(Decimal::from(25)));
        assert!(m.is_upset());
    }

    #[test]
    fn test_equal_totals_tie_then_tiebreaker_completes() {
        let mut m = scored(PlayoffRound::WildCard, Decimal::new(1000, 1), Decimal::new(1000, 1));

        assert!(!m.determine_winner().unwrap());
        assert_eq!(m.status(), MatchupStatus::Tied);
        assert_eq!(m.winner_id(), None);

        let result = TiebreakerResult::resolved(
            bob().player_id,
            alice().player_id,
            TiebreakerMethod::MostTouchdowns,
            "5",
            "3",
        );
        m.apply_tiebreaker_result(result.clone()).unwrap();

        assert_eq!(m.status(), MatchupStatus::Completed);
        assert_eq!(m.winner_id(), Some(bob().player_id));
        assert_eq!(m.margin_of_victory(), Some(Decimal::ZERO));
        assert!(m.is_upset());
        assert_eq!(m.tiebreaker_result(), Some(&result));
    }

    #[test]
    fn test_tiebreaker_requires_tied_status() {
        let mut m = matchup(PlayoffRound::WildCard);
        let result = TiebreakerResult::co_winners(alice().player_id, bob().player_id);
        let err = m.apply_tiebreaker_result(result).unwrap_err();
        assert_eq!(
            err,
            BracketError::NotTied {
                status: MatchupStatus::Scheduled
            }
        );
    }

    #[test]
    fn test_co_winners_only_in_final_round() {
        let mut m = scored(PlayoffRound::Conference, Decimal::from(100), Decimal::from(100));
        m.determine_winner().unwrap();

        let result = TiebreakerResult::co_winners(alice().player_id, bob().player_id);
        let err = m.apply_tiebreaker_result(result.clone()).unwrap_err();
        assert_eq!(err, BracketError::CoWinnersOutsideFinal(PlayoffRound::Conference));
        assert_eq!(m.status(), MatchupStatus::Tied);
        assert_eq!(m.tiebreaker_result(), None);

        let mut title = scored(PlayoffRound::SuperBowl, Decimal::from(100), Decimal::from(100));
        title.determine_winner().unwrap();
        title.apply_tiebreaker_result(result).unwrap();
        assert_eq!(title.status(), MatchupStatus::Completed);
        assert_eq!(title.winner_id(), None);
        assert_eq!(title.loser_id(), None);
    }

    #[test]
    fn test_unresolved_tiebreaker_keeps_matchup_tied() {
        let mut m = scored(PlayoffRound::WildCard, Decimal::from(100), Decimal::from(100));
        m.determine_winner().unwrap();

        m.apply_tiebreaker_result(TiebreakerResult::still_tied(
            TiebreakerMethod::MostTouchdowns,
            "4",
        ))
        .unwrap();

        assert_eq!(m.status(), MatchupStatus::Tied);
        assert!(m.tiebreaker_result().is_some());
    }

    #[test]
    fn test_tiebreaker_for_strangers_is_rejected() {
        let mut m = scored(PlayoffRound::WildCard, Decimal::from(100), Decimal::from(100));
        m.determine_winner().unwrap();

        let stranger = Uuid::from_u128(42);
        let result = TiebreakerResult::resolved(
            stranger,
            alice().player_id,
            TiebreakerMethod::HigherSeed,
            "Seed 1",
            "Seed 1",
        );
        assert!(matches!(
            m.apply_tiebreaker_result(result),
            Err(BracketError::PlayerNotInMatchup { .. })
        ));
        assert_eq!(m.status(), MatchupStatus::Tied);
    }

    #[test]
    fn test_completed_matchup_rejects_every_mutator() {
        let mut m = scored(PlayoffRound::WildCard, Decimal::from(120), Decimal::from(100));
        m.determine_winner().unwrap();
        let before = m.clone();

        let expected = BracketError::MatchupCompleted {
            round: PlayoffRound::WildCard,
            matchup_number: 1,
        };
        let stranger = MatchupSlot::new(Uuid::from_u128(7), "Carol", 4);

        assert_eq!(m.set_player1(stranger.clone()), Err(expected.clone()));
        assert_eq!(m.set_player2(stranger), Err(expected.clone()));
        assert_eq!(
            m.update_player1_score(score(&alice(), PlayoffRound::WildCard, Decimal::ZERO, true)),
            Err(expected.clone())
        );
        assert_eq!(
            m.update_player2_score(score(&bob(), PlayoffRound::WildCard, Decimal::ZERO, true)),
            Err(expected.clone())
        );
        assert_eq!(m.determine_winner(), Err(expected.clone()));
        assert_eq!(
            m.apply_tiebreaker_result(TiebreakerResult::co_winners(
                alice().player_id,
                bob().player_id
            )),
            Err(expected)
        );

        assert_eq!(m, before);
    }

    #[test]
    fn test_update_score_routes_by_player() {
        let mut m = matchup(PlayoffRound::WildCard);
        m.update_score(score(&bob(), PlayoffRound::WildCard, Decimal::from(77), true))
            .unwrap();
        assert_eq!(m.player1_score(), None);
        assert_eq!(
            m.score_for_player(bob().player_id).map(|s| s.total_score),
            Some(Decimal::from(77))
        );

        let stranger = MatchupSlot::new(Uuid::from_u128(7), "Carol", 4);
        let err = m
            .update_score(score(&stranger, PlayoffRound::WildCard, Decimal::ONE, true))
            .unwrap_err();
        assert!(matches!(err, BracketError::PlayerNotInMatchup { .. }));
    }

    #[test]
    fn test_slot_lookups() {
        let m = matchup(PlayoffRound::WildCard);
        assert!(m.has_player(alice().player_id));
        assert!(!m.has_player(Uuid::from_u128(7)));
        assert_eq!(m.opponent_of(alice().player_id), Some(&bob()));
        assert_eq!(m.opponent_of(Uuid::from_u128(7)), None);
        assert_eq!(m.slot_for(bob().player_id).unwrap().seed, 8);
        assert!(m.slot_for(Uuid::from_u128(7)).is_err());
    }

    #[test]
    fn test_corrected_score_on_tied_matchup_can_be_redecided() {
        let mut m = scored(PlayoffRound::WildCard, Decimal::from(100), Decimal::from(100));
        m.determine_winner().unwrap();
        assert_eq!(m.status(), MatchupStatus::Tied);

        m.update_player2_score(score(&bob(), PlayoffRound::WildCard, Decimal::from(101), true))
            .unwrap();
        assert_eq!(m.status(), MatchupStatus::Tied);

        assert!(m.determine_winner().unwrap());
        assert_eq!(m.winner_id(), Some(bob().player_id));
        assert_eq!(m.margin_of_victory(), Some(Decimal::ONE));
    }

    #[test]
    fn test_points_decision_drops_unresolved_tiebreaker() {
        let mut m = scored(PlayoffRound::WildCard, Decimal::from(100), Decimal::from(100));
        m.determine_winner().unwrap();
        m.apply_tiebreaker_result(TiebreakerResult::still_tied(
            TiebreakerMethod::MostTouchdowns,
            "4",
        ))
        .unwrap();

        m.update_player2_score(score(&bob(), PlayoffRound::WildCard, Decimal::from(105), true))
            .unwrap();
        assert!(m.determine_winner().unwrap());

        assert_eq!(m.winner_id(), Some(bob().player_id));
        assert_eq!(m.margin_of_victory(), Some(Decimal::from(5)));
        assert!(m.tiebreaker_result().is_none());
    }

    #[test]
    fn test_partial_rescore_of_tied_matchup_drops_unresolved_tiebreaker() {
        let mut m = scored(PlayoffRound::WildCard, Decimal::from(100), Decimal::from(100));
        m.determine_winner().unwrap();
        m.apply_tiebreaker_result(TiebreakerResult::still_tied(
            TiebreakerMethod::MostTouchdowns,
            "4",
        ))
        .unwrap();

        // A partial score means the matchup is live again
        m.update_player2_score(score(&bob(), PlayoffRound::WildCard, Decimal::from(60), false))
            .unwrap();

        assert_eq!(m.status(), MatchupStatus::InProgress);
        assert!(m.tiebreaker_result().is_none());
    }
}
