//! Bracket advancement service.
//!
//! Loads a league's bracket, decides a round (breaking ties with the
//! bracket's own tiebreaker cascade), and saves the result back.

use crate::bracket::{
    BracketError, LeagueId, MatchupStatus, PlayerId, PlayoffRound, TiebreakerResolver,
    TiebreakerResult,
};
use crate::store::{BracketRepository, StoreError, Version, VersionedBracket};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Advancement errors
#[derive(Debug, Error)]
pub enum AdvancementError {
    #[error("No playoff bracket found for league {0}")]
    LeagueNotFound(LeagueId),

    #[error("No matchups found for the {round} of league {league_id}")]
    NoMatchups {
        league_id: LeagueId,
        round: PlayoffRound,
    },

    #[error(transparent)]
    Bracket(#[from] BracketError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type AdvancementResult<T> = Result<T, AdvancementError>;

/// Outcome of one decided matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupResult {
    pub matchup_id: Uuid,
    pub matchup_number: u32,
    /// None when the final ended with co-winners
    pub winner_id: Option<PlayerId>,
    pub loser_id: Option<PlayerId>,
    pub margin_of_victory: Option<Decimal>,
    pub is_upset: bool,
    pub tiebreaker_result: Option<TiebreakerResult>,
}

/// Summary of a processed round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancementReport {
    pub league_id: LeagueId,
    pub round: PlayoffRound,
    /// Losers of every decided matchup in the round
    pub eliminated: Vec<PlayerId>,
    /// Winners of every decided matchup in the round
    pub advancing: Vec<PlayerId>,
    pub matchup_results: Vec<MatchupResult>,
    /// Matchups still waiting on scores or a tiebreaker
    pub pending_matchups: usize,
    pub playoffs_complete: bool,
    /// Stored version after the save
    pub version: Version,
}

/// Drives rounds of stored brackets forward
#[derive(Clone)]
pub struct BracketAdvancementService<R: BracketRepository> {
    repository: Arc<R>,
}

impl<R: BracketRepository> BracketAdvancementService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Decide every ready matchup of a round and persist the bracket.
    ///
    /// Tied matchups go through the bracket's configured tiebreaker cascade.
    /// Winners advance once the whole round is decided.
    ///
    /// # Errors
    ///
    /// Returns error if the league has no bracket, the round has no
    /// matchups, or the bracket was saved by someone else in the meantime
    pub async fn process_round(
        &self,
        league_id: LeagueId,
        round: PlayoffRound,
    ) -> AdvancementResult<AdvancementReport> {
        let VersionedBracket {
            mut bracket,
            version,
        } = self
            .repository
            .find_by_league_id(league_id)
            .await?
            .ok_or(AdvancementError::LeagueNotFound(league_id))?;

        if bracket.matchups_for_round(round).is_empty() {
            return Err(AdvancementError::NoMatchups { league_id, round });
        }

        bracket.process_round_results(round)?;

        let resolver = TiebreakerResolver::new(bracket.tiebreaker_configuration().clone());
        if bracket.resolve_ties(round, &resolver) > 0 {
            bracket.process_round_results(round)?;
        }

        let mut eliminated = Vec::new();
        let mut advancing = Vec::new();
        let mut matchup_results = Vec::new();
        let mut pending_matchups = 0;

        for matchup in bracket.matchups_for_round(round) {
            if matchup.status() != MatchupStatus::Completed {
                pending_matchups += 1;
                continue;
            }
            eliminated.extend(matchup.loser_id());
            advancing.extend(matchup.winner_id());
            matchup_results.push(MatchupResult {
                matchup_id: matchup.id(),
                matchup_number: matchup.matchup_number(),
                winner_id: matchup.winner_id(),
                loser_id: matchup.loser_id(),
                margin_of_victory: matchup.margin_of_victory(),
                is_upset: matchup.is_upset(),
                tiebreaker_result: matchup.tiebreaker_result().cloned(),
            });
        }

        let version = self.repository.save(&bracket, version).await?;

        log::info!(
            "Processed the {} for league {}: {} decided, {} pending",
            round,
            league_id,
            matchup_results.len(),
            pending_matchups
        );

        Ok(AdvancementReport {
            league_id,
            round,
            eliminated,
            advancing,
            matchup_results,
            pending_matchups,
            playoffs_complete: bracket.is_complete(),
            version,
        })
    }
}
