//! The playoff bracket aggregate.
//!
//! [`PlayoffBracket`] owns every entry, matchup, score and ranking of one
//! league's playoffs. All state changes go through its command methods, each
//! of which validates before mutating.

use super::config::{ConfigError, TiebreakerConfiguration};
use super::errors::{BracketError, BracketResult};
use super::matchup::{MatchupSlot, PlayoffMatchup};
use super::models::{
    BracketEntry, BracketId, MatchupStatus, PlayerId, PlayerPlayoffStatus, PlayoffRanking,
    PlayoffRound, RoundScore,
};
use super::ranking::competition_ranks;
use super::tiebreaker::{TiebreakPolicy, TiebreakerResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// League ID type
pub type LeagueId = Uuid;

/// Aggregate root for one league's playoff bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffBracket {
    id: BracketId,
    league_id: LeagueId,
    league_name: String,
    current_round: PlayoffRound,
    total_players: u32,
    tiebreaker_configuration: TiebreakerConfiguration,
    entries: HashMap<PlayerId, BracketEntry>,
    matchups: BTreeMap<PlayoffRound, Vec<PlayoffMatchup>>,
    rankings: BTreeMap<PlayoffRound, Vec<PlayoffRanking>>,
    round_scores: BTreeMap<PlayoffRound, Vec<RoundScore>>,
    cumulative_scores: HashMap<PlayerId, Decimal>,
    is_complete: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlayoffBracket {
    /// Create an empty bracket using the default tiebreaker cascade
    pub fn new(league_id: LeagueId, league_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            league_id,
            league_name: league_name.into(),
            current_round: PlayoffRound::first(),
            total_players: 0,
            tiebreaker_configuration: TiebreakerConfiguration::default(),
            entries: HashMap::new(),
            matchups: PlayoffRound::ALL.into_iter().map(|r| (r, Vec::new())).collect(),
            rankings: PlayoffRound::ALL.into_iter().map(|r| (r, Vec::new())).collect(),
            round_scores: PlayoffRound::ALL.into_iter().map(|r| (r, Vec::new())).collect(),
            cumulative_scores: HashMap::new(),
            is_complete: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the tiebreaker cascade ties in this bracket are broken with.
    ///
    /// # Arguments
    ///
    /// * `configuration` - Ordered cascade, checked with
    ///   [`TiebreakerConfiguration::validate`]
    ///
    /// # Errors
    ///
    /// Returns error if the cascade is empty, repeats a method or lists
    /// `co_winners`
    pub fn with_tiebreaker_configuration(
        mut self,
        configuration: TiebreakerConfiguration,
    ) -> Result<Self, ConfigError> {
        configuration.validate()?;
        self.tiebreaker_configuration = configuration;
        Ok(self)
    }

    // === Entries ===

    /// Register a player with their seed.
    ///
    /// # Errors
    ///
    /// Returns error if the player is already registered or the seed is 0
    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        player_name: impl Into<String>,
        seed: u32,
        regular_season_score: Decimal,
    ) -> BracketResult<()> {
        if self.entries.contains_key(&player_id) {
            return Err(BracketError::DuplicatePlayer(player_id));
        }
        if seed == 0 {
            return Err(BracketError::InvalidSeed(seed));
        }

        self.entries.insert(
            player_id,
            BracketEntry::new(player_id, player_name.into(), seed, regular_season_score),
        );
        self.cumulative_scores.insert(player_id, Decimal::ZERO);
        self.total_players = self.entries.len() as u32;
        self.touch();
        Ok(())
    }

    /// Players still alive in the bracket (champions included), best seed first
    pub fn active_players(&self) -> Vec<BracketEntry> {
        self.entries_by_seed(|entry| entry.status().is_competing())
    }

    /// Knocked-out players, best seed first
    pub fn eliminated_players(&self) -> Vec<BracketEntry> {
        self.entries_by_seed(|entry| entry.status() == PlayerPlayoffStatus::Eliminated)
    }

    /// Every entry, best seed first
    pub fn entries(&self) -> Vec<BracketEntry> {
        self.entries_by_seed(|_| true)
    }

    /// Look up one player's entry.
    ///
    /// # Returns
    ///
    /// `None` if the player was never registered
    pub fn entry(&self, player_id: PlayerId) -> Option<&BracketEntry> {
        self.entries.get(&player_id)
    }

    /// Unknown players count as not eliminated
    pub fn is_player_eliminated(&self, player_id: PlayerId) -> bool {
        self.entries
            .get(&player_id)
            .is_some_and(|entry| entry.status() == PlayerPlayoffStatus::Eliminated)
    }

    fn entries_by_seed(&self, filter: impl Fn(&BracketEntry) -> bool) -> Vec<BracketEntry> {
        let mut entries: Vec<BracketEntry> = self
            .entries
            .values()
            .filter(|entry| filter(*entry))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| (entry.seed(), entry.player_id()));
        entries
    }

    // === Generation ===

    /// Pair the field for the first round, best seed against worst.
    ///
    /// With an odd field the median seed is left without a matchup.
    /// Replaces any first-round matchups generated earlier, as long as no
    /// matchup has received a score yet.
    ///
    /// # Errors
    ///
    /// Returns error if no players are registered or play has started
    pub fn generate_bracket(&mut self) -> BracketResult<()> {
        if self.entries.is_empty() {
            return Err(BracketError::NoPlayers);
        }
        if let Some(round) = self.round_in_play() {
            return Err(BracketError::AlreadyInPlay(round));
        }

        let seeded = self.entries();
        let round = PlayoffRound::first();
        if seeded.len() % 2 == 1 {
            let median = &seeded[seeded.len() / 2];
            log::warn!(
                "Odd field of {} players: seed {} ({}) has no {} matchup",
                seeded.len(),
                median.seed(),
                median.player_name(),
                round
            );
        }

        let matchups = self.pair_by_seed(round, &seeded);
        log::info!(
            "Generated {} {} matchups for league {}",
            matchups.len(),
            round,
            self.league_id
        );
        self.matchups.insert(round, matchups);
        self.touch();
        Ok(())
    }

    fn round_in_play(&self) -> Option<PlayoffRound> {
        self.matchups.iter().find_map(|(round, matchups)| {
            matchups
                .iter()
                .any(|m| m.status() != MatchupStatus::Scheduled)
                .then_some(*round)
        })
    }

    fn pair_by_seed(&self, round: PlayoffRound, seeded: &[BracketEntry]) -> Vec<PlayoffMatchup> {
        let n = seeded.len();
        (0..n / 2)
            .map(|i| {
                PlayoffMatchup::new(
                    self.id,
                    round,
                    i as u32 + 1,
                    slot_for_entry(&seeded[i]),
                    slot_for_entry(&seeded[n - 1 - i]),
                )
            })
            .collect()
    }

    // === Scoring ===

    /// Record a player's score for a round.
    ///
    /// A later score for the same player and round replaces the earlier one,
    /// and the cumulative ledger only moves by the difference. Returns
    /// whether a matchup in that round received the score.
    ///
    /// # Errors
    ///
    /// Returns error if the player is not in the bracket or their matchup in
    /// that round is already completed
    pub fn record_score(&mut self, score: RoundScore) -> BracketResult<bool> {
        let player_id = score.player_id;
        let round = score.round;

        if !self.entries.contains_key(&player_id) {
            return Err(BracketError::PlayerNotFound(player_id));
        }
        if let Some(matchup) = self.find_matchup_for_player(round, player_id) {
            if matchup.status() == MatchupStatus::Completed {
                return Err(BracketError::MatchupCompleted {
                    round,
                    matchup_number: matchup.matchup_number(),
                });
            }
        }

        let scores = self.round_scores.entry(round).or_default();
        let previous_idx = scores.iter().position(|s| s.player_id == player_id);
        let previous = previous_idx.map(|idx| scores.remove(idx).total_score);
        scores.push(score.clone());

        let delta = score.total_score - previous.unwrap_or(Decimal::ZERO);
        *self.cumulative_scores.entry(player_id).or_insert(Decimal::ZERO) += delta;

        let matchup = self
            .matchups
            .get_mut(&round)
            .and_then(|matchups| matchups.iter_mut().find(|m| m.has_player(player_id)));
        let attached = match matchup {
            Some(matchup) => {
                matchup.update_score(score)?;
                true
            }
            None => false,
        };

        log::debug!(
            "Recorded {} score for {}: delta {} (attached to matchup: {})",
            round,
            player_id,
            delta,
            attached
        );
        self.touch();
        Ok(attached)
    }

    // === Progression ===

    /// Decide every ready matchup of the round and eliminate the losers.
    ///
    /// Once every matchup of a non-final round is completed the winners are
    /// re-seeded into the next round; completing the final crowns the
    /// champion. Returns the players eliminated by this call.
    ///
    /// # Errors
    ///
    /// Returns error if a matchup rejects its result
    pub fn process_round_results(&mut self, round: PlayoffRound) -> BracketResult<Vec<PlayerId>> {
        let mut eliminated = Vec::new();

        let matchups = self.matchups.entry(round).or_default();
        for matchup in matchups.iter_mut() {
            if matchup.status() != MatchupStatus::Completed && matchup.is_ready_for_result() {
                matchup.determine_winner()?;
            }

            if matchup.status() != MatchupStatus::Completed {
                continue;
            }
            if let (Some(winner), Some(loser)) = (matchup.winner_id(), matchup.loser_id()) {
                let newly_out = self
                    .entries
                    .get_mut(&loser)
                    .is_some_and(|entry| entry.eliminate(round, winner));
                if newly_out {
                    eliminated.push(loser);
                }
            }
        }

        if !eliminated.is_empty() {
            log::info!("{} players eliminated in the {}", eliminated.len(), round);
        }

        if self.is_round_decided(round) {
            if round.is_final() {
                self.declare_champion();
            } else {
                self.advance_to_next_round(round);
            }
        }

        self.touch();
        Ok(eliminated)
    }

    /// The round has matchups and all of them are completed
    pub fn is_round_decided(&self, round: PlayoffRound) -> bool {
        let matchups = self.matchups_for_round(round);
        !matchups.is_empty()
            && matchups
                .iter()
                .all(|m| m.status() == MatchupStatus::Completed)
    }

    /// Re-seed the winners of a decided round into the next round.
    ///
    /// Winners are sorted by their original seed and paired best against
    /// worst. Returns false without changes for the final round, an
    /// undecided round, or a next round that already has matchups.
    pub fn advance_to_next_round(&mut self, completed_round: PlayoffRound) -> bool {
        let Some(next_round) = completed_round.next() else {
            return false;
        };
        if !self.is_round_decided(completed_round) {
            return false;
        }
        if !self.matchups_for_round(next_round).is_empty() {
            log::debug!("The {} is already seeded", next_round);
            return false;
        }

        let mut winners: Vec<BracketEntry> = self
            .matchups_for_round(completed_round)
            .iter()
            .filter_map(PlayoffMatchup::winner_id)
            .filter_map(|id| self.entries.get(&id))
            .cloned()
            .collect();
        winners.sort_by_key(|entry| (entry.seed(), entry.player_id()));

        if winners.len() % 2 == 1 {
            log::warn!(
                "{} winners advance from the {}; seed {} has no {} matchup",
                winners.len(),
                completed_round,
                winners[winners.len() / 2].seed(),
                next_round
            );
        }

        let matchups = self.pair_by_seed(next_round, &winners);
        log::info!(
            "Advanced {} winners into the {} ({} matchups)",
            winners.len(),
            next_round,
            matchups.len()
        );
        self.matchups.insert(next_round, matchups);
        self.current_round = next_round;
        self.touch();
        true
    }

    /// Crown the winner (or co-winners) of the completed championship.
    ///
    /// The bracket is marked complete only when somebody was crowned.
    /// Returns the champion ids, empty while the final is undecided.
    pub fn declare_champion(&mut self) -> Vec<PlayerId> {
        let Some(championship) = self.matchups_for_round(PlayoffRound::final_round()).first()
        else {
            return Vec::new();
        };
        if championship.status() != MatchupStatus::Completed {
            return Vec::new();
        }

        let crowned = if let Some(winner) = championship.winner_id() {
            vec![(winner, PlayerPlayoffStatus::Champion)]
        } else if championship
            .tiebreaker_result()
            .is_some_and(TiebreakerResult::is_co_winners)
        {
            vec![
                (championship.player1().player_id, PlayerPlayoffStatus::CoChampion),
                (championship.player2().player_id, PlayerPlayoffStatus::CoChampion),
            ]
        } else {
            Vec::new()
        };

        if crowned.is_empty() {
            return Vec::new();
        }

        for (player_id, status) in crowned {
            if let Some(entry) = self.entries.get_mut(&player_id) {
                entry.crown(status);
            }
        }

        let champions = self.champions();
        if !self.is_complete {
            log::info!(
                "League {} playoffs complete, champions: {:?}",
                self.league_id,
                champions
            );
        }
        self.is_complete = true;
        self.touch();
        champions
    }

    /// Champions and co-champions, best seed first
    pub fn champions(&self) -> Vec<PlayerId> {
        self.entries_by_seed(|entry| {
            matches!(
                entry.status(),
                PlayerPlayoffStatus::Champion | PlayerPlayoffStatus::CoChampion
            )
        })
        .into_iter()
        .map(|entry| entry.player_id())
        .collect()
    }

    // === Tiebreakers ===

    /// Run the policy over every tied matchup of the round.
    ///
    /// Returns how many matchups the policy completed. Results the matchup
    /// cannot accept, such as co-winners before the final, leave it tied.
    pub fn resolve_ties<P>(&mut self, round: PlayoffRound, policy: &P) -> usize
    where
        P: TiebreakPolicy + ?Sized,
    {
        let mut resolved = 0;

        let matchups = self.matchups.entry(round).or_default();
        for matchup in matchups
            .iter_mut()
            .filter(|m| m.status() == MatchupStatus::Tied)
        {
            let result = policy.resolve(matchup);
            let method = result.method_used;
            match matchup.apply_tiebreaker_result(result) {
                Ok(()) if matchup.status() == MatchupStatus::Completed => resolved += 1,
                Ok(()) => log::debug!(
                    "Matchup {} in the {} still tied after {}",
                    matchup.matchup_number(),
                    round,
                    method
                ),
                Err(e) => log::warn!(
                    "Could not apply {} to matchup {} in the {}: {}",
                    method,
                    matchup.matchup_number(),
                    round,
                    e
                ),
            }
        }

        if resolved > 0 {
            self.touch();
        }
        resolved
    }

    /// Apply an externally decided tiebreaker to one matchup.
    ///
    /// # Errors
    ///
    /// Returns error if the matchup does not exist or rejects the result
    pub fn apply_tiebreaker_result(
        &mut self,
        round: PlayoffRound,
        matchup_number: u32,
        result: TiebreakerResult,
    ) -> BracketResult<()> {
        let matchup = self
            .matchups
            .get_mut(&round)
            .and_then(|matchups| {
                matchups
                    .iter_mut()
                    .find(|m| m.matchup_number() == matchup_number)
            })
            .ok_or(BracketError::MatchupNumberNotFound {
                round,
                matchup_number,
            })?;

        matchup.apply_tiebreaker_result(result)?;
        self.touch();
        Ok(())
    }

    // === Rankings ===

    /// Rank players by round score, or by cumulative score.
    ///
    /// Equal scores share a rank. Round rankings are stored as the round's
    /// snapshot and become the previous ranks of the next round; cumulative
    /// rankings are only returned.
    pub fn calculate_rankings(&mut self, round: PlayoffRound, cumulative: bool) -> Vec<PlayoffRanking> {
        let scores: Vec<(PlayerId, Decimal)> = if cumulative {
            self.cumulative_scores
                .iter()
                .map(|(id, score)| (*id, *score))
                .collect()
        } else {
            self.scores_for_round(round)
                .iter()
                .map(|s| (s.player_id, s.total_score))
                .collect()
        };

        let previous_ranks: HashMap<PlayerId, u32> = round
            .previous()
            .map(|previous| {
                self.rankings_for_round(previous)
                    .iter()
                    .map(|r| (r.player_id, r.rank))
                    .collect()
            })
            .unwrap_or_default();

        let mut rows: Vec<(&BracketEntry, Decimal)> = scores
            .into_iter()
            .filter_map(|(id, score)| self.entries.get(&id).map(|entry| (entry, score)))
            .collect();
        rows.sort_by(|(a, score_a), (b, score_b)| {
            score_b
                .cmp(score_a)
                .then_with(|| a.seed().cmp(&b.seed()))
                .then_with(|| a.player_id().cmp(&b.player_id()))
        });

        let sorted_scores: Vec<Decimal> = rows.iter().map(|(_, score)| *score).collect();
        let rankings: Vec<PlayoffRanking> = rows
            .iter()
            .zip(competition_ranks(&sorted_scores))
            .map(|((entry, score), rank)| PlayoffRanking {
                player_id: entry.player_id(),
                player_name: entry.player_name().to_string(),
                rank,
                previous_rank: previous_ranks
                    .get(&entry.player_id())
                    .copied()
                    .unwrap_or(0),
                score: *score,
                round,
                is_cumulative: cumulative,
                rounds_survived: self.rounds_survived(entry),
                status: entry.status(),
            })
            .collect();

        log::debug!(
            "Ranked {} players for the {} (cumulative: {})",
            rankings.len(),
            round,
            cumulative
        );

        if !cumulative {
            self.rankings.insert(round, rankings.clone());
            self.touch();
        }
        rankings
    }

    fn rounds_survived(&self, entry: &BracketEntry) -> u32 {
        entry.eliminated_in_round().map_or_else(
            || self.current_round.week_number(),
            |round| round.week_number() - 1,
        )
    }

    // === Read API ===

    /// Matchups of a round in matchup-number order, empty until seeded
    pub fn matchups_for_round(&self, round: PlayoffRound) -> &[PlayoffMatchup] {
        self.matchups.get(&round).map_or(&[], Vec::as_slice)
    }

    pub fn matchups_by_round(&self) -> &BTreeMap<PlayoffRound, Vec<PlayoffMatchup>> {
        &self.matchups
    }

    /// Latest score of each player who scored in the round
    pub fn scores_for_round(&self, round: PlayoffRound) -> &[RoundScore] {
        self.round_scores.get(&round).map_or(&[], Vec::as_slice)
    }

    /// Last non-cumulative ranking snapshot stored for the round
    pub fn rankings_for_round(&self, round: PlayoffRound) -> &[PlayoffRanking] {
        self.rankings.get(&round).map_or(&[], Vec::as_slice)
    }

    /// Sum of a player's latest per-round scores.
    ///
    /// # Returns
    ///
    /// `None` for players not in the bracket, zero for players who have not
    /// scored yet
    pub fn cumulative_score(&self, player_id: PlayerId) -> Option<Decimal> {
        self.cumulative_scores.get(&player_id).copied()
    }

    pub fn cumulative_scores(&self) -> &HashMap<PlayerId, Decimal> {
        &self.cumulative_scores
    }

    /// Number of players eliminated in each round
    pub fn elimination_summary(&self) -> BTreeMap<PlayoffRound, usize> {
        PlayoffRound::ALL
            .into_iter()
            .map(|round| {
                let count = self
                    .entries
                    .values()
                    .filter(|entry| entry.eliminated_in_round() == Some(round))
                    .count();
                (round, count)
            })
            .collect()
    }

    /// The matchup a player occupies in a round, if any
    pub fn find_matchup_for_player(
        &self,
        round: PlayoffRound,
        player_id: PlayerId,
    ) -> Option<&PlayoffMatchup> {
        self.matchups_for_round(round)
            .iter()
            .find(|m| m.has_player(player_id))
    }

    /// Like [`Self::find_matchup_for_player`], but a missing matchup is an error
    pub fn matchup_for_player(
        &self,
        round: PlayoffRound,
        player_id: PlayerId,
    ) -> BracketResult<&PlayoffMatchup> {
        self.find_matchup_for_player(round, player_id)
            .ok_or(BracketError::MatchupNotFound { round, player_id })
    }

    pub fn id(&self) -> BracketId {
        self.id
    }

    pub fn league_id(&self) -> LeagueId {
        self.league_id
    }

    pub fn league_name(&self) -> &str {
        &self.league_name
    }

    /// Latest round that has been seeded
    pub fn current_round(&self) -> PlayoffRound {
        self.current_round
    }

    pub fn total_players(&self) -> u32 {
        self.total_players
    }

    pub fn tiebreaker_configuration(&self) -> &TiebreakerConfiguration {
        &self.tiebreaker_configuration
    }

    /// True once a champion or co-champions were crowned
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn slot_for_entry(entry: &BracketEntry) -> MatchupSlot {
    MatchupSlot::new(entry.player_id(), entry.player_name(), entry.seed())
}
