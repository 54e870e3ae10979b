//! Repository trait for loading and saving whole brackets.
//!
//! A bracket is always read and written as one unit. Every save names the
//! version it was loaded at, so two writers racing on the same bracket
//! cannot silently overwrite each other.

use async_trait::async_trait;
use bincode::config;
use bincode::serde::{decode_from_slice, encode_to_vec};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use crate::bracket::{BracketId, LeagueId, PlayoffBracket};

/// Monotonic per-bracket version number
pub type Version = u64;

/// Version of a bracket that has never been saved
pub const UNSAVED_VERSION: Version = 0;

/// A loaded bracket with the version it was stored at
#[derive(Debug, Clone)]
pub struct VersionedBracket {
    pub bracket: PlayoffBracket,
    pub version: Version,
}

/// Trait for bracket persistence
#[async_trait]
pub trait BracketRepository: Send + Sync {
    /// Find a bracket by its ID
    async fn find_by_id(&self, id: BracketId) -> StoreResult<Option<VersionedBracket>>;

    /// Find the bracket belonging to a league
    async fn find_by_league_id(&self, league_id: LeagueId) -> StoreResult<Option<VersionedBracket>>;

    /// Store the bracket if the stored version still equals `expected_version`
    /// ([`UNSAVED_VERSION`] for a new bracket). Returns the new version.
    async fn save(&self, bracket: &PlayoffBracket, expected_version: Version)
    -> StoreResult<Version>;

    /// Remove a bracket
    async fn delete(&self, id: BracketId) -> StoreResult<()>;
}

struct StoredBracket {
    league_id: LeagueId,
    version: Version,
    snapshot: Vec<u8>,
}

impl StoredBracket {
    fn load(&self) -> StoreResult<VersionedBracket> {
        let (bracket, _) = decode_from_slice(&self.snapshot, config::standard())?;
        Ok(VersionedBracket {
            bracket,
            version: self.version,
        })
    }
}

/// In-process repository holding bincode snapshots
#[derive(Clone, Default)]
pub struct InMemoryBracketRepository {
    brackets: Arc<RwLock<HashMap<BracketId, StoredBracket>>>,
}

impl InMemoryBracketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored brackets
    pub async fn len(&self) -> usize {
        self.brackets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.brackets.read().await.is_empty()
    }
}

#[async_trait]
impl BracketRepository for InMemoryBracketRepository {
    async fn find_by_id(&self, id: BracketId) -> StoreResult<Option<VersionedBracket>> {
        let brackets = self.brackets.read().await;
        brackets.get(&id).map(StoredBracket::load).transpose()
    }

    async fn find_by_league_id(&self, league_id: LeagueId) -> StoreResult<Option<VersionedBracket>> {
        let brackets = self.brackets.read().await;
        brackets
            .values()
            .find(|stored| stored.league_id == league_id)
            .map(StoredBracket::load)
            .transpose()
    }

    async fn save(
        &self,
        bracket: &PlayoffBracket,
        expected_version: Version,
    ) -> StoreResult<Version> {
        let snapshot = encode_to_vec(bracket, config::standard())?;
        let mut brackets = self.brackets.write().await;

        let current = brackets
            .get(&bracket.id())
            .map_or(UNSAVED_VERSION, |stored| stored.version);
        if current != expected_version {
            return Err(StoreError::VersionConflict {
                bracket_id: bracket.id(),
                expected: expected_version,
                actual: current,
            });
        }

        if current == UNSAVED_VERSION
            && brackets
                .values()
                .any(|stored| stored.league_id == bracket.league_id())
        {
            return Err(StoreError::DuplicateLeague(bracket.league_id()));
        }

        let version = current + 1;
        brackets.insert(
            bracket.id(),
            StoredBracket {
                league_id: bracket.league_id(),
                version,
                snapshot,
            },
        );

        log::debug!("Saved bracket {} at version {}", bracket.id(), version);
        Ok(version)
    }

    async fn delete(&self, id: BracketId) -> StoreResult<()> {
        let mut brackets = self.brackets.write().await;
        brackets.remove(&id).ok_or(StoreError::NotFound(id))?;
        log::info!("Deleted bracket {}", id);
        Ok(())
    }
}
