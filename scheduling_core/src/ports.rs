// storage port

use crate::match_::{AllocatedMatch, MatchScore, SlotUpdate, StoredMatch};
use crate::pitch::Pitch;
use crate::stage::Stage;
use crate::timing::ScheduleTiming;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Everything the engine needs to know about a tournament, as the storage
/// adapter yields it: confirmed teams inside their groups, stages in order,
/// pitches and timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentInput {
    pub tournament_id: Uuid,
    pub timing: ScheduleTiming,
    pub pitches: Vec<Pitch>,
    pub stages: Vec<Stage>,
}

/// storage port trait
///
/// The engine is pure over its input structures; this trait is its only
/// I/O seam. Implementations are expected to run each method in a single
/// transaction scope, and `apply_slot_updates` must be atomic as a batch.
#[async_trait]
pub trait StoragePort: Send + Sync {
    async fn get_tournament_input(
        &self,
        tournament_id: Uuid,
    ) -> StorageResult<Option<TournamentInput>>;

    /// Persist a freshly generated schedule, replacing any prior matches of
    /// the tournament. Returns the stored shapes with their assigned ids.
    async fn save_allocated_matches(
        &self,
        tournament_id: Uuid,
        matches: &[AllocatedMatch],
    ) -> StorageResult<Vec<StoredMatch>>;

    async fn get_match(&self, match_id: Uuid) -> StorageResult<Option<StoredMatch>>;

    async fn list_matches_of_stage(&self, stage_id: Uuid) -> StorageResult<Vec<StoredMatch>>;

    async fn list_matches_of_group(&self, group_id: Uuid) -> StorageResult<Vec<StoredMatch>>;

    /// Write a result and mark the match completed.
    async fn save_result(&self, match_id: Uuid, score: &MatchScore) -> StorageResult<StoredMatch>;

    /// Remove a result and mark the match scheduled again.
    async fn delete_result(&self, match_id: Uuid) -> StorageResult<StoredMatch>;

    /// Apply propagated team-slot changes as one atomic batch.
    async fn apply_slot_updates(&self, updates: &[SlotUpdate]) -> StorageResult<()>;

    /// Cascade-delete every match of a tournament. Returns the number of
    /// deleted matches.
    async fn delete_matches_of_tournament(&self, tournament_id: Uuid) -> StorageResult<u64>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    /// ID does not exist
    #[error("entity not found")]
    NotFound,

    /// constraint name if the adapter returns one
    #[error("unique violation{0:?}")]
    UniqueViolation(Option<String>),

    // transient problems (retry may work)
    #[error("serialization failure")]
    SerializationFailure,

    // connection, pool, or other adapter errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
