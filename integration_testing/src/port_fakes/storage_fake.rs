use async_trait::async_trait;
use scheduling_core::{
    AllocatedMatch, MatchScore, MatchStatus, Side, SlotUpdate, StorageError, StoragePort,
    StorageResult, StoredMatch, TournamentInput,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct FakeState {
    inputs: HashMap<Uuid, TournamentInput>,
    matches: HashMap<Uuid, StoredMatch>,
}

/// In-memory implementation of the storage port. Deterministic ordering on
/// every list call and one injectable failure switch per write path.
#[derive(Clone, Default)]
pub struct FakeStoragePort {
    inner: Arc<Mutex<FakeState>>,
    fail_next_save: Arc<Mutex<bool>>,
}

impl FakeStoragePort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tournament the engine can load.
    pub fn insert_tournament(&self, input: TournamentInput) {
        self.inner
            .lock()
            .unwrap()
            .inputs
            .insert(input.tournament_id, input);
    }

    /// Make the next save call fail with a deterministic error.
    pub fn fail_next_save(&self) {
        *self.fail_next_save.lock().unwrap() = true;
    }

    /// Everything persisted for a tournament, ordered by stage and match
    /// number.
    pub fn stored_matches(&self, tournament_id: Uuid) -> Vec<StoredMatch> {
        let guard = self.inner.lock().unwrap();
        let mut rows: Vec<StoredMatch> = guard
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| (m.stage_id, m.match_number));
        rows
    }

    /// Find one persisted match by bracket position.
    pub fn stored_by_position(&self, tournament_id: Uuid, position: &str) -> Option<StoredMatch> {
        self.stored_matches(tournament_id)
            .into_iter()
            .find(|m| m.bracket_position.as_deref() == Some(position))
    }

    fn take_failure(&self) -> bool {
        let mut guard = self.fail_next_save.lock().unwrap();
        std::mem::take(&mut *guard)
    }
}

#[async_trait]
impl StoragePort for FakeStoragePort {
    async fn get_tournament_input(
        &self,
        tournament_id: Uuid,
    ) -> StorageResult<Option<TournamentInput>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .inputs
            .get(&tournament_id)
            .cloned())
    }

    async fn save_allocated_matches(
        &self,
        tournament_id: Uuid,
        matches: &[AllocatedMatch],
    ) -> StorageResult<Vec<StoredMatch>> {
        if self.take_failure() {
            return Err(StorageError::Other(anyhow::anyhow!(
                "injected save failure"
            )));
        }

        let mut guard = self.inner.lock().unwrap();
        // regeneration replaces any prior schedule
        guard
            .matches
            .retain(|_, m| m.tournament_id != tournament_id);

        let mut stored = Vec::with_capacity(matches.len());
        for allocated in matches {
            let row = StoredMatch::from_allocated(Uuid::new_v4(), tournament_id, allocated);
            guard.matches.insert(row.id, row.clone());
            stored.push(row);
        }
        Ok(stored)
    }

    async fn get_match(&self, match_id: Uuid) -> StorageResult<Option<StoredMatch>> {
        Ok(self.inner.lock().unwrap().matches.get(&match_id).cloned())
    }

    async fn list_matches_of_stage(&self, stage_id: Uuid) -> StorageResult<Vec<StoredMatch>> {
        let guard = self.inner.lock().unwrap();
        let mut rows: Vec<StoredMatch> = guard
            .matches
            .values()
            .filter(|m| m.stage_id == stage_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.match_number);
        Ok(rows)
    }

    async fn list_matches_of_group(&self, group_id: Uuid) -> StorageResult<Vec<StoredMatch>> {
        let guard = self.inner.lock().unwrap();
        let mut rows: Vec<StoredMatch> = guard
            .matches
            .values()
            .filter(|m| m.group_id == Some(group_id))
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.match_number);
        Ok(rows)
    }

    async fn save_result(
        &self,
        match_id: Uuid,
        score: &MatchScore,
    ) -> StorageResult<StoredMatch> {
        if self.take_failure() {
            return Err(StorageError::Other(anyhow::anyhow!(
                "injected save failure"
            )));
        }
        let mut guard = self.inner.lock().unwrap();
        let row = guard
            .matches
            .get_mut(&match_id)
            .ok_or(StorageError::NotFound)?;
        row.score = Some(*score);
        row.status = MatchStatus::Completed;
        Ok(row.clone())
    }

    async fn delete_result(&self, match_id: Uuid) -> StorageResult<StoredMatch> {
        let mut guard = self.inner.lock().unwrap();
        let row = guard
            .matches
            .get_mut(&match_id)
            .ok_or(StorageError::NotFound)?;
        row.score = None;
        row.status = MatchStatus::Scheduled;
        Ok(row.clone())
    }

    async fn apply_slot_updates(&self, updates: &[SlotUpdate]) -> StorageResult<()> {
        let mut guard = self.inner.lock().unwrap();
        for update in updates {
            let row = guard
                .matches
                .get_mut(&update.match_id)
                .ok_or(StorageError::NotFound)?;
            match update.side {
                Side::Home => row.home_registration_id = update.registration_id,
                Side::Away => row.away_registration_id = update.registration_id,
            }
        }
        Ok(())
    }

    async fn delete_matches_of_tournament(&self, tournament_id: Uuid) -> StorageResult<u64> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.matches.len();
        guard
            .matches
            .retain(|_, m| m.tournament_id != tournament_id);
        Ok((before - guard.matches.len()) as u64)
    }
}
