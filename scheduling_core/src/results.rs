//! Result entry operations of the engine facade.
//!
//! Each operation is one logical transaction: write the score through the
//! storage port, then propagate team slots downstream. Propagation is best
//! effort; an un-parseable label or missing downstream match never rolls
//! back the result write.

use crate::Engine;
use crate::errors::{EngineError, EngineResult};
use crate::match_::{MatchScore, SlotUpdate, StoredMatch};
use crate::ports::TournamentInput;
use crate::propagator::{
    clear_knockout_progression, group_advancement, group_is_complete, group_positions,
    knockout_progression,
};
use crate::stage::Stage;
use crate::utils::validation::{FieldError, ValidationErrors, ValidationResult};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const MAX_SCORE: u32 = 99;

/// Score entry for a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterResultRequest {
    pub match_id: Uuid,
    pub home_score: u32,
    pub away_score: u32,
    pub home_penalties: Option<u32>,
    pub away_penalties: Option<u32>,
    pub notes: Option<String>,
}

impl EnterResultRequest {
    pub fn new(match_id: Uuid, home_score: u32, away_score: u32) -> Self {
        EnterResultRequest {
            match_id,
            home_score,
            away_score,
            home_penalties: None,
            away_penalties: None,
            notes: None,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let mut errs = ValidationErrors::new();
        let fields = [
            ("home_score", Some(self.home_score)),
            ("away_score", Some(self.away_score)),
            ("home_penalties", self.home_penalties),
            ("away_penalties", self.away_penalties),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                if value > MAX_SCORE {
                    errs.add(
                        FieldError::builder()
                            .set_field(String::from(field))
                            .add_out_of_range()
                            .add_message(format!("{field} must be between 0 and {MAX_SCORE}"))
                            .set_object_id(self.match_id)
                            .build(),
                    );
                }
            }
        }
        if self.home_penalties.is_some() != self.away_penalties.is_some() {
            errs.add(
                FieldError::builder()
                    .set_field(String::from("penalties"))
                    .add_message("penalties must be entered for both teams or neither")
                    .set_object_id(self.match_id)
                    .build(),
            );
        }
        errs.into_result()
    }

    pub fn score(&self) -> MatchScore {
        MatchScore {
            home_score: self.home_score,
            away_score: self.away_score,
            home_penalties: self.home_penalties,
            away_penalties: self.away_penalties,
        }
    }
}

/// API of result entry and propagation
impl Engine {
    /// Enter a fresh result and propagate winners, losers and group
    /// standings downstream.
    #[instrument(skip(self, request), fields(match_id = %request.match_id))]
    pub async fn enter_result(&self, request: &EnterResultRequest) -> EngineResult<StoredMatch> {
        request.validate().map_err(EngineError::from)?;

        let stored = self
            .storage()
            .save_result(request.match_id, &request.score())
            .await?;
        info!("result saved");

        self.propagate(&stored, &request.score()).await?;
        Ok(stored)
    }

    /// Update an existing result. Slots populated from the old score are
    /// cleared before the new score propagates, so a flipped winner cannot
    /// leave stale teams downstream.
    #[instrument(skip(self, request), fields(match_id = %request.match_id))]
    pub async fn update_result(&self, request: &EnterResultRequest) -> EngineResult<StoredMatch> {
        request.validate().map_err(EngineError::from)?;

        let existing = self
            .storage()
            .get_match(request.match_id)
            .await?
            .ok_or_else(|| EngineError::MissingId("Match".into()))?;
        let stage_matches = self
            .storage()
            .list_matches_of_stage(existing.stage_id)
            .await?;
        let cleared = clear_knockout_progression(&existing, &stage_matches);
        if !cleared.is_empty() {
            self.storage().apply_slot_updates(&cleared).await?;
        }

        let stored = self
            .storage()
            .save_result(request.match_id, &request.score())
            .await?;
        info!(cleared = cleared.len(), "result updated");

        self.propagate(&stored, &request.score()).await?;
        Ok(stored)
    }

    /// Delete a result and clear every slot it had populated.
    #[instrument(skip(self))]
    pub async fn delete_result(&self, match_id: Uuid) -> EngineResult<StoredMatch> {
        let stored = self.storage().delete_result(match_id).await?;
        let stage_matches = self
            .storage()
            .list_matches_of_stage(stored.stage_id)
            .await?;
        let cleared = clear_knockout_progression(&stored, &stage_matches);
        if !cleared.is_empty() {
            self.storage().apply_slot_updates(&cleared).await?;
        }
        info!(cleared = cleared.len(), "result deleted");
        Ok(stored)
    }

    /// Propagate a completed match: bracket progression for stages that
    /// route by bracket position, group advancement once a group finishes.
    async fn propagate(&self, stored: &StoredMatch, score: &MatchScore) -> EngineResult<()> {
        let Some(input) = self
            .storage()
            .get_tournament_input(stored.tournament_id)
            .await?
        else {
            warn!("tournament input gone, skipping propagation");
            return Ok(());
        };
        let Some(stage) = input.stages.iter().find(|s| s.id == stored.stage_id) else {
            warn!("stage of match unknown, skipping propagation");
            return Ok(());
        };

        // bracket-position routing covers knockouts, finals and the GSL
        // dual shape inside group stages
        if stage.kind.is_bracket() || stored.bracket_position.is_some() {
            let stage_matches = self
                .storage()
                .list_matches_of_stage(stored.stage_id)
                .await?;
            let updates = knockout_progression(stored, score, &stage_matches);
            if !updates.is_empty() {
                info!(updates = updates.len(), "bracket progression");
                self.storage().apply_slot_updates(&updates).await?;
            }
        }

        if stage.kind.is_group_based() {
            if let Some(group_id) = stored.group_id {
                self.advance_group(&input, stage, group_id).await?;
            }
        }
        Ok(())
    }

    async fn advance_group(
        &self,
        input: &TournamentInput,
        stage: &Stage,
        group_id: Uuid,
    ) -> EngineResult<()> {
        let group_matches = self.storage().list_matches_of_group(group_id).await?;
        if !group_is_complete(&group_matches) {
            return Ok(());
        }
        let Some(group) = stage.groups.iter().find(|g| g.id == group_id) else {
            warn!(%group_id, "group unknown, skipping advancement");
            return Ok(());
        };
        let Some(next_stage) = input.stages.iter().find(|s| s.order == stage.order + 1) else {
            info!("final stage group completed, nothing to advance to");
            return Ok(());
        };

        let team_ids: Vec<Uuid> = resolved_group_teams(group, &group_matches);
        let positions = group_positions(stage.kind, &team_ids, &group_matches);
        let next_matches = self
            .storage()
            .list_matches_of_stage(next_stage.id)
            .await?;
        let updates: Vec<SlotUpdate> =
            group_advancement(&group.name, &positions, &next_matches);
        if !updates.is_empty() {
            info!(updates = updates.len(), group = %group.name, "group advancement");
            self.storage().apply_slot_updates(&updates).await?;
        }
        Ok(())
    }
}

/// Teams of a group: the registered assignments, or, for groups that were
/// filled by propagation, the distinct teams appearing in its matches.
fn resolved_group_teams(group: &crate::group::Group, group_matches: &[StoredMatch]) -> Vec<Uuid> {
    if !group.teams.is_empty() {
        return group.teams.iter().map(|t| t.registration_id).collect();
    }
    let mut ids = Vec::new();
    for m in group_matches {
        for id in [m.home_registration_id, m.away_registration_id]
            .into_iter()
            .flatten()
        {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_range_is_validated() {
        let mut request = EnterResultRequest::new(Uuid::new_v4(), 3, 1);
        assert!(request.validate().is_ok());

        request.home_score = 100;
        assert!(request.validate().is_err());
    }

    #[test]
    fn one_sided_penalties_are_rejected() {
        let mut request = EnterResultRequest::new(Uuid::new_v4(), 1, 1);
        request.home_penalties = Some(4);
        assert!(request.validate().is_err());

        request.away_penalties = Some(3);
        assert!(request.validate().is_ok());
    }
}
