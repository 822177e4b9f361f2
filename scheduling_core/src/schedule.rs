//! Schedule generation operations of the engine facade.

use crate::allocator::allocate;
use crate::errors::{EngineError, EngineResult};
use crate::generator::generate;
use crate::match_::AllocatedMatch;
use crate::pitch::Pitch;
use crate::ports::TournamentInput;
use crate::stage::Stage;
use crate::stage_config::build_stage_configs;
use crate::stats::{ScheduleStats, compute_stats};
use crate::timing::ScheduleTiming;
use crate::utils::validation::{FieldError, ValidationErrors, ValidationResult};
use crate::validator::{
    RestTimeOptions, ValidationOptions, Violation, ViolationKind, validate, validate_pitches,
};
use crate::Engine;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Optional scheduling constraints of a generate request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleConstraints {
    pub rest_time: Option<RestTimeOptions>,
}

/// Full description of a schedule to generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScheduleRequest {
    pub tournament_id: Uuid,
    pub stages: Vec<Stage>,
    pub timing: ScheduleTiming,
    pub pitches: Vec<Pitch>,
    #[serde(default)]
    pub constraints: Option<ScheduleConstraints>,
}

impl GenerateScheduleRequest {
    pub fn from_input(input: TournamentInput) -> Self {
        GenerateScheduleRequest {
            tournament_id: input.tournament_id,
            stages: input.stages,
            timing: input.timing,
            pitches: input.pitches,
            constraints: None,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let mut errs = ValidationErrors::new();

        if self.stages.is_empty() {
            errs.add(
                FieldError::builder()
                    .set_field(String::from("stages"))
                    .add_required()
                    .set_object_id(self.tournament_id)
                    .build(),
            );
        }
        if let Err(timing_errs) = self.timing.validate() {
            errs.extend(timing_errs);
        }
        for stage in &self.stages {
            if let Err(stage_errs) = stage.validate() {
                errs.extend(stage_errs);
            }
        }

        errs.into_result()
    }

    /// Validator options for this request: explicit rest thresholds win,
    /// and missing-team checks are dropped for schedules that legitimately
    /// carry unresolved slots (brackets, GSL, fed finals).
    fn validation_options(&self) -> ValidationOptions {
        let rest_time = self
            .constraints
            .as_ref()
            .and_then(|c| c.rest_time)
            .unwrap_or_default();
        let placeholder_heavy = self.stages.iter().any(|s| {
            s.kind.is_bracket()
                || !s.incoming_team_slots.is_empty()
                || s.groups.iter().any(|g| !g.incoming_team_slots.is_empty())
        });
        ValidationOptions {
            rest_time,
            validate_missing_teams: !placeholder_heavy,
        }
    }
}

/// What the caller gets back; `success == false` blocks persisting and
/// confirming the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScheduleResponse {
    pub success: bool,
    pub matches: Vec<AllocatedMatch>,
    pub warnings: Vec<Violation>,
    pub errors: Vec<Violation>,
    pub stats: ScheduleStats,
}

/// Run the pure part of schedule generation: convert, generate, allocate,
/// validate, summarise. No I/O.
pub fn compute_schedule(request: &GenerateScheduleRequest) -> EngineResult<GenerateScheduleResponse> {
    let configs = build_stage_configs(&request.stages)?;

    let generated = match generate(&configs) {
        Ok(generated) => generated,
        Err(generation_error) => {
            warn!(%generation_error, "match generation failed");
            return Ok(GenerateScheduleResponse {
                success: false,
                matches: Vec::new(),
                warnings: Vec::new(),
                errors: vec![Violation::error(
                    ViolationKind::MissingTeam,
                    generation_error.to_string(),
                )],
                stats: ScheduleStats::default(),
            });
        }
    };

    let outcome = allocate(&generated, &configs, &request.timing, &request.pitches);
    let report = validate(&outcome.matches, &request.validation_options());
    let stats = compute_stats(&outcome.matches, &request.pitches);

    let mut errors = validate_pitches(&request.pitches);
    errors.extend(outcome.errors);
    errors.extend(report.errors().cloned());
    let warnings: Vec<Violation> = report.warnings().cloned().collect();

    Ok(GenerateScheduleResponse {
        success: errors.is_empty(),
        matches: outcome.matches,
        warnings,
        errors,
        stats,
    })
}

/// API of schedule generation
impl Engine {
    /// Generate, validate and (on success) persist the schedule described
    /// by the request. A response with `success == false` is returned with
    /// partial matches and the violations; nothing is persisted then.
    #[instrument(skip(self, request), fields(tournament_id = %request.tournament_id))]
    pub async fn generate_schedule(
        &self,
        request: &GenerateScheduleRequest,
    ) -> EngineResult<GenerateScheduleResponse> {
        request.validate().map_err(EngineError::from)?;

        let response = compute_schedule(request)?;
        info!(
            matches = response.matches.len(),
            errors = response.errors.len(),
            warnings = response.warnings.len(),
            "schedule computed"
        );

        if response.success {
            self.storage()
                .save_allocated_matches(request.tournament_id, &response.matches)
                .await?;
        }
        Ok(response)
    }

    /// Load the tournament through the storage port and generate its
    /// schedule.
    #[instrument(skip(self))]
    pub async fn generate_schedule_for_tournament(
        &self,
        tournament_id: Uuid,
    ) -> EngineResult<GenerateScheduleResponse> {
        let input = self
            .storage()
            .get_tournament_input(tournament_id)
            .await?
            .ok_or_else(|| EngineError::MissingId("Tournament".into()))?;
        self.generate_schedule(&GenerateScheduleRequest::from_input(input))
            .await
    }

    /// Cascade-delete every generated match of a tournament.
    #[instrument(skip(self))]
    pub async fn clear_schedule(&self, tournament_id: Uuid) -> EngineResult<u64> {
        let deleted = self
            .storage()
            .delete_matches_of_tournament(tournament_id)
            .await?;
        info!(deleted, "schedule cleared");
        Ok(deleted)
    }
}
