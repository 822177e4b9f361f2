//! Stage of a tournament.
//!
//! A stage is one phase of the competition (a pool phase, a knockout
//! bracket, the finals). Stages are ordered; each owns its groups and, for
//! stages fed by earlier results, a list of incoming team slots. The
//! free-form `configuration` JSON carries authoring-time options and is
//! parsed into [`StageSettings`] before generation.

use crate::group::Group;
use crate::team::IncomingTeamSlot;
use crate::utils::validation::{FieldError, ValidationErrors, ValidationResult};
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// kind of stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageKind {
    /// Group stage
    GroupStage,
    /// GSL groups
    GslGroups,
    /// Round robin
    RoundRobin,
    /// Knockout
    Knockout,
    /// Double elimination
    DoubleElimination,
    /// Final
    Final,
}

impl StageKind {
    /// Stages whose matches progress winners/losers through bracket
    /// positions.
    pub fn is_bracket(&self) -> bool {
        matches!(
            self,
            StageKind::Knockout | StageKind::DoubleElimination | StageKind::Final
        )
    }

    /// Stages whose groups produce standings that advance to the next
    /// stage.
    pub fn is_group_based(&self) -> bool {
        matches!(
            self,
            StageKind::GroupStage | StageKind::GslGroups | StageKind::RoundRobin
        )
    }
}

/// ordering of group matches within a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum GroupSchedulingMode {
    /// interleaved
    #[default]
    Interleaved,
    /// sequential
    Sequential,
}

/// Typed view of the stage `configuration` JSON. Unknown keys are ignored
/// so authoring tools can stash extra hints without breaking the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageSettings {
    /// teams taken into a KNOCKOUT/FINAL stage
    pub advancing_team_count: Option<u32>,
    /// teams advancing from each group of a group stage (GSL is fixed at 2)
    pub advancing_teams_per_group: Option<u32>,
    /// add a third-place match to a bracket stage
    pub has_third_place: bool,
    /// group match ordering
    pub group_scheduling_mode: GroupSchedulingMode,
    /// authoring hint, not used by the engine
    pub num_groups: Option<u32>,
}

impl StageSettings {
    /// Teams advancing per group with the documented defaults applied:
    /// GSL always advances two, other group stages default to two and are
    /// clamped to 1..=4.
    pub fn advancing_per_group(&self, kind: StageKind) -> u32 {
        if kind == StageKind::GslGroups {
            return 2;
        }
        self.advancing_teams_per_group.unwrap_or(2).clamp(1, 4)
    }
}

/// stage of a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// id of stage
    pub id: Uuid,
    /// id of tournament
    pub tournament_id: Uuid,
    /// display name of stage
    pub name: String,
    /// position within the tournament, starting at 1
    pub order: u32,
    /// kind of stage
    #[serde(rename = "type")]
    pub kind: StageKind,
    /// minutes inserted before this stage (and between groups under
    /// sequential scheduling)
    pub buffer_time_minutes: i64,
    /// authoring-time options, parsed via [`Stage::settings`]
    #[serde(default)]
    pub configuration: Value,
    /// groups of this stage
    #[serde(default)]
    pub groups: Vec<Group>,
    /// placeholder slots fed by earlier stages
    #[serde(default)]
    pub incoming_team_slots: Vec<IncomingTeamSlot>,
}

impl Stage {
    pub fn new(
        id: Uuid,
        tournament_id: Uuid,
        name: impl Into<String>,
        order: u32,
        kind: StageKind,
    ) -> Self {
        Stage {
            id,
            tournament_id,
            name: name.into(),
            order,
            kind,
            buffer_time_minutes: 0,
            configuration: Value::Null,
            groups: Vec::new(),
            incoming_team_slots: Vec::new(),
        }
    }

    /// Parse the configuration JSON into typed settings. A `Null`
    /// configuration yields the defaults.
    pub fn settings(&self) -> Result<StageSettings, serde_json::Error> {
        if self.configuration.is_null() {
            return Ok(StageSettings::default());
        }
        serde_json::from_value(self.configuration.clone())
    }

    /// Groups sorted by their order, ready for deterministic generation.
    pub fn sorted_groups(&self) -> Vec<Group> {
        let mut groups = self.groups.clone();
        groups.sort_by_key(|g| g.order);
        groups
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let mut errs = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errs.add(
                FieldError::builder()
                    .set_field(String::from("name"))
                    .add_required()
                    .set_object_id(self.id)
                    .build(),
            );
        }

        if self.order < 1 {
            errs.add(
                FieldError::builder()
                    .set_field(String::from("order"))
                    .add_message("stage order starts at 1")
                    .set_object_id(self.id)
                    .build(),
            );
        }

        if self.buffer_time_minutes < 0 {
            errs.add(
                FieldError::builder()
                    .set_field(String::from("buffer_time_minutes"))
                    .add_message("buffer time must not be negative")
                    .set_object_id(self.id)
                    .build(),
            );
        }

        if self.settings().is_err() {
            errs.add(
                FieldError::builder()
                    .set_field(String::from("configuration"))
                    .add_invalid_format()
                    .set_object_id(self.id)
                    .build(),
            );
        }

        for group in &self.groups {
            if let Err(group_errs) = group.validate() {
                for err in group_errs.errors {
                    errs.add(err);
                }
            }
        }

        if !errs.is_empty() {
            return Err(errs);
        }
        Ok(())
    }
}
