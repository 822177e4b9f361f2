// matches of a tournament: generated, allocated, and stored shapes

use chrono::NaiveDateTime;
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// bracket a double-elimination match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum BracketType {
    /// winners
    Winners,
    /// losers
    Losers,
}

/// side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// home
    Home,
    /// away
    Away,
}

/// Generation-time annotations carried along to allocation and storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchMetadata {
    /// origin label of the home slot, e.g. "Winner M1", "Group A 1st"
    pub home_source: Option<String>,
    /// origin label of the away slot
    pub away_source: Option<String>,
    /// decider match of a GSL group
    pub is_decider: bool,
    /// third-place match of a bracket stage
    pub is_third_place: bool,
    /// winners or losers bracket in double elimination
    pub bracket_type: Option<BracketType>,
}

/// A match produced by the generator: pairing, position within the stage
/// and dependency edges, but no pitch or time yet.
///
/// `temp_id` is unique across the generation batch and parseable; the
/// `BYE-` prefix marks placeholder ids of suppressed bye matches inside
/// `depends_on` lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMatch {
    pub temp_id: String,
    pub stage_id: Uuid,
    pub group_id: Option<Uuid>,
    pub home_registration_id: Option<Uuid>,
    pub away_registration_id: Option<Uuid>,
    /// unique within the stage
    pub match_number: u32,
    pub round_number: u32,
    /// slot within a bracket, e.g. "M3", "SF1", "LB-R2-1"
    pub bracket_position: Option<String>,
    /// temp ids of matches that must finish before this one starts
    pub depends_on: Vec<String>,
    pub metadata: MatchMetadata,
}

impl GeneratedMatch {
    pub fn new(
        temp_id: impl Into<String>,
        stage_id: Uuid,
        match_number: u32,
        round_number: u32,
    ) -> Self {
        GeneratedMatch {
            temp_id: temp_id.into(),
            stage_id,
            group_id: None,
            home_registration_id: None,
            away_registration_id: None,
            match_number,
            round_number,
            bracket_position: None,
            depends_on: Vec::new(),
            metadata: MatchMetadata::default(),
        }
    }

    /// True when both team slots are still unresolved placeholders.
    pub fn is_placeholder(&self) -> bool {
        self.home_registration_id.is_none() && self.away_registration_id.is_none()
    }
}

/// A generated match with its pitch and time assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocatedMatch {
    #[serde(flatten)]
    pub generated: GeneratedMatch,
    pub pitch_id: Uuid,
    pub scheduled_start_time: NaiveDateTime,
    pub scheduled_end_time: NaiveDateTime,
}

/// lifecycle of a stored match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Scheduled
    #[default]
    Scheduled,
    /// In progress
    InProgress,
    /// Completed
    Completed,
}

/// Entered score of a match. Penalties are only consulted when the regular
/// score is level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub home_score: u32,
    pub away_score: u32,
    pub home_penalties: Option<u32>,
    pub away_penalties: Option<u32>,
}

impl MatchScore {
    pub fn new(home_score: u32, away_score: u32) -> Self {
        MatchScore {
            home_score,
            away_score,
            home_penalties: None,
            away_penalties: None,
        }
    }

    /// Winning side, consulting penalties on a level score. `None` for a
    /// draw without (or with level) penalties.
    pub fn winning_side(&self) -> Option<Side> {
        if self.home_score != self.away_score {
            return if self.home_score > self.away_score {
                Some(Side::Home)
            } else {
                Some(Side::Away)
            };
        }
        match (self.home_penalties, self.away_penalties) {
            (Some(h), Some(a)) if h > a => Some(Side::Home),
            (Some(h), Some(a)) if a > h => Some(Side::Away),
            _ => None,
        }
    }
}

/// The persisted representation of a match as the storage adapter exposes
/// it back to the engine. Mirrors [`AllocatedMatch`] plus lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMatch {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub stage_id: Uuid,
    pub group_id: Option<Uuid>,
    pub temp_id: String,
    pub bracket_position: Option<String>,
    pub match_number: u32,
    pub round_number: u32,
    pub home_registration_id: Option<Uuid>,
    pub away_registration_id: Option<Uuid>,
    pub home_source: Option<String>,
    pub away_source: Option<String>,
    pub depends_on: Vec<String>,
    pub pitch_id: Option<Uuid>,
    pub scheduled_start_time: Option<NaiveDateTime>,
    pub scheduled_end_time: Option<NaiveDateTime>,
    pub status: MatchStatus,
    pub score: Option<MatchScore>,
}

impl StoredMatch {
    /// Build the stored shape of a freshly allocated match.
    pub fn from_allocated(id: Uuid, tournament_id: Uuid, allocated: &AllocatedMatch) -> Self {
        let m = &allocated.generated;
        StoredMatch {
            id,
            tournament_id,
            stage_id: m.stage_id,
            group_id: m.group_id,
            temp_id: m.temp_id.clone(),
            bracket_position: m.bracket_position.clone(),
            match_number: m.match_number,
            round_number: m.round_number,
            home_registration_id: m.home_registration_id,
            away_registration_id: m.away_registration_id,
            home_source: m.metadata.home_source.clone(),
            away_source: m.metadata.away_source.clone(),
            depends_on: m.depends_on.clone(),
            pitch_id: Some(allocated.pitch_id),
            scheduled_start_time: Some(allocated.scheduled_start_time),
            scheduled_end_time: Some(allocated.scheduled_end_time),
            status: MatchStatus::Scheduled,
            score: None,
        }
    }
}

/// One team-slot mutation produced by the result propagator. `None`
/// clears a previously propagated team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotUpdate {
    pub match_id: Uuid,
    pub side: Side,
    pub registration_id: Option<Uuid>,
}
