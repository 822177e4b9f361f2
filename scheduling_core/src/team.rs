// team references within groups and stages

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A concrete team reference inside a group. `seed_position` orders teams
/// for match making; unseeded teams sort after seeded ones in insertion
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSlot {
    /// registration id of the team at this tournament
    pub registration_id: Uuid,
    /// seed within the group, 1 is best
    pub seed_position: Option<u32>,
    /// optional display name
    pub team_name: Option<String>,
}

impl TeamSlot {
    pub fn new(registration_id: Uuid) -> Self {
        TeamSlot {
            registration_id,
            seed_position: None,
            team_name: None,
        }
    }

    pub fn with_seed(registration_id: Uuid, seed_position: u32) -> Self {
        TeamSlot {
            registration_id,
            seed_position: Some(seed_position),
            team_name: None,
        }
    }
}

/// A placeholder team slot of a later stage. It names the team by where it
/// will come from (`"Group A 1st"`, `"Winner M3"`) and is resolved to a
/// concrete `registration_id` once the prior stage produces results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingTeamSlot {
    /// seed the resolved team takes within the stage
    pub seed_position: u32,
    /// human-readable, parseable origin of the team
    pub source_label: String,
    /// filled in once the origin is decided
    pub registration_id: Option<Uuid>,
}

impl IncomingTeamSlot {
    pub fn new(seed_position: u32, source_label: impl Into<String>) -> Self {
        IncomingTeamSlot {
            seed_position,
            source_label: source_label.into(),
            registration_id: None,
        }
    }
}

/// Sort team slots by seed position, unseeded last, stable within equal
/// seeds. This ordering is part of the generator's determinism contract.
pub fn sort_by_seed(teams: &mut [TeamSlot]) {
    teams.sort_by_key(|t| t.seed_position.unwrap_or(u32::MAX));
}
