// group of a stage

use crate::team::{IncomingTeamSlot, TeamSlot, sort_by_seed};
use crate::utils::validation::{FieldError, ValidationErrors, ValidationResult};
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// round robin flavour of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundRobinType {
    /// Single round robin
    #[default]
    Single,
    /// Double round robin
    Double,
}

/// group of a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// id of group
    pub id: Uuid,
    /// id of owning stage
    pub stage_id: Uuid,
    /// display name, e.g. "Group A"
    pub name: String,
    /// position within the stage, starting at 1
    pub order: u32,
    /// single or double round robin
    pub round_robin_type: RoundRobinType,
    /// team assignments of this group
    pub teams: Vec<TeamSlot>,
    /// placeholder slots when this group is fed by a prior stage
    #[serde(default)]
    pub incoming_team_slots: Vec<IncomingTeamSlot>,
}

impl Group {
    pub fn new(id: Uuid, stage_id: Uuid, name: impl Into<String>, order: u32) -> Self {
        Group {
            id,
            stage_id,
            name: name.into(),
            order,
            round_robin_type: RoundRobinType::default(),
            teams: Vec::new(),
            incoming_team_slots: Vec::new(),
        }
    }

    /// Teams sorted by seed position (unseeded last, stable).
    pub fn seeded_teams(&self) -> Vec<TeamSlot> {
        let mut teams = self.teams.clone();
        sort_by_seed(&mut teams);
        teams
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
                    .add_message("group order starts at 1")
                    .set_object_id(self.id)
                    .build(),
            );
        }

        // duplicate registrations within one group break match making
        let mut seen = std::collections::HashSet::new();
        for team in &self.teams {
            if !seen.insert(team.registration_id) {
                errs.add(
                    FieldError::builder()
                        .set_field(String::from("teams"))
                        .add_message(format!(
                            "registration {} assigned twice",
                            team.registration_id
                        ))
                        .set_object_id(self.id)
                        .build(),
                );
            }
        }

        if !errs.is_empty() {
            return Err(errs);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_is_rejected() {
        let reg = Uuid::new_v4();
        let mut group = Group::new(Uuid::new_v4(), Uuid::new_v4(), "Group A", 1);
        group.teams.push(TeamSlot::new(reg));
        group.teams.push(TeamSlot::new(reg));
        assert!(group.validate().is_err());
    }

    #[test]
    fn seeded_teams_do_not_mutate_the_group() {
        let mut group = Group::new(Uuid::new_v4(), Uuid::new_v4(), "Group A", 1);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        group.teams.push(TeamSlot::with_seed(a, 2));
        group.teams.push(TeamSlot::with_seed(b, 1));
        let sorted = group.seeded_teams();
        assert_eq!(sorted[0].registration_id, b);
        assert_eq!(group.teams[0].registration_id, a, "original order kept");
    }
}
