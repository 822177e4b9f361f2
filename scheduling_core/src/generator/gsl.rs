//! GSL dual-tournament groups.
//!
//! Four seeds, five matches with a fixed dependency shape:
//!
//! | id | round | home        | away        | depends on |
//! |----|-------|-------------|-------------|------------|
//! | M1 | 1     | seed 1      | seed 2      | -          |
//! | M2 | 1     | seed 3      | seed 4      | -          |
//! | M3 | 2     | winner M1   | winner M2   | M1, M2     |
//! | M4 | 2     | loser M1    | loser M2    | M1, M2     |
//! | M5 | 3     | loser M3    | winner M4   | M3, M4     |
//!
//! Placements: 1st = winner M3, 2nd = winner M5 (the decider), 3rd =
//! loser M5, 4th = loser M4.

use super::{GenerationError, MatchNumbering};
use crate::group::Group;
use crate::labels::{ReferenceKind, knockout_reference_label};
use crate::match_::GeneratedMatch;
use crate::stage::Stage;
use uuid::Uuid;

/// seed slot of a GSL group: a concrete team and/or its origin label
struct GslSeed {
    registration_id: Option<Uuid>,
    label: Option<String>,
}

/// Generate the five matches of one GSL group.
///
/// The group must carry exactly four team slots. A group fed by a prior
/// stage may instead carry exactly four incoming slots (placeholder mode):
/// team ids stay empty and the source labels are attached.
pub fn generate_gsl_group(
    stage: &Stage,
    group: &Group,
    numbering: &mut MatchNumbering,
) -> Result<Vec<GeneratedMatch>, GenerationError> {
    let seeds = gsl_seeds(group)?;

    let temp = |pos: &str| format!("{}:G{}-{}", stage.id, group.order, pos);
    let mut matches = Vec::with_capacity(5);

    let mut push =
        |pos: &str, round: u32, deps: Vec<String>, build: &mut dyn FnMut(&mut GeneratedMatch)| {
            let mut m = GeneratedMatch::new(temp(pos), stage.id, numbering.take(), round);
            m.group_id = Some(group.id);
            m.bracket_position = Some(pos.to_string());
            m.depends_on = deps;
            build(&mut m);
            matches.push(m);
        };

    // opening matches from seeds
    push("M1", 1, vec![], &mut |m| {
        m.home_registration_id = seeds[0].registration_id;
        m.away_registration_id = seeds[1].registration_id;
        m.metadata.home_source = seeds[0].label.clone();
        m.metadata.away_source = seeds[1].label.clone();
    });
    push("M2", 1, vec![], &mut |m| {
        m.home_registration_id = seeds[2].registration_id;
        m.away_registration_id = seeds[3].registration_id;
        m.metadata.home_source = seeds[2].label.clone();
        m.metadata.away_source = seeds[3].label.clone();
    });

    let winners = |pos: &str| Some(knockout_reference_label(ReferenceKind::Winner, pos));
    let losers = |pos: &str| Some(knockout_reference_label(ReferenceKind::Loser, pos));

    push("M3", 2, vec![temp("M1"), temp("M2")], &mut |m| {
        m.metadata.home_source = winners("M1");
        m.metadata.away_source = winners("M2");
    });
    push("M4", 2, vec![temp("M1"), temp("M2")], &mut |m| {
        m.metadata.home_source = losers("M1");
        m.metadata.away_source = losers("M2");
    });
    push("M5", 3, vec![temp("M3"), temp("M4")], &mut |m| {
        m.metadata.home_source = losers("M3");
        m.metadata.away_source = winners("M4");
        m.metadata.is_decider = true;
    });

    Ok(matches)
}

/// Resolve the four seed slots, concrete teams first, incoming slots as the
/// placeholder fallback.
fn gsl_seeds(group: &Group) -> Result<Vec<GslSeed>, GenerationError> {
    let seeds: Vec<GslSeed> = if !group.teams.is_empty() {
        group
            .seeded_teams()
            .into_iter()
            .map(|t| GslSeed {
                registration_id: Some(t.registration_id),
                label: None,
            })
            .collect()
    } else {
        let mut slots = group.incoming_team_slots.clone();
        slots.sort_by_key(|s| s.seed_position);
        slots
            .into_iter()
            .map(|s| GslSeed {
                registration_id: s.registration_id,
                label: Some(s.source_label),
            })
            .collect()
    };

    if seeds.len() != 4 {
        return Err(GenerationError::GslGroupSize {
            group_name: group.name.clone(),
            count: seeds.len(),
        });
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageKind;
    use crate::team::{IncomingTeamSlot, TeamSlot};

    fn gsl_stage() -> (Stage, Group) {
        let stage = Stage::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "GSL",
            1,
            StageKind::GslGroups,
        );
        let group = Group::new(Uuid::new_v4(), stage.id, "Group A", 1);
        (stage, group)
    }

    #[test]
    fn gsl_produces_the_five_match_shape() {
        let (stage, mut group) = gsl_stage();
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            group.teams.push(TeamSlot::with_seed(*id, i as u32 + 1));
        }
        let matches = generate_gsl_group(&stage, &group, &mut MatchNumbering::new()).unwrap();
        assert_eq!(matches.len(), 5);

        let by_pos = |pos: &str| {
            matches
                .iter()
                .find(|m| m.bracket_position.as_deref() == Some(pos))
                .unwrap()
        };
        assert_eq!(by_pos("M1").home_registration_id, Some(ids[0]));
        assert_eq!(by_pos("M1").away_registration_id, Some(ids[1]));
        assert_eq!(by_pos("M2").home_registration_id, Some(ids[2]));
        assert_eq!(by_pos("M2").away_registration_id, Some(ids[3]));

        let m3 = by_pos("M3");
        assert!(m3.is_placeholder());
        assert_eq!(m3.metadata.home_source.as_deref(), Some("Winner M1"));
        assert_eq!(m3.metadata.away_source.as_deref(), Some("Winner M2"));
        assert_eq!(m3.depends_on.len(), 2);

        let m4 = by_pos("M4");
        assert_eq!(m4.metadata.home_source.as_deref(), Some("Loser M1"));
        assert_eq!(m4.metadata.away_source.as_deref(), Some("Loser M2"));

        let m5 = by_pos("M5");
        assert_eq!(m5.metadata.home_source.as_deref(), Some("Loser M3"));
        assert_eq!(m5.metadata.away_source.as_deref(), Some("Winner M4"));
        assert!(m5.metadata.is_decider);
        assert_eq!(m5.round_number, 3);
    }

    #[test]
    fn wrong_team_count_is_rejected() {
        let (stage, mut group) = gsl_stage();
        for i in 0..3 {
            group.teams.push(TeamSlot::with_seed(Uuid::new_v4(), i + 1));
        }
        let err = generate_gsl_group(&stage, &group, &mut MatchNumbering::new()).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::GslGroupSize { count: 3, .. }
        ));
    }

    #[test]
    fn placeholder_mode_uses_incoming_slots() {
        let (stage, mut group) = gsl_stage();
        for (i, label) in ["Group A 1st", "Group B 2nd", "Group B 1st", "Group A 2nd"]
            .iter()
            .enumerate()
        {
            group
                .incoming_team_slots
                .push(IncomingTeamSlot::new(i as u32 + 1, *label));
        }
        let matches = generate_gsl_group(&stage, &group, &mut MatchNumbering::new()).unwrap();
        let m1 = matches
            .iter()
            .find(|m| m.bracket_position.as_deref() == Some("M1"))
            .unwrap();
        assert!(m1.is_placeholder());
        assert_eq!(m1.metadata.home_source.as_deref(), Some("Group A 1st"));
        assert_eq!(m1.metadata.away_source.as_deref(), Some("Group B 2nd"));
    }
}
