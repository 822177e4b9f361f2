//! Builders for test tournaments.

use chrono::{NaiveDate, NaiveDateTime};
use scheduling_core::{
    Group, Pitch, RoundRobinType, ScheduleTiming, Stage, StageKind, TeamSlot, TournamentInput,
};
use serde_json::json;
use uuid::Uuid;

/// Clock helper: all fixtures play on the same summer Saturday.
pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 6, 6)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// One pitch with a generous window.
pub fn single_pitch() -> Vec<Pitch> {
    vec![Pitch::new(Uuid::new_v4(), "Pitch 1", at(8, 0), at(22, 0))]
}

/// A group with `teams` seeded entries named after their seed.
pub fn seeded_group(stage_id: Uuid, name: &str, order: u32, teams: usize) -> (Group, Vec<Uuid>) {
    let mut group = Group::new(Uuid::new_v4(), stage_id, name, order);
    let mut ids = Vec::with_capacity(teams);
    for seed in 1..=teams {
        let id = Uuid::new_v4();
        let mut slot = TeamSlot::with_seed(id, seed as u32);
        slot.team_name = Some(format!("{name} Team {seed}"));
        group.teams.push(slot);
        ids.push(id);
    }
    (group, ids)
}

/// A one-stage round-robin tournament.
pub fn round_robin_tournament(
    teams: usize,
    rr: RoundRobinType,
    timing: ScheduleTiming,
    pitches: Vec<Pitch>,
) -> (TournamentInput, Vec<Uuid>) {
    let tournament_id = Uuid::new_v4();
    let mut stage = Stage::new(
        Uuid::new_v4(),
        tournament_id,
        "Pool",
        1,
        StageKind::GroupStage,
    );
    let (mut group, ids) = seeded_group(stage.id, "Group A", 1, teams);
    group.round_robin_type = rr;
    stage.groups.push(group);

    (
        TournamentInput {
            tournament_id,
            timing,
            pitches,
            stages: vec![stage],
        },
        ids,
    )
}

/// A one-stage GSL tournament with a single group of four.
pub fn gsl_tournament(
    timing: ScheduleTiming,
    pitches: Vec<Pitch>,
) -> (TournamentInput, Vec<Uuid>) {
    let tournament_id = Uuid::new_v4();
    let mut stage = Stage::new(
        Uuid::new_v4(),
        tournament_id,
        "GSL",
        1,
        StageKind::GslGroups,
    );
    let (group, ids) = seeded_group(stage.id, "Group A", 1, 4);
    stage.groups.push(group);

    (
        TournamentInput {
            tournament_id,
            timing,
            pitches,
            stages: vec![stage],
        },
        ids,
    )
}

/// A one-stage knockout tournament with optional third place.
pub fn knockout_tournament(
    teams: usize,
    has_third_place: bool,
    timing: ScheduleTiming,
    pitches: Vec<Pitch>,
) -> (TournamentInput, Vec<Uuid>) {
    let tournament_id = Uuid::new_v4();
    let mut stage = Stage::new(
        Uuid::new_v4(),
        tournament_id,
        "Knockout",
        1,
        StageKind::Knockout,
    );
    stage.configuration = json!({ "hasThirdPlace": has_third_place });
    let (group, ids) = seeded_group(stage.id, "Bracket", 1, teams);
    stage.groups.push(group);

    (
        TournamentInput {
            tournament_id,
            timing,
            pitches,
            stages: vec![stage],
        },
        ids,
    )
}

/// A group stage (one group of `teams`) followed by a final fed by the top
/// two of the group.
pub fn group_into_final_tournament(
    teams: usize,
    timing: ScheduleTiming,
    pitches: Vec<Pitch>,
) -> (TournamentInput, Vec<Uuid>) {
    let tournament_id = Uuid::new_v4();
    let mut pool = Stage::new(
        Uuid::new_v4(),
        tournament_id,
        "Pool",
        1,
        StageKind::GroupStage,
    );
    pool.configuration = json!({ "advancingTeamsPerGroup": 2 });
    let (group, ids) = seeded_group(pool.id, "Group X", 1, teams);
    pool.groups.push(group);

    let mut finals = Stage::new(
        Uuid::new_v4(),
        tournament_id,
        "Finals",
        2,
        StageKind::Final,
    );
    finals.buffer_time_minutes = 10;
    finals.configuration = json!({ "advancingTeamCount": 2 });

    (
        TournamentInput {
            tournament_id,
            timing,
            pitches,
            stages: vec![pool, finals],
        },
        ids,
    )
}
