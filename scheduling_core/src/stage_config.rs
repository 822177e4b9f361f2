//! Stage configuration conversion.
//!
//! Persisted stage records are normalised before generation: groups sorted
//! by order, teams by seed, and placeholder team slots built for every
//! stage that is fed by an earlier one. The generator only ever sees the
//! enriched records this module produces.

use crate::errors::{EngineError, EngineResult};
use crate::labels::group_position_label;
use crate::seeding::{AdvancingGroup, cross_seeded_slots, snake_distributed_slots};
use crate::stage::{Stage, StageKind};
use crate::team::IncomingTeamSlot;
use tracing::debug;

/// Normalise and wire the stages of a tournament for generation.
///
/// Stages come back sorted by order. Bracket and final stages without
/// explicit team material receive cross-seeded incoming slots from the
/// stage before them; a group stage following another group stage gets its
/// per-group slots snake-distributed.
pub fn build_stage_configs(stages: &[Stage]) -> EngineResult<Vec<Stage>> {
    let mut sorted: Vec<Stage> = stages.to_vec();
    sorted.sort_by_key(|s| s.order);

    for stage in &mut sorted {
        stage.groups.sort_by_key(|g| g.order);
        for group in &mut stage.groups {
            crate::team::sort_by_seed(&mut group.teams);
            group.incoming_team_slots.sort_by_key(|s| s.seed_position);
        }
        stage.incoming_team_slots.sort_by_key(|s| s.seed_position);
    }

    for index in 0..sorted.len() {
        let prior = index
            .checked_sub(1)
            .map(|i| advancing_view(&sorted[i]))
            .transpose()?;
        let stage = &sorted[index];
        let settings = stage
            .settings()
            .map_err(|e| EngineError::Parsing(format!("stage {}: {e}", stage.id)))?;

        match stage.kind {
            StageKind::Knockout | StageKind::DoubleElimination | StageKind::Final => {
                if !stage.incoming_team_slots.is_empty() || stage_has_teams(stage) {
                    continue;
                }
                let slots = match prior {
                    Some(groups) if !groups.is_empty() => {
                        cross_seeded_slots(&groups, settings.advancing_team_count)
                    }
                    // a standalone finals stage still needs named slots
                    _ => placeholder_finalists(stage.kind, settings.advancing_team_count),
                };
                debug!(stage = %sorted[index].name, slots = slots.len(), "built incoming slots");
                sorted[index].incoming_team_slots = slots;
            }
            StageKind::GroupStage | StageKind::GslGroups | StageKind::RoundRobin => {
                if stage_has_teams(stage) || stage.groups.is_empty() {
                    continue;
                }
                let Some(groups) = prior else {
                    continue;
                };
                if groups.is_empty() {
                    continue;
                }
                let num_groups = stage.groups.len() as u32;
                let distributed = snake_distributed_slots(&groups, num_groups);
                for (group, slots) in sorted[index].groups.iter_mut().zip(distributed) {
                    group.incoming_team_slots = slots;
                }
            }
        }
    }

    Ok(sorted)
}

/// What a stage's groups feed forward: name, advancing count, GSL flag.
/// Only group-based stages advance by position; bracket stages advance by
/// bracket labels which are already in place.
fn advancing_view(stage: &Stage) -> EngineResult<Vec<AdvancingGroup>> {
    if !stage.kind.is_group_based() {
        return Ok(Vec::new());
    }
    let settings = stage
        .settings()
        .map_err(|e| EngineError::Parsing(format!("stage {}: {e}", stage.id)))?;
    let advancing = settings.advancing_per_group(stage.kind);
    Ok(stage
        .groups
        .iter()
        .map(|g| AdvancingGroup {
            name: g.name.clone(),
            advancing,
            gsl: stage.kind == StageKind::GslGroups,
        })
        .collect())
}

fn stage_has_teams(stage: &Stage) -> bool {
    stage.groups.iter().any(|g| !g.teams.is_empty())
        || stage
            .groups
            .iter()
            .any(|g| !g.incoming_team_slots.is_empty())
}

/// Fallback slots for a stage with no feeding stage: `"Finalist 1"` style
/// names that read sensibly in a published schedule.
fn placeholder_finalists(kind: StageKind, advancing_team_count: Option<u32>) -> Vec<IncomingTeamSlot> {
    let Some(count) = advancing_team_count else {
        return Vec::new();
    };
    (1..=count)
        .map(|seed| {
            let label = if kind == StageKind::Final {
                format!("Finalist {seed}")
            } else {
                group_position_label("Qualifier", seed, false)
            };
            IncomingTeamSlot::new(seed, label)
        })
        .collect()
}
