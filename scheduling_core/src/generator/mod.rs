//! Match generation.
//!
//! `generate` turns the ordered stages of a tournament into the full set of
//! unscheduled matches with dependency edges. The function is pure and
//! deterministic: identical input (including team seed order) yields
//! byte-identical temp ids, match numbers and dependency lists.

mod double_elimination;
mod finals;
mod gsl;
mod knockout;
mod round_robin;

pub use double_elimination::generate_double_elimination;
pub use finals::generate_finals;
pub use gsl::generate_gsl_group;
pub use knockout::{BracketEntrant, BracketNaming, generate_knockout};
pub use round_robin::generate_round_robin_group;

use crate::match_::GeneratedMatch;
use crate::stage::{Stage, StageKind};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// GSL requires exactly four team slots per group
    #[error("GSL group '{group_name}' requires exactly four team slots, got {count}")]
    GslGroupSize { group_name: String, count: usize },

    /// configuration JSON of a stage did not parse
    #[error("stage {stage_id} configuration is invalid: {message}")]
    InvalidConfiguration { stage_id: Uuid, message: String },

    /// a dependency cycle would deadlock the allocator
    #[error("generated matches form a dependency cycle at '{temp_id}'")]
    CyclicDependencies { temp_id: String },
}

/// Per-stage counter handing out match numbers in generation order,
/// starting at 1.
#[derive(Debug)]
pub(crate) struct MatchNumbering {
    next: u32,
}

impl MatchNumbering {
    pub(crate) fn new() -> Self {
        MatchNumbering { next: 1 }
    }
    pub(crate) fn take(&mut self) -> u32 {
        let n = self.next;
        self.next += 1;
        n
    }
}

/// Generate all matches of the given stages, stages processed in `order`.
pub fn generate(stages: &[Stage]) -> Result<Vec<GeneratedMatch>, GenerationError> {
    let mut sorted: Vec<&Stage> = stages.iter().collect();
    sorted.sort_by_key(|s| s.order);

    let mut matches = Vec::new();
    for stage in sorted {
        matches.extend(generate_stage(stage)?);
    }

    assert_acyclic(&matches)?;
    Ok(matches)
}

/// Generate the matches of a single stage.
pub fn generate_stage(stage: &Stage) -> Result<Vec<GeneratedMatch>, GenerationError> {
    let settings = stage
        .settings()
        .map_err(|e| GenerationError::InvalidConfiguration {
            stage_id: stage.id,
            message: e.to_string(),
        })?;

    let mut numbering = MatchNumbering::new();
    let mut matches = Vec::new();

    match stage.kind {
        StageKind::GroupStage | StageKind::RoundRobin => {
            for group in stage.sorted_groups() {
                matches.extend(generate_round_robin_group(stage, &group, &mut numbering));
            }
        }
        StageKind::GslGroups => {
            for group in stage.sorted_groups() {
                matches.extend(generate_gsl_group(stage, &group, &mut numbering)?);
            }
        }
        StageKind::Knockout => {
            let entrants = bracket_entrants(stage);
            matches.extend(generate_knockout(
                stage,
                &entrants,
                settings.has_third_place,
                BracketNaming::Standard,
                &mut numbering,
            ));
        }
        StageKind::DoubleElimination => {
            let entrants = bracket_entrants(stage);
            matches.extend(generate_double_elimination(stage, &entrants, &mut numbering));
        }
        StageKind::Final => {
            matches.extend(generate_finals(stage, &settings, &mut numbering)?);
        }
    }

    Ok(matches)
}

/// Entrants of a bracket stage: the incoming team slots when the stage is
/// fed by an earlier stage, otherwise the concrete teams of its groups.
/// Result is sorted by seed, seed numbers re-issued densely from 1.
pub(crate) fn bracket_entrants(stage: &Stage) -> Vec<BracketEntrant> {
    if !stage.incoming_team_slots.is_empty() {
        let mut slots = stage.incoming_team_slots.clone();
        slots.sort_by_key(|s| s.seed_position);
        return slots
            .iter()
            .enumerate()
            .map(|(i, slot)| BracketEntrant {
                seed: i as u32 + 1,
                registration_id: slot.registration_id,
                label: Some(slot.source_label.clone()),
            })
            .collect();
    }

    let mut teams = Vec::new();
    for group in stage.sorted_groups() {
        teams.extend(group.seeded_teams());
    }
    teams
        .iter()
        .enumerate()
        .map(|(i, team)| BracketEntrant {
            seed: i as u32 + 1,
            registration_id: Some(team.registration_id),
            label: None,
        })
        .collect()
}

/// The `depends_on` graph must be a DAG; the allocator relies on a
/// topological order existing. `BYE-` placeholders and other unknown ids
/// carry no edge.
fn assert_acyclic(matches: &[GeneratedMatch]) -> Result<(), GenerationError> {
    let mut graph = DiGraph::<(), ()>::new();
    let mut nodes = HashMap::new();
    for m in matches {
        let node = graph.add_node(());
        nodes.insert(m.temp_id.as_str(), node);
    }
    for m in matches {
        let to = nodes[m.temp_id.as_str()];
        for dep in &m.depends_on {
            if let Some(&from) = nodes.get(dep.as_str()) {
                graph.add_edge(from, to, ());
            }
        }
    }
    if let Err(cycle) = toposort(&graph, None) {
        let node = cycle.node_id();
        let temp_id = matches
            .iter()
            .zip(graph.node_indices())
            .find(|(_, idx)| *idx == node)
            .map(|(m, _)| m.temp_id.clone())
            .unwrap_or_default();
        return Err(GenerationError::CyclicDependencies { temp_id });
    }
    Ok(())
}
