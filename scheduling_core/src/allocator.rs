//! Greedy time allocation.
//!
//! Matches are placed stage by stage onto the earliest feasible pitch slot.
//! The allocator is deterministic: ties between pitches break towards the
//! earliest start and then the pitch listed first. Dependency-blocked
//! matches are skipped in a first pass and retried once their parents are
//! placed; whatever still cannot be placed is returned as `unallocated`
//! with a matching error.

use crate::match_::{AllocatedMatch, GeneratedMatch};
use crate::pitch::Pitch;
use crate::stage::{GroupSchedulingMode, Stage};
use crate::timing::ScheduleTiming;
use crate::validator::{Violation, ViolationKind};
use chrono::{Duration, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

/// Result of an allocation run. `matches` holds everything that was
/// placed; `unallocated` whatever was not, each with a matching entry in
/// `errors`.
#[derive(Debug, Clone, Default)]
pub struct AllocationOutcome {
    pub matches: Vec<AllocatedMatch>,
    pub unallocated: Vec<GeneratedMatch>,
    pub errors: Vec<Violation>,
}

impl AllocationOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Allocate pitch and start/end times for every generated match.
pub fn allocate(
    matches: &[GeneratedMatch],
    stages: &[Stage],
    timing: &ScheduleTiming,
    pitches: &[Pitch],
) -> AllocationOutcome {
    let mut outcome = AllocationOutcome::default();

    if pitches.is_empty() {
        warn!("allocation requested without any pitches");
        outcome.errors.push(Violation::error(
            ViolationKind::PitchConflict,
            "no pitches available for allocation",
        ));
        outcome.unallocated = matches.to_vec();
        return outcome;
    }

    // mutable pitch copies; pre-booked slots stay respected
    let mut pitch_states: Vec<Pitch> = pitches.to_vec();
    let duration = timing.match_duration();
    let transition = timing.transition_time();

    let known_ids: HashSet<&str> = matches.iter().map(|m| m.temp_id.as_str()).collect();
    let mut allocated: HashMap<String, AllocatedMatch> = HashMap::new();
    let mut allocation_order: Vec<String> = Vec::new();

    let mut sorted_stages: Vec<&Stage> = stages.iter().collect();
    sorted_stages.sort_by_key(|s| s.order);

    let mut stage_start = timing.start_time;
    let mut latest_end_overall: Option<NaiveDateTime> = None;
    let mut first_match_overall = true;

    for (stage_index, stage) in sorted_stages.into_iter().enumerate() {
        let mode = stage
            .settings()
            .map(|s| s.group_scheduling_mode)
            .unwrap_or_default();
        let buffer = Duration::minutes(stage.buffer_time_minutes);

        if stage_index > 0 {
            if let Some(latest) = latest_end_overall {
                stage_start = stage_start.max(latest);
            }
            stage_start += buffer;
        }

        let stage_matches = sort_for_allocation(
            matches.iter().filter(|m| m.stage_id == stage.id),
            stage,
            mode,
        );
        if stage_matches.is_empty() {
            continue;
        }
        debug!(
            stage = %stage.name,
            matches = stage_matches.len(),
            ?mode,
            "allocating stage"
        );

        // sequential group threading
        let mut group_starts: HashMap<Uuid, NaiveDateTime> = HashMap::new();
        let mut current_group: Option<Uuid> = None;
        let mut current_group_end: Option<NaiveDateTime> = None;

        let mut skipped: Vec<&GeneratedMatch> = Vec::new();

        for &m in &stage_matches {
            if mode == GroupSchedulingMode::Sequential {
                if let Some(group_id) = m.group_id {
                    if current_group != Some(group_id) {
                        let start = match current_group_end {
                            Some(end) => end + buffer,
                            None => stage_start,
                        };
                        group_starts.insert(group_id, start);
                        current_group = Some(group_id);
                        current_group_end = None;
                    }
                }
            }

            if !dependencies_met(m, &known_ids, &allocated) {
                skipped.push(m);
                continue;
            }

            match place(
                m,
                stage_start,
                mode,
                &group_starts,
                &allocated,
                &mut pitch_states,
                duration,
                transition,
                first_match_overall,
            ) {
                Some(placed) => {
                    first_match_overall = false;
                    latest_end_overall = Some(
                        latest_end_overall
                            .map_or(placed.scheduled_end_time, |l| {
                                l.max(placed.scheduled_end_time)
                            }),
                    );
                    if mode == GroupSchedulingMode::Sequential
                        && m.group_id.is_some()
                        && m.group_id == current_group
                    {
                        current_group_end = Some(
                            current_group_end
                                .map_or(placed.scheduled_end_time, |l| {
                                    l.max(placed.scheduled_end_time)
                                }),
                        );
                    }
                    allocation_order.push(m.temp_id.clone());
                    allocated.insert(m.temp_id.clone(), placed);
                }
                None => {
                    outcome.errors.push(
                        Violation::error(
                            ViolationKind::TimeOverlap,
                            format!("match {} does not fit any pitch window", m.temp_id),
                        )
                        .with_match(m.temp_id.clone()),
                    );
                    outcome.unallocated.push(m.clone());
                }
            }
        }

        // second pass: dependencies may have been placed out of order
        for m in skipped {
            if !dependencies_met(m, &known_ids, &allocated) {
                outcome.errors.push(
                    Violation::error(
                        ViolationKind::Dependency,
                        format!(
                            "match {} has unallocated dependencies (DEPENDENCY_UNMET)",
                            m.temp_id
                        ),
                    )
                    .with_match(m.temp_id.clone()),
                );
                outcome.unallocated.push(m.clone());
                continue;
            }
            match place(
                m,
                stage_start,
                mode,
                &group_starts,
                &allocated,
                &mut pitch_states,
                duration,
                transition,
                first_match_overall,
            ) {
                Some(placed) => {
                    first_match_overall = false;
                    latest_end_overall = Some(
                        latest_end_overall
                            .map_or(placed.scheduled_end_time, |l| {
                                l.max(placed.scheduled_end_time)
                            }),
                    );
                    allocation_order.push(m.temp_id.clone());
                    allocated.insert(m.temp_id.clone(), placed);
                }
                None => {
                    outcome.errors.push(
                        Violation::error(
                            ViolationKind::TimeOverlap,
                            format!("match {} does not fit any pitch window", m.temp_id),
                        )
                        .with_match(m.temp_id.clone()),
                    );
                    outcome.unallocated.push(m.clone());
                }
            }
        }
    }

    outcome.matches = allocation_order
        .iter()
        .filter_map(|temp_id| allocated.remove(temp_id))
        .collect();
    outcome
}

/// Allocation priority within a stage. Interleaved mixes groups round by
/// round; sequential finishes one group before the next. A third-place
/// match beats the final regardless of match numbers.
fn sort_for_allocation<'a>(
    matches: impl Iterator<Item = &'a GeneratedMatch>,
    stage: &Stage,
    mode: GroupSchedulingMode,
) -> Vec<&'a GeneratedMatch> {
    let group_order: HashMap<Uuid, u32> =
        stage.groups.iter().map(|g| (g.id, g.order)).collect();
    let order_of = |m: &GeneratedMatch| {
        m.group_id
            .and_then(|id| group_order.get(&id).copied())
            .unwrap_or(0)
    };

    let mut sorted: Vec<&GeneratedMatch> = matches.collect();
    match mode {
        GroupSchedulingMode::Interleaved => sorted.sort_by_key(|m| {
            (
                m.round_number,
                !m.metadata.is_third_place,
                order_of(m),
                m.match_number,
            )
        }),
        GroupSchedulingMode::Sequential => sorted.sort_by_key(|m| {
            (
                order_of(m),
                m.round_number,
                !m.metadata.is_third_place,
                m.match_number,
            )
        }),
    }
    sorted
}

/// Every dependency that refers to a match of this batch must already be
/// allocated. `BYE-` placeholders and foreign ids never block.
fn dependencies_met(
    m: &GeneratedMatch,
    known_ids: &HashSet<&str>,
    allocated: &HashMap<String, AllocatedMatch>,
) -> bool {
    m.depends_on
        .iter()
        .filter(|dep| known_ids.contains(dep.as_str()))
        .all(|dep| allocated.contains_key(dep))
}

/// Place one match on the best pitch. Returns `None` when no pitch window
/// can hold it.
#[allow(clippy::too_many_arguments)]
fn place(
    m: &GeneratedMatch,
    stage_start: NaiveDateTime,
    mode: GroupSchedulingMode,
    group_starts: &HashMap<Uuid, NaiveDateTime>,
    allocated: &HashMap<String, AllocatedMatch>,
    pitch_states: &mut [Pitch],
    duration: Duration,
    transition: Duration,
    first_match_overall: bool,
) -> Option<AllocatedMatch> {
    let base = match (mode, m.group_id) {
        (GroupSchedulingMode::Sequential, Some(group_id)) => group_starts
            .get(&group_id)
            .copied()
            .unwrap_or(stage_start),
        _ => stage_start,
    };

    let mut earliest = base;
    for dep in &m.depends_on {
        if let Some(parent) = allocated.get(dep) {
            earliest = earliest.max(parent.scheduled_end_time);
        }
    }

    let search_from = if first_match_overall {
        earliest
    } else {
        earliest + transition
    };

    let mut best: Option<(NaiveDateTime, usize)> = None;
    for (index, pitch) in pitch_states.iter().enumerate() {
        if let Some(start) = pitch.earliest_fit(search_from, duration, transition) {
            if best.is_none_or(|(s, _)| start < s) {
                best = Some((start, index));
            }
        }
    }

    let (start, pitch_index) = best?;
    let end = start + duration;
    pitch_states[pitch_index].book(m.temp_id.clone(), start, end);

    Some(AllocatedMatch {
        generated: m.clone(),
        pitch_id: pitch_states[pitch_index].get_id(),
        scheduled_start_time: start,
        scheduled_end_time: end,
    })
}
