//! Result propagation.
//!
//! After a result is written, downstream team slots must follow: bracket
//! matches referencing "Winner M3" style labels receive the concrete team,
//! and once a group is fully played its standings resolve the next stage's
//! "Group A 1st" style slots. All functions here are pure; they return the
//! slot updates to apply and the caller persists them atomically.

use crate::labels::{ReferenceKind, match_knockout_reference, parse_group_position};
use crate::match_::{MatchScore, MatchStatus, Side, SlotUpdate, StoredMatch};
use crate::stage::StageKind;
use crate::standings::compute_standings;
use tracing::{debug, info};
use uuid::Uuid;

/// Winner and loser of a completed match, when the score decides one.
pub fn resolve_winner(m: &StoredMatch, score: &MatchScore) -> Option<(Uuid, Uuid)> {
    let (home, away) = (m.home_registration_id?, m.away_registration_id?);
    match score.winning_side()? {
        Side::Home => Some((home, away)),
        Side::Away => Some((away, home)),
    }
}

/// Route the winner and loser of a completed bracket match into every
/// stage match whose team sources reference its bracket position.
///
/// GSL stages repeat the positions `M1..M5` per group, so matching is
/// restricted to the completed match's group whenever it has one.
pub fn knockout_progression(
    completed: &StoredMatch,
    score: &MatchScore,
    stage_matches: &[StoredMatch],
) -> Vec<SlotUpdate> {
    let Some(position) = completed.bracket_position.as_deref() else {
        debug!(match_id = %completed.id, "no bracket position, nothing to propagate");
        return Vec::new();
    };
    let Some((winner, loser)) = resolve_winner(completed, score) else {
        info!(
            match_id = %completed.id,
            "result does not decide a winner, skipping propagation"
        );
        return Vec::new();
    };

    let mut updates = Vec::new();
    for m in downstream_candidates(completed, stage_matches) {
        for (side, source) in [(Side::Home, &m.home_source), (Side::Away, &m.away_source)] {
            let Some(source) = source.as_deref() else {
                continue;
            };
            let team = match match_knockout_reference(source, position) {
                Some(ReferenceKind::Winner) => winner,
                Some(ReferenceKind::Loser) => loser,
                None => continue,
            };
            updates.push(SlotUpdate {
                match_id: m.id,
                side,
                registration_id: Some(team),
            });
        }
    }
    updates
}

/// Clear every slot that was populated from the given match, winner and
/// loser references alike. Used before re-propagating an updated score and
/// after deleting a result.
pub fn clear_knockout_progression(
    completed: &StoredMatch,
    stage_matches: &[StoredMatch],
) -> Vec<SlotUpdate> {
    let Some(position) = completed.bracket_position.as_deref() else {
        return Vec::new();
    };

    let mut updates = Vec::new();
    for m in downstream_candidates(completed, stage_matches) {
        for (side, source) in [(Side::Home, &m.home_source), (Side::Away, &m.away_source)] {
            let Some(source) = source.as_deref() else {
                continue;
            };
            if match_knockout_reference(source, position).is_some() {
                updates.push(SlotUpdate {
                    match_id: m.id,
                    side,
                    registration_id: None,
                });
            }
        }
    }
    updates
}

fn downstream_candidates<'a>(
    completed: &StoredMatch,
    stage_matches: &'a [StoredMatch],
) -> impl Iterator<Item = &'a StoredMatch> {
    let group_id = completed.group_id;
    let own_id = completed.id;
    stage_matches
        .iter()
        .filter(move |m| m.id != own_id)
        .filter(move |m| group_id.is_none() || m.group_id == group_id)
}

/// True when every match of the group has a completed result.
pub fn group_is_complete(group_matches: &[StoredMatch]) -> bool {
    !group_matches.is_empty()
        && group_matches
            .iter()
            .all(|m| m.status == MatchStatus::Completed)
}

/// Final positions of a completed group.
///
/// Round-robin flavoured groups rank by standings. GSL groups place by the
/// dual bracket instead: 1st is the winner of M3, 2nd the winner of the
/// decider M5, 3rd its loser, 4th the loser of M4. A GSL group with a
/// damaged bracket (missing positions) falls back to standings.
pub fn group_positions(
    kind: StageKind,
    group_team_ids: &[Uuid],
    group_matches: &[StoredMatch],
) -> Vec<(u32, Uuid)> {
    if kind == StageKind::GslGroups {
        if let Some(placements) = gsl_placements(group_matches) {
            return placements;
        }
        debug!("GSL bracket incomplete, falling back to standings");
    }
    compute_standings(group_team_ids, group_matches)
        .into_iter()
        .map(|s| (s.position, s.registration_id))
        .collect()
}

fn gsl_placements(group_matches: &[StoredMatch]) -> Option<Vec<(u32, Uuid)>> {
    let by_pos = |pos: &str| {
        group_matches
            .iter()
            .find(|m| m.bracket_position.as_deref() == Some(pos))
    };
    let (m3, m4, m5) = (by_pos("M3")?, by_pos("M4")?, by_pos("M5")?);
    let winner_loser = |m: &StoredMatch| resolve_winner(m, &m.score?);

    let (first, _) = winner_loser(m3)?;
    let (second, third) = winner_loser(m5)?;
    let (_, fourth) = winner_loser(m4)?;
    Some(vec![(1, first), (2, second), (3, third), (4, fourth)])
}

/// Resolve the next stage's placeholder slots from a finished group.
///
/// The group's positions map onto every `"<group name> <position>"` source
/// of the next stage's matches; labels that do not parse against this
/// group name are left alone.
pub fn group_advancement(
    group_name: &str,
    positions: &[(u32, Uuid)],
    next_stage_matches: &[StoredMatch],
) -> Vec<SlotUpdate> {
    let team_at = |position: u32| {
        positions
            .iter()
            .find(|(p, _)| *p == position)
            .map(|(_, team)| *team)
    };

    let mut updates = Vec::new();
    for m in next_stage_matches {
        for (side, source) in [(Side::Home, &m.home_source), (Side::Away, &m.away_source)] {
            let Some(source) = source.as_deref() else {
                continue;
            };
            let Some(position) = parse_group_position(source, group_name) else {
                continue;
            };
            let Some(team) = team_at(position) else {
                info!(
                    group = group_name,
                    position, "source references a position beyond the group size"
                );
                continue;
            };
            updates.push(SlotUpdate {
                match_id: m.id,
                side,
                registration_id: Some(team),
            });
        }
    }
    updates
}
