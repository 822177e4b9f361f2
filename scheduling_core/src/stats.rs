// schedule statistics

use crate::match_::AllocatedMatch;
use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Summary numbers of a generated schedule, reported back to the caller
/// alongside the matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStats {
    pub total_matches: usize,
    /// first scheduled start to last scheduled end
    pub total_duration_minutes: i64,
    /// played minutes relative to each pitch's availability window
    pub pitch_utilization: HashMap<Uuid, f64>,
    /// mean rest between consecutive matches of the same team
    pub average_rest_minutes: f64,
}

/// Compute the stats block for an allocated schedule.
pub fn compute_stats(matches: &[AllocatedMatch], pitches: &[Pitch]) -> ScheduleStats {
    let mut stats = ScheduleStats {
        total_matches: matches.len(),
        ..Default::default()
    };
    if matches.is_empty() {
        return stats;
    }

    let first_start = matches
        .iter()
        .map(|m| m.scheduled_start_time)
        .min()
        .expect("non-empty checked above");
    let last_end = matches
        .iter()
        .map(|m| m.scheduled_end_time)
        .max()
        .expect("non-empty checked above");
    stats.total_duration_minutes = (last_end - first_start).num_minutes();

    // busy minutes per pitch against its availability window
    let mut busy: HashMap<Uuid, i64> = HashMap::new();
    for m in matches {
        *busy.entry(m.pitch_id).or_default() +=
            (m.scheduled_end_time - m.scheduled_start_time).num_minutes();
    }
    for pitch in pitches {
        let window =
            (pitch.get_available_to() - pitch.get_available_from()).num_minutes();
        let minutes = busy.get(&pitch.get_id()).copied().unwrap_or(0);
        let percent = if window > 0 {
            (minutes as f64 / window as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };
        stats.pitch_utilization.insert(pitch.get_id(), percent);
    }

    // rest gaps per team
    let mut by_team: HashMap<Uuid, Vec<&AllocatedMatch>> = HashMap::new();
    for m in matches {
        for team in [
            m.generated.home_registration_id,
            m.generated.away_registration_id,
        ]
        .into_iter()
        .flatten()
        {
            by_team.entry(team).or_default().push(m);
        }
    }
    let mut rest_sum = 0i64;
    let mut rest_count = 0usize;
    for team_matches in by_team.values_mut() {
        team_matches.sort_by_key(|m| m.scheduled_start_time);
        for pair in team_matches.windows(2) {
            rest_sum +=
                (pair[1].scheduled_start_time - pair[0].scheduled_end_time).num_minutes();
            rest_count += 1;
        }
    }
    if rest_count > 0 {
        stats.average_rest_minutes =
            (rest_sum as f64 / rest_count as f64 * 10.0).round() / 10.0;
    }

    stats
}
