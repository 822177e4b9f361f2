// group standings

use crate::match_::{MatchStatus, StoredMatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Accumulated record of one team over all matches of a group. Calculated
/// on the fly when a group completes; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    /// id of team registration
    pub registration_id: Uuid,
    /// 3 for a win, 1 for a draw
    pub points: u32,
    /// goals scored over all matches
    pub goals_for: u32,
    /// goals conceded over all matches
    pub goals_against: u32,
    /// final rank within the group, 1 is best
    pub position: u32,
}

impl TeamStanding {
    fn new(registration_id: Uuid) -> Self {
        TeamStanding {
            registration_id,
            points: 0,
            goals_for: 0,
            goals_against: 0,
            position: 0,
        }
    }

    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }
}

/// Compute final standings of a group from its completed matches.
///
/// Every registered team gets a record even without a single completed
/// match. Ranking order is points, then goal difference, then goals for;
/// ties beyond that keep the registration order of the group, which makes
/// the result deterministic across runs.
pub fn compute_standings(team_ids: &[Uuid], matches: &[StoredMatch]) -> Vec<TeamStanding> {
    let mut standings: Vec<TeamStanding> = team_ids
        .iter()
        .map(|&id| TeamStanding::new(id))
        .collect();

    for m in matches {
        if m.status != MatchStatus::Completed {
            continue;
        }
        let (Some(home), Some(away), Some(score)) =
            (m.home_registration_id, m.away_registration_id, m.score)
        else {
            continue;
        };

        let (home_points, away_points) = if score.home_score > score.away_score {
            (3, 0)
        } else if score.home_score < score.away_score {
            (0, 3)
        } else {
            (1, 1)
        };

        if let Some(entry) = standings.iter_mut().find(|s| s.registration_id == home) {
            entry.points += home_points;
            entry.goals_for += score.home_score;
            entry.goals_against += score.away_score;
        }
        if let Some(entry) = standings.iter_mut().find(|s| s.registration_id == away) {
            entry.points += away_points;
            entry.goals_for += score.away_score;
            entry.goals_against += score.home_score;
        }
    }

    standings.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference().cmp(&a.goal_difference()))
            .then(b.goals_for.cmp(&a.goals_for))
    });

    for (index, entry) in standings.iter_mut().enumerate() {
        entry.position = index as u32 + 1;
    }
    standings
}
