//! Round-robin generation via the circle method.
//!
//! Teams are numbered and one of them pinned; the rest rotate one position
//! per round. With an odd team count a synthetic BYE joins the rotation and
//! its pairings are dropped. Home/away alternates by `(round + pair) % 2`
//! so no team plays a long run of only-home or only-away matches.

use super::MatchNumbering;
use crate::group::{Group, RoundRobinType};
use crate::match_::GeneratedMatch;
use crate::stage::Stage;
use crate::team::TeamSlot;

/// Pairings of index-numbered teams per round; `n` is the team count.
/// Indices are positions in the seed-sorted team list.
pub(crate) fn circle_rounds(n: usize) -> Vec<Vec<(usize, usize)>> {
    if n < 2 {
        return Vec::new();
    }

    // seat list with an optional BYE seat; None never plays
    let mut seats: Vec<Option<usize>> = (0..n).map(Some).collect();
    if n % 2 == 1 {
        seats.push(None);
    }
    let m = seats.len();
    let rotating = m - 1;

    let mut rounds = Vec::with_capacity(rotating);
    for r in 0..rotating {
        // seat 0 is pinned, the rest rotate right by r
        let mut arrangement = Vec::with_capacity(m);
        arrangement.push(seats[0]);
        for i in 0..rotating {
            arrangement.push(seats[1 + (i + rotating - (r % rotating)) % rotating]);
        }

        let mut pairs = Vec::with_capacity(m / 2);
        for p in 0..m / 2 {
            let (a, b) = (arrangement[p], arrangement[m - 1 - p]);
            let (Some(a), Some(b)) = (a, b) else {
                continue;
            };
            // alternate orientation for home/away balance
            if (r + p) % 2 == 1 {
                pairs.push((b, a));
            } else {
                pairs.push((a, b));
            }
        }
        rounds.push(pairs);
    }
    rounds
}

/// Generate the round-robin matches of one group. Double round robin
/// appends the mirrored legs with continuing round numbers. Fewer than two
/// teams yield no matches.
pub fn generate_round_robin_group(
    stage: &Stage,
    group: &Group,
    numbering: &mut MatchNumbering,
) -> Vec<GeneratedMatch> {
    let teams: Vec<TeamSlot> = group.seeded_teams();
    let rounds = circle_rounds(teams.len());
    let first_leg_rounds = rounds.len() as u32;

    let mut matches = Vec::new();
    let emit = |round: u32, pair_index: usize, home: &TeamSlot, away: &TeamSlot,
                    matches: &mut Vec<GeneratedMatch>,
                    numbering: &mut MatchNumbering| {
        let temp_id = format!(
            "{}:G{}-R{}-M{}",
            stage.id,
            group.order,
            round,
            pair_index + 1
        );
        let mut m = GeneratedMatch::new(temp_id, stage.id, numbering.take(), round);
        m.group_id = Some(group.id);
        m.home_registration_id = Some(home.registration_id);
        m.away_registration_id = Some(away.registration_id);
        matches.push(m);
    };

    for (r, pairs) in rounds.iter().enumerate() {
        for (p, &(home, away)) in pairs.iter().enumerate() {
            emit(
                r as u32 + 1,
                p,
                &teams[home],
                &teams[away],
                &mut matches,
                numbering,
            );
        }
    }

    if group.round_robin_type == RoundRobinType::Double {
        for (r, pairs) in rounds.iter().enumerate() {
            for (p, &(home, away)) in pairs.iter().enumerate() {
                // second leg swaps home and away
                emit(
                    first_leg_rounds + r as u32 + 1,
                    p,
                    &teams[away],
                    &teams[home],
                    &mut matches,
                    numbering,
                );
            }
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageKind;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn group_of(n: usize) -> (Stage, Group) {
        let stage = Stage::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Pool",
            1,
            StageKind::GroupStage,
        );
        let mut group = Group::new(Uuid::new_v4(), stage.id, "Group A", 1);
        for seed in 1..=n {
            group
                .teams
                .push(TeamSlot::with_seed(Uuid::new_v4(), seed as u32));
        }
        (stage, group)
    }

    #[test]
    fn single_round_robin_has_n_choose_two_matches() {
        for n in 2..=8 {
            let (stage, group) = group_of(n);
            let matches =
                generate_round_robin_group(&stage, &group, &mut MatchNumbering::new());
            assert_eq!(matches.len(), n * (n - 1) / 2, "n = {n}");
        }
    }

    #[test]
    fn double_round_robin_doubles_with_swapped_orientation() {
        let (stage, mut group) = group_of(3);
        group.round_robin_type = RoundRobinType::Double;
        let matches = generate_round_robin_group(&stage, &group, &mut MatchNumbering::new());
        assert_eq!(matches.len(), 6);

        let mut oriented = HashSet::new();
        for m in &matches {
            assert!(
                oriented.insert((m.home_registration_id, m.away_registration_id)),
                "each orientation appears exactly once"
            );
        }
        for m in &matches {
            assert!(
                oriented.contains(&(m.away_registration_id, m.home_registration_id)),
                "every pairing has its mirrored leg"
            );
        }
    }

    #[test]
    fn four_teams_play_three_rounds_with_expected_pairings() {
        let (stage, group) = group_of(4);
        let teams = group.seeded_teams();
        let id = |i: usize| teams[i].registration_id;
        let matches = generate_round_robin_group(&stage, &group, &mut MatchNumbering::new());

        let rounds: Vec<HashSet<(Uuid, Uuid)>> = (1..=3)
            .map(|r| {
                matches
                    .iter()
                    .filter(|m| m.round_number == r)
                    .map(|m| {
                        let (h, a) = (
                            m.home_registration_id.unwrap(),
                            m.away_registration_id.unwrap(),
                        );
                        (h.min(a), h.max(a))
                    })
                    .collect()
            })
            .collect();

        let pair = |a: usize, b: usize| (id(a).min(id(b)), id(a).max(id(b)));
        assert_eq!(rounds[0], HashSet::from([pair(0, 3), pair(1, 2)]));
        assert_eq!(rounds[1], HashSet::from([pair(0, 2), pair(1, 3)]));
        assert_eq!(rounds[2], HashSet::from([pair(0, 1), pair(2, 3)]));
    }

    #[test]
    fn odd_team_count_gives_everyone_one_pause() {
        let (stage, group) = group_of(5);
        let matches = generate_round_robin_group(&stage, &group, &mut MatchNumbering::new());
        assert_eq!(matches.len(), 10);
        // 5 rounds of 2 matches; every team sits out exactly one round
        for team in group.seeded_teams() {
            let played: usize = matches
                .iter()
                .filter(|m| {
                    m.home_registration_id == Some(team.registration_id)
                        || m.away_registration_id == Some(team.registration_id)
                })
                .count();
            assert_eq!(played, 4);
        }
    }

    #[test]
    fn fewer_than_two_teams_yield_nothing() {
        let (stage, group) = group_of(1);
        assert!(generate_round_robin_group(&stage, &group, &mut MatchNumbering::new()).is_empty());
    }

    #[test]
    fn pinned_team_alternates_home_and_away() {
        let (stage, group) = group_of(6);
        let pinned = group.seeded_teams()[0].registration_id;
        let matches = generate_round_robin_group(&stage, &group, &mut MatchNumbering::new());
        let mut sides: Vec<bool> = matches
            .iter()
            .filter(|m| {
                m.home_registration_id == Some(pinned) || m.away_registration_id == Some(pinned)
            })
            .map(|m| m.home_registration_id == Some(pinned))
            .collect();
        assert_eq!(sides.len(), 5, "pinned team plays every round");
        sides.dedup();
        assert_eq!(sides.len(), 5, "pinned team flips side every round");
    }
}
