//! Seed arithmetic: bracket slot orders and advancement distributions.

use crate::labels::group_position_label;
use crate::team::IncomingTeamSlot;

/// Slot order of a single-elimination first round for `size` slots (`size`
/// must be a power of two). Slots are seed numbers; consecutive pairs form
/// the first-round matches, e.g. for 8: `(1,8) (4,5) (6,3) (7,2)` — the
/// reflected arrangement in which the top seeds can only meet in the
/// final and the bottom half mirrors the top half.
pub fn bracket_slot_order(size: u32) -> Vec<u32> {
    debug_assert!(size.is_power_of_two());
    let mut order = vec![1u32];
    let mut n = 1;
    while n < size {
        n *= 2;
        let half = order.len() / 2;
        let mut next = Vec::with_capacity(n as usize);
        for (i, &seed) in order.iter().enumerate() {
            let complement = n + 1 - seed;
            if order.len() == 1 || i < half {
                next.push(seed);
                next.push(complement);
            } else {
                next.push(complement);
                next.push(seed);
            }
        }
        order = next;
    }
    order
}

/// Descriptor of a prior group as the advancement builders need it.
#[derive(Debug, Clone)]
pub struct AdvancingGroup {
    pub name: String,
    pub advancing: u32,
    pub gsl: bool,
}

/// Cross-seeded advancement slots for a knockout or final stage following a
/// group stage: position 1 of every group first, then position 2, and so
/// on, truncated to `advancing_team_count` when given.
pub fn cross_seeded_slots(
    groups: &[AdvancingGroup],
    advancing_team_count: Option<u32>,
) -> Vec<IncomingTeamSlot> {
    let max_rank = groups.iter().map(|g| g.advancing).max().unwrap_or(0);
    let mut slots = Vec::new();
    let mut seed = 1;
    for rank in 1..=max_rank {
        for group in groups {
            if rank > group.advancing {
                continue;
            }
            let label = group_position_label(&group.name, rank, group.gsl);
            slots.push(IncomingTeamSlot::new(seed, label));
            seed += 1;
        }
    }
    if let Some(count) = advancing_team_count {
        slots.truncate(count as usize);
    }
    slots
}

/// Snake-draft distribution of advancing teams into `num_new_groups` groups
/// of a following group stage. Rank rows alternate direction, so a new
/// group never collects both the winner and the runner-up of the same prior
/// group (as long as group counts allow it). Within each new group, seeds
/// interleave the ranks: with two advancing per group the prior winners
/// take seeds {1,3} and the runners-up take seeds {2,4}, which puts winner
/// against runner-up in the opening GSL matches.
pub fn snake_distributed_slots(
    groups: &[AdvancingGroup],
    num_new_groups: u32,
) -> Vec<Vec<IncomingTeamSlot>> {
    let k = num_new_groups.max(1) as usize;
    let mut new_groups: Vec<Vec<IncomingTeamSlot>> = vec![Vec::new(); k];
    let max_rank = groups.iter().map(|g| g.advancing).max().unwrap_or(0);

    for rank in 1..=max_rank {
        let mut placed_in_row = vec![0u32; k];
        for (i, group) in groups.iter().enumerate() {
            if rank > group.advancing {
                continue;
            }
            let forward = i % k;
            let target = if rank % 2 == 1 { forward } else { k - 1 - forward };
            let label = group_position_label(&group.name, rank, group.gsl);
            // seeds interleave ranks: row index * ranks-per-group + rank
            let seed = placed_in_row[target] * max_rank + rank;
            new_groups[target].push(IncomingTeamSlot::new(seed, label));
            placed_in_row[target] += 1;
        }
    }

    for group in &mut new_groups {
        group.sort_by_key(|slot| slot.seed_position);
    }
    new_groups
}
