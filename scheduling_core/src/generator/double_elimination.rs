//! Double elimination: a winners bracket, a losers bracket fed by every
//! winners-bracket loser exactly once, a grand final, and an always
//! generated grand-final reset (only actually played when the losers
//! bracket champion wins the first grand final).
//!
//! The losers bracket has `2 * (winners_rounds - 1)` rounds, alternating
//! between shrink rounds (losers-bracket survivors play each other) and
//! drop-down rounds (survivors meet the losers of the next winners round).
//! Drop-down order is reversed on every other winners round so early
//! rematches stay rare.

use super::knockout::{BracketNaming, Feeder, build_bracket};
use super::{BracketEntrant, MatchNumbering};
use crate::labels::{ReferenceKind, knockout_reference_label};
use crate::match_::{BracketType, GeneratedMatch};
use crate::stage::Stage;

/// An unresolved team travelling through the losers bracket: the match it
/// comes out of and the label describing how.
#[derive(Debug, Clone)]
struct LbSlot {
    dep: String,
    label: String,
}

fn loser_slot(temp_id: &str, position: &str) -> LbSlot {
    LbSlot {
        dep: temp_id.to_string(),
        label: knockout_reference_label(ReferenceKind::Loser, position),
    }
}

pub fn generate_double_elimination(
    stage: &Stage,
    entrants: &[BracketEntrant],
    numbering: &mut MatchNumbering,
) -> Vec<GeneratedMatch> {
    let wb = build_bracket(stage, entrants, BracketNaming::Winners, numbering);
    let winners_rounds = wb.total_rounds;
    if winners_rounds == 0 {
        return Vec::new();
    }

    let mut matches = wb.matches;
    // interleave: winners round r plays as overall round 2r - 1, leaving
    // the even rounds to the losers bracket
    for m in &mut matches {
        m.round_number = m.round_number * 2 - 1;
    }

    // with two or more entrants the winners final always materialises
    let Some(Feeder::Match {
        temp_id: wb_final_temp,
        position: wb_final_pos,
    }) = wb.champion.clone()
    else {
        return matches;
    };

    // seed the losers bracket with the first winners round
    let mut slots: Vec<Option<LbSlot>> = wb.losers_by_round[0]
        .iter()
        .map(|entry| {
            entry
                .as_ref()
                .map(|(temp_id, position)| loser_slot(temp_id, position))
        })
        .collect();

    let mut lb_round = 0;
    for wb_round in 2..=winners_rounds {
        // shrink: survivors play each other
        lb_round += 1;
        slots = play_shrink_round(stage, &mut matches, slots, lb_round, numbering);

        // drop-down: survivors meet the losers of this winners round
        lb_round += 1;
        let mut dropped: Vec<LbSlot> = wb.losers_by_round[wb_round as usize - 1]
            .iter()
            .flatten()
            .map(|(temp_id, position)| loser_slot(temp_id, position))
            .collect();
        if wb_round % 2 == 0 {
            dropped.reverse();
        }
        slots = play_drop_round(stage, &mut matches, slots, dropped, lb_round, numbering);
    }

    let lb_champion = slots.into_iter().flatten().next();

    // grand final: winners champion against whatever survived the gauntlet
    let grand_final_round = 2 * winners_rounds;
    let gf_temp = format!("{}:GF", stage.id);
    let mut gf = GeneratedMatch::new(&gf_temp, stage.id, numbering.take(), grand_final_round);
    gf.bracket_position = Some("GF".to_string());
    gf.depends_on.push(wb_final_temp.clone());
    gf.metadata.home_source = Some(knockout_reference_label(
        ReferenceKind::Winner,
        &wb_final_pos,
    ));
    match lb_champion {
        Some(slot) => {
            if slot.dep != wb_final_temp {
                gf.depends_on.push(slot.dep);
            }
            gf.metadata.away_source = Some(slot.label);
        }
        // no survivor at all: the beaten finalist gets the rematch
        None => {
            gf.metadata.away_source = Some(knockout_reference_label(
                ReferenceKind::Loser,
                &wb_final_pos,
            ));
        }
    }
    matches.push(gf);

    // the reset is generated unconditionally; whether it is played is a
    // result-time concern
    let mut reset = GeneratedMatch::new(
        format!("{}:GF-R", stage.id),
        stage.id,
        numbering.take(),
        grand_final_round + 1,
    );
    reset.bracket_position = Some("GF-R".to_string());
    reset.depends_on.push(gf_temp);
    reset.metadata.home_source = Some(knockout_reference_label(ReferenceKind::Winner, "GF"));
    reset.metadata.away_source = Some(knockout_reference_label(ReferenceKind::Loser, "GF"));
    matches.push(reset);

    matches
}

/// Pair up adjacent losers-bracket slots. A lone survivor (its opponent
/// suppressed by a winners-bracket bye) is carried forward unplayed.
fn play_shrink_round(
    stage: &Stage,
    matches: &mut Vec<GeneratedMatch>,
    slots: Vec<Option<LbSlot>>,
    lb_round: u32,
    numbering: &mut MatchNumbering,
) -> Vec<Option<LbSlot>> {
    let mut next = Vec::with_capacity(slots.len() / 2);
    let mut pairs = slots.into_iter();
    let mut index = 0;
    while let (Some(a), Some(b)) = (pairs.next(), pairs.next()) {
        index += 1;
        match (a, b) {
            (Some(a), Some(b)) => {
                next.push(Some(emit_lb_match(
                    stage, matches, a, b, lb_round, index, numbering,
                )));
            }
            (Some(survivor), None) | (None, Some(survivor)) => next.push(Some(survivor)),
            (None, None) => next.push(None),
        }
    }
    next
}

/// Merge the losers of a winners round into the bracket. An empty survivor
/// slot lets the dropping team advance unplayed.
fn play_drop_round(
    stage: &Stage,
    matches: &mut Vec<GeneratedMatch>,
    slots: Vec<Option<LbSlot>>,
    dropped: Vec<LbSlot>,
    lb_round: u32,
    numbering: &mut MatchNumbering,
) -> Vec<Option<LbSlot>> {
    let mut next = Vec::with_capacity(dropped.len());
    for (index, (survivor, dropping)) in slots.into_iter().zip(dropped).enumerate() {
        match survivor {
            Some(survivor) => next.push(Some(emit_lb_match(
                stage,
                matches,
                survivor,
                dropping,
                lb_round,
                index + 1,
                numbering,
            ))),
            None => next.push(Some(dropping)),
        }
    }
    next
}

fn emit_lb_match(
    stage: &Stage,
    matches: &mut Vec<GeneratedMatch>,
    home: LbSlot,
    away: LbSlot,
    lb_round: u32,
    index: usize,
    numbering: &mut MatchNumbering,
) -> LbSlot {
    let position = format!("LB-R{lb_round}-{index}");
    let temp_id = format!("{}:{}", stage.id, position);
    let mut m = GeneratedMatch::new(&temp_id, stage.id, numbering.take(), lb_round + 1);
    m.bracket_position = Some(position.clone());
    m.metadata.bracket_type = Some(BracketType::Losers);
    m.depends_on.push(home.dep);
    m.depends_on.push(away.dep);
    m.metadata.home_source = Some(home.label);
    m.metadata.away_source = Some(away.label);
    matches.push(m);

    LbSlot {
        dep: temp_id,
        label: knockout_reference_label(ReferenceKind::Winner, &position),
    }
}
