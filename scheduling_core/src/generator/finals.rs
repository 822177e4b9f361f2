//! Finals stages.
//!
//! Small by construction: one final, a final plus third-place match, or a
//! little round robin when three or four teams play out the title. Larger
//! finals fields fall back to a knockout bracket.

use super::knockout::{BracketEntrant, BracketNaming, generate_knockout};
use super::round_robin::circle_rounds;
use super::{GenerationError, MatchNumbering, bracket_entrants};
use crate::match_::GeneratedMatch;
use crate::stage::{Stage, StageSettings};

pub fn generate_finals(
    stage: &Stage,
    settings: &StageSettings,
    numbering: &mut MatchNumbering,
) -> Result<Vec<GeneratedMatch>, GenerationError> {
    let entrants = bracket_entrants(stage);
    let n = entrants.len();

    if n < 2 {
        return Ok(Vec::new());
    }

    if n == 2 {
        return Ok(vec![pairing_match(
            stage, "F", 1, &entrants[0], &entrants[1], false, numbering,
        )]);
    }

    if settings.has_third_place && n >= 4 {
        // slots 1 and 2 contest the title, slots 3 and 4 the bronze
        let third = pairing_match(stage, "3P", 1, &entrants[2], &entrants[3], true, numbering);
        let final_match =
            pairing_match(stage, "F", 1, &entrants[0], &entrants[1], false, numbering);
        return Ok(vec![third, final_match]);
    }

    if n <= 4 {
        return Ok(finals_round_robin(stage, &entrants, numbering));
    }

    Ok(generate_knockout(
        stage,
        &entrants,
        settings.has_third_place,
        BracketNaming::Standard,
        numbering,
    ))
}

fn pairing_match(
    stage: &Stage,
    position: &str,
    round: u32,
    home: &BracketEntrant,
    away: &BracketEntrant,
    is_third_place: bool,
    numbering: &mut MatchNumbering,
) -> GeneratedMatch {
    let temp_id = format!("{}:{}", stage.id, position);
    let mut m = GeneratedMatch::new(temp_id, stage.id, numbering.take(), round);
    m.bracket_position = Some(position.to_string());
    m.home_registration_id = home.registration_id;
    m.away_registration_id = away.registration_id;
    m.metadata.home_source = home.label.clone();
    m.metadata.away_source = away.label.clone();
    m.metadata.is_third_place = is_third_place;
    m
}

fn finals_round_robin(
    stage: &Stage,
    entrants: &[BracketEntrant],
    numbering: &mut MatchNumbering,
) -> Vec<GeneratedMatch> {
    let mut matches = Vec::new();
    for (r, pairs) in circle_rounds(entrants.len()).iter().enumerate() {
        for (p, &(home, away)) in pairs.iter().enumerate() {
            let round = r as u32 + 1;
            let temp_id = format!("{}:RR-R{}-M{}", stage.id, round, p + 1);
            let mut m = GeneratedMatch::new(temp_id, stage.id, numbering.take(), round);
            m.home_registration_id = entrants[home].registration_id;
            m.away_registration_id = entrants[away].registration_id;
            m.metadata.home_source = entrants[home].label.clone();
            m.metadata.away_source = entrants[away].label.clone();
            matches.push(m);
        }
    }
    matches
}
