//! Single-elimination brackets with seeded first rounds.
//!
//! Bracket size is the smallest power of two holding all entrants; seeds
//! beyond the entrant count become byes. A match with one bye is not
//! materialised, its real team advances straight into the next round; the
//! skipped slot is recorded as a `BYE-` placeholder in the downstream
//! `depends_on` list so later passes can tell "suppressed" from "missing".

use super::MatchNumbering;
use crate::labels::{ReferenceKind, knockout_reference_label};
use crate::match_::{BracketType, GeneratedMatch};
use crate::seeding::bracket_slot_order;
use crate::stage::Stage;
use uuid::Uuid;

/// One entrant of a bracket: dense seed, optional concrete team, optional
/// origin label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketEntrant {
    pub seed: u32,
    pub registration_id: Option<Uuid>,
    pub label: Option<String>,
}

/// Position naming scheme of a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketNaming {
    /// QF1/SF2/F style of a standalone knockout
    Standard,
    /// W-R1-1/W-F style of a double-elimination winners bracket
    Winners,
}

impl BracketNaming {
    fn position(&self, round: u32, total_rounds: u32, index: usize) -> String {
        match self {
            BracketNaming::Standard => match total_rounds - round {
                0 => "F".to_string(),
                1 => format!("SF{index}"),
                2 => format!("QF{index}"),
                _ => format!("R{round}M{index}"),
            },
            BracketNaming::Winners => {
                if round == total_rounds {
                    "W-F".to_string()
                } else {
                    format!("W-R{round}-{index}")
                }
            }
        }
    }

    fn bracket_type(&self) -> Option<BracketType> {
        match self {
            BracketNaming::Standard => None,
            BracketNaming::Winners => Some(BracketType::Winners),
        }
    }
}

/// What a bracket slot of the next round is fed by.
#[derive(Debug, Clone)]
pub(crate) enum Feeder {
    /// winner of a materialised match
    Match { temp_id: String, position: String },
    /// a bye: the entrant (if any) advances without playing
    Bye {
        entrant: Option<BracketEntrant>,
        placeholder: String,
    },
}

impl Feeder {
    /// Dependency entry this feeder contributes downstream.
    pub(crate) fn dependency(&self) -> String {
        match self {
            Feeder::Match { temp_id, .. } => temp_id.clone(),
            Feeder::Bye { placeholder, .. } => placeholder.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct BracketOutcome {
    pub matches: Vec<GeneratedMatch>,
    /// feeder of the champion (the final, or a walkover)
    pub champion: Option<Feeder>,
    /// feeders of the final, i.e. the semifinals (when rounds >= 2)
    pub final_feeders: Vec<Feeder>,
    /// per round: the materialised match (temp id, position) per pair slot,
    /// `None` where the pair was suppressed by byes
    pub losers_by_round: Vec<Vec<Option<(String, String)>>>,
    pub total_rounds: u32,
}

/// Build a full single-elimination bracket. `entrants` must be sorted by
/// seed with dense seeds starting at 1.
pub(crate) fn build_bracket(
    stage: &Stage,
    entrants: &[BracketEntrant],
    naming: BracketNaming,
    numbering: &mut MatchNumbering,
) -> BracketOutcome {
    let n = entrants.len() as u32;
    if n < 2 {
        return BracketOutcome::default();
    }
    let size = n.next_power_of_two();
    let total_rounds = size.trailing_zeros();
    let order = bracket_slot_order(size);

    let slot = |seed: u32| (seed <= n).then(|| &entrants[seed as usize - 1]);

    let mut outcome = BracketOutcome {
        total_rounds,
        ..Default::default()
    };

    // first round from the seeded slot order
    let mut current: Vec<Feeder> = Vec::with_capacity(size as usize / 2);
    let mut round_losers = Vec::with_capacity(size as usize / 2);
    for i in 0..(size as usize / 2) {
        let (s1, s2) = (order[2 * i], order[2 * i + 1]);
        let (home_seed, away_seed) = (s1.min(s2), s1.max(s2));
        let position = naming.position(1, total_rounds, i + 1);
        let temp_id = format!("{}:{}", stage.id, position);

        match (slot(home_seed), slot(away_seed)) {
            (Some(home), Some(away)) => {
                let mut m = GeneratedMatch::new(&temp_id, stage.id, numbering.take(), 1);
                m.bracket_position = Some(position.clone());
                m.home_registration_id = home.registration_id;
                m.away_registration_id = away.registration_id;
                m.metadata.home_source = home.label.clone();
                m.metadata.away_source = away.label.clone();
                m.metadata.bracket_type = naming.bracket_type();
                outcome.matches.push(m);
                round_losers.push(Some((temp_id.clone(), position.clone())));
                current.push(Feeder::Match { temp_id, position });
            }
            (one, two) => {
                // at most one real team; it advances as if it had won
                let entrant = one.or(two).cloned();
                round_losers.push(None);
                current.push(Feeder::Bye {
                    entrant,
                    placeholder: format!("BYE-{temp_id}"),
                });
            }
        }
    }
    outcome.losers_by_round.push(round_losers);

    // later rounds materialise fully
    for round in 2..=total_rounds {
        if round == total_rounds {
            outcome.final_feeders = current.clone();
        }
        let mut next = Vec::with_capacity(current.len() / 2);
        let mut round_losers = Vec::with_capacity(current.len() / 2);
        for i in 0..current.len() / 2 {
            let position = naming.position(round, total_rounds, i + 1);
            let temp_id = format!("{}:{}", stage.id, position);
            let mut m = GeneratedMatch::new(&temp_id, stage.id, numbering.take(), round);
            m.bracket_position = Some(position.clone());
            m.metadata.bracket_type = naming.bracket_type();

            apply_feeder(&mut m, &current[2 * i], true);
            apply_feeder(&mut m, &current[2 * i + 1], false);

            outcome.matches.push(m);
            round_losers.push(Some((temp_id.clone(), position.clone())));
            next.push(Feeder::Match { temp_id, position });
        }
        outcome.losers_by_round.push(round_losers);
        current = next;
    }

    outcome.champion = current.into_iter().next();
    outcome
}

/// Wire one feeder into the home or away slot of a downstream match.
fn apply_feeder(m: &mut GeneratedMatch, feeder: &Feeder, home: bool) {
    m.depends_on.push(feeder.dependency());
    let (slot_id, slot_source) = match feeder {
        Feeder::Match { position, .. } => (
            None,
            Some(knockout_reference_label(ReferenceKind::Winner, position)),
        ),
        Feeder::Bye {
            entrant: Some(entrant),
            ..
        } => (entrant.registration_id, entrant.label.clone()),
        Feeder::Bye { entrant: None, .. } => (None, None),
    };
    if home {
        m.home_registration_id = slot_id;
        m.metadata.home_source = slot_source;
    } else {
        m.away_registration_id = slot_id;
        m.metadata.away_source = slot_source;
    }
}

/// Generate a knockout stage: the bracket plus an optional third-place
/// match depending on both semifinals and sorted before the final.
pub fn generate_knockout(
    stage: &Stage,
    entrants: &[BracketEntrant],
    has_third_place: bool,
    naming: BracketNaming,
    numbering: &mut MatchNumbering,
) -> Vec<GeneratedMatch> {
    let outcome = build_bracket(stage, entrants, naming, numbering);
    let mut matches = outcome.matches;

    if has_third_place && outcome.total_rounds >= 2 {
        let position = "3P".to_string();
        let temp_id = format!("{}:{}", stage.id, position);
        let mut m = GeneratedMatch::new(
            &temp_id,
            stage.id,
            numbering.take(),
            outcome.total_rounds,
        );
        m.bracket_position = Some(position);
        m.metadata.is_third_place = true;

        for (i, feeder) in outcome.final_feeders.iter().enumerate() {
            m.depends_on.push(feeder.dependency());
            let source = match feeder {
                Feeder::Match { position, .. } => {
                    Some(knockout_reference_label(ReferenceKind::Loser, position))
                }
                // the loser of a walkover does not exist
                Feeder::Bye { .. } => None,
            };
            if i == 0 {
                m.metadata.home_source = source;
            } else {
                m.metadata.away_source = source;
            }
        }
        matches.push(m);
    }

    matches
}
