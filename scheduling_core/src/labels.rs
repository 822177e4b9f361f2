//! Source labels.
//!
//! Cross-stage dependencies are expressed as human-readable labels such as
//! `"Group A 1st"` or `"Winner M3"` rather than typed edges. This module is
//! the single place that renders and parses them, so the two directions
//! cannot drift apart.

use crate::utils::normalize::normalize_label;
use regex::Regex;
use std::sync::LazyLock;

/// what a knockout source label refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Winner,
    Loser,
}

/// Ordinal suffix rendering: 1 → "1st", 2 → "2nd", 11 → "11th".
pub fn ordinal(position: u32) -> String {
    let suffix = match (position % 10, position % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{position}{suffix}")
}

/// Label of a team advancing from a group, e.g. `"Group A 1st"`. GSL groups
/// use `"Winner"` / `"Runner-up"` wording for their two advancing teams.
pub fn group_position_label(group_name: &str, position: u32, gsl: bool) -> String {
    if gsl {
        match position {
            1 => return format!("{group_name} Winner"),
            2 => return format!("{group_name} Runner-up"),
            _ => {}
        }
    }
    format!("{group_name} {}", ordinal(position))
}

/// Label referencing the winner or loser of a bracket position.
pub fn knockout_reference_label(kind: ReferenceKind, bracket_position: &str) -> String {
    match kind {
        ReferenceKind::Winner => format!("Winner {bracket_position}"),
        ReferenceKind::Loser => format!("Loser {bracket_position}"),
    }
}

// a leading match reference like "a1 winner" disqualifies the remainder
static MATCH_REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]?\d+\s*(winner|loser)").expect("match reference pattern is valid")
});
static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(st|nd|rd|th)$").expect("ordinal pattern is valid"));
static RUNNER_UP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^runner-?up$").expect("runner-up pattern is valid"));

/// Parse a group-advancement source label against a concrete group name.
/// Returns the referenced position, or `None` when the label does not refer
/// to a position of this group.
///
/// The prefix check prevents `"Group A A1 Winner"` (a within-stage match
/// reference of a group whose name merely starts with `"Group A"`) from
/// matching `"Group A"`.
pub fn parse_group_position(source: &str, group_name: &str) -> Option<u32> {
    let source = normalize_label(source);
    let group_name = normalize_label(group_name);
    if group_name.is_empty() {
        return None;
    }

    let remainder = source.strip_prefix(group_name.as_str())?.trim().to_string();

    if MATCH_REFERENCE_RE.is_match(&remainder) {
        return None;
    }

    if remainder == "winner" {
        return Some(1);
    }
    if RUNNER_UP_RE.is_match(&remainder) {
        return Some(2);
    }
    if let Some(caps) = ORDINAL_RE.captures(&remainder) {
        return caps[1].parse().ok();
    }
    None
}

/// Check whether a source label references the given bracket position, and
/// if so whether it asks for the winner or the loser. Case-insensitive; a
/// trailing word boundary keeps `"Winner M1"` from claiming position
/// `"M10"`.
pub fn match_knockout_reference(source: &str, bracket_position: &str) -> Option<ReferenceKind> {
    let pattern = format!(
        r"(?i)\b(winner|loser)\b\W*(?:of\W+)?{}(\b|$)",
        regex::escape(bracket_position)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(source)?;
    match caps[1].to_lowercase().as_str() {
        "winner" => Some(ReferenceKind::Winner),
        _ => Some(ReferenceKind::Loser),
    }
}
