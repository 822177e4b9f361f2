//! Constraint validation of an allocated schedule.
//!
//! Validation never mutates: it reports violations with a severity, and
//! the schedule counts as valid exactly when no error-severity violation
//! exists. Warnings are informational.

use crate::match_::AllocatedMatch;
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use uuid::Uuid;

/// category of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    /// rest time
    RestTime,
    /// dependency
    Dependency,
    /// pitch conflict
    PitchConflict,
    /// time overlap
    TimeOverlap,
    /// missing team
    MissingTeam,
}

/// severity of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// error
    Error,
    /// warning
    Warning,
}

/// A single constraint violation with a structured payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub severity: Severity,
    pub message: String,
    /// temp id of the offending match, when one exists
    pub match_id: Option<String>,
    #[serde(default)]
    pub details: Value,
}

impl Violation {
    pub fn error(kind: ViolationKind, message: impl Into<String>) -> Self {
        Violation {
            kind,
            severity: Severity::Error,
            message: message.into(),
            match_id: None,
            details: Value::Null,
        }
    }

    pub fn warning(kind: ViolationKind, message: impl Into<String>) -> Self {
        Violation {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            match_id: None,
            details: Value::Null,
        }
    }

    pub fn with_match(mut self, temp_id: impl Into<String>) -> Self {
        self.match_id = Some(temp_id.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// rest time thresholds in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestTimeOptions {
    pub minimum_rest_minutes: i64,
    pub preferred_rest_minutes: Option<i64>,
}

impl Default for RestTimeOptions {
    fn default() -> Self {
        RestTimeOptions {
            minimum_rest_minutes: 15,
            preferred_rest_minutes: Some(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOptions {
    pub rest_time: RestTimeOptions,
    /// knockout-heavy schedules legitimately carry unresolved team slots
    pub validate_missing_teams: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            rest_time: RestTimeOptions::default(),
            validate_missing_teams: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_error())
    }
    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| !v.is_error())
    }
}

/// Validate an allocated schedule against the rest/overlap/dependency/
/// missing-team constraints.
pub fn validate(matches: &[AllocatedMatch], options: &ValidationOptions) -> ValidationReport {
    let mut violations = Vec::new();

    check_rest_times(matches, &options.rest_time, &mut violations);
    check_pitch_conflicts(matches, &mut violations);
    check_dependencies(matches, &mut violations);
    if options.validate_missing_teams {
        check_missing_teams(matches, &mut violations);
    }

    let valid = !violations.iter().any(Violation::is_error);
    ValidationReport { valid, violations }
}

/// Pre-existing bookings on a pitch are outside the allocator's control;
/// an overlap among them is a data problem the caller must see.
pub fn validate_pitches(pitches: &[crate::pitch::Pitch]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for pitch in pitches {
        for pair in pitch.get_scheduled_matches().windows(2) {
            if pair[0].end > pair[1].start {
                violations.push(
                    Violation::error(
                        ViolationKind::PitchConflict,
                        format!(
                            "pre-existing bookings overlap on pitch '{}'",
                            pitch.get_name()
                        ),
                    )
                    .with_details(json!({
                        "pitch": pitch.get_id(),
                        "firstStart": pair[0].start,
                        "secondStart": pair[1].start,
                    })),
                );
            }
        }
    }
    violations
}

fn check_rest_times(
    matches: &[AllocatedMatch],
    options: &RestTimeOptions,
    violations: &mut Vec<Violation>,
) {
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

    let mut teams: Vec<(&Uuid, &mut Vec<&AllocatedMatch>)> = by_team.iter_mut().collect();
    teams.sort_by_key(|(team, _)| **team);

    for (team, team_matches) in teams {
        team_matches.sort_by_key(|m| m.scheduled_start_time);
        for pair in team_matches.windows(2) {
            let rest = (pair[1].scheduled_start_time - pair[0].scheduled_end_time).num_minutes();
            let details = json!({
                "team": team,
                "previousMatch": pair[0].generated.temp_id,
                "nextMatch": pair[1].generated.temp_id,
                "restMinutes": rest,
            });
            if rest < options.minimum_rest_minutes {
                violations.push(
                    Violation::error(
                        ViolationKind::RestTime,
                        format!(
                            "team {team} has only {rest} minutes rest (minimum {})",
                            options.minimum_rest_minutes
                        ),
                    )
                    .with_match(pair[1].generated.temp_id.clone())
                    .with_details(details),
                );
            } else if let Some(preferred) = options.preferred_rest_minutes {
                if rest < preferred {
                    violations.push(
                        Violation::warning(
                            ViolationKind::RestTime,
                            format!(
                                "team {team} has {rest} minutes rest (preferred {preferred})"
                            ),
                        )
                        .with_match(pair[1].generated.temp_id.clone())
                        .with_details(details),
                    );
                }
            }
        }
    }
}

fn check_pitch_conflicts(matches: &[AllocatedMatch], violations: &mut Vec<Violation>) {
    let mut by_pitch: HashMap<Uuid, Vec<&AllocatedMatch>> = HashMap::new();
    for m in matches {
        by_pitch.entry(m.pitch_id).or_default().push(m);
    }

    let mut pitches: Vec<(&Uuid, &mut Vec<&AllocatedMatch>)> = by_pitch.iter_mut().collect();
    pitches.sort_by_key(|(pitch, _)| **pitch);

    for (pitch, pitch_matches) in pitches {
        pitch_matches.sort_by_key(|m| m.scheduled_start_time);
        for pair in pitch_matches.windows(2) {
            if pair[0].scheduled_end_time > pair[1].scheduled_start_time {
                violations.push(
                    Violation::error(
                        ViolationKind::PitchConflict,
                        format!(
                            "matches {} and {} overlap on pitch {pitch}",
                            pair[0].generated.temp_id, pair[1].generated.temp_id
                        ),
                    )
                    .with_match(pair[1].generated.temp_id.clone())
                    .with_details(json!({
                        "pitch": pitch,
                        "firstMatch": pair[0].generated.temp_id,
                        "secondMatch": pair[1].generated.temp_id,
                    })),
                );
            }
        }
    }
}

fn check_dependencies(matches: &[AllocatedMatch], violations: &mut Vec<Violation>) {
    let by_temp: HashMap<&str, &AllocatedMatch> = matches
        .iter()
        .map(|m| (m.generated.temp_id.as_str(), m))
        .collect();

    for m in matches {
        for dep in &m.generated.depends_on {
            match by_temp.get(dep.as_str()) {
                Some(parent) => {
                    if parent.scheduled_end_time > m.scheduled_start_time {
                        violations.push(
                            Violation::error(
                                ViolationKind::Dependency,
                                format!(
                                    "match {} starts before its dependency {} ends",
                                    m.generated.temp_id, dep
                                ),
                            )
                            .with_match(m.generated.temp_id.clone())
                            .with_details(json!({
                                "dependency": dep,
                                "dependencyEnd": parent.scheduled_end_time,
                                "matchStart": m.scheduled_start_time,
                            })),
                        );
                    }
                }
                None if !dep.starts_with("BYE-") => {
                    violations.push(
                        Violation::warning(
                            ViolationKind::Dependency,
                            format!(
                                "match {} depends on unknown match {}",
                                m.generated.temp_id, dep
                            ),
                        )
                        .with_match(m.generated.temp_id.clone()),
                    );
                }
                None => {}
            }
        }
    }
}

fn check_missing_teams(matches: &[AllocatedMatch], violations: &mut Vec<Violation>) {
    for m in matches {
        // matches with dependencies legitimately wait for their teams
        if !m.generated.depends_on.is_empty() {
            continue;
        }
        if m.generated.home_registration_id.is_none() || m.generated.away_registration_id.is_none()
        {
            violations.push(
                Violation::error(
                    ViolationKind::MissingTeam,
                    format!(
                        "match {} has no dependencies but is missing a team",
                        m.generated.temp_id
                    ),
                )
                .with_match(m.generated.temp_id.clone()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_::GeneratedMatch;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn allocated(
        temp_id: &str,
        home: Option<Uuid>,
        away: Option<Uuid>,
        pitch: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AllocatedMatch {
        let stage_id = Uuid::nil();
        let mut g = GeneratedMatch::new(temp_id, stage_id, 1, 1);
        g.home_registration_id = home;
        g.away_registration_id = away;
        AllocatedMatch {
            generated: g,
            pitch_id: pitch,
            scheduled_start_time: start,
            scheduled_end_time: end,
        }
    }

    #[test]
    fn short_rest_is_an_error_and_medium_rest_a_warning() {
        let team = Uuid::new_v4();
        let other1 = Uuid::new_v4();
        let other2 = Uuid::new_v4();
        let pitch = Uuid::new_v4();
        let matches = vec![
            allocated("m1", Some(team), Some(other1), pitch, at(10, 0), at(10, 30)),
            // 10 minutes rest: below the 15 minute minimum
            allocated("m2", Some(team), Some(other2), pitch, at(10, 40), at(11, 10)),
            // 20 minutes rest: above minimum, below preferred 30
            allocated("m3", Some(other1), Some(team), pitch, at(11, 30), at(12, 0)),
        ];
        let report = validate(&matches, &ValidationOptions::default());
        assert!(!report.valid);
        let rest: Vec<&Violation> = report
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::RestTime)
            .collect();
        assert!(rest.iter().any(|v| v.is_error()));
        assert!(rest.iter().any(|v| !v.is_error()));
    }

    #[test]
    fn raising_the_minimum_never_removes_a_violation() {
        let team = Uuid::new_v4();
        let pitch = Uuid::new_v4();
        let matches = vec![
            allocated("m1", Some(team), Some(Uuid::new_v4()), pitch, at(10, 0), at(10, 30)),
            allocated("m2", Some(team), Some(Uuid::new_v4()), pitch, at(10, 50), at(11, 20)),
        ];
        let mut previous_errors = 0;
        for minimum in [5, 15, 25, 45, 90] {
            let options = ValidationOptions {
                rest_time: RestTimeOptions {
                    minimum_rest_minutes: minimum,
                    preferred_rest_minutes: None,
                },
                ..Default::default()
            };
            let errors = validate(&matches, &options)
                .violations
                .iter()
                .filter(|v| v.is_error())
                .count();
            assert!(errors >= previous_errors, "monotone in the minimum");
            previous_errors = errors;
        }
    }

    #[test]
    fn overlapping_matches_on_one_pitch_are_flagged() {
        let pitch = Uuid::new_v4();
        let matches = vec![
            allocated(
                "m1",
                Some(Uuid::new_v4()),
                Some(Uuid::new_v4()),
                pitch,
                at(10, 0),
                at(10, 30),
            ),
            allocated(
                "m2",
                Some(Uuid::new_v4()),
                Some(Uuid::new_v4()),
                pitch,
                at(10, 15),
                at(10, 45),
            ),
        ];
        let report = validate(&matches, &ValidationOptions::default());
        assert!(
            report
                .violations
                .iter()
                .any(|v| v.kind == ViolationKind::PitchConflict && v.is_error())
        );
    }

    #[test]
    fn dependency_violations_distinguish_order_from_absence() {
        let pitch = Uuid::new_v4();
        let team = || Some(Uuid::new_v4());
        let mut parent = allocated("parent", team(), team(), pitch, at(11, 0), at(11, 30));
        parent.generated.depends_on = vec![];
        let mut child = allocated("child", team(), team(), pitch, at(10, 0), at(10, 30));
        child.generated.depends_on = vec!["parent".into(), "BYE-x".into(), "ghost".into()];

        let report = validate(&[parent, child], &ValidationOptions::default());
        let deps: Vec<&Violation> = report
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::Dependency)
            .collect();
        // "parent" ends after "child" starts: error; "ghost" unknown:
        // warning; "BYE-x" ignored
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().any(|v| v.is_error()));
        assert!(deps.iter().any(|v| !v.is_error()));
    }

    #[test]
    fn missing_team_only_flags_dependency_free_matches() {
        let pitch = Uuid::new_v4();
        let mut incomplete = allocated("no-team", None, Some(Uuid::new_v4()), pitch, at(10, 0), at(10, 30));
        incomplete.generated.depends_on = vec![];
        let mut pending = allocated("pending", None, None, pitch, at(11, 0), at(11, 30));
        pending.generated.depends_on = vec!["no-team".into()];

        let report = validate(&[incomplete, pending], &ValidationOptions::default());
        let missing: Vec<&Violation> = report
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::MissingTeam)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].match_id.as_deref(), Some("no-team"));

        let relaxed = ValidationOptions {
            validate_missing_teams: false,
            ..Default::default()
        };
        let report = validate(
            &[
                allocated("x", None, None, pitch, at(10, 0), at(10, 30)),
            ],
            &relaxed,
        );
        assert!(report.valid);
    }
}
