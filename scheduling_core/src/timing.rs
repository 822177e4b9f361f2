// timing parameters of a schedule

use crate::utils::validation::{FieldError, ValidationErrors, ValidationResult};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timing parameters shared by every match of a tournament. Durations are
/// carried as whole minutes, which is the resolution the allocator works at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTiming {
    /// start of the first match of the tournament
    pub start_time: NaiveDateTime,
    /// playing time of a single match
    pub match_duration_minutes: i64,
    /// minimum gap between two matches on the same pitch
    pub transition_time_minutes: i64,
}

impl ScheduleTiming {
    pub fn new(
        start_time: NaiveDateTime,
        match_duration_minutes: i64,
        transition_time_minutes: i64,
    ) -> Self {
        ScheduleTiming {
            start_time,
            match_duration_minutes,
            transition_time_minutes,
        }
    }

    /// Playing time of a single match as a `Duration`.
    pub fn match_duration(&self) -> Duration {
        Duration::minutes(self.match_duration_minutes)
    }

    /// Gap between matches as a `Duration`.
    pub fn transition_time(&self) -> Duration {
        Duration::minutes(self.transition_time_minutes)
    }

    /// Validate the timing parameters.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errs = ValidationErrors::new();

        if self.match_duration_minutes < 1 {
            errs.add(
                FieldError::builder()
                    .set_field(String::from("match_duration_minutes"))
                    .add_message("match duration must be at least one minute")
                    .build(),
            );
        }

        if self.transition_time_minutes < 0 {
            errs.add(
                FieldError::builder()
                    .set_field(String::from("transition_time_minutes"))
                    .add_message("transition time must not be negative")
                    .build(),
            );
        }

        if !errs.is_empty() {
            return Err(errs);
        }
        Ok(())
    }
}
