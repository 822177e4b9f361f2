//! Pitches and their booked time slots.
//!
//! A pitch is the unit of parallelism in the allocator: two matches can run
//! at the same time only on different pitches. Each pitch carries an
//! availability window and the slots already booked on it, kept sorted by
//! start time so feasibility searches walk the day once.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A booked interval on a pitch. `match_temp_id` is `None` for slots that
/// were supplied externally (e.g. a blocked maintenance window or a match
/// from another event sharing the pitch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTimeSlot {
    pub match_temp_id: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A physical playing field with an availability window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pitch {
    /// id of pitch
    id: Uuid,
    /// display name of pitch
    name: String,
    /// opening of the availability window
    available_from: NaiveDateTime,
    /// closing of the availability window
    available_to: NaiveDateTime,
    /// booked slots, sorted by start time
    scheduled_matches: Vec<ScheduledTimeSlot>,
}

impl Pitch {
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        available_from: NaiveDateTime,
        available_to: NaiveDateTime,
    ) -> Self {
        Pitch {
            id,
            name: name.into(),
            available_from,
            available_to,
            scheduled_matches: Vec::new(),
        }
    }

    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_available_from(&self) -> NaiveDateTime {
        self.available_from
    }

    pub fn get_available_to(&self) -> NaiveDateTime {
        self.available_to
    }

    pub fn get_scheduled_matches(&self) -> &[ScheduledTimeSlot] {
        &self.scheduled_matches
    }

    /// Pre-book a slot, e.g. one supplied by the surrounding event. Keeps
    /// the slot list sorted by start time.
    pub fn add_scheduled_slot(&mut self, slot: ScheduledTimeSlot) -> &mut Self {
        let at = self
            .scheduled_matches
            .partition_point(|s| s.start <= slot.start);
        self.scheduled_matches.insert(at, slot);
        self
    }

    /// Earliest start `>= from` at which a match of `duration` fits on this
    /// pitch: inside the availability window, separated from every booked
    /// slot by at least `transition` on both sides. Returns `None` when the
    /// remaining window is too short.
    pub fn earliest_fit(
        &self,
        from: NaiveDateTime,
        duration: Duration,
        transition: Duration,
    ) -> Option<NaiveDateTime> {
        let mut candidate = from.max(self.available_from);

        for slot in &self.scheduled_matches {
            if candidate + duration + transition <= slot.start {
                break;
            }
            candidate = candidate.max(slot.end + transition);
        }

        (candidate + duration <= self.available_to).then_some(candidate)
    }

    /// Book a match into the slot list.
    pub fn book(&mut self, match_temp_id: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) {
        self.add_scheduled_slot(ScheduledTimeSlot {
            match_temp_id: Some(match_temp_id.into()),
            start,
            end,
        });
    }
}
