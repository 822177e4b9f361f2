//! End-to-end scheduling scenarios against the in-memory storage fake.

use integration_testing::fixtures::*;
use integration_testing::port_fakes::make_engine_with_fake;
use scheduling_core::{
    GenerateScheduleRequest, Pitch, RestTimeOptions, RoundRobinType, ScheduleConstraints,
    ScheduleTiming, ScheduledTimeSlot, ViolationKind,
};
use std::collections::HashSet;
use uuid::Uuid;

fn relaxed_rest(minimum: i64) -> Option<ScheduleConstraints> {
    Some(ScheduleConstraints {
        rest_time: Some(RestTimeOptions {
            minimum_rest_minutes: minimum,
            preferred_rest_minutes: None,
        }),
    })
}

/// Scenario: four teams, single round robin, one pitch, 10 minute matches
/// with 2 minute transitions from 10:00.
#[tokio::test]
async fn round_robin_on_one_pitch_plays_back_to_back() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(10, 0), 10, 2);
    let (input, ids) = round_robin_tournament(4, RoundRobinType::Single, timing, single_pitch());
    let tournament_id = input.tournament_id;
    fake.insert_tournament(input.clone());

    let mut request = GenerateScheduleRequest::from_input(input);
    request.constraints = relaxed_rest(2);
    let response = engine.generate_schedule(&request).await.unwrap();

    assert!(response.success, "errors: {:?}", response.errors);
    assert_eq!(response.matches.len(), 6);

    let expected_times = [
        (at(10, 0), at(10, 10)),
        (at(10, 12), at(10, 22)),
        (at(10, 24), at(10, 34)),
        (at(10, 36), at(10, 46)),
        (at(10, 48), at(10, 58)),
        (at(11, 0), at(11, 10)),
    ];
    for (m, (start, end)) in response.matches.iter().zip(expected_times) {
        assert_eq!(m.scheduled_start_time, start);
        assert_eq!(m.scheduled_end_time, end);
    }

    // three rounds with the classic circle pairings
    let pair = |a: usize, b: usize| {
        let (x, y) = (ids[a].min(ids[b]), ids[a].max(ids[b]));
        (x, y)
    };
    let round_pairs = |round: u32| -> HashSet<(Uuid, Uuid)> {
        response
            .matches
            .iter()
            .filter(|m| m.generated.round_number == round)
            .map(|m| {
                let h = m.generated.home_registration_id.unwrap();
                let a = m.generated.away_registration_id.unwrap();
                (h.min(a), h.max(a))
            })
            .collect()
    };
    assert_eq!(round_pairs(1), HashSet::from([pair(0, 3), pair(1, 2)]));
    assert_eq!(round_pairs(2), HashSet::from([pair(0, 2), pair(1, 3)]));
    assert_eq!(round_pairs(3), HashSet::from([pair(0, 1), pair(2, 3)]));

    // schedule was persisted
    assert_eq!(fake.stored_matches(tournament_id).len(), 6);
}

/// Scenario: eight teams, knockout with third place, one pitch.
#[tokio::test]
async fn knockout_with_third_place_seeds_and_orders_correctly() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(10, 0), 15, 5);
    let (input, ids) = knockout_tournament(8, true, timing, single_pitch());
    fake.insert_tournament(input.clone());

    let response = engine
        .generate_schedule(&GenerateScheduleRequest::from_input(input))
        .await
        .unwrap();
    assert!(response.success, "errors: {:?}", response.errors);
    assert_eq!(response.matches.len(), 8, "7 bracket matches + third place");

    let seed_of = |id: Uuid| ids.iter().position(|x| *x == id).unwrap() + 1;
    let quarters: Vec<(usize, usize)> = response
        .matches
        .iter()
        .filter(|m| m.generated.round_number == 1)
        .map(|m| {
            (
                seed_of(m.generated.home_registration_id.unwrap()),
                seed_of(m.generated.away_registration_id.unwrap()),
            )
        })
        .collect();
    assert_eq!(quarters, vec![(1, 8), (4, 5), (3, 6), (2, 7)]);

    // the third-place match is allocated before the final
    let start_of = |pos: &str| {
        response
            .matches
            .iter()
            .find(|m| m.generated.bracket_position.as_deref() == Some(pos))
            .unwrap()
            .scheduled_start_time
    };
    assert!(start_of("3P") < start_of("F"));
}

/// Scenario: double round robin with three teams.
#[tokio::test]
async fn double_round_robin_mirrors_every_pairing() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(10, 0), 10, 2);
    let (input, _ids) = round_robin_tournament(3, RoundRobinType::Double, timing, single_pitch());
    fake.insert_tournament(input.clone());

    let mut request = GenerateScheduleRequest::from_input(input);
    request.constraints = relaxed_rest(0);
    let response = engine.generate_schedule(&request).await.unwrap();
    assert!(response.success, "errors: {:?}", response.errors);
    assert_eq!(response.matches.len(), 6);

    let mut oriented = HashSet::new();
    for m in &response.matches {
        let key = (
            m.generated.home_registration_id.unwrap(),
            m.generated.away_registration_id.unwrap(),
        );
        assert!(oriented.insert(key), "orientation {key:?} repeated");
    }
    for (home, away) in oriented.clone() {
        assert!(
            oriented.contains(&(away, home)),
            "pairing missing its mirrored leg"
        );
    }
}

/// Scenario: a pitch arrives with overlapping external bookings. The
/// allocator still avoids them, and the overlap itself is reported.
#[tokio::test]
async fn pre_existing_pitch_overlap_is_rejected() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(10, 0), 10, 2);

    let mut pitch = Pitch::new(Uuid::new_v4(), "Shared pitch", at(8, 0), at(22, 0));
    pitch.add_scheduled_slot(ScheduledTimeSlot {
        match_temp_id: None,
        start: at(10, 0),
        end: at(10, 30),
    });
    pitch.add_scheduled_slot(ScheduledTimeSlot {
        match_temp_id: None,
        start: at(10, 15),
        end: at(10, 45),
    });

    let (input, _ids) =
        round_robin_tournament(4, RoundRobinType::Single, timing, vec![pitch]);
    fake.insert_tournament(input.clone());

    let mut request = GenerateScheduleRequest::from_input(input);
    request.constraints = relaxed_rest(2);
    let response = engine.generate_schedule(&request).await.unwrap();

    assert!(!response.success);
    assert!(
        response
            .errors
            .iter()
            .any(|v| v.kind == ViolationKind::PitchConflict),
        "expected a PITCH_CONFLICT error, got {:?}",
        response.errors
    );
    // the allocator itself never double-books: everything starts after the
    // external bookings
    for m in &response.matches {
        assert!(m.scheduled_start_time >= at(10, 47));
    }
    // nothing persisted on failure
    assert!(fake.stored_matches(request.tournament_id).is_empty());
}

#[tokio::test]
async fn clear_schedule_cascades() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(12, 0), 20, 0);
    let (input, _ids) = gsl_tournament(timing, single_pitch());
    let tournament_id = input.tournament_id;
    fake.insert_tournament(input);

    engine
        .generate_schedule_for_tournament(tournament_id)
        .await
        .unwrap();
    assert_eq!(fake.stored_matches(tournament_id).len(), 5);

    let deleted = engine.clear_schedule(tournament_id).await.unwrap();
    assert_eq!(deleted, 5);
    assert!(fake.stored_matches(tournament_id).is_empty());
}

#[tokio::test]
async fn storage_failure_surfaces_as_engine_error() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(12, 0), 20, 0);
    let (input, _ids) = gsl_tournament(timing, single_pitch());
    let tournament_id = input.tournament_id;
    fake.insert_tournament(input);

    fake.fail_next_save();
    let err = engine
        .generate_schedule_for_tournament(tournament_id)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("injected save failure"));
}
