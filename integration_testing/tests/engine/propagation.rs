//! Result entry and propagation flows.

use integration_testing::fixtures::*;
use integration_testing::port_fakes::{FakeStoragePort, make_engine_with_fake};
use scheduling_core::{
    Engine, EnterResultRequest, GenerateScheduleRequest, RestTimeOptions, ScheduleConstraints,
    ScheduleTiming, StoredMatch,
};
use uuid::Uuid;

fn relaxed_rest() -> Option<ScheduleConstraints> {
    Some(ScheduleConstraints {
        rest_time: Some(RestTimeOptions {
            minimum_rest_minutes: 0,
            preferred_rest_minutes: None,
        }),
    })
}

/// Find the stored match between two teams, in either orientation, and
/// build the request that records `first` beating (or drawing) `second`.
fn result_for(
    stored: &[StoredMatch],
    first: Uuid,
    first_score: u32,
    second: Uuid,
    second_score: u32,
) -> EnterResultRequest {
    let m = stored
        .iter()
        .find(|m| {
            (m.home_registration_id == Some(first) && m.away_registration_id == Some(second))
                || (m.home_registration_id == Some(second)
                    && m.away_registration_id == Some(first))
        })
        .expect("match between the two teams exists");
    if m.home_registration_id == Some(first) {
        EnterResultRequest::new(m.id, first_score, second_score)
    } else {
        EnterResultRequest::new(m.id, second_score, first_score)
    }
}

async fn enter(engine: &Engine, request: EnterResultRequest) {
    engine.enter_result(&request).await.unwrap();
}

/// Scenario: GSL group of four from 12:00 in 20 minute slots without
/// transitions; opening results populate the winners and losers matches.
#[tokio::test]
async fn gsl_results_flow_into_dependent_matches() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(12, 0), 20, 0);
    let (input, seeds) = gsl_tournament(timing, single_pitch());
    let tournament_id = input.tournament_id;
    fake.insert_tournament(input);

    engine
        .generate_schedule_for_tournament(tournament_id)
        .await
        .unwrap();

    let start_of = |pos: &str| {
        fake.stored_by_position(tournament_id, pos)
            .unwrap()
            .scheduled_start_time
            .unwrap()
    };
    assert_eq!(start_of("M1"), at(12, 0));
    assert_eq!(start_of("M2"), at(12, 20));
    assert_eq!(start_of("M3"), at(12, 40));
    assert_eq!(start_of("M4"), at(13, 0));
    assert_eq!(start_of("M5"), at(13, 20));

    // M1: seed 1 beats seed 2 3-1
    let m1 = fake.stored_by_position(tournament_id, "M1").unwrap();
    enter(&engine, EnterResultRequest::new(m1.id, 3, 1)).await;

    let m3 = fake.stored_by_position(tournament_id, "M3").unwrap();
    let m4 = fake.stored_by_position(tournament_id, "M4").unwrap();
    assert_eq!(m3.home_registration_id, Some(seeds[0]));
    assert_eq!(m4.home_registration_id, Some(seeds[1]));
    assert_eq!(m3.away_registration_id, None, "M2 not played yet");

    // M2: seed 3 loses to seed 4 0-2
    let m2 = fake.stored_by_position(tournament_id, "M2").unwrap();
    enter(&engine, EnterResultRequest::new(m2.id, 0, 2)).await;

    let m3 = fake.stored_by_position(tournament_id, "M3").unwrap();
    let m4 = fake.stored_by_position(tournament_id, "M4").unwrap();
    assert_eq!(m3.away_registration_id, Some(seeds[3]));
    assert_eq!(m4.away_registration_id, Some(seeds[2]));

    // play the group out: M3 and M4 feed the decider
    let m3 = fake.stored_by_position(tournament_id, "M3").unwrap();
    enter(&engine, EnterResultRequest::new(m3.id, 1, 0)).await;
    let m4 = fake.stored_by_position(tournament_id, "M4").unwrap();
    enter(&engine, EnterResultRequest::new(m4.id, 2, 0)).await;

    let m5 = fake.stored_by_position(tournament_id, "M5").unwrap();
    assert_eq!(
        m5.home_registration_id,
        Some(seeds[3]),
        "loser of M3 drops to the decider"
    );
    assert_eq!(
        m5.away_registration_id,
        Some(seeds[1]),
        "winner of M4 reaches the decider"
    );
}

/// Scenario: standings tie on points and goal difference resolves by
/// goals-for, and the finished group fills the finals slots.
#[tokio::test]
async fn group_standings_tiebreak_feeds_the_final() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(10, 0), 10, 2);
    let (input, ids) = group_into_final_tournament(3, timing, single_pitch());
    let tournament_id = input.tournament_id;
    fake.insert_tournament(input.clone());

    let (a, b, c) = (ids[0], ids[1], ids[2]);
    let mut request = GenerateScheduleRequest::from_input(input);
    request.constraints = relaxed_rest();
    let response = engine.generate_schedule(&request).await.unwrap();
    assert!(response.success, "errors: {:?}", response.errors);

    // final exists with unresolved slots
    let final_before = fake.stored_by_position(tournament_id, "F").unwrap();
    assert_eq!(final_before.home_source.as_deref(), Some("Group X 1st"));
    assert_eq!(final_before.away_source.as_deref(), Some("Group X 2nd"));
    assert_eq!(final_before.home_registration_id, None);

    // A 2-0 B, B 3-0 C, C 1-0 A: everyone on 3 points and goal
    // difference 0; goals-for ranks B(3), A(2), C(1)
    let stored = fake.stored_matches(tournament_id);
    enter(&engine, result_for(&stored, a, 2, b, 0)).await;
    enter(&engine, result_for(&stored, b, 3, c, 0)).await;
    enter(&engine, result_for(&stored, c, 1, a, 0)).await;

    let final_after = fake.stored_by_position(tournament_id, "F").unwrap();
    assert_eq!(final_after.home_registration_id, Some(b), "B tops the group");
    assert_eq!(final_after.away_registration_id, Some(a));
}

/// Updating a pool result recomputes the standings and overwrites the
/// propagated finals slots.
#[tokio::test]
async fn updating_a_result_repropagates_group_advancement() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(10, 0), 10, 2);
    let (input, ids) = group_into_final_tournament(3, timing, single_pitch());
    let tournament_id = input.tournament_id;
    fake.insert_tournament(input.clone());

    let (a, b, c) = (ids[0], ids[1], ids[2]);
    let mut request = GenerateScheduleRequest::from_input(input);
    request.constraints = relaxed_rest();
    engine.generate_schedule(&request).await.unwrap();

    let stored = fake.stored_matches(tournament_id);
    enter(&engine, result_for(&stored, a, 2, b, 0)).await;
    enter(&engine, result_for(&stored, b, 3, c, 0)).await;
    enter(&engine, result_for(&stored, c, 1, a, 0)).await;

    // flip B's win over C into a loss: C now tops the group
    let update = result_for(&stored, b, 0, c, 1);
    engine.update_result(&update).await.unwrap();

    let final_match = fake.stored_by_position(tournament_id, "F").unwrap();
    assert_eq!(final_match.home_registration_id, Some(c));
    assert_eq!(final_match.away_registration_id, Some(a));
}

/// Updating a knockout result first clears the previously propagated slots
/// so a flipped winner cannot linger downstream.
#[tokio::test]
async fn updating_a_knockout_result_clears_before_repropagating() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(10, 0), 15, 5);
    let (input, ids) = knockout_tournament(4, false, timing, single_pitch());
    let tournament_id = input.tournament_id;
    fake.insert_tournament(input);

    engine
        .generate_schedule_for_tournament(tournament_id)
        .await
        .unwrap();

    // SF1 is seed 1 vs seed 4
    let sf1 = fake.stored_by_position(tournament_id, "SF1").unwrap();
    assert_eq!(sf1.home_registration_id, Some(ids[0]));
    assert_eq!(sf1.away_registration_id, Some(ids[3]));

    enter(&engine, EnterResultRequest::new(sf1.id, 2, 0)).await;
    let final_match = fake.stored_by_position(tournament_id, "F").unwrap();
    assert_eq!(final_match.home_registration_id, Some(ids[0]));

    // the result is corrected: seed 4 actually won
    engine
        .update_result(&EnterResultRequest::new(sf1.id, 1, 3))
        .await
        .unwrap();
    let final_match = fake.stored_by_position(tournament_id, "F").unwrap();
    assert_eq!(final_match.home_registration_id, Some(ids[3]));

    // deleting the result empties the slot again
    engine.delete_result(sf1.id).await.unwrap();
    let final_match = fake.stored_by_position(tournament_id, "F").unwrap();
    assert_eq!(final_match.home_registration_id, None);
}

/// A drawn knockout result with no shootout propagates nothing and does
/// not fail the write.
#[tokio::test]
async fn drawn_result_without_penalties_is_a_propagation_no_op() {
    let (engine, fake) = make_engine_with_fake();
    let timing = ScheduleTiming::new(at(10, 0), 15, 5);
    let (input, _ids) = knockout_tournament(4, false, timing, single_pitch());
    let tournament_id = input.tournament_id;
    fake.insert_tournament(input);

    engine
        .generate_schedule_for_tournament(tournament_id)
        .await
        .unwrap();

    let sf1 = fake.stored_by_position(tournament_id, "SF1").unwrap();
    enter(&engine, EnterResultRequest::new(sf1.id, 1, 1)).await;

    let final_match = fake.stored_by_position(tournament_id, "F").unwrap();
    assert_eq!(final_match.home_registration_id, None);

    // with penalties the same score decides it
    let mut shootout = EnterResultRequest::new(sf1.id, 1, 1);
    shootout.home_penalties = Some(4);
    shootout.away_penalties = Some(2);
    engine.update_result(&shootout).await.unwrap();

    let final_match = fake.stored_by_position(tournament_id, "F").unwrap();
    assert_eq!(
        final_match.home_registration_id,
        fake.stored_by_position(tournament_id, "SF1")
            .unwrap()
            .home_registration_id
    );
}

/// Unknown matches and out-of-range scores are rejected before anything is
/// written.
#[tokio::test]
async fn invalid_result_requests_are_rejected() {
    let (engine, _fake): (Engine, std::sync::Arc<FakeStoragePort>) = make_engine_with_fake();

    let mut request = EnterResultRequest::new(Uuid::new_v4(), 120, 0);
    assert!(engine.enter_result(&request).await.is_err());

    request.home_score = 1;
    // valid scores but the match does not exist
    let err = engine.enter_result(&request).await.unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}
