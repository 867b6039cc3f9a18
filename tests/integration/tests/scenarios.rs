//! End-to-end choice scenarios
//!
//! Several users share one in-memory store, each signed in through a
//! session gate of their own.
//!
//! Run with: cargo test -p integration-tests --test scenarios

use cricket_core::{project, DecisionKind, RsvpStatus};
use cricket_db::WriteKind;
use cricket_service::dto::RsvpAction;
use cricket_service::{ChoiceEngine, ChoiceIntent, ChoiceStage, ServiceError, SessionState};
use futures::future::join_all;
use integration_tests::{fixtures::*, TestApp};

// ============================================================================
// Choice invariants
// ============================================================================

#[tokio::test]
async fn test_at_most_one_choice_per_identity() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let voter = app.sign_in("voter").await.unwrap();
    let poll = owner.create_poll("A, B, C").await.unwrap();

    let mut current = poll;
    for option in ["A", "B", "B", "C", "A"] {
        let outcome = voter.polls().vote(&current, option).await.unwrap();
        assert_eq!(outcome.decision.entries_of(&voter.identity().id), 1);

        current = voter.reload(DecisionKind::Poll, &current.id).await.unwrap();
        assert_eq!(current.entries_of(&voter.identity().id), 1);
        assert_eq!(current.choice_of(&voter.identity().id).unwrap().option, option);
    }

    voter.polls().retract(&current).await.unwrap();
    let current = voter.reload(DecisionKind::Poll, &current.id).await.unwrap();
    assert_eq!(current.entries_of(&voter.identity().id), 0);
}

#[tokio::test]
async fn test_reselecting_same_option_writes_nothing() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();

    let first = owner.polls().vote(&poll, "A").await.unwrap();
    assert_eq!(first.mutations, 1);
    let writes = app.store.write_count();

    let second = owner.polls().vote(&first.decision, "A").await.unwrap();
    assert_eq!(second.mutations, 0);
    assert_eq!(app.store.write_count(), writes);
}

#[tokio::test]
async fn test_stale_snapshot_reselect_writes_nothing() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();
    let engine = ChoiceEngine::new(&owner.ctx);

    let first = engine
        .apply_choice(&poll, owner.identity(), ChoiceIntent::select("A"))
        .await
        .unwrap();
    assert_eq!(first.mutations, 1);
    let writes = app.store.write_count();

    let second = engine
        .apply_choice(&poll, owner.identity(), ChoiceIntent::select("A"))
        .await
        .unwrap();
    assert_eq!(second.mutations, 0);
    assert_eq!(app.store.write_count(), writes);

    let stored = owner.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    assert_eq!(stored.entries_of(&owner.identity().id), 1);
}

#[tokio::test]
async fn test_stale_snapshot_switch_and_cancel_keep_one_entry() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();
    let engine = ChoiceEngine::new(&owner.ctx);

    engine
        .apply_choice(&poll, owner.identity(), ChoiceIntent::select("A"))
        .await
        .unwrap();
    let switched = engine
        .apply_choice(&poll, owner.identity(), ChoiceIntent::select("B"))
        .await
        .unwrap();
    assert_eq!(switched.mutations, 2);
    assert_eq!(switched.choice_of(owner.identity()), Some("B"));

    let stored = owner.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    assert_eq!(stored.entries_of(&owner.identity().id), 1);
    assert_eq!(stored.choice_of(&owner.identity().id).unwrap().option, "B");
    assert!(stored.counts_consistent());

    let cancelled = engine
        .apply_choice(&poll, owner.identity(), ChoiceIntent::Cancel)
        .await
        .unwrap();
    assert_eq!(cancelled.mutations, 1);

    let stored = owner.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    assert_eq!(stored.entries_of(&owner.identity().id), 0);
    assert!(stored.counts_consistent());
}

#[tokio::test]
async fn test_choice_on_deleted_decision_is_not_found() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();
    owner.polls().delete(&poll).await.unwrap();
    let writes = app.store.write_count();

    let err = owner.polls().vote(&poll, "A").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(app.store.write_count(), writes);
}

#[tokio::test]
async fn test_tally_matches_recorded_choices() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B, C").await.unwrap();

    let mut voters = Vec::new();
    for name in ["u1", "u2", "u3", "u4"] {
        voters.push(app.sign_in(name).await.unwrap());
    }

    for (voter, option) in voters.iter().zip(["A", "B", "A", "C"]) {
        let current = voter.reload(DecisionKind::Poll, &poll.id).await.unwrap();
        voter.polls().vote(&current, option).await.unwrap();
    }
    let current = owner.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    voters[1].polls().retract(&current).await.unwrap();

    let current = owner.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    let tally = project(&current);
    assert_eq!(tally.total as usize, current.choices.len());
    assert_eq!(tally.options.iter().map(|o| o.count).sum::<u32>(), 3);
    assert!(current.counts_consistent());
}

#[tokio::test]
async fn test_cancel_clears_choice() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let guest = app.sign_in("guest").await.unwrap();
    let event = owner.create_event().await.unwrap();

    let outcome = guest.events().rsvp(&event, RsvpAction::NotGoing).await.unwrap();
    let outcome = guest.events().rsvp(&outcome.decision, RsvpAction::Cancel).await.unwrap();
    assert_eq!(outcome.mutations, 1);
    assert!(outcome.choice_of(guest.identity()).is_none());

    let stored = guest.reload(DecisionKind::Event, &event.id).await.unwrap();
    assert!(stored.choices.is_empty());

    // Nothing to cancel
    let again = guest.events().rsvp(&stored, RsvpAction::Cancel).await.unwrap();
    assert_eq!(again.mutations, 0);
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_rsvp_going_then_maybe() {
    let app = TestApp::new();
    let organizer = app.sign_in("organizer").await.unwrap();
    let guest = app.sign_in("guest").await.unwrap();
    let event = organizer.create_event().await.unwrap();
    let option_names: Vec<_> = event.options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(option_names, vec!["going", "maybe", "not-going"]);

    let going = guest.events().rsvp(&event, RsvpAction::Going).await.unwrap();
    assert_eq!(going.choice_of(guest.identity()), Some(RsvpStatus::Going.as_str()));

    let writes = app.store.write_count();
    let maybe = guest.events().rsvp(&going.decision, RsvpAction::Maybe).await.unwrap();
    assert_eq!(maybe.mutations, 2);
    assert_eq!(app.store.write_count(), writes + 2);

    let stored = guest.reload(DecisionKind::Event, &event.id).await.unwrap();
    assert_eq!(stored.choices.len(), 1);
    assert_eq!(stored.choices[0].identity_id, guest.identity().id);
    assert_eq!(stored.choices[0].option, "maybe");

    let view = guest.events().view(&event.id).await.unwrap();
    assert_eq!(view.my_rsvp.as_deref(), Some("maybe"));
    assert_eq!(view.tally.count("going"), 0);
    assert!(!view.can_delete);
}

#[tokio::test]
async fn test_poll_counts_follow_votes() {
    let app = TestApp::new();
    let u1 = app.sign_in("u1").await.unwrap();
    let u2 = app.sign_in("u2").await.unwrap();
    let poll = u1.create_poll("A, B").await.unwrap();
    let counts = |d: &cricket_core::Decision| (d.options[0].count, d.options[1].count);
    assert_eq!(counts(&poll), (0, 0));

    u1.polls().vote(&poll, "A").await.unwrap();
    let poll = u1.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    assert_eq!(counts(&poll), (1, 0));

    u2.polls().vote(&poll, "A").await.unwrap();
    let poll = u1.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    assert_eq!(counts(&poll), (2, 0));

    u1.polls().vote(&poll, "B").await.unwrap();
    let poll = u1.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    assert_eq!(counts(&poll), (1, 1));

    let tally = project(&poll);
    assert_eq!(tally.count("A"), 1);
    assert_eq!(tally.count("B"), 1);
    assert!((tally.get("A").unwrap().percent - 50.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_empty_poll_projection() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    owner.create_poll("A, B, C").await.unwrap();

    let views = owner.polls().list().await.unwrap();
    assert_eq!(views.len(), 1);
    let tally = &views[0].tally;
    assert_eq!(tally.total, 0);
    assert_eq!(tally.options.len(), 3);
    for option in &tally.options {
        assert_eq!(option.count, 0);
        assert!(option.percent.abs() < f64::EPSILON);
    }
    assert!(views[0].can_delete);
    assert!(!views[0].has_voted());
}

#[tokio::test]
async fn test_non_owner_delete_is_rejected_before_store() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let other = app.sign_in("other").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();
    let event = owner.create_event().await.unwrap();
    let writes = app.store.write_count();

    let err = other.polls().delete(&poll).await.unwrap_err();
    assert_eq!(err.error_code(), "PERMISSION_DENIED");
    let err = other.events().delete(&event).await.unwrap_err();
    assert_eq!(err.error_code(), "PERMISSION_DENIED");
    assert_eq!(app.store.write_count(), writes);

    owner.polls().delete(&poll).await.unwrap();
    owner.events().delete(&event).await.unwrap();
    assert!(app.store.is_empty("polls"));
    assert!(app.store.is_empty("events"));
    assert_eq!(app.store.write_log().last(), Some(&WriteKind::Delete));
}

// ============================================================================
// Store failures
// ============================================================================

#[tokio::test]
async fn test_removal_failure_keeps_previous_choice() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();
    let voted = owner.polls().vote(&poll, "A").await.unwrap();

    app.store.fail_next_write("network down");
    let err = owner.polls().vote(&voted.decision, "B").await.unwrap_err();
    match err {
        ServiceError::ChoiceUpdateFailed {
            stage,
            removed_previous,
            ..
        } => {
            assert_eq!(stage, ChoiceStage::Removal);
            assert!(!removed_previous);
        }
        other => panic!("unexpected error: {other}"),
    }

    let stored = owner.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    assert_eq!(stored.choice_of(&owner.identity().id).unwrap().option, "A");
    assert!(stored.counts_consistent());
}

#[tokio::test]
async fn test_addition_failure_leaves_no_choice() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();
    let voted = owner.polls().vote(&poll, "A").await.unwrap();

    app.store.fail_write_after(1, "quota exceeded");
    let err = owner.polls().vote(&voted.decision, "B").await.unwrap_err();
    assert!(err.is_retryable());
    match err {
        ServiceError::ChoiceUpdateFailed {
            stage,
            removed_previous,
            ..
        } => {
            assert_eq!(stage, ChoiceStage::Addition);
            assert!(removed_previous);
        }
        other => panic!("unexpected error: {other}"),
    }

    let stored = owner.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    assert_eq!(stored.entries_of(&owner.identity().id), 0);
    assert!(stored.counts_consistent());

    // A retry from the stored state records the new vote
    owner.polls().vote(&stored, "B").await.unwrap();
    let stored = owner.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    assert_eq!(stored.choice_of(&owner.identity().id).unwrap().option, "B");
}

#[tokio::test]
async fn test_atomic_batch_is_one_mutation() {
    let app = TestApp::with_atomic_batches();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();
    let voted = owner.polls().vote(&poll, "A").await.unwrap();

    let switched = owner.polls().vote(&voted.decision, "B").await.unwrap();
    assert_eq!(switched.mutations, 1);
    assert_eq!(app.store.write_log().last(), Some(&WriteKind::Batch));

    app.store.fail_next_write("network down");
    let err = owner.polls().vote(&switched.decision, "A").await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::ChoiceUpdateFailed {
            stage: ChoiceStage::Batch,
            removed_previous: false,
            ..
        }
    ));
    let stored = owner.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    assert_eq!(stored.choice_of(&owner.identity().id).unwrap().option, "B");
}

#[tokio::test]
async fn test_read_failure_surfaces() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    app.store.set_fail_reads(true);

    let err = owner.events().list().await.unwrap_err();
    assert_eq!(err.error_code(), "STORE_READ_ERROR");

    app.store.set_fail_reads(false);
    assert!(owner.events().list().await.unwrap().is_empty());
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_voters_keep_one_choice_each() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();

    let mut voters = Vec::new();
    for i in 0..8 {
        voters.push(app.sign_in(&format!("voter{i}")).await.unwrap());
    }

    let poll = &poll;
    let votes = voters.iter().enumerate().map(|(i, voter)| async move {
        let option = if i % 2 == 0 { "A" } else { "B" };
        voter.polls().vote(poll, option).await
    });
    for result in join_all(votes).await {
        result.unwrap();
    }

    let stored = owner.reload(DecisionKind::Poll, &poll.id).await.unwrap();
    for voter in &voters {
        assert_eq!(stored.entries_of(&voter.identity().id), 1);
    }
    let tally = project(&stored);
    assert_eq!(tally.total, 8);
    assert_eq!(tally.count("A"), 4);

    // Cached counts are rewritten from each voter's read; repair settles them
    let repaired = owner.repository().repair_counts(&poll.id).await.unwrap();
    assert!(repaired.counts_consistent());
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_anonymous_user_cannot_choose() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();

    let anonymous = app.anonymous().unwrap();
    assert_eq!(anonymous.ctx.session().state(), SessionState::Unknown);
    anonymous.ctx.session().initialize().await.unwrap();
    assert_eq!(anonymous.ctx.session().state(), SessionState::Anonymous);

    let err = anonymous.polls().vote(&poll, "A").await.unwrap_err();
    assert!(err.is_auth());
    let err = anonymous.polls().create(poll_request()).await.unwrap_err();
    assert!(err.is_auth());

    let views = anonymous.polls().list().await.unwrap();
    assert_eq!(views.len(), 1);
    assert!(!views[0].can_delete);
}

#[tokio::test]
async fn test_sign_out_stops_choices() {
    let app = TestApp::new();
    let user = app.sign_in("user").await.unwrap();
    let poll = user.create_poll("A, B").await.unwrap();

    user.ctx.session().sign_out().await.unwrap();
    assert!(!user.auth.has_session());

    let err = user.polls().vote(&poll, "A").await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_AUTHENTICATED");
    assert!(app.store.write_log().iter().all(|w| *w == WriteKind::Create));
}

#[tokio::test]
async fn test_expired_session_goes_anonymous() {
    let app = TestApp::new();
    let user = app.sign_in("user").await.unwrap();

    user.auth.invalidate_session();
    let state = user.ctx.session().check_session().await.unwrap();
    assert_eq!(state, SessionState::Anonymous);
    assert!(user.ctx.session().require_identity().is_err());
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_poll_needs_two_distinct_options() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();

    let err = owner
        .polls()
        .create(poll_request_with("Oval, Oval ,  , Oval,"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(app.store.is_empty("polls"));

    let poll = owner.create_poll(" Oval, Lord's, Oval ").await.unwrap();
    let names: Vec<_> = poll.options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Oval", "Lord's"]);
}

#[tokio::test]
async fn test_unknown_option_is_rejected() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();
    let poll = owner.create_poll("A, B").await.unwrap();
    let writes = app.store.write_count();

    let err = owner.polls().vote(&poll, "Z").await.unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_OPTION");

    let engine = ChoiceEngine::new(&owner.ctx);
    let err = engine
        .apply_choice(&poll, owner.identity(), ChoiceIntent::select("maybe"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(app.store.write_count(), writes);
}

#[tokio::test]
async fn test_event_requires_fields() {
    let app = TestApp::new();
    let owner = app.sign_in("owner").await.unwrap();

    let mut request = event_request();
    request.location = "   ".to_string();
    assert!(owner.events().create(request).await.unwrap_err().is_validation());

    let mut request = event_request();
    request.time = "half seven".to_string();
    assert!(owner.events().create(request).await.unwrap_err().is_validation());

    assert!(app.store.is_empty("events"));
}
