//! Integration tests: submission controller over the CSV review store
//!
//! Exercises the full rating → comment → reset cycle against a real table
//! on disk, including restarts and many sessions sharing one table.

use std::sync::Arc;
use std::thread;

use ksr_common::{
    AmendTarget, CsvReviewStore, Error, Phase, ReviewStore, SessionState, SubmissionController,
};
use tempfile::TempDir;

fn setup(target: AmendTarget) -> (TempDir, Arc<CsvReviewStore>, SubmissionController) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CsvReviewStore::new(dir.path().join("reviews.csv")));
    let controller = SubmissionController::new(store.clone(), target);
    (dir, store, controller)
}

#[test]
fn test_end_to_end_on_disk() {
    let (_dir, store, controller) = setup(AmendTarget::Record);

    let state = SessionState::new();
    let state = controller.submit_rating(&state, 5).unwrap();
    assert_eq!(state.phase(), Phase::AwaitingComment);

    let records = store.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rating.value(), 5);
    assert_eq!(records[0].comment, "");

    let state = controller.attach_comment(&state, "Loved it").unwrap();
    assert_eq!(state.phase(), Phase::Done);

    let state = controller.reset(&state);
    assert_eq!(state.phase(), Phase::AwaitingRating);

    let records = store.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].comment, "Loved it");

    let table = std::fs::read_to_string(store.path()).unwrap();
    assert!(table.starts_with("timestamp,rating,comment\n"));
    assert!(table.trim_end().ends_with(",5,Loved it"));
}

#[test]
fn test_rejected_rating_writes_nothing() {
    let (_dir, store, controller) = setup(AmendTarget::Record);
    let state = SessionState::new();

    assert!(matches!(controller.submit_rating(&state, 0), Err(Error::InvalidRating(0))));
    assert!(matches!(controller.submit_rating(&state, 6), Err(Error::InvalidRating(6))));
    assert!(!store.path().exists());
}

#[test]
fn test_comment_survives_restart() {
    let (dir, store, controller) = setup(AmendTarget::Record);
    let state = controller.submit_rating(&SessionState::new(), 4).unwrap();
    drop(controller);
    drop(store);

    // New process, same table; session state carried over by the caller
    let store = Arc::new(CsvReviewStore::new(dir.path().join("reviews.csv")));
    let controller = SubmissionController::new(store.clone(), AmendTarget::Record);
    controller.attach_comment(&state, "Great service").unwrap();

    let records = store.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].comment, "Great service");
}

#[test]
fn test_storage_failure_leaves_session_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the table should be makes every read fail
    let table = dir.path().join("reviews.csv");
    std::fs::create_dir(&table).unwrap();
    let store = Arc::new(CsvReviewStore::new(table));
    let controller = SubmissionController::new(store, AmendTarget::Record);

    let state = SessionState::new();
    let err = controller.submit_rating(&state, 3).unwrap_err();
    assert!(err.is_storage_failure(), "unexpected error: {:?}", err);
    assert_eq!(state.phase(), Phase::AwaitingRating);
}

#[test]
fn test_concurrent_sessions_attach_to_own_records() {
    let (_dir, store, controller) = setup(AmendTarget::Record);

    let handles: Vec<_> = (1..=5)
        .map(|rating| {
            let controller = controller.clone();
            thread::spawn(move || {
                for round in 0..4 {
                    let state = controller.submit_rating(&SessionState::new(), rating).unwrap();
                    let comment = format!("rating {} round {}", rating, round);
                    let state = controller.attach_comment(&state, &comment).unwrap();
                    assert_eq!(state.phase(), Phase::Done);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let records = store.load_all().unwrap();
    assert_eq!(records.len(), 20);
    for record in &records {
        let prefix = format!("rating {} ", record.rating.value());
        assert!(
            record.comment.starts_with(&prefix),
            "comment {:?} attached to rating {}",
            record.comment,
            record.rating
        );
    }
}
