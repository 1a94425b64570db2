//! Restart safety through the durable file store: a job killed between
//! batches resumes from the persisted cursor without duplicating work,
//! and metrics keep accumulating across process lifetimes.

mod common;

use common::{RecordingScheduler, ScriptedClassifier};
use sentiment_batch::{
    BatchConfig, InMemorySheet, JobController, JsonFileStore, PropertyStore, Started,
};
use std::sync::Arc;

fn config() -> BatchConfig {
    BatchConfig {
        batch_size: 2,
        ..BatchConfig::default()
    }
}

#[tokio::test]
async fn job_resumes_from_durable_cursor_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("job_state.json");

    // The sheet outlives the "process": results written in the first
    // lifetime are visible to the second.
    let sheet = Arc::new(InMemorySheet::new(&[
        ("review 0", "x", ""),
        ("review 1", "x", ""),
        ("review 2", "x", ""),
        ("review 3", "x", ""),
    ]));

    // First lifetime: one batch, then the process dies.
    {
        let store: Arc<dyn PropertyStore> = Arc::new(JsonFileStore::open(&state_path).unwrap());
        let scheduler = Arc::new(RecordingScheduler::new());
        let classifier = Arc::new(ScriptedClassifier::new());
        let controller =
            JobController::new(sheet.clone(), scheduler, classifier.clone(), store, config());

        assert_eq!(controller.start().await.unwrap(), Started::Running);
        assert_eq!(classifier.calls(), vec!["review 0", "review 1"]);
    }

    // Second lifetime: fresh controller over the same store file.
    {
        let store: Arc<dyn PropertyStore> = Arc::new(JsonFileStore::open(&state_path).unwrap());
        let scheduler = Arc::new(RecordingScheduler::new());
        let classifier = Arc::new(ScriptedClassifier::new());
        let controller = JobController::new(
            sheet.clone(),
            scheduler,
            classifier.clone(),
            store.clone(),
            config(),
        );

        let outcome = controller.on_tick().await.unwrap();
        // Only the tail beyond the persisted cursor is attempted.
        assert_eq!(classifier.calls(), vec!["review 2", "review 3"]);
        assert_eq!(outcome.end, 4);
        assert!(!outcome.has_more);

        // Metrics accumulated across both lifetimes.
        assert_eq!(controller.current_metrics().unwrap().total_reviews, 4);
    }
}

#[tokio::test]
async fn restart_mid_window_skips_already_written_rows() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("job_state.json");

    // Simulates a crash after row 0's result was written through but
    // before the cursor advanced: the store has no cursor, the sheet has
    // one result.
    let sheet = Arc::new(InMemorySheet::new(&[
        ("review 0", "x", "positive"),
        ("review 1", "x", ""),
    ]));

    let store: Arc<dyn PropertyStore> = Arc::new(JsonFileStore::open(&state_path).unwrap());
    let scheduler = Arc::new(RecordingScheduler::new());
    let classifier = Arc::new(ScriptedClassifier::new());
    let controller = JobController::new(sheet.clone(), scheduler, classifier.clone(), store, config());

    controller.on_tick().await.unwrap();
    assert_eq!(classifier.calls(), vec!["review 1"]);
    assert_eq!(sheet.result(0).as_deref(), Some("positive"));
    assert_eq!(sheet.result(1).as_deref(), Some("positive"));
}

#[tokio::test]
async fn reset_wipes_the_store_file_state() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("job_state.json");

    let sheet = Arc::new(InMemorySheet::new(&[("review 0", "x", "")]));
    let store: Arc<dyn PropertyStore> = Arc::new(JsonFileStore::open(&state_path).unwrap());
    let scheduler = Arc::new(RecordingScheduler::new());
    let classifier = Arc::new(ScriptedClassifier::new());
    let controller =
        JobController::new(sheet, scheduler, classifier, store.clone(), config());

    controller.start().await.unwrap();
    assert_eq!(controller.current_metrics().unwrap().total_reviews, 1);

    controller.reset_metrics().unwrap();

    // A store reopened from disk also sees the wipe.
    let reopened = JsonFileStore::open(&state_path).unwrap();
    assert_eq!(reopened.get("total_reviews").unwrap(), None);
    assert_eq!(reopened.get("last_processed_index").unwrap(), None);
}
