//! Draft session store behaviour against real storage backends.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sinoscript_application::DraftSessionStore;
use sinoscript_core::clock::{ManualClock, SystemClock};
use sinoscript_core::session::{DataBag, FieldValue, SessionPatch, WorkflowAction};
use sinoscript_core::storage::KeyValueBackend;
use sinoscript_infrastructure::{
    FileKeyValueBackend, LocalDraftSessionRepository, LocalStore, MemoryKeyValueBackend,
};
use tempfile::TempDir;

fn store_over(backend: Arc<dyn KeyValueBackend>) -> DraftSessionStore {
    let repository = LocalDraftSessionRepository::new(LocalStore::new(backend));
    DraftSessionStore::new(Arc::new(repository), Arc::new(SystemClock))
}

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-03-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn test_region_and_name_patches_build_exact_data_bag() {
    let mut store = store_over(Arc::new(MemoryKeyValueBackend::new()));

    let id = store.create_session(None);
    store.update_session_data(&id, DataBag::new().with("region", "China"));
    store.update_session_data(&id, DataBag::new().with("text_name_english", "Dao De Jing"));

    let session = store.get_session(&id).unwrap();
    assert_eq!(
        session.data,
        DataBag::new()
            .with("region", "China")
            .with("text_name_english", "Dao De Jing")
    );
    assert!(session.updated_at > session.created_at);
}

#[test]
fn test_reopened_store_matches_memory() {
    let temp_dir = TempDir::new().unwrap();
    let backend: Arc<dyn KeyValueBackend> = Arc::new(FileKeyValueBackend::new(temp_dir.path()));

    let mut store = store_over(backend.clone());
    let a = store.create_session(Some(DataBag::new().with("num_sections", 81.0)));
    let b = store.create_session(None);
    store.update_session(
        &a,
        SessionPatch::default()
            .region("China")
            .text_action(WorkflowAction::Create)
            .name("Dao De Jing"),
    );
    store.update_session_data(
        &b,
        DataBag::new()
            .with("creation_date", chrono::NaiveDate::from_ymd_opt(1644, 1, 1).unwrap())
            .with("reviewed", true),
    );
    let in_memory = store.sessions().to_vec();

    let mut reopened = store_over(backend);
    assert_eq!(reopened.sessions(), in_memory.as_slice());
}

#[test]
fn test_repeated_data_update_changes_only_timestamp() {
    let clock = Arc::new(ManualClock::new(start()));
    let repository =
        LocalDraftSessionRepository::new(LocalStore::new(Arc::new(MemoryKeyValueBackend::new())));
    let mut store = DraftSessionStore::new(Arc::new(repository), clock.clone());

    let id = store.create_session(None);
    let patch = DataBag::new().with("writing_system", "Hanzi");

    store.update_session_data(&id, patch.clone());
    let once = store.get_session(&id).unwrap();
    clock.advance(Duration::minutes(5));
    store.update_session_data(&id, patch);
    let twice = store.get_session(&id).unwrap();

    assert_eq!(once.data, twice.data);
    assert_eq!(once.name, twice.name);
    assert!(twice.updated_at > once.updated_at);
}

#[test]
fn test_delete_leaves_other_sessions_identical() {
    let mut store = store_over(Arc::new(MemoryKeyValueBackend::new()));
    let keep_a = store.create_session(Some(DataBag::new().with("a", "1")));
    let doomed = store.create_session(Some(DataBag::new().with("b", "2")));
    let keep_c = store.create_session(None);
    store.update_session(&keep_c, SessionPatch::default().region("Japan"));

    let before_a = store.get_session(&keep_a).unwrap();
    let before_c = store.get_session(&keep_c).unwrap();

    assert!(store.delete_session(&doomed));

    assert_eq!(store.sessions().len(), 2);
    assert_eq!(store.get_session(&keep_a).unwrap(), before_a);
    assert_eq!(store.get_session(&keep_c).unwrap(), before_c);
    assert!(store.get_session(&doomed).is_none());
}

#[test]
fn test_clear_empties_data_and_workflow() {
    let mut store = store_over(Arc::new(MemoryKeyValueBackend::new()));
    let id = store.create_session(Some(DataBag::new().with("author_name_english", "Laozi")));
    store.update_session(
        &id,
        SessionPatch::default()
            .region("China")
            .author_id("a1")
            .author_action(WorkflowAction::Edit),
    );

    assert!(store.clear_session_data(&id));

    let session = store.get_session(&id).unwrap();
    assert!(session.data.is_empty());
    assert_eq!(session.region, None);
    assert_eq!(session.author_id, None);
    assert_eq!(session.author_action, None);
    assert_eq!(session.text_id, None);
    assert_eq!(session.text_action, None);
}

#[test]
fn test_quota_failure_keeps_memory_state() {
    let backend = Arc::new(MemoryKeyValueBackend::with_quota(64));
    let mut store = store_over(backend.clone());

    let id = store.create_session(None);
    assert!(store.update_session_data(
        &id,
        DataBag::new().with("description_content", "x".repeat(500))
    ));

    let session = store.get_session(&id).unwrap();
    assert_eq!(
        session.data.get("description_content"),
        Some(&FieldValue::Text("x".repeat(500)))
    );
    assert!(backend.raw("form-sessions").is_none());
}

#[test]
fn test_hydration_happens_before_first_write() {
    let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryKeyValueBackend::new());
    let mut first = store_over(backend.clone());
    let existing = first.create_session(None);

    let mut second = store_over(backend);
    let created = second.create_session(None);

    let ids: Vec<_> = second.sessions().iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids, vec![existing, created]);
}
