//! Draft session store.
//!
//! Owns the in-memory list of draft sessions and writes the whole list back
//! through the repository after every mutation.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use sinoscript_core::clock::Clock;
use sinoscript_core::session::{DataBag, DraftSession, DraftSessionRepository, SessionPatch};

/// The single owner of draft session state.
///
/// The persisted list is read once, on the first operation (or an explicit
/// [`DraftSessionStore::hydrate`]). Writes happen only after hydration, so
/// the initial read can never be overwritten by an empty list.
///
/// Operations on an unknown id return `false`/`None` and leave storage
/// untouched.
pub struct DraftSessionStore {
    repository: Arc<dyn DraftSessionRepository>,
    clock: Arc<dyn Clock>,
    /// `None` until hydrated.
    sessions: Option<Vec<DraftSession>>,
}

impl DraftSessionStore {
    pub fn new(repository: Arc<dyn DraftSessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            sessions: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.sessions.is_some()
    }

    /// Reads the persisted list if that has not happened yet.
    pub fn hydrate(&mut self) {
        self.list_mut();
    }

    fn list_mut(&mut self) -> &mut Vec<DraftSession> {
        let repository = &self.repository;
        self.sessions.get_or_insert_with(|| {
            let sessions = repository.load_all().unwrap_or_default();
            tracing::debug!("[DraftSessionStore] Hydrated {} session(s)", sessions.len());
            sessions
        })
    }

    /// All sessions in creation order.
    pub fn sessions(&mut self) -> &[DraftSession] {
        self.list_mut()
    }

    pub fn get_session(&mut self, id: &str) -> Option<DraftSession> {
        self.list_mut().iter().find(|s| s.id == id).cloned()
    }

    /// Creates a session named `Session {n}` (n = current count + 1) and
    /// returns its id.
    pub fn create_session(&mut self, initial_data: Option<DataBag>) -> String {
        let now = self.clock.now();
        let sessions = self.list_mut();
        let id = Uuid::new_v4().to_string();
        let name = format!("Session {}", sessions.len() + 1);

        sessions.push(DraftSession::new(
            id.clone(),
            name,
            now,
            initial_data.unwrap_or_default(),
        ));
        tracing::info!("[DraftSessionStore] Created session {}", id);

        self.persist();
        id
    }

    /// Shallow-merges `patch` into the session's data bag.
    pub fn update_session_data(&mut self, id: &str, patch: DataBag) -> bool {
        self.mutate(id, "update_session_data", |session| session.data.merge(patch))
    }

    /// Shallow-merges `patch` into the session's top-level fields.
    pub fn update_session(&mut self, id: &str, patch: SessionPatch) -> bool {
        self.mutate(id, "update_session", |session| session.apply(patch))
    }

    /// Empties the data bag and unsets every workflow field.
    pub fn clear_session_data(&mut self, id: &str) -> bool {
        self.mutate(id, "clear_session_data", |session| {
            session.data.clear();
            session.text_action = None;
            session.author_action = None;
            session.text_id = None;
            session.author_id = None;
            session.region = None;
        })
    }

    pub fn delete_session(&mut self, id: &str) -> bool {
        let sessions = self.list_mut();
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            tracing::debug!("[DraftSessionStore] delete_session: no session {}", id);
            return false;
        }

        tracing::info!("[DraftSessionStore] Deleted session {}", id);
        self.persist();
        true
    }

    fn mutate(&mut self, id: &str, op: &str, f: impl FnOnce(&mut DraftSession)) -> bool {
        let now = self.clock.now();
        let Some(session) = self.list_mut().iter_mut().find(|s| s.id == id) else {
            tracing::debug!("[DraftSessionStore] {}: no session {}", op, id);
            return false;
        };

        f(session);
        session.updated_at = next_timestamp(session.updated_at, now);

        self.persist();
        true
    }

    fn persist(&self) {
        if let Some(sessions) = &self.sessions {
            self.repository.save_all(sessions);
        }
    }
}

/// `now`, or one microsecond past `previous` when the clock has not moved.
fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::microseconds(1);
    if now >= floor { now } else { floor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinoscript_core::clock::ManualClock;
    use sinoscript_core::session::{FieldValue, WorkflowAction};
    use std::sync::Mutex;

    /// Repository that records every write.
    #[derive(Default)]
    struct RecordingRepository {
        initial: Option<Vec<DraftSession>>,
        loads: Mutex<usize>,
        writes: Mutex<Vec<Vec<DraftSession>>>,
    }

    impl DraftSessionRepository for RecordingRepository {
        fn load_all(&self) -> Option<Vec<DraftSession>> {
            *self.loads.lock().unwrap() += 1;
            self.initial.clone()
        }

        fn save_all(&self, sessions: &[DraftSession]) {
            self.writes.lock().unwrap().push(sessions.to_vec());
        }
    }

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn store_with(repo: Arc<RecordingRepository>) -> (DraftSessionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        (DraftSessionStore::new(repo, clock.clone()), clock)
    }

    #[test]
    fn test_hydrates_lazily_and_once() {
        let repo = Arc::new(RecordingRepository::default());
        let (mut store, _) = store_with(repo.clone());

        assert!(!store.is_loaded());
        assert_eq!(*repo.loads.lock().unwrap(), 0);

        assert!(store.sessions().is_empty());
        store.get_session("x");
        store.hydrate();

        assert!(store.is_loaded());
        assert_eq!(*repo.loads.lock().unwrap(), 1);
        assert!(repo.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_create_names_by_count() {
        let repo = Arc::new(RecordingRepository::default());
        let (mut store, _) = store_with(repo.clone());

        let first = store.create_session(None);
        let second = store.create_session(Some(DataBag::new().with("k", "v")));

        assert_ne!(first, second);
        let sessions = store.sessions();
        assert_eq!(sessions[0].name, "Session 1");
        assert_eq!(sessions[1].name, "Session 2");
        assert_eq!(sessions[1].data.get("k"), Some(&FieldValue::Text("v".into())));
        assert_eq!(sessions[0].created_at, sessions[0].updated_at);

        let writes = repo.writes.lock().unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[1].len(), 2);
    }

    #[test]
    fn test_create_continues_numbering_after_existing_sessions() {
        let existing = DraftSession::new("old".into(), "Mine".into(), start(), DataBag::new());
        let repo = Arc::new(RecordingRepository {
            initial: Some(vec![existing]),
            ..Default::default()
        });
        let (mut store, _) = store_with(repo);

        let id = store.create_session(None);
        assert_eq!(store.get_session(&id).unwrap().name, "Session 2");
    }

    #[test]
    fn test_unknown_id_is_a_no_op() {
        let repo = Arc::new(RecordingRepository::default());
        let (mut store, _) = store_with(repo.clone());

        assert!(!store.update_session_data("missing", DataBag::new().with("a", "b")));
        assert!(!store.update_session("missing", SessionPatch::default().name("x")));
        assert!(!store.clear_session_data("missing"));
        assert!(!store.delete_session("missing"));
        assert!(store.get_session("missing").is_none());

        assert!(repo.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_updated_at_strictly_increases_when_clock_stalls() {
        let repo = Arc::new(RecordingRepository::default());
        let (mut store, _clock) = store_with(repo);

        let id = store.create_session(None);
        let created = store.get_session(&id).unwrap().created_at;

        store.update_session_data(&id, DataBag::new().with("a", "1"));
        let first = store.get_session(&id).unwrap().updated_at;
        store.update_session_data(&id, DataBag::new().with("a", "1"));
        let second = store.get_session(&id).unwrap().updated_at;

        assert!(first > created);
        assert!(second > first);
    }

    #[test]
    fn test_updated_at_follows_clock_when_it_advances() {
        let repo = Arc::new(RecordingRepository::default());
        let (mut store, clock) = store_with(repo);

        let id = store.create_session(None);
        clock.advance(Duration::seconds(30));
        store.update_session(&id, SessionPatch::default().region("China"));

        let session = store.get_session(&id).unwrap();
        assert_eq!(session.updated_at, start() + Duration::seconds(30));
    }

    #[test]
    fn test_clear_resets_data_and_workflow() {
        let repo = Arc::new(RecordingRepository::default());
        let (mut store, _) = store_with(repo);

        let id = store.create_session(Some(DataBag::new().with("a", "1")));
        store.update_session(
            &id,
            SessionPatch::default()
                .region("China")
                .text_id("t1")
                .text_action(WorkflowAction::Edit)
                .author_id("a1")
                .author_action(WorkflowAction::Create)
                .name("Kept"),
        );

        assert!(store.clear_session_data(&id));

        let session = store.get_session(&id).unwrap();
        assert!(session.data.is_empty());
        assert!(!session.has_workflow_state());
        assert_eq!(session.name, "Kept");
    }

    #[test]
    fn test_delete_writes_remaining_list() {
        let repo = Arc::new(RecordingRepository::default());
        let (mut store, _) = store_with(repo.clone());

        let a = store.create_session(None);
        let b = store.create_session(None);
        assert!(store.delete_session(&a));

        let writes = repo.writes.lock().unwrap();
        let last = writes.last().unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].id, b);
    }
}
