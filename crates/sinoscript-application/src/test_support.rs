//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use sinoscript_core::clock::SystemClock;
use sinoscript_core::navigation::{Location, NavigationMode, Navigator};
use sinoscript_core::prompt::ConfirmationPrompt;
use sinoscript_infrastructure::{
    LocalDraftSessionRepository, LocalStore, MemoryKeyValueBackend, StoredNavigator,
};

use crate::session_store::DraftSessionStore;

pub fn memory_store() -> LocalStore {
    LocalStore::new(Arc::new(MemoryKeyValueBackend::new()))
}

pub fn session_store() -> DraftSessionStore {
    DraftSessionStore::new(
        Arc::new(LocalDraftSessionRepository::new(memory_store())),
        Arc::new(SystemClock),
    )
}

pub fn navigator_at(location: Location) -> StoredNavigator {
    let navigator = StoredNavigator::new(memory_store());
    navigator.navigate(location, NavigationMode::Replace);
    navigator
}

/// Prompt that records each question and answers with `answer`.
pub struct RecordingPrompt {
    answer: bool,
    pub asked: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.lock().unwrap().len()
    }
}

impl ConfirmationPrompt for RecordingPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.answer
    }
}
