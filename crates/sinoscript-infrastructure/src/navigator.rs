//! Navigator that remembers the current location across runs.

use std::sync::Mutex;

use crate::storage::LocalStore;
use sinoscript_core::navigation::{Location, NavigationMode, Navigator, Route};

pub const LOCATION_KEY: &str = "current-location";

/// Keeps the current [`Location`] and its history in the local store.
///
/// A command-line session has no browser history of its own, so each
/// invocation resumes where the previous one left off.
pub struct StoredNavigator {
    store: LocalStore,
    history: Mutex<Vec<Location>>,
}

impl StoredNavigator {
    pub fn new(store: LocalStore) -> Self {
        let history = store
            .get::<Vec<Location>>(LOCATION_KEY)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| vec![Location::bare(Route::Home)]);
        Self {
            store,
            history: Mutex::new(history),
        }
    }

    pub fn history(&self) -> Vec<Location> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Pops the current entry. Returns false at the start of history.
    pub fn go_back(&self) -> bool {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.len() <= 1 {
            return false;
        }
        history.pop();
        self.store.set(LOCATION_KEY, &*history);
        true
    }
}

impl Navigator for StoredNavigator {
    fn navigate(&self, location: Location, mode: NavigationMode) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        tracing::debug!("[Navigator] {:?} {}", mode, location.href());
        match mode {
            NavigationMode::Push => history.push(location),
            NavigationMode::Replace => match history.last_mut() {
                Some(last) => *last = location,
                None => history.push(location),
            },
        }
        self.store.set(LOCATION_KEY, &*history);
    }

    fn current(&self) -> Location {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history
            .last()
            .cloned()
            .unwrap_or_else(|| Location::bare(Route::Home))
    }
}
