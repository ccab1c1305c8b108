//! Draft session repository trait.

use crate::session::model::DraftSession;

/// Persistence for the whole list of draft sessions.
///
/// The list is always read and written as a unit. Implementations swallow
/// storage failures: a failed read looks like an empty store and a failed
/// write is logged and dropped.
pub trait DraftSessionRepository: Send + Sync {
    /// Reads the persisted list. `None` when nothing has been stored yet
    /// or the stored list could not be decoded.
    fn load_all(&self) -> Option<Vec<DraftSession>>;

    /// Replaces the persisted list.
    fn save_all(&self, sessions: &[DraftSession]);
}
