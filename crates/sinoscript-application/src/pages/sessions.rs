//! Session list page.

use chrono::{DateTime, Utc};
use sinoscript_core::navigation::Route;
use sinoscript_core::session::SessionPatch;

use crate::flow::validation::{ValidationReport, validate_session_name};
use crate::flow::{FlowContext, FlowError, Step, go_to};
use crate::pages::load_session;
use crate::session_store::DraftSessionStore;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Furthest step the session can be resumed at.
    pub progress: Step,
    pub field_count: usize,
}

/// All sessions, most recently updated first.
pub fn list(store: &mut DraftSessionStore) -> Vec<SessionSummary> {
    let mut summaries: Vec<SessionSummary> = store
        .sessions()
        .iter()
        .map(|s| SessionSummary {
            id: s.id.clone(),
            name: s.name.clone(),
            created_at: s.created_at,
            updated_at: s.updated_at,
            progress: Step::furthest(s),
            field_count: s.data.len(),
        })
        .collect();
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    summaries
}

/// Creates a session and opens its first step.
pub fn start_new(ctx: &mut FlowContext<'_>) -> Result<String, FlowError> {
    let id = ctx.store.create_session(None);
    let session = load_session(ctx, &id)?;
    go_to(ctx, &session, Route::SelectText);
    Ok(id)
}

/// Opens an existing session at its first step.
pub fn resume(ctx: &mut FlowContext<'_>, session_id: &str) -> Result<(), FlowError> {
    let session = load_session(ctx, session_id)?;
    go_to(ctx, &session, Route::SelectText);
    Ok(())
}

pub fn rename(ctx: &mut FlowContext<'_>, session_id: &str, name: &str) -> Result<(), FlowError> {
    let mut report = ValidationReport::new();
    validate_session_name(name, &mut report);
    if !report.is_valid() {
        return Err(FlowError::ValidationBlocked(report));
    }

    if !ctx
        .store
        .update_session(session_id, SessionPatch::default().name(name.trim()))
    {
        return Err(FlowError::SessionMissing(session_id.to_string()));
    }
    Ok(())
}

/// Deletes a session after confirmation. Returns whether it was deleted.
pub fn delete(ctx: &mut FlowContext<'_>, session_id: &str) -> Result<bool, FlowError> {
    let session = load_session(ctx, session_id)?;
    if !ctx
        .prompt
        .confirm(&format!("Delete '{}'? This cannot be undone.", session.name))
    {
        return Ok(false);
    }
    Ok(ctx.store.delete_session(session_id))
}
