//! Reconciles persisted session fields with route parameters on page entry.

use sinoscript_core::navigation::{Location, NavigationMode, Route, RouteParams};
use sinoscript_core::session::{DraftSession, SessionPatch, WorkflowAction, WorkflowField};

use crate::flow::FlowContext;
use crate::flow::error::FlowError;

/// Loads the session for the current location.
///
/// Persisted values win. A route parameter only fills a workflow field the
/// session lacks, and is written back to the session.
pub fn enter_page(ctx: &mut FlowContext<'_>) -> Result<DraftSession, FlowError> {
    let location = ctx.navigator.current();
    let session_id = location.params.session_id.clone().ok_or(FlowError::NoSession)?;
    let session = ctx
        .store
        .get_session(&session_id)
        .ok_or_else(|| FlowError::SessionMissing(session_id.clone()))?;

    let mut patch = SessionPatch::default();
    let mut adopted = 0;
    for field in WorkflowField::ALL {
        if session.workflow_value(field).is_some() {
            continue;
        }
        if let Some(value) = location.params.workflow(field) {
            patch = patch.and(SessionPatch::workflow(field, Some(value.to_string())));
            adopted += 1;
        }
    }

    if adopted == 0 {
        return Ok(session);
    }

    tracing::debug!(
        "[FlowController] Adopted {} route parameter(s) into session {}",
        adopted,
        session_id
    );
    ctx.store.update_session(&session_id, patch);
    ctx.store
        .get_session(&session_id)
        .ok_or(FlowError::SessionMissing(session_id))
}

/// Route parameters mirroring `session`.
///
/// An id is only carried for an `edit` action; creating a new record has no
/// id to show.
pub fn canonical_params(session: &DraftSession) -> RouteParams {
    let mut params = RouteParams::from_session(session);
    if session.text_action == Some(WorkflowAction::Create) {
        params.text_id = None;
    }
    if session.author_action == Some(WorkflowAction::Create) {
        params.author_id = None;
    }
    params
}

/// Moves to another route carrying the session's canonical parameters.
pub fn go_to(ctx: &FlowContext<'_>, session: &DraftSession, route: Route) {
    ctx.navigator
        .navigate(Location::new(route, canonical_params(session)), NavigationMode::Push);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{navigator_at, session_store};
    use sinoscript_core::navigation::Navigator;
    use sinoscript_core::prompt::AlwaysConfirm;

    #[test]
    fn test_session_value_wins_over_route() {
        let mut store = session_store();
        let id = store.create_session(None);
        store.update_session(&id, SessionPatch::default().text_action(WorkflowAction::Create));

        let mut params = RouteParams::for_session(id.clone());
        params.text_action = Some("edit".into());
        params.author_id = Some("a3".into());
        let navigator = navigator_at(Location::new(Route::TextInfo, params));

        let mut ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);
        let session = enter_page(&mut ctx).unwrap();

        assert_eq!(session.text_action, Some(WorkflowAction::Create));
        assert_eq!(session.author_id.as_deref(), Some("a3"));
        assert_eq!(store.get_session(&id).unwrap().author_id.as_deref(), Some("a3"));
    }

    #[test]
    fn test_missing_session_id() {
        let mut store = session_store();
        let navigator = navigator_at(Location::bare(Route::TextInfo));
        let mut ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);
        assert_eq!(enter_page(&mut ctx).unwrap_err(), FlowError::NoSession);
    }

    #[test]
    fn test_canonical_params_drop_id_on_create() {
        let mut session = DraftSession::new(
            "s".into(),
            "Session 1".into(),
            chrono::Utc::now(),
            Default::default(),
        );
        session.text_id = Some("t1".into());
        session.text_action = Some(WorkflowAction::Create);
        session.author_id = Some("a1".into());

        let params = canonical_params(&session);
        assert_eq!(params.text_id, None);
        assert_eq!(params.text_action.as_deref(), Some("create"));
        assert_eq!(params.author_id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_go_to_pushes() {
        let mut store = session_store();
        let id = store.create_session(None);
        let session = store.get_session(&id).unwrap();
        let navigator = navigator_at(Location::bare(Route::Sessions));
        let ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);

        go_to(&ctx, &session, Route::SelectText);

        assert_eq!(navigator.history().len(), 2);
        let current = navigator.current();
        assert_eq!(current.route, Route::SelectText);
        assert_eq!(current.params.session_id, Some(id));
    }
}
