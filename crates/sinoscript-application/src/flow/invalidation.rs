//! Dependent-state invalidation.
//!
//! Changing a selection clears every selection and field group that depends
//! on it, after the user confirms the loss.

use sinoscript_core::navigation::{Location, NavigationMode};
use sinoscript_core::session::{DraftSession, SessionPatch, WorkflowAction, WorkflowField};

use crate::flow::FlowContext;
use crate::flow::error::FlowError;
use crate::flow::steps::ChainLink;

/// What a change would throw away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discard {
    pub fields: Vec<WorkflowField>,
    pub keys: Vec<String>,
}

impl Discard {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.keys.is_empty()
    }

    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self.fields.iter().map(|f| f.to_string()).collect();
        if !self.keys.is_empty() {
            parts.push(format!("{} entered field(s)", self.keys.len()));
        }
        format!(
            "Changing this selection will clear: {}. Continue?",
            parts.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    Unchanged,
    Applied { discarded: Discard },
    Declined,
}

/// Action values that don't parse are treated as unset.
fn normalize(field: WorkflowField, value: Option<String>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    match field {
        WorkflowField::TextAction | WorkflowField::AuthorAction => value
            .parse::<WorkflowAction>()
            .ok()
            .map(|a| a.to_string()),
        _ => Some(value),
    }
}

/// Everything downstream of `field` that is currently set in `session`.
pub fn pending_discard(session: &DraftSession, field: WorkflowField) -> Discard {
    let link = ChainLink::for_workflow(field);
    Discard {
        fields: link
            .downstream()
            .filter_map(|l| l.workflow_field())
            .filter(|f| session.workflow_value(*f).is_some())
            .collect(),
        keys: session
            .data
            .keys()
            .filter(|k| !link.upstream_owns_key(k))
            .map(str::to_string)
            .collect(),
    }
}

/// Sets `field` to `value`, discarding dependent state.
///
/// A declined confirmation leaves the session and the route untouched.
pub fn change_workflow(
    ctx: &mut FlowContext<'_>,
    session_id: &str,
    field: WorkflowField,
    value: Option<String>,
) -> Result<ChangeOutcome, FlowError> {
    let session = ctx
        .store
        .get_session(session_id)
        .ok_or_else(|| FlowError::SessionMissing(session_id.to_string()))?;

    let value = normalize(field, value);
    if session.workflow_value(field) == value {
        return Ok(ChangeOutcome::Unchanged);
    }

    let discard = pending_discard(&session, field);
    if !discard.is_empty() && !ctx.prompt.confirm(&discard.describe()) {
        tracing::info!(
            "[FlowController] Change of {} declined for session {}",
            field,
            session_id
        );
        return Ok(ChangeOutcome::Declined);
    }

    let link = ChainLink::for_workflow(field);
    let restore = link
        .upstream()
        .filter_map(|l| l.workflow_field())
        .fold(SessionPatch::default(), |patch, f| {
            patch.and(SessionPatch::workflow(f, session.workflow_value(f)))
        })
        .and(SessionPatch::workflow(field, value.clone()));
    let upstream_data = session.data.subset(|k| link.upstream_owns_key(k));

    ctx.store.clear_session_data(session_id);
    ctx.store.update_session(session_id, restore);
    if !upstream_data.is_empty() {
        ctx.store.update_session_data(session_id, upstream_data);
    }

    let current = ctx.navigator.current();
    let mut params = current.params;
    params.session_id = Some(session_id.to_string());
    for downstream in link.downstream().filter_map(|l| l.workflow_field()) {
        params.set_workflow(downstream, None);
    }
    params.set_workflow(field, value);
    ctx.navigator
        .navigate(Location::new(current.route, params), NavigationMode::Replace);

    if !discard.is_empty() {
        tracing::info!(
            "[FlowController] {} changed for session {}; cleared {} field(s) and {} value(s)",
            field,
            session_id,
            discard.fields.len(),
            discard.keys.len()
        );
    }
    Ok(ChangeOutcome::Applied { discarded: discard })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::fields::{AUTHOR_NAME_ENGLISH, TEXT_NAME_ENGLISH};
    use crate::session_store::DraftSessionStore;
    use crate::test_support::{RecordingPrompt, navigator_at, session_store};
    use sinoscript_core::navigation::{Navigator, Route, RouteParams};
    use sinoscript_core::prompt::{AlwaysConfirm, NeverConfirm};
    use sinoscript_core::session::DataBag;

    fn filled_session(store: &mut DraftSessionStore) -> String {
        let id = store.create_session(None);
        store.update_session(
            &id,
            SessionPatch::default()
                .region("China")
                .text_id("t1")
                .text_action(WorkflowAction::Edit)
                .author_action(WorkflowAction::Create),
        );
        store.update_session_data(
            &id,
            DataBag::new()
                .with(TEXT_NAME_ENGLISH, "Shijing")
                .with(AUTHOR_NAME_ENGLISH, "Anonymous"),
        );
        id
    }

    #[test]
    fn test_unchanged_value_is_a_no_op() {
        let mut store = session_store();
        let id = filled_session(&mut store);
        let before = store.get_session(&id).unwrap();
        let navigator = navigator_at(Location::bare(Route::SelectText));
        let prompt = RecordingPrompt::answering(true);

        let mut ctx = FlowContext::new(&mut store, &navigator, &prompt);
        let outcome =
            change_workflow(&mut ctx, &id, WorkflowField::Region, Some("China".into())).unwrap();

        assert_eq!(outcome, ChangeOutcome::Unchanged);
        assert_eq!(store.get_session(&id).unwrap(), before);
        assert_eq!(prompt.times_asked(), 0);
        assert_eq!(navigator.current(), Location::bare(Route::SelectText));
    }

    #[test]
    fn test_declined_change_mutates_nothing() {
        let mut store = session_store();
        let id = filled_session(&mut store);
        let before = store.get_session(&id).unwrap();
        let params = RouteParams::from_session(&before);
        let navigator = navigator_at(Location::new(Route::SelectText, params.clone()));

        let mut ctx = FlowContext::new(&mut store, &navigator, &NeverConfirm);
        let outcome =
            change_workflow(&mut ctx, &id, WorkflowField::Region, Some("Japan".into())).unwrap();

        assert_eq!(outcome, ChangeOutcome::Declined);
        assert_eq!(store.get_session(&id).unwrap(), before);
        assert_eq!(navigator.current().params, params);
    }

    #[test]
    fn test_author_change_keeps_text_details() {
        let mut store = session_store();
        let id = filled_session(&mut store);
        let navigator = navigator_at(Location::new(
            Route::SelectAuthor,
            RouteParams::for_session(id.clone()),
        ));

        let mut ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);
        let outcome =
            change_workflow(&mut ctx, &id, WorkflowField::AuthorId, Some("a9".into())).unwrap();

        let ChangeOutcome::Applied { discarded } = outcome else {
            panic!("expected change to apply");
        };
        assert_eq!(discarded.fields, vec![WorkflowField::AuthorAction]);
        assert_eq!(discarded.keys, vec![AUTHOR_NAME_ENGLISH.to_string()]);

        let session = store.get_session(&id).unwrap();
        assert_eq!(session.region.as_deref(), Some("China"));
        assert_eq!(session.text_id.as_deref(), Some("t1"));
        assert_eq!(session.text_action, Some(WorkflowAction::Edit));
        assert_eq!(session.author_id.as_deref(), Some("a9"));
        assert_eq!(session.author_action, None);
        assert!(session.data.contains_key(TEXT_NAME_ENGLISH));
        assert!(!session.data.contains_key(AUTHOR_NAME_ENGLISH));

        let params = navigator.current().params;
        assert_eq!(params.author_id.as_deref(), Some("a9"));
        assert_eq!(params.author_action, None);
    }

    #[test]
    fn test_first_choice_needs_no_confirmation() {
        let mut store = session_store();
        let id = store.create_session(None);
        let navigator = navigator_at(Location::bare(Route::SelectText));
        let prompt = RecordingPrompt::answering(false);

        let mut ctx = FlowContext::new(&mut store, &navigator, &prompt);
        change_workflow(&mut ctx, &id, WorkflowField::Region, Some("Korea".into())).unwrap();
        change_workflow(&mut ctx, &id, WorkflowField::TextAction, Some("create".into())).unwrap();

        assert_eq!(prompt.times_asked(), 0);
        let session = store.get_session(&id).unwrap();
        assert_eq!(session.region.as_deref(), Some("Korea"));
        assert_eq!(session.text_action, Some(WorkflowAction::Create));
        assert_eq!(navigator.current().params.text_action.as_deref(), Some("create"));
        assert_eq!(navigator.history().len(), 1);
    }

    #[test]
    fn test_invalid_action_is_treated_as_unset() {
        let mut store = session_store();
        let id = store.create_session(None);
        let navigator = navigator_at(Location::bare(Route::SelectText));

        let mut ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);
        let outcome =
            change_workflow(&mut ctx, &id, WorkflowField::TextAction, Some("delete".into()))
                .unwrap();
        assert_eq!(outcome, ChangeOutcome::Unchanged);
    }

    #[test]
    fn test_missing_session() {
        let mut store = session_store();
        let navigator = navigator_at(Location::bare(Route::SelectText));
        let mut ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);

        let err = change_workflow(&mut ctx, "nope", WorkflowField::Region, Some("China".into()))
            .unwrap_err();
        assert_eq!(err, FlowError::SessionMissing("nope".into()));
    }
}
