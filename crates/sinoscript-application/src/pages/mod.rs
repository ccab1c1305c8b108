//! Page operations.
//!
//! Pages hold only uncommitted local state. Every committed change goes
//! through the [`DraftSessionStore`](crate::session_store::DraftSessionStore)
//! in the [`FlowContext`] passed to each call.

pub mod auth;
pub mod detail;
pub mod select_author;
pub mod select_text;
pub mod sessions;

pub use auth::{LoginPage, RouteGuard};
pub use detail::{DetailKind, DetailPage};
pub use select_author::SelectAuthorPage;
pub use select_text::SelectTextPage;
pub use sessions::SessionSummary;

use sinoscript_core::navigation::Route;
use sinoscript_core::session::DraftSession;

use crate::flow::validation::ValidationReport;
use crate::flow::{FlowContext, FlowError, Step, go_to};

/// Current state of the page's session.
pub(crate) fn load_session(
    ctx: &mut FlowContext<'_>,
    session_id: &str,
) -> Result<DraftSession, FlowError> {
    ctx.store
        .get_session(session_id)
        .ok_or_else(|| FlowError::SessionMissing(session_id.to_string()))
}

/// Errors for upstream selections a step depends on.
pub(crate) fn upstream_report(step: Step, session: &DraftSession) -> ValidationReport {
    let mut report = ValidationReport::new();
    for field in step.missing_upstream(session) {
        report.push(field.to_string(), "Complete the previous step first");
    }
    report
}

/// Moves to the step after `step` when `report` is clean.
pub(crate) fn advance(
    ctx: &FlowContext<'_>,
    step: Step,
    session: &DraftSession,
    report: ValidationReport,
) -> Result<Route, FlowError> {
    if !report.is_valid() {
        tracing::debug!(
            "[FlowController] {:?} blocked by {} error(s)",
            step,
            report.errors.len()
        );
        return Err(FlowError::ValidationBlocked(report));
    }
    let descriptor = step.descriptor();
    let next = descriptor.next.ok_or(FlowError::NoNextStep(descriptor.route))?;
    go_to(ctx, session, next);
    Ok(next)
}

/// Moves to the step before `step`. Never gated.
pub(crate) fn retreat(ctx: &FlowContext<'_>, step: Step, session: &DraftSession) -> Route {
    let back = step.descriptor().back.unwrap_or(Route::Sessions);
    go_to(ctx, session, back);
    back
}
