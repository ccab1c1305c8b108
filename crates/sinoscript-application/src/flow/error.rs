use sinoscript_core::navigation::Route;
use thiserror::Error;

use crate::flow::validation::ValidationReport;

/// Conditions a page surfaces to the user instead of acting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("No draft session with id '{0}'")]
    SessionMissing(String),

    #[error("No draft session is active on this page")]
    NoSession,

    #[error("Cannot continue: {} field(s) need attention", .0.errors.len())]
    ValidationBlocked(ValidationReport),

    #[error("Action unavailable: {0}")]
    ActionUnavailable(String),

    #[error("'{}' has no next step", .0.path())]
    NoNextStep(Route),

    #[error("Unknown field '{0}'")]
    UnknownField(String),
}

impl FlowError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        FlowError::ActionUnavailable(reason.into())
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            FlowError::ValidationBlocked(report) => Some(report),
            _ => None,
        }
    }
}
