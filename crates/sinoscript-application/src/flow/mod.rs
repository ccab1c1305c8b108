//! Form navigation controller.
//!
//! Walks the ordered steps, keeps dependent selections consistent and gates
//! forward navigation on validation.

pub mod error;
pub mod fetch;
pub mod fields;
pub mod invalidation;
pub mod reconcile;
pub mod steps;
pub mod validation;

pub use error::FlowError;
pub use fetch::{DependentResource, FetchStatus, FetchTicket};
pub use fields::{AUTHOR_FIELDS, FieldKind, FieldSpec, TEXT_FIELDS};
pub use invalidation::{ChangeOutcome, Discard, change_workflow, pending_discard};
pub use reconcile::{canonical_params, enter_page, go_to};
pub use steps::{ChainLink, STEPS, Step, StepDescriptor};
pub use validation::{FieldError, ValidationReport};

use sinoscript_core::navigation::Navigator;
use sinoscript_core::prompt::ConfirmationPrompt;

use crate::session_store::DraftSessionStore;

/// Services a page operation runs against.
pub struct FlowContext<'a> {
    pub store: &'a mut DraftSessionStore,
    pub navigator: &'a dyn Navigator,
    pub prompt: &'a dyn ConfirmationPrompt,
}

impl<'a> FlowContext<'a> {
    pub fn new(
        store: &'a mut DraftSessionStore,
        navigator: &'a dyn Navigator,
        prompt: &'a dyn ConfirmationPrompt,
    ) -> Self {
        Self {
            store,
            navigator,
            prompt,
        }
    }
}
