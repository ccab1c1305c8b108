//! Draft session domain.

pub mod model;
pub mod repository;

pub use model::{
    DataBag, DraftSession, FieldPatch, FieldValue, SessionPatch, WorkflowAction, WorkflowField,
};
pub use repository::DraftSessionRepository;
