//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs are the versioned schema of everything written to the local
//! store. They are private to the infrastructure layer and absorb changes to
//! the storage format over time.
//!
//! ### DraftSession Version History
//! - **1.0.0**: Browser layout (`createdAt`, `action_text`, `textId`, untyped `data`)
//! - **1.1.0**: camelCase throughout, typed timestamps and tagged data bag

mod draft_session;

pub use draft_session::{
    DraftSessionDTO, DraftSessionV1_0_0, DraftSessionV1_1_0, create_draft_session_migrator,
};
