pub mod auth;
pub mod clock;
pub mod error;
pub mod navigation;
pub mod prompt;
pub mod reference;
pub mod session;
pub mod storage;

// Re-export common error type
pub use error::{PortalError, Result};
