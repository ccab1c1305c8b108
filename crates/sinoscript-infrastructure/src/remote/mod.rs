//! Remote catalogue and authentication clients.

pub mod hosted_auth;
pub mod offline;
pub mod postgrest;

pub use hosted_auth::HostedAuthenticator;
pub use offline::{OfflineAuthenticator, StaticReferenceSource};
pub use postgrest::PostgrestReferenceSource;

/// Local store key holding the signed-in [`sinoscript_core::auth::AuthSession`].
pub const AUTH_SESSION_KEY: &str = "auth-session";
