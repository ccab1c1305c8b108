//! Application layer for the SinoScript portal.
//!
//! Owns the draft session store and implements the multi-step form flow on
//! top of the core contracts.

pub mod flow;
pub mod pages;
pub mod portal;
pub mod session_store;

#[cfg(test)]
mod test_support;

pub use flow::{FlowContext, FlowError};
pub use portal::Portal;
pub use session_store::DraftSessionStore;
