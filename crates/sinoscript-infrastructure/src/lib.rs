pub mod config_service;
pub mod draft_session_repository;
pub mod dto;
pub mod navigator;
pub mod paths;
pub mod remote;
pub mod storage;

pub use config_service::{ConfigService, PortalConfig};
pub use draft_session_repository::LocalDraftSessionRepository;
pub use navigator::StoredNavigator;
pub use paths::SinoScriptPaths;
pub use storage::{FileKeyValueBackend, LocalStore, MemoryKeyValueBackend};
