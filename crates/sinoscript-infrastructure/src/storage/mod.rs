//! Local key-value storage.

pub mod file_backend;
pub mod local_store;
pub mod memory_backend;

pub use file_backend::FileKeyValueBackend;
pub use local_store::LocalStore;
pub use memory_backend::MemoryKeyValueBackend;
