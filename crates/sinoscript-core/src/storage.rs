//! Raw key-value storage contract.

use crate::error::Result;

/// A string-keyed, string-valued local store.
///
/// This is the raw seam under the JSON adapter; errors surface here and are
/// swallowed one layer up.
pub trait KeyValueBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}
