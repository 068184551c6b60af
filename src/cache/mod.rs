//! Cache-aside storage for rendered badges
//! - memory.rs: in-process map with per-entry expiry
//! - sqlite.rs: SQLite table with an expiry column
//! - NullStore: never stores anything

pub mod memory;
pub mod sqlite;

use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::info;

use crate::config::{CacheBackend, CacheConfig};
use crate::error::CacheError;
use crate::request::RequestParams;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key/value store with per-entry TTL, shared by every resource type
#[cfg_attr(test, automock)]
pub trait CacheStore: Send + Sync {
    fn has(&self, key: &str) -> Result<bool, CacheError>;

    /// The live value for `key`; expired entries read as absent
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Writes or wholesale replaces the entry for `key`
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Store used when caching is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl CacheStore for NullStore {
    fn has(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Cache key of a request: `name:path;k1=v1;k2=v2` with query pairs sorted
///
/// Insertion order of query pairs never changes the key. Repeated keys
/// contribute only the value the request is parsed with.
pub fn fingerprint(resource_name: &str, raw: &RequestParams) -> String {
    let mut pairs: Vec<String> = raw
        .query_map()
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    pairs.sort();

    format!("{}:{};{}", resource_name, raw.path(), pairs.join(";"))
}

/// Builds the configured store
pub fn from_config(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    info!("Using {:?} cache backend", config.backend);
    let store: Arc<dyn CacheStore> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryStore::new()),
        CacheBackend::Sqlite => Arc::new(SqliteStore::open(&config.path)?),
        CacheBackend::Disabled => Arc::new(NullStore),
    };
    Ok(store)
}
