//! Storage layer
//!
//! Four independent key-value namespaces (`users`, `shortcodes`,
//! `shortcode_creations`, `shortcode_invocations`) behind one generic
//! async trait. Backends are selected by name through [`StorageFactory`];
//! every backend provides atomic per-key get/set and a full-scan filter.
//! Nothing here spans namespaces: the record write and its audit write are
//! two independent `set` calls.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageConfig;
use crate::errors::{Result, ShortgateError};

pub mod file;
pub mod memory;
pub mod models;
pub mod sqlite;

pub use models::{
    format_record, is_allowed_status, CreationRecord, FormattedRecord, InvocationRecord,
    RequestContext, ShortcodeRecord, User, ALLOWED_REDIRECT_STATUSES,
};

/// Full-scan predicate passed to [`Collection::filter`].
pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send>;

/// One key-value namespace.
///
/// `get` distinguishes an absent key (`Ok(None)`) from a failed lookup
/// (`Err`), so callers can route the two differently.
#[async_trait]
pub trait Collection<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<T>>;
    async fn set(&self, key: &str, value: T) -> Result<()>;
    async fn filter(&self, predicate: Predicate<T>) -> Result<Vec<T>>;
}

/// Namespace names, shared by all backends.
pub mod namespaces {
    pub const USERS: &str = "users";
    pub const SHORTCODES: &str = "shortcodes";
    pub const SHORTCODE_CREATIONS: &str = "shortcode_creations";
    pub const SHORTCODE_INVOCATIONS: &str = "shortcode_invocations";
}

/// The four namespaces the service works with.
#[derive(Clone)]
pub struct Collections {
    pub users: Arc<dyn Collection<User>>,
    pub shortcodes: Arc<dyn Collection<ShortcodeRecord>>,
    pub creations: Arc<dyn Collection<CreationRecord>>,
    pub invocations: Arc<dyn Collection<InvocationRecord>>,
}

pub struct StorageFactory;

impl StorageFactory {
    pub fn create(config: &StorageConfig) -> Result<Collections> {
        match config.backend.as_str() {
            "memory" => Ok(Self::memory()),
            "file" => file::open_collections(&config.path),
            "sqlite" => sqlite::open_collections(&config.path),
            other => Err(ShortgateError::config(format!(
                "Unknown storage backend: {}",
                other
            ))),
        }
    }

    /// Fresh in-memory collections; also what tests build their apps on.
    pub fn memory() -> Collections {
        Collections {
            users: Arc::new(memory::MemoryCollection::new()),
            shortcodes: Arc::new(memory::MemoryCollection::new()),
            creations: Arc::new(memory::MemoryCollection::new()),
            invocations: Arc::new(memory::MemoryCollection::new()),
        }
    }
}
