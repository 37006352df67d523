//! Key-value storage scopes backing the credential lookup.
//!
//! Two scopes exist side by side:
//! - persistent: survives process restarts (`FileStore` or `KeyringStore`)
//! - session: cleared when the user session ends (`FileStore` under the
//!   runtime directory, or `MemoryStore`)
//!
//! Both are handed to the API client through a `StorageContext` so nothing
//! reads ambient global state.

pub mod error;
pub mod file;
pub mod keychain;
pub mod memory;

use std::sync::Arc;

pub use error::StorageError;
pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

/// Key holding the "remember me" flag in the persistent scope.
pub const REMEMBER_ME_KEY: &str = "remember_me";

/// Key holding the auth token in whichever scope is authoritative.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// A string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// The pair of storage scopes the client reads credentials from.
/// Clone is cheap - both scopes are shared behind `Arc`.
#[derive(Clone)]
pub struct StorageContext {
    pub persistent: Arc<dyn KeyValueStore>,
    pub session: Arc<dyn KeyValueStore>,
}

impl StorageContext {
    pub fn new(persistent: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self {
            persistent,
            session,
        }
    }

    /// Two fresh in-memory scopes. Nothing survives the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }
}

impl std::fmt::Debug for StorageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageContext").finish_non_exhaustive()
    }
}
