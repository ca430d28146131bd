//! Secure key-value keychain holding the identity and issued credentials.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::KeychainError;

/// Device keychain. Values are opaque, pre-serialized strings.
pub trait Keychain: Send + Sync {
    /// Store `value` under `key`. Resolves to whether the value was written.
    fn set(&self, key: &str, value: &str)
    -> impl Future<Output = Result<bool, KeychainError>> + Send;

    /// Fetch the value stored under `key`. Fails with
    /// [`KeychainError::NotFound`] if absent.
    fn get(&self, key: &str) -> impl Future<Output = Result<String, KeychainError>> + Send;

    /// Remove every entry.
    fn clear(&self) -> impl Future<Output = Result<bool, KeychainError>> + Send;
}

/// In-process keychain. Clones share entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryKeychain {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeychain {
    /// Create an empty keychain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the keychain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Keychain for MemoryKeychain {
    async fn set(&self, key: &str, value: &str) -> Result<bool, KeychainError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.into(), value.into());
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<String, KeychainError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned().ok_or_else(|| KeychainError::NotFound(key.into()))
    }

    async fn clear(&self) -> Result<bool, KeychainError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
        Ok(true)
    }
}
