//! Observable state cells.
//!
//! Each cell is an independent `tokio::sync::watch` channel: UI surfaces call
//! `subscribe` to be notified of changes and `get` to read the latest value.
//! [`Persistent`] cells additionally mirror every change to
//! [`LocalStorage`](crate::storage::LocalStorage).

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::storage::LocalStorage;

/// A cloneable handle to a single observable value. Clones share the value.
#[derive(Debug)]
pub struct Observable<T> {
    sender: Arc<watch::Sender<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    /// Create a cell holding `value`.
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(value);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// Modify the value in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.sender.send_modify(f);
    }

    /// Subscribe to changes. The receiver sees the current value immediately.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Read the value through a closure without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.sender.borrow())
    }
}

impl<T: Clone> Observable<T> {
    /// A copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

/// An observable cell mirrored to durable storage under a fixed key.
pub struct Persistent<T> {
    key: String,
    cell: Observable<T>,
    storage: Arc<dyn LocalStorage>,
}

impl<T> Clone for Persistent<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            cell: self.cell.clone(),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<T: Debug> Debug for Persistent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistent").field("key", &self.key).field("cell", &self.cell).finish()
    }
}

impl<T> Persistent<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Create a cell for `key`, rehydrating it from `storage`.
    ///
    /// A missing or unparsable stored value falls back to `initial`; parse and
    /// read failures are logged, never returned.
    pub fn new(key: impl Into<String>, initial: T, storage: Arc<dyn LocalStorage>) -> Self {
        let key = key.into();
        let value = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("unable to parse stored value for {key}: {e}");
                    initial
                }
            },
            Ok(None) => initial,
            Err(e) => {
                tracing::warn!("unable to read stored value for {key}: {e}");
                initial
            }
        };
        Self {
            key,
            cell: Observable::new(value),
            storage,
        }
    }

    /// Storage key for this cell.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// A copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Subscribe to changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.cell.subscribe()
    }

    /// Replace the value and write it to storage before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or written. The
    /// in-memory value is updated regardless.
    pub fn set(&self, value: T) -> anyhow::Result<()> {
        self.cell.set(value);
        self.persist()
    }

    /// Modify the value in place and write it to storage before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or written.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> anyhow::Result<()> {
        self.cell.update(f);
        self.persist()
    }

    fn persist(&self) -> anyhow::Result<()> {
        let raw =
            self.cell.with(serde_json::to_string::<T>).context("serializing persistent value")?;
        self.storage.set(&self.key, &raw)
    }
}
