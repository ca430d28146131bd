//! # Application State Store
//!
//! The full set of observable cells UI surfaces subscribe to. An [`AppState`]
//! is created once and shared (typically behind an `Arc`) between the UI and
//! the [`IdentityService`](crate::service::IdentityService).
//!
//! Cells are independent: updating one never touches another, with two
//! exceptions. Logging out resets the credential table to a fresh default, and
//! setting a non-empty error schedules it to be cleared.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::AbortHandle;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::model::{
    CredentialTable, CredentialType, ModalStatus, ModalType, QrLink, SocketConnectionState,
    SocketState,
};
use crate::observable::{Observable, Persistent};
use crate::storage::LocalStorage;

/// Storage key of the onboarding flag.
pub const HAS_SETUP_ACCOUNT_KEY: &str = "hasSetupAccount";

/// Storage key of the demo data version.
pub const DATA_VERSION_KEY: &str = "dataVersion";

/// Observable state of the wallet application.
#[derive(Debug)]
pub struct AppState {
    /// Whether onboarding has completed. Persisted.
    pub has_setup_account: Persistent<bool>,

    /// Version of the demo data set in use. Persisted.
    pub data_version: Persistent<Option<String>>,

    /// The active modal.
    pub modal_status: Observable<ModalStatus>,

    /// Link scanned for the current share/accept handshake.
    pub qr_link: Observable<Option<QrLink>>,

    /// Last known state of the real-time channel.
    pub socket_connection_state: Observable<SocketConnectionState>,

    /// Credential table.
    pub credentials: Observable<CredentialTable>,

    /// The user-visible error.
    pub error: ErrorCell,

    pending: Arc<Mutex<Pending>>,
}

#[derive(Debug, Default)]
struct Pending {
    next_id: u64,
    handles: HashMap<u64, AbortHandle>,
}

impl AppState {
    /// Create the store, rehydrating persistent cells from `storage`.
    pub fn new(storage: Arc<dyn LocalStorage>, config: &Config) -> Self {
        Self {
            has_setup_account: Persistent::new(
                HAS_SETUP_ACCOUNT_KEY,
                false,
                Arc::clone(&storage),
            ),
            data_version: Persistent::new(DATA_VERSION_KEY, None, storage),
            modal_status: Observable::default(),
            qr_link: Observable::default(),
            socket_connection_state: Observable::default(),
            credentials: Observable::default(),
            error: ErrorCell::new(config.error_timeout()),
            pending: Arc::default(),
        }
    }

    /// Show a modal, replacing any that is active.
    pub fn open_modal(&self, modal_type: ModalType, props: Value) {
        self.modal_status.set(ModalStatus {
            active: true,
            modal_type: Some(modal_type),
            props,
        });
    }

    /// Hide the active modal.
    pub fn close_modal(&self) {
        self.modal_status.set(ModalStatus::default());
    }

    /// Record a state change of the real-time channel.
    pub fn set_socket_state(&self, state: SocketState, payload: Option<Value>) {
        self.socket_connection_state.set(SocketConnectionState { state, payload });
    }

    /// Replace the credential table with a freshly built default.
    pub fn reset_credentials(&self) {
        self.credentials.set(CredentialTable::default());
    }

    /// Populate the data for one credential kind.
    pub fn set_credential(
        &self, kind: CredentialType, data: Value, channel_id: Option<String>,
        password: Option<String>,
    ) {
        self.credentials.update(|table| {
            let entry = table.get_mut(kind);
            entry.data = Some(data);
            entry.channel_id = channel_id;
            entry.password = password;
        });
    }

    /// Register an in-flight operation so it can be aborted with
    /// [`AppState::cancel_pending`]. The operation stays registered until the
    /// returned guard is dropped.
    #[must_use]
    pub fn track(&self, handle: AbortHandle) -> PendingGuard {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let id = pending.next_id;
        pending.next_id = pending.next_id.wrapping_add(1);
        pending.handles.insert(id, handle);
        PendingGuard {
            id,
            pending: Arc::clone(&self.pending),
        }
    }

    /// Abort every tracked in-flight operation. Returns how many were aborted.
    pub fn cancel_pending(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let count = pending.handles.len();
        for (_, handle) in pending.handles.drain() {
            handle.abort();
        }
        if count > 0 {
            tracing::debug!("cancelled {count} pending operations");
        }
        count
    }
}

/// Registration of an in-flight operation. Dropping it, typically when the
/// operation finishes, unregisters the operation.
#[derive(Debug)]
pub struct PendingGuard {
    id: u64,
    pending: Arc<Mutex<Pending>>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.handles.remove(&self.id);
    }
}

/// The single user-visible error.
///
/// A non-empty value is cleared after a timeout. Each new non-empty value
/// restarts the timeout, so at most one clear is pending and only the latest
/// error is shown.
#[derive(Debug)]
pub struct ErrorCell {
    cell: Observable<String>,
    timeout: Duration,
    timer: Arc<Mutex<Timer>>,
}

#[derive(Debug, Default)]
struct Timer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl ErrorCell {
    /// Create an empty error cell with the given auto-clear timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            cell: Observable::default(),
            timeout,
            timer: Arc::new(Mutex::new(Timer::default())),
        }
    }

    /// The current error, empty if none.
    #[must_use]
    pub fn get(&self) -> String {
        self.cell.get()
    }

    /// Subscribe to changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.cell.subscribe()
    }

    /// Set the error. Any pending clear is cancelled; a non-empty value
    /// schedules a new one.
    ///
    /// Scheduling needs a Tokio runtime. Without one the error stays set until
    /// replaced or cleared.
    pub fn set(&self, message: impl Into<String>) {
        let message = message.into();
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        timer.generation = timer.generation.wrapping_add(1);
        if let Some(previous) = timer.handle.take() {
            previous.abort();
        }

        let schedule = !message.is_empty();
        self.cell.set(message);
        if !schedule {
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("no runtime to schedule error dismissal");
            return;
        };
        let cell = self.cell.clone();
        let shared = Arc::clone(&self.timer);
        let generation = timer.generation;
        let timeout = self.timeout;
        timer.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut timer = shared.lock().unwrap_or_else(PoisonError::into_inner);
            // a newer error owns the cell
            if timer.generation == generation {
                cell.set(String::new());
                timer.handle = None;
            }
        }));
    }

    /// Clear the error now.
    pub fn clear(&self) {
        self.set(String::new());
    }
}
