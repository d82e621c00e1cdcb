//! Endpoint-death callbacks.

use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::StatusCode;
use tracing::info;

use crate::ports::DeathRecipient;

/// Called once when the remote endpoint dies.
pub type OnBinderDiedCallback = Arc<dyn Fn() + Send + Sync>;

/// Registry of death callbacks, identified by `Arc` pointer.
///
/// Callbacks run while the registry lock is held, so a callback must not
/// add or remove callbacks on the same registry.
#[derive(Default)]
pub struct DeathNotifier {
    callbacks: Mutex<Vec<OnBinderDiedCallback>>,
}

impl DeathNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same callback twice keeps a single entry.
    pub fn add(&self, callback: OnBinderDiedCallback) -> StatusCode {
        let mut callbacks = self.callbacks.lock();
        if !callbacks.iter().any(|c| Arc::ptr_eq(c, &callback)) {
            callbacks.push(callback);
        }
        StatusCode::Ok
    }

    /// `InvalidArg` if the callback was never registered.
    pub fn remove(&self, callback: &OnBinderDiedCallback) -> StatusCode {
        let mut callbacks = self.callbacks.lock();
        let before = callbacks.len();
        callbacks.retain(|c| !Arc::ptr_eq(c, callback));
        if callbacks.len() == before {
            StatusCode::InvalidArg
        } else {
            StatusCode::Ok
        }
    }

    pub fn count(&self) -> usize {
        self.callbacks.lock().len()
    }
}

impl DeathRecipient for DeathNotifier {
    fn on_binder_died(&self) {
        let mut callbacks = self.callbacks.lock();
        info!(callbacks = callbacks.len(), "VHAL died");
        for callback in callbacks.iter() {
            callback();
        }
        callbacks.clear();
    }

    fn on_binder_unlinked(&self) {
        self.callbacks.lock().clear();
    }
}
