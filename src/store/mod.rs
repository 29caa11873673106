//! Remote store contract.
//!
//! The web app's internal state is observed, never owned. Anything that can
//! report the sync flag, push change notifications and watch a record's type
//! can drive the bridge; [MemoryStore] is the in-process implementation used by
//! tests and by adapters that receive page notifications as JSON.

mod memory;
mod page;

pub use memory::MemoryStore;
pub use page::PageNotification;

use crate::types::{InboundRecord, RecordId, SessionState};
use std::sync::Arc;
use uuid::Uuid;

/// Handle for a registered listener or type watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Change notification pushed by the store to its listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreNotification {
    SyncChanged(bool),
    RecordAdded(InboundRecord),
    RecordRemoved(InboundRecord),
    StateChanged(SessionState),
}

/// Listener for store notifications. Called synchronously by the store.
pub type StoreListener = Arc<dyn Fn(&StoreNotification) + Send + Sync>;

/// One-time watcher for a record's type change; receives the updated record.
pub type TypeWatcher = Box<dyn FnOnce(&InboundRecord) + Send>;

/// Observable remote store.
///
/// Implementations must not hold internal locks while invoking listeners or
/// watchers: listeners may call back into the store.
pub trait RemoteStore: Send + Sync {
    /// Current sync flag. An undefined flag reads as `false`.
    fn is_synced(&self) -> crate::Result<bool>;

    /// Register a listener for all future notifications.
    fn subscribe(&self, listener: StoreListener) -> crate::Result<ListenerId>;

    /// Remove a listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: ListenerId) -> crate::Result<()>;

    /// Watch the next change of `record`'s type. The watcher fires at most once
    /// and is dropped by the store after firing.
    fn watch_type(&self, record: &RecordId, watcher: TypeWatcher) -> crate::Result<ListenerId>;

    /// Cancel a type watch. Unknown ids are ignored.
    fn unwatch_type(&self, id: ListenerId) -> crate::Result<()>;
}

/// Shared handle to a remote store.
pub type Remote = Arc<dyn RemoteStore>;
