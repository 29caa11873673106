//! Event reconciliation bridge.
//!
//! Merges the store's current sync flag and its live notifications into one
//! ordered stream of [Event]s. `Ready` is delivered exactly once whether the
//! store synced before or after attaching, and each record identity yields at
//! most one `MessageAdded` (or `MessageTypeResolved` for placeholders).

mod classify;

pub use classify::{classify_record_admission, classify_record_removal, Admission, Removal};

use crate::events::{Event, EventSink};
use crate::store::{ListenerId, Remote, StoreNotification};
use crate::types::{InboundRecord, RecordId, SessionState};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Bridge between a [RemoteStore](crate::store::RemoteStore) and an [EventSink].
///
/// Admitted and removed record ids are remembered for the life of the bridge,
/// so memory grows with the number of distinct records seen. Long sessions
/// should recycle the bridge (`detach` and attach a new one) to reset them.
pub struct Bridge {
    inner: Arc<Inner>,
}

struct Inner {
    store: Remote,
    sink: Arc<dyn EventSink>,
    forward_state: AtomicBool,
    attached: AtomicBool,
    detached: AtomicBool,
    ready_fired: AtomicBool,
    /// Record ids admitted or deferred.
    seen: Mutex<HashSet<RecordId>>,
    removed: Mutex<HashSet<RecordId>>,
    /// Outstanding one-time type watches, by record.
    watches: Mutex<HashMap<RecordId, Watch>>,
    next_watch: AtomicU64,
    listeners: Mutex<Vec<ListenerId>>,
}

/// Registry entry for a placeholder. `id` is `None` while the store call that
/// registers the watch is still in flight.
struct Watch {
    seq: u64,
    id: Option<ListenerId>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Bridge {
    pub fn new(store: Remote, sink: Arc<dyn EventSink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                sink,
                forward_state: AtomicBool::new(true),
                attached: AtomicBool::new(false),
                detached: AtomicBool::new(false),
                ready_fired: AtomicBool::new(false),
                seen: Mutex::new(HashSet::new()),
                removed: Mutex::new(HashSet::new()),
                watches: Mutex::new(HashMap::new()),
                next_watch: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Whether `StateChanged` events are delivered. `Disconnected` is always delivered.
    pub fn set_forward_state_changes(&self, on: bool) {
        self.inner.forward_state.store(on, Ordering::SeqCst);
    }

    /// Attach to the store: ready signal first, then record listeners, so a
    /// store that is already synced delivers `Ready` before any record event.
    /// Attaching more than once is a no-op.
    pub fn attach(&self) -> crate::Result<()> {
        if self.inner.attached.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.attach_ready_signal()?;
        self.attach_records()
    }

    /// Deliver `Ready` now if the store is synced, and on its future transition.
    ///
    /// The flag is read before subscribing and once more after, so a transition
    /// racing the subscription is never lost; the ready guard absorbs the
    /// duplicate when both paths observe it.
    pub fn attach_ready_signal(&self) -> crate::Result<()> {
        let inner = &self.inner;
        if inner.store.is_synced()? {
            inner.fire_ready();
        }
        let weak = Arc::downgrade(inner);
        let id = inner.store.subscribe(Arc::new(move |n: &StoreNotification| {
            if let StoreNotification::SyncChanged(true) = n {
                if let Some(inner) = weak.upgrade() {
                    inner.fire_ready();
                }
            }
        }))?;
        lock(&inner.listeners).push(id);
        if inner.store.is_synced()? {
            inner.fire_ready();
        }
        Ok(())
    }

    fn attach_records(&self) -> crate::Result<()> {
        let weak = Arc::downgrade(&self.inner);
        let id = self
            .inner
            .store
            .subscribe(Arc::new(move |n: &StoreNotification| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                match n {
                    StoreNotification::RecordAdded(r) => inner.on_added(r.clone()),
                    StoreNotification::RecordRemoved(r) => inner.on_removed(r.clone()),
                    StoreNotification::StateChanged(s) => inner.on_state(*s),
                    StoreNotification::SyncChanged(_) => {}
                }
            }))?;
        lock(&self.inner.listeners).push(id);
        Ok(())
    }

    /// Remove every listener and outstanding type watch. No event is delivered
    /// once this returns.
    pub fn detach(&self) -> crate::Result<()> {
        let inner = &self.inner;
        inner.detached.store(true, Ordering::SeqCst);
        let listeners: Vec<ListenerId> = lock(&inner.listeners).drain(..).collect();
        for id in listeners {
            inner.store.unsubscribe(id)?;
        }
        let watches: Vec<ListenerId> = lock(&inner.watches)
            .drain()
            .filter_map(|(_, w)| w.id)
            .collect();
        for id in watches {
            inner.store.unwatch_type(id)?;
        }
        tracing::debug!("bridge detached");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready_fired.load(Ordering::SeqCst)
    }

    pub fn is_detached(&self) -> bool {
        self.inner.detached.load(Ordering::SeqCst)
    }

    /// Number of placeholder records still waiting for their type.
    pub fn pending_count(&self) -> usize {
        lock(&self.inner.watches).len()
    }
}

impl Inner {
    fn deliver(&self, event: Event) {
        if self.detached.load(Ordering::SeqCst) {
            tracing::trace!(kind = event.kind(), "dropping event after detach");
            return;
        }
        tracing::debug!(kind = event.kind(), "delivering event");
        self.sink.deliver(event);
    }

    fn fire_ready(&self) {
        if !self.ready_fired.swap(true, Ordering::SeqCst) {
            self.deliver(Event::Ready);
        }
    }

    /// Returns `false` if the record id was already admitted or deferred.
    fn mark_seen(&self, id: &RecordId) -> bool {
        lock(&self.seen).insert(id.clone())
    }

    fn on_added(self: &Arc<Self>, record: InboundRecord) {
        match classify_record_admission(&record) {
            Admission::Reject => {
                tracing::trace!(record = %record.id, "skipping stale record");
            }
            Admission::Admit => {
                if self.mark_seen(&record.id) {
                    self.deliver(Event::MessageAdded(record));
                }
            }
            Admission::Defer => {
                if self.mark_seen(&record.id) {
                    self.defer(record);
                }
            }
        }
    }

    fn defer(self: &Arc<Self>, record: InboundRecord) {
        if self.detached.load(Ordering::SeqCst) {
            return;
        }
        // Claim the registry slot before the store call: the watch may fire,
        // or the bridge may detach, before `watch_type` returns.
        let seq = self.next_watch.fetch_add(1, Ordering::SeqCst);
        lock(&self.watches).insert(record.id.clone(), Watch { seq, id: None });
        let weak: Weak<Self> = Arc::downgrade(self);
        let res = self.store.watch_type(
            &record.id,
            Box::new(move |updated: &InboundRecord| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_type_changed(updated.clone());
                }
            }),
        );
        match res {
            Ok(id) => {
                let kept = {
                    let mut watches = lock(&self.watches);
                    let claimed = watches.get(&record.id).is_some_and(|w| w.seq == seq);
                    if claimed && !self.detached.load(Ordering::SeqCst) {
                        watches.insert(record.id.clone(), Watch { seq, id: Some(id) });
                        true
                    } else {
                        if claimed {
                            watches.remove(&record.id);
                        }
                        false
                    }
                };
                if kept {
                    tracing::trace!(record = %record.id, "waiting for placeholder to resolve");
                } else if let Err(e) = self.store.unwatch_type(id) {
                    // Fired, removed or detached in the meantime.
                    tracing::warn!(record = %record.id, error = %e, "cannot cancel type watch");
                }
            }
            Err(e) => {
                let mut watches = lock(&self.watches);
                if watches.get(&record.id).is_some_and(|w| w.seq == seq) {
                    watches.remove(&record.id);
                }
                tracing::warn!(record = %record.id, error = %e, "cannot watch placeholder record");
            }
        }
    }

    fn on_type_changed(self: &Arc<Self>, record: InboundRecord) {
        lock(&self.watches).remove(&record.id);
        if record.msg_type.is_pending() {
            self.defer(record);
            return;
        }
        self.deliver(Event::MessageTypeResolved(record));
    }

    fn on_removed(&self, record: InboundRecord) {
        let watch = lock(&self.watches).remove(&record.id);
        if let Some(Watch { id: Some(id), .. }) = watch {
            if let Err(e) = self.store.unwatch_type(id) {
                tracing::warn!(record = %record.id, error = %e, "cannot cancel type watch");
            }
        }
        match classify_record_removal(&record) {
            Removal::Suppress => {
                tracing::trace!(record = %record.id, "skipping stale removal");
            }
            Removal::Emit => {
                if lock(&self.removed).insert(record.id.clone()) {
                    self.deliver(Event::MessageRemoved(record));
                }
            }
        }
    }

    fn on_state(&self, state: SessionState) {
        if self.forward_state.load(Ordering::SeqCst) {
            self.deliver(Event::StateChanged(state));
        }
        if state.is_disconnected() {
            self.deliver(Event::Disconnected { state });
        }
    }
}
