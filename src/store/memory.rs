use super::{ListenerId, PageNotification, RemoteStore, StoreListener, StoreNotification, TypeWatcher};
use crate::types::{InboundRecord, MessageType, RecordId, SessionState};
use crate::{error::StoreError, Result};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

/// In-memory remote store (for tests, or fed by page notifications).
pub struct MemoryStore {
    synced: RwLock<bool>,
    state: RwLock<Option<SessionState>>,
    records: RwLock<HashMap<RecordId, InboundRecord>>,
    listeners: RwLock<Vec<(ListenerId, StoreListener)>>,
    watchers: Mutex<HashMap<ListenerId, (RecordId, TypeWatcher)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            synced: RwLock::new(false),
            state: RwLock::new(None),
            records: RwLock::new(HashMap::new()),
            listeners: RwLock::new(Vec::new()),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// Set the sync flag. The flag never reverts once synced.
    pub fn set_synced(&self, synced: bool) -> Result<()> {
        {
            let mut flag = self
                .synced
                .write()
                .map_err(|e| StoreError::Write(e.to_string()))?;
            if *flag == synced {
                return Ok(());
            }
            if *flag {
                tracing::warn!("ignoring attempt to clear sync flag");
                return Ok(());
            }
            *flag = synced;
        }
        self.notify(&StoreNotification::SyncChanged(synced))
    }

    pub fn set_state(&self, state: SessionState) -> Result<()> {
        {
            let mut current = self
                .state
                .write()
                .map_err(|e| StoreError::Write(e.to_string()))?;
            if *current == Some(state) {
                return Ok(());
            }
            *current = Some(state);
        }
        self.notify(&StoreNotification::StateChanged(state))
    }

    pub fn state(&self) -> Result<Option<SessionState>> {
        Ok(*self
            .state
            .read()
            .map_err(|e| StoreError::Read(e.to_string()))?)
    }

    /// Insert a record and notify listeners.
    pub fn add_record(&self, record: InboundRecord) -> Result<()> {
        self.records
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?
            .insert(record.id.clone(), record.clone());
        self.notify(&StoreNotification::RecordAdded(record))
    }

    /// Remove a record and notify listeners. Returns the removed record.
    pub fn remove_record(&self, id: &RecordId) -> Result<Option<InboundRecord>> {
        let record = self
            .records
            .read()
            .map_err(|e| StoreError::Read(e.to_string()))?
            .get(id)
            .cloned();
        match record {
            Some(record) => {
                self.record_removed(record.clone())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Change a record's type, firing any type watchers registered for it.
    pub fn set_record_type(&self, id: &RecordId, msg_type: MessageType) -> Result<()> {
        let updated = {
            let mut records = self
                .records
                .write()
                .map_err(|e| StoreError::Write(e.to_string()))?;
            let record = records
                .get_mut(id)
                .ok_or_else(|| StoreError::UnknownRecord(id.to_string()))?;
            if record.msg_type == msg_type {
                return Ok(());
            }
            record.msg_type = msg_type;
            record.clone()
        };
        let fired: Vec<TypeWatcher> = {
            let mut watchers = self
                .watchers
                .lock()
                .map_err(|e| StoreError::Write(e.to_string()))?;
            let ids: Vec<ListenerId> = watchers
                .iter()
                .filter(|(_, (rid, _))| rid == id)
                .map(|(wid, _)| *wid)
                .collect();
            ids.into_iter()
                .filter_map(|wid| watchers.remove(&wid))
                .map(|(_, w)| w)
                .collect()
        };
        tracing::trace!(record = %id, msg_type = %updated.msg_type, watchers = fired.len(), "record type changed");
        for watcher in fired {
            watcher(&updated);
        }
        Ok(())
    }

    pub fn record(&self, id: &RecordId) -> Result<Option<InboundRecord>> {
        Ok(self
            .records
            .read()
            .map_err(|e| StoreError::Read(e.to_string()))?
            .get(id)
            .cloned())
    }

    /// Number of outstanding type watches.
    pub fn pending_watches(&self) -> Result<usize> {
        Ok(self
            .watchers
            .lock()
            .map_err(|e| StoreError::Read(e.to_string()))?
            .len())
    }

    pub fn listener_count(&self) -> Result<usize> {
        Ok(self
            .listeners
            .read()
            .map_err(|e| StoreError::Read(e.to_string()))?
            .len())
    }

    /// Apply a notification reported by the page.
    pub fn apply(&self, notification: PageNotification) -> Result<()> {
        match notification {
            PageNotification::Sync { synced } => self.set_synced(synced.unwrap_or(false)),
            PageNotification::Add { record } => self.add_record(record),
            PageNotification::Remove { record } => self.record_removed(record),
            PageNotification::ChangeType { id, msg_type } => self.set_record_type(&id, msg_type),
            PageNotification::State { state } => self.set_state(state),
        }
    }

    /// Decode and apply a JSON notification reported by the page.
    pub fn apply_json(&self, payload: &str) -> Result<()> {
        self.apply(PageNotification::from_json(payload)?)
    }

    fn record_removed(&self, record: InboundRecord) -> Result<()> {
        self.records
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?
            .remove(&record.id);
        self.watchers
            .lock()
            .map_err(|e| StoreError::Write(e.to_string()))?
            .retain(|_, (rid, _)| *rid != record.id);
        self.notify(&StoreNotification::RecordRemoved(record))
    }

    fn notify(&self, notification: &StoreNotification) -> Result<()> {
        let listeners: Vec<StoreListener> = self
            .listeners
            .read()
            .map_err(|e| StoreError::Read(e.to_string()))?
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(notification);
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryStore {
    fn is_synced(&self) -> Result<bool> {
        Ok(*self
            .synced
            .read()
            .map_err(|e| StoreError::Read(e.to_string()))?)
    }

    fn subscribe(&self, listener: StoreListener) -> Result<ListenerId> {
        let id = ListenerId::new();
        self.listeners
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?
            .push((id, listener));
        Ok(id)
    }

    fn unsubscribe(&self, id: ListenerId) -> Result<()> {
        self.listeners
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?
            .retain(|(lid, _)| *lid != id);
        Ok(())
    }

    fn watch_type(&self, record: &RecordId, watcher: TypeWatcher) -> Result<ListenerId> {
        if !self
            .records
            .read()
            .map_err(|e| StoreError::Read(e.to_string()))?
            .contains_key(record)
        {
            return Err(StoreError::UnknownRecord(record.to_string()).into());
        }
        let id = ListenerId::new();
        self.watchers
            .lock()
            .map_err(|e| StoreError::Write(e.to_string()))?
            .insert(id, (record.clone(), watcher));
        Ok(id)
    }

    fn unwatch_type(&self, id: ListenerId) -> Result<()> {
        self.watchers
            .lock()
            .map_err(|e| StoreError::Write(e.to_string()))?
            .remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IsNew, Jid, MessageKey};
    use std::sync::Arc;

    fn record(id: &str) -> InboundRecord {
        InboundRecord::new(
            MessageKey::new(false, Jid::user("111"), id),
            Jid::user("111"),
            Jid::user("222"),
        )
        .with_is_new(IsNew::True)
    }

    fn recording(store: &MemoryStore) -> Arc<Mutex<Vec<StoreNotification>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store
            .subscribe(Arc::new(move |n: &StoreNotification| {
                sink.lock().unwrap().push(n.clone())
            }))
            .unwrap();
        seen
    }

    #[test]
    fn sync_flag_never_reverts() {
        let store = MemoryStore::new();
        let seen = recording(&store);
        store.set_synced(true).unwrap();
        store.set_synced(true).unwrap();
        store.set_synced(false).unwrap();
        assert!(store.is_synced().unwrap());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![StoreNotification::SyncChanged(true)]
        );
    }

    #[test]
    fn add_and_remove_notify_listeners() {
        let store = MemoryStore::new();
        let seen = recording(&store);
        let rec = record("A");
        store.add_record(rec.clone()).unwrap();
        assert_eq!(store.record(&rec.id).unwrap(), Some(rec.clone()));
        assert_eq!(store.remove_record(&rec.id).unwrap(), Some(rec.clone()));
        assert_eq!(store.remove_record(&rec.id).unwrap(), None);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                StoreNotification::RecordAdded(rec.clone()),
                StoreNotification::RecordRemoved(rec),
            ]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let store = MemoryStore::new();
        let seen = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&seen);
        let id = store
            .subscribe(Arc::new(move |_: &StoreNotification| {
                *counter.lock().unwrap() += 1
            }))
            .unwrap();
        store.add_record(record("A")).unwrap();
        store.unsubscribe(id).unwrap();
        store.add_record(record("B")).unwrap();
        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(store.listener_count().unwrap(), 0);
    }

    #[test]
    fn type_watch_fires_once() {
        let store = MemoryStore::new();
        let rec = record("A").with_type(MessageType::Ciphertext);
        store.add_record(rec.clone()).unwrap();
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        store
            .watch_type(
                &rec.id,
                Box::new(move |r: &InboundRecord| sink.lock().unwrap().push(r.msg_type.clone())),
            )
            .unwrap();
        store.set_record_type(&rec.id, MessageType::Chat).unwrap();
        store.set_record_type(&rec.id, MessageType::Revoked).unwrap();
        assert_eq!(*fired.lock().unwrap(), vec![MessageType::Chat]);
        assert_eq!(store.pending_watches().unwrap(), 0);
    }

    #[test]
    fn watch_unknown_record_fails() {
        let store = MemoryStore::new();
        let res = store.watch_type(&record("A").id, Box::new(|_: &InboundRecord| {}));
        assert!(matches!(
            res.unwrap_err(),
            crate::Error::Store(StoreError::UnknownRecord(_))
        ));
    }

    #[test]
    fn removing_record_drops_its_watches() {
        let store = MemoryStore::new();
        let rec = record("A").with_type(MessageType::Ciphertext);
        store.add_record(rec.clone()).unwrap();
        store
            .watch_type(&rec.id, Box::new(|_: &InboundRecord| {}))
            .unwrap();
        store.remove_record(&rec.id).unwrap();
        assert_eq!(store.pending_watches().unwrap(), 0);
    }

    #[test]
    fn listener_may_reenter_store() {
        let store = Arc::new(MemoryStore::new());
        let inner = Arc::clone(&store);
        store
            .subscribe(Arc::new(move |n: &StoreNotification| {
                if let StoreNotification::RecordAdded(r) = n {
                    inner
                        .watch_type(&r.id, Box::new(|_: &InboundRecord| {}))
                        .unwrap();
                }
            }))
            .unwrap();
        store.add_record(record("A")).unwrap();
        assert_eq!(store.pending_watches().unwrap(), 1);
    }

    #[test]
    fn apply_json_drives_store() {
        let store = MemoryStore::new();
        store
            .apply_json(r#"{"kind":"state","state":"CONNECTED"}"#)
            .unwrap();
        store.apply_json(r#"{"kind":"sync","synced":true}"#).unwrap();
        store
            .apply_json(
                r#"{"kind":"add","record":{"id":"false_1@c.us_AB","type":"ciphertext",
                    "from":"1@c.us","to":"2@c.us"}}"#,
            )
            .unwrap();
        store
            .apply_json(r#"{"kind":"change_type","id":"false_1@c.us_AB","type":"chat"}"#)
            .unwrap();
        assert!(store.is_synced().unwrap());
        assert_eq!(store.state().unwrap(), Some(SessionState::Connected));
        let id: RecordId = "false_1@c.us_AB".parse().unwrap();
        assert_eq!(
            store.record(&id).unwrap().unwrap().msg_type,
            MessageType::Chat
        );
        assert!(store.apply_json("not json").is_err());
    }
}
