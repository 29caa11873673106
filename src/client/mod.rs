//! Main client.

mod registry;

use crate::bridge::Bridge;
use crate::config::ClientOptions;
use crate::error::Error;
use crate::events::{Event, EventSink};
use crate::store::Remote;
use crate::types::SessionState;
use futures::Stream;
use registry::Registry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// Client for a WhatsApp Web session observed through a remote store.
///
/// Owns the [Bridge] and fans its events out to handlers and channel
/// subscribers. Handlers run synchronously on the thread that mutated the store.
pub struct Client {
    store: Remote,
    options: ClientOptions,
    registry: Arc<Registry>,
    bridge: Mutex<Option<Bridge>>,
    /// Set from the start of `initialize` until `destroy`.
    claimed: AtomicBool,
}

impl Client {
    /// Create a new client over the given remote store.
    pub fn new(store: Remote) -> Self {
        Self::with_options(store, ClientOptions::default())
    }

    pub fn with_options(store: Remote, options: ClientOptions) -> Self {
        Self {
            store,
            options,
            registry: Arc::new(Registry::new()),
            bridge: Mutex::new(None),
            claimed: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Add an event handler (called for every event).
    pub fn add_event_handler<F>(&self, f: F)
    where
        F: Fn(Event) + Send + Sync + 'static,
    {
        self.registry.add_handler(Arc::new(f));
    }

    /// Receive every event delivered after this call on a channel.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Event> {
        self.registry.subscribe()
    }

    /// Same as [subscribe](Self::subscribe), as a stream.
    pub fn event_stream(&self) -> impl Stream<Item = Event> + Send + 'static {
        futures::stream::unfold(self.subscribe(), |mut rx| async move {
            rx.recv().await.map(|evt| (evt, rx))
        })
    }

    /// Attach the bridge to the store. `Ready` is delivered during this call
    /// if the store has already synced.
    pub fn initialize(&self) -> crate::Result<()> {
        if self.claimed.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyInitialized);
        }
        let sink: Arc<dyn EventSink> = self.registry.clone();
        let bridge = Bridge::new(Arc::clone(&self.store), sink);
        bridge.set_forward_state_changes(self.options.forward_state_changes);
        // Attach without holding the slot: handlers run inside attach and may
        // call back into the client.
        if let Err(e) = bridge.attach() {
            tracing::warn!(error = %e, "bridge attach failed");
            bridge.detach().ok();
            self.claimed.store(false, Ordering::SeqCst);
            return Err(e);
        }
        tracing::debug!(ready = bridge.is_ready(), "client initialized");
        *self.bridge.lock().unwrap_or_else(PoisonError::into_inner) = Some(bridge);
        Ok(())
    }

    /// Wait until the store has synced, bounded by `ready_timeout_ms`.
    pub async fn wait_ready(&self) -> crate::Result<()> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        let mut rx = self.registry.ready();
        let wait = async move {
            rx.wait_for(|ready| *ready)
                .await
                .map(|_| ())
                .map_err(|_| Error::Other(anyhow::anyhow!("ready channel closed")))
        };
        match self.options.ready_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, wait)
                .await
                .map_err(|_| Error::ReadyTimeout(timeout))?,
            None => wait.await,
        }
    }

    /// Whether the store has synced.
    pub fn is_ready(&self) -> bool {
        self.registry.is_ready()
    }

    pub fn is_initialized(&self) -> bool {
        self.bridge
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Last session state reported by the store.
    pub fn state(&self) -> Option<SessionState> {
        self.registry.state()
    }

    /// Detach the bridge. No event is delivered after this returns.
    pub async fn destroy(&self) -> crate::Result<()> {
        let bridge = self
            .bridge
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(Error::NotInitialized)?;
        let res = bridge.detach();
        self.claimed.store(false, Ordering::SeqCst);
        res?;
        tracing::debug!("client destroyed");
        Ok(())
    }
}
