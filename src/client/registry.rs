//! Fan-out of bridge events to handlers and channel subscribers.

use crate::events::{Event, EventSink};
use crate::types::SessionState;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::{mpsc, watch};

/// Event handler registered with [Client::add_event_handler](crate::Client::add_event_handler).
pub(crate) type EventHandler = Arc<dyn Fn(Event) + Send + Sync>;

pub(crate) struct Registry {
    handlers: RwLock<Vec<EventHandler>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Event>>>,
    ready: watch::Sender<bool>,
    state: RwLock<Option<SessionState>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            handlers: RwLock::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            ready,
            state: RwLock::new(None),
        }
    }

    pub(crate) fn add_handler(&self, handler: EventHandler) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    pub(crate) fn subscribe(&self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub(crate) fn ready(&self) -> watch::Receiver<bool> {
        self.ready.subscribe()
    }

    pub(crate) fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub(crate) fn state(&self) -> Option<SessionState> {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for Registry {
    fn deliver(&self, event: Event) {
        match &event {
            Event::Ready => {
                self.ready.send_replace(true);
            }
            Event::StateChanged(state) | Event::Disconnected { state } => {
                *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(*state);
            }
            _ => {}
        }
        // Handlers may register further handlers; call them without the lock.
        let handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for f in handlers.iter() {
            f(event.clone());
        }
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
