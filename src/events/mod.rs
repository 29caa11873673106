//! Event types delivered to subscribers.

use crate::types::{InboundRecord, SessionState};

/// Events emitted by the [Bridge](crate::Bridge) and fanned out by
/// [Client](crate::Client) to registered handlers.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The remote store finished its initial sync. Delivered at most once per bridge.
    Ready,

    /// A new message record arrived.
    MessageAdded(InboundRecord),

    /// A message record was removed from the store.
    MessageRemoved(InboundRecord),

    /// A placeholder record resolved to its concrete type. Replaces
    /// `MessageAdded` for records that arrived as placeholders.
    MessageTypeResolved(InboundRecord),

    /// Session connection state changed.
    StateChanged(SessionState),

    /// Session reached a state that no longer delivers events.
    Disconnected { state: SessionState },
}

impl Event {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::MessageAdded(_) => "message_added",
            Self::MessageRemoved(_) => "message_removed",
            Self::MessageTypeResolved(_) => "message_type_resolved",
            Self::StateChanged(_) => "state_changed",
            Self::Disconnected { .. } => "disconnected",
        }
    }
}

/// Receiver of bridge events (the subscriber registry side of the bridge).
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: Event);
}

impl<F> EventSink for F
where
    F: Fn(Event) + Send + Sync,
{
    fn deliver(&self, event: Event) {
        self(event)
    }
}
