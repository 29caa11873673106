//! # wweb-bridge
//!
//! Event bridge for a WhatsApp Web session running in a browser page.
//!
//! The page's internal object store is observed through the [RemoteStore]
//! trait. The [Bridge] turns its sync flag and change notifications into an
//! ordered, deduplicated stream of [Event]s, and the [Client] fans those out to
//! handlers and channel subscribers.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wweb_bridge::{store::MemoryStore, Client, Event};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let client = Client::new(store.clone());
//!     client.add_event_handler(|evt| {
//!         if let Event::MessageAdded(msg) = evt {
//!             println!("{}: {:?}", msg.from, msg.body);
//!         }
//!     });
//!     client.initialize()?;
//!     // Feed page notifications into the store...
//!     store.apply_json(r#"{"kind":"sync","synced":true}"#)?;
//!     client.wait_ready().await?;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod store;
pub mod types;

pub use bridge::{Admission, Bridge, Removal};
pub use client::Client;
pub use config::ClientOptions;
pub use error::{Error, Result};
pub use events::{Event, EventSink};
pub use store::{ListenerId, MemoryStore, PageNotification, Remote, RemoteStore, StoreNotification};
pub use types::{InboundRecord, IsNew, Jid, MessageKey, MessageType, RecordId, SessionState};
