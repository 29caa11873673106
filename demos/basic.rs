//! Basic example: feed page notifications into an in-memory store and print
//! the events the bridge delivers.
//!
//! Run with: `cargo run --example basic`

use std::sync::Arc;
use std::time::Duration;
use wweb_bridge::{store::MemoryStore, Client, ClientOptions, Event};

const PAGE_NOTIFICATIONS: &[&str] = &[
    r#"{"kind":"state","state":"CONNECTED"}"#,
    r#"{"kind":"add","record":{"id":"false_5511999999999@c.us_OLD1","isNew":false,
        "type":"chat","from":"5511999999999@c.us","to":"5511888888888@c.us","body":"cached"}}"#,
    r#"{"kind":"sync","synced":true}"#,
    r#"{"kind":"add","record":{"id":"false_5511999999999@c.us_NEW1","isNew":true,
        "type":"chat","from":"5511999999999@c.us","to":"5511888888888@c.us","body":"hello"}}"#,
    r#"{"kind":"add","record":{"id":"false_5511999999999@c.us_NEW2",
        "type":"ciphertext","from":"5511999999999@c.us","to":"5511888888888@c.us"}}"#,
    r#"{"kind":"change_type","id":"false_5511999999999@c.us_NEW2","type":"chat"}"#,
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let store = Arc::new(MemoryStore::new());
    let client = Client::with_options(
        store.clone(),
        ClientOptions::default().with_ready_timeout(Duration::from_secs(5)),
    );

    client.add_event_handler(|evt| match evt {
        Event::Ready => println!("[Event] Ready."),
        Event::MessageAdded(msg) => {
            println!("[Event] Message from {}: {:?}", msg.from, msg.body);
        }
        Event::MessageTypeResolved(msg) => {
            println!("[Event] Placeholder {} resolved to {}", msg.id, msg.msg_type);
        }
        Event::StateChanged(state) => println!("[Event] State: {:?}", state),
        other => println!("[Event] {:?}", other),
    });

    client.initialize()?;

    let feeder = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for payload in PAGE_NOTIFICATIONS {
                store.apply_json(payload)?;
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Ok::<_, wweb_bridge::Error>(())
        })
    };

    client.wait_ready().await?;
    println!("Store synced.");
    feeder.await??;
    client.destroy().await?;
    Ok(())
}
