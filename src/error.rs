use std::time::Duration;
use thiserror::Error;

/// Library result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the bridge or the client.
#[derive(Error, Debug)]
pub enum Error {
    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("payload: {0}")]
    Payload(#[from] PayloadError),

    #[error("remote store did not sync within {0:?}")]
    ReadyTimeout(Duration),

    #[error("client already initialized")]
    AlreadyInitialized,

    #[error("client not initialized")]
    NotInitialized,

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Remote store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("read failed: {0}")]
    Read(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("unknown record: {0}")]
    UnknownRecord(String),
}

/// Errors decoding values reported by the page.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid JID: {0:?}")]
    InvalidJid(String),

    #[error("invalid message key: {0:?}")]
    InvalidMessageKey(String),
}
