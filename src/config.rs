//! Client options.

use crate::error::PayloadError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for [Client](crate::Client).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// How long [Client::wait_ready](crate::Client::wait_ready) waits for the
    /// store to sync. `None` waits forever.
    pub ready_timeout_ms: Option<u64>,
    /// Deliver `StateChanged` events for every session state transition.
    pub forward_state_changes: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            ready_timeout_ms: None,
            forward_state_changes: true,
        }
    }
}

impl ClientOptions {
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn ready_timeout(&self) -> Option<Duration> {
        self.ready_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_fields_missing() {
        let opts = ClientOptions::from_json("{}").unwrap();
        assert_eq!(opts, ClientOptions::default());
        assert!(opts.forward_state_changes);
        assert_eq!(opts.ready_timeout(), None);
    }

    #[test]
    fn parses_timeout() {
        let opts = ClientOptions::from_json(
            r#"{"ready_timeout_ms": 1500, "forward_state_changes": false}"#,
        )
        .unwrap();
        assert_eq!(opts.ready_timeout(), Some(Duration::from_millis(1500)));
        assert!(!opts.forward_state_changes);
    }

    #[test]
    fn builder_sets_timeout() {
        let opts = ClientOptions::default().with_ready_timeout(Duration::from_secs(2));
        assert_eq!(opts.ready_timeout_ms, Some(2000));
    }

    #[test]
    fn oversized_timeout_saturates() {
        let opts = ClientOptions::default().with_ready_timeout(Duration::MAX);
        assert_eq!(opts.ready_timeout_ms, Some(u64::MAX));
    }
}
