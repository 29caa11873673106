use crate::error::PayloadError;
use crate::types::{InboundRecord, MessageKey, MessageType, SessionState};
use serde::{Deserialize, Serialize};

/// Notification reported by the script injected into the web page.
///
/// ```json
/// {"kind": "sync", "synced": true}
/// {"kind": "add", "record": {"id": "false_1@c.us_AB", "isNew": true, ...}}
/// {"kind": "change_type", "id": "false_1@c.us_AB", "type": "chat"}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageNotification {
    /// Sync flag changed. The page reports `undefined` as a missing field.
    Sync {
        #[serde(default)]
        synced: Option<bool>,
    },
    Add {
        record: InboundRecord,
    },
    Remove {
        record: InboundRecord,
    },
    ChangeType {
        id: MessageKey,
        #[serde(rename = "type")]
        msg_type: MessageType,
    },
    State {
        state: SessionState,
    },
}

impl PageNotification {
    pub fn from_json(payload: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(payload)?)
    }
}
