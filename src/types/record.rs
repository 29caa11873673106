//! Message records as reported by the remote store.

use super::{Jid, MessageKey};
use serde::{Deserialize, Serialize};

/// The store's "is new" marker for a record.
///
/// Only an explicit `false` marks a cached replay. The marker is known to read
/// as absent for genuinely new records after the first one in a session, so
/// `Unknown` is never treated as stale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum IsNew {
    True,
    False,
    #[default]
    Unknown,
}

impl From<Option<bool>> for IsNew {
    fn from(v: Option<bool>) -> Self {
        match v {
            Some(true) => Self::True,
            Some(false) => Self::False,
            None => Self::Unknown,
        }
    }
}

impl From<IsNew> for Option<bool> {
    fn from(v: IsNew) -> Self {
        match v {
            IsNew::True => Some(true),
            IsNew::False => Some(false),
            IsNew::Unknown => None,
        }
    }
}

/// Lifecycle type of a message record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    #[default]
    Chat,
    Image,
    Video,
    Audio,
    Ptt,
    Document,
    Sticker,
    Location,
    VCard,
    Revoked,
    /// Encrypted placeholder still waiting to be decrypted.
    Ciphertext,
    Other(String),
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Chat => "chat",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Ptt => "ptt",
            Self::Document => "document",
            Self::Sticker => "sticker",
            Self::Location => "location",
            Self::VCard => "vcard",
            Self::Revoked => "revoked",
            Self::Ciphertext => "ciphertext",
            Self::Other(s) => s,
        }
    }

    /// Whether the record will later change to a concrete type.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Ciphertext)
    }
}

impl From<String> for MessageType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "chat" => Self::Chat,
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "ptt" => Self::Ptt,
            "document" => Self::Document,
            "sticker" => Self::Sticker,
            "location" => Self::Location,
            "vcard" => Self::VCard,
            "revoked" => Self::Revoked,
            "ciphertext" => Self::Ciphertext,
            _ => Self::Other(s),
        }
    }
}

impl From<MessageType> for String {
    fn from(t: MessageType) -> Self {
        match t {
            MessageType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message record from the remote store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRecord {
    pub id: MessageKey,
    #[serde(default)]
    pub is_new: IsNew,
    #[serde(rename = "type", default)]
    pub msg_type: MessageType,
    pub from: Jid,
    pub to: Jid,
    /// Seconds since the Unix epoch.
    #[serde(rename = "t", default)]
    pub timestamp: u64,
    #[serde(default)]
    pub body: Option<String>,
}

impl InboundRecord {
    pub fn new(id: MessageKey, from: Jid, to: Jid) -> Self {
        Self {
            id,
            is_new: IsNew::Unknown,
            msg_type: MessageType::Chat,
            from,
            to,
            timestamp: 0,
            body: None,
        }
    }

    pub fn from_me(&self) -> bool {
        self.id.from_me
    }

    pub fn with_is_new(mut self, is_new: IsNew) -> Self {
        self.is_new = is_new;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_type(mut self, msg_type: MessageType) -> Self {
        self.msg_type = msg_type;
        self
    }
}
