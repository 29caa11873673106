use crate::error::PayloadError;
use std::fmt;
use std::str::FromStr;

/// Servers seen in WhatsApp Web serialized ids.
pub const USER_SERVER: &str = "c.us";
pub const GROUP_SERVER: &str = "g.us";
pub const BROADCAST_SERVER: &str = "broadcast";
pub const LID_SERVER: &str = "lid";
pub const NEWSLETTER_SERVER: &str = "newsletter";

/// Chat or contact id as the web app serializes it (`user@server`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Jid {
    pub user: String,
    pub server: String,
}

impl Jid {
    pub fn new(user: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            server: server.into(),
        }
    }

    /// Contact JID (`user@c.us`).
    pub fn user(user: impl Into<String>) -> Self {
        Self::new(user, USER_SERVER)
    }

    /// Group JID (`id@g.us`).
    pub fn group(id: impl Into<String>) -> Self {
        Self::new(id, GROUP_SERVER)
    }

    pub fn is_group(&self) -> bool {
        self.server == GROUP_SERVER
    }

    pub fn is_status(&self) -> bool {
        self.server == BROADCAST_SERVER && self.user == "status"
    }
}

impl FromStr for Jid {
    type Err = PayloadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || PayloadError::InvalidJid(s.to_string());
        match s.split_once('@') {
            None if s.is_empty() => Err(invalid()),
            None => Ok(Self::new("", s)),
            Some((user, server)) => {
                if server.is_empty() || server.contains('@') {
                    return Err(invalid());
                }
                // Device suffixes (`user:3@c.us`) address the same chat.
                let user = user.split_once(':').map_or(user, |(u, _)| u);
                Ok(Self::new(user, server))
            }
        }
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.user.is_empty() {
            write!(f, "{}", self.server)
        } else {
            write!(f, "{}@{}", self.user, self.server)
        }
    }
}

impl serde::Serialize for Jid {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Jid {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Jid::from_str(&s).map_err(serde::de::Error::custom)
    }
}
