use super::Jid;
use crate::error::PayloadError;
use std::fmt;
use std::str::FromStr;

/// Identity of one message record.
///
/// Serialized by the web app as `{fromMe}_{remote}_{id}`, with a trailing
/// `_{participant}` for messages received in groups.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub from_me: bool,
    pub remote: Jid,
    pub id: String,
    pub participant: Option<Jid>,
}

impl MessageKey {
    pub fn new(from_me: bool, remote: Jid, id: impl Into<String>) -> Self {
        Self {
            from_me,
            remote,
            id: id.into(),
            participant: None,
        }
    }

    pub fn with_participant(mut self, participant: Jid) -> Self {
        self.participant = Some(participant);
        self
    }
}

impl FromStr for MessageKey {
    type Err = PayloadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || PayloadError::InvalidMessageKey(s.to_string());
        let mut parts = s.splitn(4, '_');
        let from_me = match parts.next() {
            Some("true") => true,
            Some("false") => false,
            _ => return Err(invalid()),
        };
        let remote: Jid = parts.next().ok_or_else(invalid)?.parse()?;
        let id = parts.next().filter(|id| !id.is_empty()).ok_or_else(invalid)?;
        let participant = parts.next().map(Jid::from_str).transpose()?;
        Ok(Self {
            from_me,
            remote,
            id: id.to_string(),
            participant,
        })
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.from_me, self.remote, self.id)?;
        if let Some(p) = &self.participant {
            write!(f, "_{}", p)?;
        }
        Ok(())
    }
}

impl serde::Serialize for MessageKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for MessageKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MessageKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}
