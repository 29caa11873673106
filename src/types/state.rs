use serde::{Deserialize, Serialize};

/// Connection state of the web session, as reported by the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Conflict,
    Connected,
    DeprecatedVersion,
    Opening,
    Pairing,
    Proxyblock,
    SmbTosBlock,
    Timeout,
    TosBlock,
    Unlaunched,
    Unpaired,
    UnpairedIdle,
    #[serde(other)]
    Unknown,
}

impl SessionState {
    /// States after which the session no longer delivers events.
    pub fn is_disconnected(&self) -> bool {
        matches!(
            self,
            Self::Conflict | Self::Unlaunched | Self::Unpaired | Self::UnpairedIdle
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_page_state_names() {
        let s: SessionState = serde_json::from_str("\"UNPAIRED_IDLE\"").unwrap();
        assert_eq!(s, SessionState::UnpairedIdle);
        assert!(s.is_disconnected());
        let s: SessionState = serde_json::from_str("\"SMB_TOS_BLOCK\"").unwrap();
        assert_eq!(s, SessionState::SmbTosBlock);
        assert!(!SessionState::Connected.is_disconnected());
    }

    #[test]
    fn unrecognised_state_is_unknown() {
        let s: SessionState = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(s, SessionState::Unknown);
    }
}
