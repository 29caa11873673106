//! Admission rules for records reported by the store.

use crate::types::{InboundRecord, IsNew};

/// Outcome of classifying an added record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Deliver `MessageAdded` now.
    Admit,
    /// Placeholder; wait for its type to resolve.
    Defer,
    /// Cached replay; deliver nothing.
    Reject,
}

/// Outcome of classifying a removed record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    Emit,
    Suppress,
}

/// Only an explicit `false` marker rejects a record.
pub fn classify_record_admission(record: &InboundRecord) -> Admission {
    match record.is_new {
        IsNew::False => Admission::Reject,
        IsNew::True | IsNew::Unknown if record.msg_type.is_pending() => Admission::Defer,
        IsNew::True | IsNew::Unknown => Admission::Admit,
    }
}

pub fn classify_record_removal(record: &InboundRecord) -> Removal {
    match record.is_new {
        IsNew::False => Removal::Suppress,
        IsNew::True | IsNew::Unknown => Removal::Emit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Jid, MessageKey, MessageType};

    fn record(is_new: IsNew, msg_type: MessageType) -> InboundRecord {
        InboundRecord::new(
            MessageKey::new(false, Jid::user("1"), "X"),
            Jid::user("1"),
            Jid::user("2"),
        )
        .with_is_new(is_new)
        .with_type(msg_type)
    }

    #[test]
    fn explicit_false_is_rejected_even_when_pending() {
        assert_eq!(
            classify_record_admission(&record(IsNew::False, MessageType::Chat)),
            Admission::Reject
        );
        assert_eq!(
            classify_record_admission(&record(IsNew::False, MessageType::Ciphertext)),
            Admission::Reject
        );
    }

    #[test]
    fn unknown_marker_is_admitted() {
        assert_eq!(
            classify_record_admission(&record(IsNew::Unknown, MessageType::Image)),
            Admission::Admit
        );
        assert_eq!(
            classify_record_admission(&record(IsNew::True, MessageType::Chat)),
            Admission::Admit
        );
    }

    #[test]
    fn placeholder_is_deferred() {
        assert_eq!(
            classify_record_admission(&record(IsNew::True, MessageType::Ciphertext)),
            Admission::Defer
        );
        assert_eq!(
            classify_record_admission(&record(IsNew::Unknown, MessageType::Ciphertext)),
            Admission::Defer
        );
    }

    #[test]
    fn removal_suppressed_only_for_explicit_false() {
        assert_eq!(
            classify_record_removal(&record(IsNew::False, MessageType::Chat)),
            Removal::Suppress
        );
        assert_eq!(
            classify_record_removal(&record(IsNew::Unknown, MessageType::Chat)),
            Removal::Emit
        );
        assert_eq!(
            classify_record_removal(&record(IsNew::True, MessageType::Ciphertext)),
            Removal::Emit
        );
    }
}
