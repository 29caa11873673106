mod jid;
mod key;
mod record;
mod state;

pub use jid::{Jid, BROADCAST_SERVER, GROUP_SERVER, LID_SERVER, NEWSLETTER_SERVER, USER_SERVER};
pub use key::MessageKey;
pub use record::{InboundRecord, IsNew, MessageType};
pub use state::SessionState;

/// Dedup key for records: the record's identity.
pub type RecordId = MessageKey;
