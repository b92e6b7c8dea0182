//! Live-connection hub and per-connection outbound mailboxes.

mod connection_hub;
pub mod mailbox;

pub use connection_hub::{ConnectionId, Hub, HubConfig, HubError, Mailbox, MailboxInbox};
pub use mailbox::MailboxError;
