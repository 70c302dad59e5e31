pub mod client;
pub mod mailbox;
pub mod mime;
pub mod wire;

pub use client::GmailClient;
pub use mailbox::GmailMailbox;
