pub mod dispatch;
pub mod error;
pub mod intent;
pub mod model;
pub mod session;
pub mod store;

pub use dispatch::{DispatchOutcome, Dispatcher, Mailbox, Summarizer};
pub use error::DispatchError;
pub use intent::{Intent, parse};
pub use model::{EmailSummary, SendReceipt};
pub use session::InboxSession;
pub use store::{FileSessionStore, SessionStore};
