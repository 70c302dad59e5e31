use serde::{Deserialize, Serialize};

/// One inbox message as cached in the session snapshot. Produced only by the
/// inbox-fetch collaborator; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
    /// Display string, may embed an address as `Name <addr>`.
    pub sender: String,
    pub subject: String,
    pub snippet: String,
}

/// Normalized provider receipt for a sent or replied message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
}
