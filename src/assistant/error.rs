use thiserror::Error;

/// Failure taxonomy for the dispatch core. Every variant is recoverable at the
/// request boundary; nothing here is retried internally.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("inbox empty. say 'read my inbox' first")]
    EmptyInbox,
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("email number must be between 1 and {len}, got {number}")]
    OutOfRange { number: u32, len: usize },
    #[error("no message id found for current email")]
    MissingMessageId,
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("missing message body")]
    MissingBody,
    #[error("unknown intent: {0}")]
    UnknownIntent(String),
    #[error("authorization required: {0}")]
    AuthRequired(String),
    #[error("mail provider error: {0}")]
    Provider(String),
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}
