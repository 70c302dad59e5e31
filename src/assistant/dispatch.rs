use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;

use super::error::DispatchError;
use super::intent::{self, Intent};
use super::model::{EmailSummary, SendReceipt};
use super::session::InboxSession;

const DEFAULT_SUBJECT: &str = "Voice Email Assistant";

static ANGLE_ADDR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([^>]+)>").unwrap());

/// Mail-provider capability consumed by the dispatcher. Implemented by the
/// Gmail client adapter; mocked in tests.
#[async_trait]
pub trait Mailbox: Send + Sync {
    async fn fetch_inbox_summaries(
        &self,
        max_results: u32,
    ) -> Result<Vec<EmailSummary>, DispatchError>;
    async fn fetch_message_body(&self, id: &str) -> Result<String, DispatchError>;
    async fn send_message(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<SendReceipt, DispatchError>;
    async fn send_reply(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        thread_id: Option<&str>,
    ) -> Result<SendReceipt, DispatchError>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, DispatchError>;
}

/// Success payload, tagged with the acting intent. Carries the resulting
/// cursor and the email at the cursor where applicable.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum DispatchOutcome {
    ReadInbox {
        emails: Vec<EmailSummary>,
        cursor: usize,
    },
    NextEmail {
        email: EmailSummary,
        cursor: usize,
    },
    PreviousEmail {
        email: EmailSummary,
        cursor: usize,
    },
    ReadEmailNumber {
        email: EmailSummary,
        cursor: usize,
    },
    OpenEmail {
        email: EmailSummary,
        cursor: usize,
        body: String,
    },
    SummarizeEmail {
        email: EmailSummary,
        cursor: usize,
        summary: String,
    },
    SendEmail {
        receipt: SendReceipt,
    },
    ReplyEmail {
        receipt: SendReceipt,
    },
}

/// Resolves one intent against the session: validates preconditions, issues at
/// most the collaborator calls the variant needs, and mutates the session it
/// exclusively owns for the duration of the call. Never retries.
pub struct Dispatcher<'a> {
    mailbox: &'a dyn Mailbox,
    summarizer: &'a dyn Summarizer,
    inbox_limit: u32,
}

impl<'a> Dispatcher<'a> {
    pub fn new(mailbox: &'a dyn Mailbox, summarizer: &'a dyn Summarizer, inbox_limit: u32) -> Self {
        Self {
            mailbox,
            summarizer,
            inbox_limit: inbox_limit.clamp(1, 10),
        }
    }

    /// Parse free-form utterance text, then dispatch the resulting intent.
    pub async fn dispatch_text(
        &self,
        text: &str,
        session: &mut InboxSession,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch(intent::parse(text), session).await
    }

    pub async fn dispatch(
        &self,
        intent: Intent,
        session: &mut InboxSession,
    ) -> Result<DispatchOutcome, DispatchError> {
        if requires_cache(&intent) && session.is_empty() {
            return Err(DispatchError::EmptyInbox);
        }

        match intent {
            Intent::ReadInbox => self.read_inbox(session).await,
            Intent::NextEmail => {
                session.advance();
                Ok(DispatchOutcome::NextEmail {
                    email: session.current()?.clone(),
                    cursor: session.cursor(),
                })
            }
            Intent::PreviousEmail => {
                session.retreat();
                Ok(DispatchOutcome::PreviousEmail {
                    email: session.current()?.clone(),
                    cursor: session.cursor(),
                })
            }
            Intent::ReadEmailNumber { number } => {
                let number = number.ok_or_else(|| {
                    DispatchError::InvalidParameter(
                        "no valid email number provided. say: 'email 2' or 'email number 2'"
                            .to_string(),
                    )
                })?;
                session.jump_to(number)?;
                Ok(DispatchOutcome::ReadEmailNumber {
                    email: session.current()?.clone(),
                    cursor: session.cursor(),
                })
            }
            Intent::OpenEmail => self.open_email(session).await,
            Intent::SummarizeEmail => self.summarize_email(session).await,
            Intent::SendEmail {
                recipient,
                message,
                subject,
            } => self.send_email(recipient, message, subject).await,
            Intent::ReplyEmail { message } => self.reply_email(message, session).await,
            Intent::Unknown { utterance } => Err(DispatchError::UnknownIntent(utterance)),
        }
    }

    async fn read_inbox(
        &self,
        session: &mut InboxSession,
    ) -> Result<DispatchOutcome, DispatchError> {
        let emails = self.mailbox.fetch_inbox_summaries(self.inbox_limit).await?;
        // Replace even when the fetch comes back empty.
        session.replace(emails);
        Ok(DispatchOutcome::ReadInbox {
            emails: session.emails().to_vec(),
            cursor: session.cursor(),
        })
    }

    async fn open_email(&self, session: &InboxSession) -> Result<DispatchOutcome, DispatchError> {
        let email = session.current()?.clone();
        let body = self.mailbox.fetch_message_body(current_id(&email)?).await?;
        Ok(DispatchOutcome::OpenEmail {
            email,
            cursor: session.cursor(),
            body,
        })
    }

    async fn summarize_email(
        &self,
        session: &InboxSession,
    ) -> Result<DispatchOutcome, DispatchError> {
        let email = session.current()?.clone();
        let body = self.mailbox.fetch_message_body(current_id(&email)?).await?;
        let summary = self.summarizer.summarize(&body).await?;
        Ok(DispatchOutcome::SummarizeEmail {
            email,
            cursor: session.cursor(),
            summary,
        })
    }

    async fn send_email(
        &self,
        recipient: Option<String>,
        message: Option<String>,
        subject: Option<String>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let recipient = recipient.filter(|to| !to.trim().is_empty()).ok_or_else(|| {
            DispatchError::InvalidRecipient("no recipient given".to_string())
        })?;
        if !recipient.contains('@') {
            return Err(DispatchError::InvalidRecipient(format!(
                "recipient must be an email address, got `{recipient}`"
            )));
        }

        let message = message
            .filter(|body| !body.trim().is_empty())
            .ok_or(DispatchError::MissingBody)?;
        let subject = subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        let receipt = self
            .mailbox
            .send_message(&recipient, &subject, &message)
            .await?;
        Ok(DispatchOutcome::SendEmail { receipt })
    }

    async fn reply_email(
        &self,
        message: Option<String>,
        session: &InboxSession,
    ) -> Result<DispatchOutcome, DispatchError> {
        let message = message
            .filter(|body| !body.trim().is_empty())
            .ok_or(DispatchError::MissingBody)?;

        let current = session.current()?.clone();
        let to = reply_address(&current.sender);
        if !to.contains('@') {
            return Err(DispatchError::InvalidRecipient(format!(
                "could not extract a valid address from sender `{}`",
                current.sender
            )));
        }

        let receipt = self
            .mailbox
            .send_reply(&to, &current.subject, &message, current.thread_id.as_deref())
            .await?;
        Ok(DispatchOutcome::ReplyEmail { receipt })
    }
}

fn requires_cache(intent: &Intent) -> bool {
    matches!(
        intent,
        Intent::NextEmail
            | Intent::PreviousEmail
            | Intent::ReadEmailNumber { .. }
            | Intent::OpenEmail
            | Intent::SummarizeEmail
            | Intent::ReplyEmail { .. }
    )
}

fn current_id(email: &EmailSummary) -> Result<&str, DispatchError> {
    // Structurally the id is always present; guard anyway before the wire call.
    if email.id.is_empty() {
        return Err(DispatchError::MissingMessageId);
    }
    Ok(&email.id)
}

/// Resolve the reply address from a display sender: the angle-bracket capture
/// when present, otherwise the raw field.
pub fn reply_address(sender: &str) -> String {
    ANGLE_ADDR
        .captures(sender)
        .map(|captures| captures[1].to_string())
        .unwrap_or_else(|| sender.to_string())
}
