use async_trait::async_trait;

use crate::assistant::model::{EmailSummary, SendReceipt};
use crate::assistant::{DispatchError, Mailbox};
use crate::context::AppContext;
use crate::error::AppError;

use super::mime;

/// Mail-provider adapter backed by the Gmail REST client. Resolves the access
/// token (refreshing when expired) on every call, so an expired session
/// surfaces as `AuthRequired` rather than a stale-token provider error.
pub struct GmailMailbox<'a> {
    ctx: &'a AppContext,
}

impl<'a> GmailMailbox<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    async fn access_token(&self) -> Result<String, DispatchError> {
        self.ctx.access_token().await.map_err(into_dispatch_error)
    }
}

#[async_trait]
impl Mailbox for GmailMailbox<'_> {
    async fn fetch_inbox_summaries(
        &self,
        max_results: u32,
    ) -> Result<Vec<EmailSummary>, DispatchError> {
        let access_token = self.access_token().await?;
        self.ctx
            .gmail_client
            .list_inbox(&access_token, max_results)
            .await
            .map_err(into_dispatch_error)
    }

    async fn fetch_message_body(&self, id: &str) -> Result<String, DispatchError> {
        let access_token = self.access_token().await?;
        self.ctx
            .gmail_client
            .fetch_body(id, &access_token)
            .await
            .map_err(into_dispatch_error)
    }

    async fn send_message(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<SendReceipt, DispatchError> {
        let access_token = self.access_token().await?;
        let raw = mime::build_raw_message(to, subject, body);
        self.ctx
            .gmail_client
            .send(&raw, None, &access_token)
            .await
            .map_err(into_dispatch_error)
    }

    async fn send_reply(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        thread_id: Option<&str>,
    ) -> Result<SendReceipt, DispatchError> {
        let access_token = self.access_token().await?;
        let raw = mime::build_raw_message(to, &mime::ensure_reply_subject(subject), body);
        self.ctx
            .gmail_client
            .send(&raw, thread_id, &access_token)
            .await
            .map_err(into_dispatch_error)
    }
}

/// Classify shell-level failures into the dispatch taxonomy. Auth failures
/// (including a missing local token) must surface re-authentication
/// instructions; transport failures are retryable by the caller.
fn into_dispatch_error(err: AppError) -> DispatchError {
    match err {
        AppError::Auth(message) | AppError::InvalidInput(message) => {
            DispatchError::AuthRequired(message)
        }
        AppError::Http(err) if err.is_timeout() || err.is_connect() => {
            DispatchError::Unavailable(err.to_string())
        }
        other => DispatchError::Provider(other.to_string()),
    }
}
