use crate::assistant::store::SessionStore;
use crate::assistant::{DispatchOutcome, Dispatcher};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::gmail::GmailMailbox;

/// Run one transcribed utterance against the persisted session.
pub async fn run(ctx: &AppContext, text: &str) -> AppResult<()> {
    let mut session = ctx.session_store.load(&ctx.profile)?;

    let mailbox = GmailMailbox::new(ctx);
    let dispatcher = Dispatcher::new(&mailbox, &ctx.summary_client, ctx.settings.inbox_limit());
    let outcome = dispatcher.dispatch_text(text, &mut session).await?;

    ctx.session_store.save(&ctx.profile, &session)?;
    ctx.output.emit(&render(&outcome), &outcome)
}

/// Text rendering of a dispatch outcome, written to be read aloud.
pub fn render(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::ReadInbox { emails, cursor: _ } => {
            if emails.is_empty() {
                return "your inbox is empty".to_string();
            }

            let mut lines = vec![format!("{} emails in your inbox:", emails.len())];
            for (index, email) in emails.iter().enumerate() {
                lines.push(format!(
                    "{}. from {}: {} — {}",
                    index + 1,
                    email.sender,
                    email.subject,
                    format_preview(&email.snippet)
                ));
            }
            lines.join("\n")
        }
        DispatchOutcome::NextEmail { email, cursor }
        | DispatchOutcome::PreviousEmail { email, cursor }
        | DispatchOutcome::ReadEmailNumber { email, cursor } => {
            format!(
                "email {}: from {}: {} — {}",
                cursor + 1,
                email.sender,
                email.subject,
                format_preview(&email.snippet)
            )
        }
        DispatchOutcome::OpenEmail {
            email,
            cursor,
            body,
        } => {
            format!(
                "email {} from {}: {}\n\n{}",
                cursor + 1,
                email.sender,
                email.subject,
                body
            )
        }
        DispatchOutcome::SummarizeEmail {
            email,
            cursor,
            summary,
        } => {
            format!(
                "summary of email {} ({}): {summary}",
                cursor + 1,
                email.subject
            )
        }
        DispatchOutcome::SendEmail { receipt } => {
            format!("email sent, message id {}", receipt.id)
        }
        DispatchOutcome::ReplyEmail { receipt } => {
            format!("reply sent, message id {}", receipt.id)
        }
    }
}

/// Decode html entities Gmail leaves in snippets and keep previews short.
fn format_preview(snippet: &str) -> String {
    if snippet.is_empty() {
        return "(no preview)".to_string();
    }

    let decoded = html_escape::decode_html_entities(snippet).to_string();
    let compact = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if compact.len() <= 120 {
        return compact;
    }

    let mut end = 120;
    while !compact.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &compact[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::model::{EmailSummary, SendReceipt};

    fn summary() -> EmailSummary {
        EmailSummary {
            id: "m1".to_string(),
            thread_id: None,
            sender: "Jane Doe <jane@x.com>".to_string(),
            subject: "Hello".to_string(),
            snippet: "I&#39;ve got news".to_string(),
        }
    }

    #[test]
    fn renders_empty_inbox() {
        let outcome = DispatchOutcome::ReadInbox {
            emails: vec![],
            cursor: 0,
        };
        assert_eq!(render(&outcome), "your inbox is empty");
    }

    #[test]
    fn renders_numbered_inbox_with_decoded_snippets() {
        let outcome = DispatchOutcome::ReadInbox {
            emails: vec![summary()],
            cursor: 0,
        };
        let text = render(&outcome);
        assert!(text.starts_with("1 emails in your inbox:"));
        assert!(text.contains("1. from Jane Doe <jane@x.com>: Hello — I've got news"));
    }

    #[test]
    fn renders_cursor_one_based() {
        let outcome = DispatchOutcome::NextEmail {
            email: summary(),
            cursor: 2,
        };
        assert!(render(&outcome).starts_with("email 3:"));
    }

    #[test]
    fn renders_send_receipt() {
        let outcome = DispatchOutcome::SendEmail {
            receipt: SendReceipt {
                id: "abc".to_string(),
                thread_id: None,
            },
        };
        assert_eq!(render(&outcome), "email sent, message id abc");
    }

    #[test]
    fn preview_truncates_long_snippets() {
        let long = "word ".repeat(60);
        let preview = format_preview(&long);
        assert!(preview.ends_with("..."));
        assert!(preview.len() <= 123);
    }
}
