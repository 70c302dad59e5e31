use std::sync::Mutex;

use async_trait::async_trait;

use voxmail::assistant::model::{EmailSummary, SendReceipt};
use voxmail::assistant::{
    DispatchError, DispatchOutcome, Dispatcher, InboxSession, Intent, Mailbox, Summarizer,
};

#[derive(Debug, Clone, PartialEq)]
struct SentMessage {
    to: String,
    subject: String,
    body: String,
    thread_id: Option<String>,
}

#[derive(Default)]
struct MockMailbox {
    inbox: Vec<EmailSummary>,
    calls: Mutex<Vec<String>>,
    sent: Mutex<Vec<SentMessage>>,
}

impl MockMailbox {
    fn with_inbox(inbox: Vec<EmailSummary>) -> Self {
        Self {
            inbox,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailbox for MockMailbox {
    async fn fetch_inbox_summaries(
        &self,
        max_results: u32,
    ) -> Result<Vec<EmailSummary>, DispatchError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch_inbox:{max_results}"));
        Ok(self.inbox.clone())
    }

    async fn fetch_message_body(&self, id: &str) -> Result<String, DispatchError> {
        self.calls.lock().unwrap().push(format!("fetch_body:{id}"));
        Ok(format!("body of {id}"))
    }

    async fn send_message(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<SendReceipt, DispatchError> {
        self.calls.lock().unwrap().push(format!("send:{to}"));
        self.sent.lock().unwrap().push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            thread_id: None,
        });
        Ok(SendReceipt {
            id: "sent-1".to_string(),
            thread_id: Some("thread-1".to_string()),
        })
    }

    async fn send_reply(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        thread_id: Option<&str>,
    ) -> Result<SendReceipt, DispatchError> {
        self.calls.lock().unwrap().push(format!("reply:{to}"));
        self.sent.lock().unwrap().push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            thread_id: thread_id.map(ToOwned::to_owned),
        });
        Ok(SendReceipt {
            id: "reply-1".to_string(),
            thread_id: thread_id.map(ToOwned::to_owned),
        })
    }
}

struct EchoSummarizer;

#[async_trait]
impl Summarizer for EchoSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, DispatchError> {
        Ok(format!("summary of: {text}"))
    }
}

fn email(id: &str, sender: &str) -> EmailSummary {
    EmailSummary {
        id: id.to_string(),
        thread_id: Some(format!("thread-{id}")),
        sender: sender.to_string(),
        subject: format!("subject {id}"),
        snippet: format!("snippet {id}"),
    }
}

fn inbox(count: usize) -> Vec<EmailSummary> {
    (1..=count)
        .map(|n| email(&format!("m{n}"), "Jane Doe <jane@x.com>"))
        .collect()
}

fn loaded_session(count: usize) -> InboxSession {
    let mut session = InboxSession::new();
    session.replace(inbox(count));
    session
}

#[tokio::test]
async fn read_inbox_replaces_cache_and_resets_cursor() {
    let mailbox = MockMailbox::with_inbox(inbox(3));
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);

    let mut session = loaded_session(5);
    session.jump_to(4).unwrap();

    let outcome = dispatcher
        .dispatch(Intent::ReadInbox, &mut session)
        .await
        .expect("read inbox");

    assert_eq!(session.cursor(), 0);
    assert_eq!(session.len(), 3);
    match outcome {
        DispatchOutcome::ReadInbox { emails, cursor } => {
            assert_eq!(emails.len(), 3);
            assert_eq!(cursor, 0);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(mailbox.calls(), ["fetch_inbox:5"]);
}

#[tokio::test]
async fn read_inbox_accepts_an_empty_fetch() {
    let mailbox = MockMailbox::with_inbox(vec![]);
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);

    let mut session = loaded_session(2);
    dispatcher
        .dispatch(Intent::ReadInbox, &mut session)
        .await
        .expect("empty inbox is still a success");

    assert!(session.is_empty());
    assert_eq!(session.cursor(), 0);
}

#[tokio::test]
async fn cache_requiring_intents_fail_fast_on_empty_session() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);

    let intents = [
        Intent::NextEmail,
        Intent::PreviousEmail,
        Intent::ReadEmailNumber { number: Some(1) },
        Intent::OpenEmail,
        Intent::SummarizeEmail,
        Intent::ReplyEmail {
            message: Some("hi".to_string()),
        },
    ];

    for intent in intents {
        let mut session = InboxSession::new();
        let err = dispatcher
            .dispatch(intent.clone(), &mut session)
            .await
            .expect_err("empty session");
        assert!(matches!(err, DispatchError::EmptyInbox), "{intent:?}");
    }

    // Precondition failures never reach a collaborator.
    assert!(mailbox.calls().is_empty());
}

#[tokio::test]
async fn navigation_saturates_at_both_ends() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = loaded_session(2);

    dispatcher
        .dispatch(Intent::PreviousEmail, &mut session)
        .await
        .expect("retreat at start stays put");
    assert_eq!(session.cursor(), 0);

    dispatcher
        .dispatch(Intent::NextEmail, &mut session)
        .await
        .expect("advance");
    dispatcher
        .dispatch(Intent::NextEmail, &mut session)
        .await
        .expect("advance at end stays put");
    assert_eq!(session.cursor(), 1);
}

#[tokio::test]
async fn out_of_range_number_leaves_cursor_untouched() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = loaded_session(5);
    session.jump_to(2).unwrap();

    let err = dispatcher
        .dispatch(Intent::ReadEmailNumber { number: Some(9) }, &mut session)
        .await
        .expect_err("out of range");

    assert!(matches!(err, DispatchError::OutOfRange { number: 9, len: 5 }));
    assert_eq!(session.cursor(), 1);
    assert!(mailbox.calls().is_empty());
}

#[tokio::test]
async fn missing_number_is_an_invalid_parameter() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = loaded_session(2);

    let err = dispatcher
        .dispatch(Intent::ReadEmailNumber { number: None }, &mut session)
        .await
        .expect_err("no number");
    assert!(matches!(err, DispatchError::InvalidParameter(_)));
}

#[tokio::test]
async fn open_email_fetches_body_for_current_id() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = loaded_session(3);
    session.jump_to(2).unwrap();

    let outcome = dispatcher
        .dispatch(Intent::OpenEmail, &mut session)
        .await
        .expect("open");

    match outcome {
        DispatchOutcome::OpenEmail {
            email,
            cursor,
            body,
        } => {
            assert_eq!(email.id, "m2");
            assert_eq!(cursor, 1);
            assert_eq!(body, "body of m2");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn summarize_pipes_the_body_through_the_summarizer() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = loaded_session(1);

    let outcome = dispatcher
        .dispatch(Intent::SummarizeEmail, &mut session)
        .await
        .expect("summarize");

    match outcome {
        DispatchOutcome::SummarizeEmail { summary, .. } => {
            assert_eq!(summary, "summary of: body of m1");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(mailbox.calls(), ["fetch_body:m1"]);
}

#[tokio::test]
async fn send_rejects_recipient_without_at_sign() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = InboxSession::new();

    let err = dispatcher
        .dispatch(
            Intent::SendEmail {
                recipient: Some("not-an-email".to_string()),
                message: Some("hi".to_string()),
                subject: None,
            },
            &mut session,
        )
        .await
        .expect_err("bad recipient");

    assert!(matches!(err, DispatchError::InvalidRecipient(_)));
    assert!(mailbox.calls().is_empty());
}

#[tokio::test]
async fn send_requires_a_message_body() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = InboxSession::new();

    let err = dispatcher
        .dispatch(
            Intent::SendEmail {
                recipient: Some("a@b.com".to_string()),
                message: None,
                subject: None,
            },
            &mut session,
        )
        .await
        .expect_err("no body");

    assert!(matches!(err, DispatchError::MissingBody));
    assert!(mailbox.calls().is_empty());
}

#[tokio::test]
async fn send_defaults_the_subject() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = InboxSession::new();

    dispatcher
        .dispatch(
            Intent::SendEmail {
                recipient: Some("a@b.com".to_string()),
                message: Some("hello there".to_string()),
                subject: None,
            },
            &mut session,
        )
        .await
        .expect("send");

    let sent = mailbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@b.com");
    assert_eq!(sent[0].subject, "Voice Email Assistant");
    assert_eq!(sent[0].body, "hello there");
}

#[tokio::test]
async fn reply_resolves_angle_bracketed_sender_and_threads() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = loaded_session(2);
    session.jump_to(2).unwrap();

    dispatcher
        .dispatch(
            Intent::ReplyEmail {
                message: Some("sounds good".to_string()),
            },
            &mut session,
        )
        .await
        .expect("reply");

    let sent = mailbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@x.com");
    assert_eq!(sent[0].subject, "subject m2");
    assert_eq!(sent[0].thread_id.as_deref(), Some("thread-m2"));
}

#[tokio::test]
async fn reply_uses_a_bare_sender_verbatim() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);

    let mut session = InboxSession::new();
    session.replace(vec![email("m1", "jane@x.com")]);

    dispatcher
        .dispatch(
            Intent::ReplyEmail {
                message: Some("ok".to_string()),
            },
            &mut session,
        )
        .await
        .expect("reply");

    assert_eq!(mailbox.sent()[0].to, "jane@x.com");
}

#[tokio::test]
async fn reply_rejects_sender_without_an_address() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);

    let mut session = InboxSession::new();
    session.replace(vec![email("m1", "Mail Delivery Subsystem")]);

    let err = dispatcher
        .dispatch(
            Intent::ReplyEmail {
                message: Some("ok".to_string()),
            },
            &mut session,
        )
        .await
        .expect_err("no address");

    assert!(matches!(err, DispatchError::InvalidRecipient(_)));
    assert!(mailbox.calls().is_empty());
}

#[tokio::test]
async fn reply_without_message_never_reads_the_sender() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = loaded_session(1);

    let err = dispatcher
        .dispatch(Intent::ReplyEmail { message: None }, &mut session)
        .await
        .expect_err("no message");

    assert!(matches!(err, DispatchError::MissingBody));
    assert!(mailbox.calls().is_empty());
}

#[tokio::test]
async fn unknown_utterance_surfaces_in_the_error() {
    let mailbox = MockMailbox::default();
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = InboxSession::new();

    let err = dispatcher
        .dispatch_text("play some music", &mut session)
        .await
        .expect_err("unknown");

    match err {
        DispatchError::UnknownIntent(utterance) => assert_eq!(utterance, "play some music"),
        other => panic!("expected unknown intent, got {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_text_runs_the_full_path() {
    let mailbox = MockMailbox::with_inbox(inbox(2));
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 5);
    let mut session = InboxSession::new();

    dispatcher
        .dispatch_text("can you read my inbox please", &mut session)
        .await
        .expect("read inbox");
    assert_eq!(session.len(), 2);

    dispatcher
        .dispatch_text("email number 2", &mut session)
        .await
        .expect("jump");
    assert_eq!(session.cursor(), 1);
}

#[tokio::test]
async fn inbox_limit_is_clamped_before_the_fetch() {
    let mailbox = MockMailbox::with_inbox(inbox(1));
    let dispatcher = Dispatcher::new(&mailbox, &EchoSummarizer, 50);
    let mut session = InboxSession::new();

    dispatcher
        .dispatch(Intent::ReadInbox, &mut session)
        .await
        .expect("read inbox");

    assert_eq!(mailbox.calls(), ["fetch_inbox:10"]);
}
