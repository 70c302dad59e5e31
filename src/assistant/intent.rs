use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Decoded user goal extracted from one utterance. Optional fields are left
/// unset when the secondary pattern does not match; the dispatcher owns the
/// validation of missing values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    ReadInbox,
    NextEmail,
    PreviousEmail,
    ReadEmailNumber {
        number: Option<u32>,
    },
    OpenEmail,
    SummarizeEmail,
    SendEmail {
        recipient: Option<String>,
        message: Option<String>,
        subject: Option<String>,
    },
    ReplyEmail {
        message: Option<String>,
    },
    Unknown {
        utterance: String,
    },
}

const INBOX_NOUNS: [&str; 4] = ["inbox", "emails", "email", "mails"];
const READ_VERBS: [&str; 4] = ["read", "open", "check", "show"];
const FORWARD_NAV: [&str; 2] = ["next", "forward"];
const BACKWARD_NAV: [&str; 3] = ["previous", "back", "before"];

static NUMBERED_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(email|mail) (number )?(\d+)").unwrap());
static SEND_TO_SAYING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"send email to (.+?) saying (.+)").unwrap());
static REPLY_MESSAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"reply (.+)").unwrap());

/// One entry of the parse cascade. The matcher receives normalized text and
/// returns an intent only when its rule applies.
pub struct Rule {
    pub name: &'static str,
    matcher: fn(&str) -> Option<Intent>,
}

impl Rule {
    pub fn apply(&self, normalized: &str) -> Option<Intent> {
        (self.matcher)(normalized)
    }
}

/// Parse cascade in precedence order, first match wins. The order is load
/// bearing: navigation beats the generic inbox match, and open_email runs
/// before the numbered rule. A spoken number after "open email" never reaches
/// the numbered rule and is discarded.
pub static RULES: &[Rule] = &[
    Rule {
        name: "read_inbox",
        matcher: match_read_inbox,
    },
    Rule {
        name: "next_email",
        matcher: match_next_email,
    },
    Rule {
        name: "previous_email",
        matcher: match_previous_email,
    },
    Rule {
        name: "open_email",
        matcher: match_open_email,
    },
    Rule {
        name: "read_email_number",
        matcher: match_read_email_number,
    },
    Rule {
        name: "send_email",
        matcher: match_send_email,
    },
    Rule {
        name: "summarize_email",
        matcher: match_summarize_email,
    },
    Rule {
        name: "reply_email",
        matcher: match_reply_email,
    },
];

/// Total parse: unparseable or empty input yields `Unknown`.
pub fn parse(text: &str) -> Intent {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Intent::Unknown {
            utterance: normalized,
        };
    }

    RULES
        .iter()
        .find_map(|rule| rule.apply(&normalized))
        .unwrap_or(Intent::Unknown {
            utterance: normalized,
        })
}

/// Lowercase, trim, and collapse common transcription mishearings onto the
/// canonical "inbox" token. Runs before any rule.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .trim()
        .replace("minebox", "inbox")
        .replace("mail box", "inbox")
        .replace("mailbox", "inbox")
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.contains(word))
}

fn match_read_inbox(text: &str) -> Option<Intent> {
    // Both sets must be satisfied; a lone noun or verb is not enough.
    if contains_any(text, &INBOX_NOUNS) && contains_any(text, &READ_VERBS) {
        return Some(Intent::ReadInbox);
    }
    None
}

fn match_next_email(text: &str) -> Option<Intent> {
    contains_any(text, &FORWARD_NAV).then_some(Intent::NextEmail)
}

fn match_previous_email(text: &str) -> Option<Intent> {
    contains_any(text, &BACKWARD_NAV).then_some(Intent::PreviousEmail)
}

fn match_open_email(text: &str) -> Option<Intent> {
    if text.contains("open") && (text.contains("email") || text.contains("mail")) {
        return Some(Intent::OpenEmail);
    }
    None
}

fn match_read_email_number(text: &str) -> Option<Intent> {
    let captures = NUMBERED_EMAIL.captures(text)?;
    let number = captures.get(3)?.as_str().parse().ok();
    Some(Intent::ReadEmailNumber { number })
}

fn match_send_email(text: &str) -> Option<Intent> {
    if !(text.contains("send") && text.contains("email")) {
        return None;
    }

    // Intent stands even when the secondary pattern fails; the dispatcher
    // rejects missing fields.
    let (recipient, message) = match SEND_TO_SAYING.captures(text) {
        Some(captures) => (
            Some(captures[1].trim().to_string()),
            Some(captures[2].trim().to_string()),
        ),
        None => (None, None),
    };

    Some(Intent::SendEmail {
        recipient,
        message,
        subject: None,
    })
}

fn match_summarize_email(text: &str) -> Option<Intent> {
    (text.contains("summarize") || text.contains("summary")).then_some(Intent::SummarizeEmail)
}

fn match_reply_email(text: &str) -> Option<Intent> {
    if !text.contains("reply") {
        return None;
    }

    let message = REPLY_MESSAGE
        .captures(text)
        .map(|captures| captures[1].trim().to_string());
    Some(Intent::ReplyEmail { message })
}
