use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Build the urlsafe-base64 `raw` payload for messages.send. The assistant
/// only ever sends a plain-text body to a single recipient.
pub fn build_raw_message(to: &str, subject: &str, body: &str) -> String {
    let headers = [
        format!("To: {}", sanitize_header_value(to)),
        format!("Subject: {}", sanitize_header_value(subject)),
        "Content-Type: text/plain; charset=utf-8".to_string(),
    ];

    let payload = format!("{}\r\n\r\n{}", headers.join("\r\n"), body);
    URL_SAFE_NO_PAD.encode(payload.as_bytes())
}

/// Prefix `Re: ` unless the subject already carries it.
pub fn ensure_reply_subject(subject: &str) -> String {
    let trimmed = subject.trim();
    if trimmed.to_ascii_lowercase().starts_with("re:") {
        trimmed.to_string()
    } else {
        format!("Re: {trimmed}")
    }
}

fn sanitize_header_value(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|value| *value != '\r' && *value != '\n')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> String {
        String::from_utf8(URL_SAFE_NO_PAD.decode(raw).expect("base64 decode"))
            .expect("utf8 payload")
    }

    #[test]
    fn builds_plain_text_message() {
        let raw = build_raw_message("dev@example.com", "hello", "hi there");
        let decoded = decode(&raw);

        assert!(decoded.starts_with("To: dev@example.com\r\n"));
        assert!(decoded.contains("Subject: hello\r\n"));
        assert!(decoded.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(decoded.ends_with("\r\n\r\nhi there"));
    }

    #[test]
    fn strips_header_injection_newlines() {
        let raw = build_raw_message("dev@example.com", "hi\r\nBcc: evil@example.com", "body");
        let decoded = decode(&raw);
        assert!(decoded.contains("Subject: hiBcc: evil@example.com"));
        assert!(!decoded.contains("\r\nBcc:"));
    }

    #[test]
    fn reply_subject_is_prefixed_exactly_once() {
        assert_eq!(ensure_reply_subject("Meeting"), "Re: Meeting");
        assert_eq!(ensure_reply_subject("Re: Meeting"), "Re: Meeting");
        assert_eq!(ensure_reply_subject("re: meeting"), "re: meeting");
        assert_eq!(ensure_reply_subject("  RE: x  "), "RE: x");
    }
}
