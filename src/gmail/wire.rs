pub fn message_endpoint(id: &str) -> String {
    format!("/gmail/v1/users/me/messages/{id}")
}

pub fn list_endpoint() -> &'static str {
    "/gmail/v1/users/me/messages"
}

pub fn send_endpoint() -> &'static str {
    "/gmail/v1/users/me/messages/send"
}

pub fn metadata_query() -> Vec<(String, String)> {
    let mut query = vec![("format".to_string(), "metadata".to_string())];

    for header in ["From", "Subject"] {
        query.push(("metadataHeaders".to_string(), header.to_string()));
    }

    query
}

pub fn full_query() -> Vec<(String, String)> {
    vec![("format".to_string(), "full".to_string())]
}

pub fn inbox_list_query(max_results: u32) -> Vec<(String, String)> {
    vec![
        ("labelIds".to_string(), "INBOX".to_string()),
        ("maxResults".to_string(), max_results.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_list_query_pins_label_and_cap() {
        let query = inbox_list_query(5);
        assert!(query.contains(&("labelIds".to_string(), "INBOX".to_string())));
        assert!(query.contains(&("maxResults".to_string(), "5".to_string())));
    }

    #[test]
    fn metadata_query_requests_sender_and_subject() {
        let query = metadata_query();
        let headers: Vec<&str> = query
            .iter()
            .filter(|(key, _)| key == "metadataHeaders")
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(headers, ["From", "Subject"]);
    }
}
