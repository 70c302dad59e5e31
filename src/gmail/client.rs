use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::assistant::model::{EmailSummary, SendReceipt};
use crate::error::{AppError, AppResult};

use super::wire;

const GMAIL_API_BASE_URL: &str = "https://gmail.googleapis.com";

#[derive(Debug, Clone)]
pub struct GmailClient {
    http: Client,
    base_url: String,
}

impl GmailClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            base_url: GMAIL_API_BASE_URL.to_string(),
        }
    }

    /// List the newest inbox messages, most recent first, mapped to the
    /// assistant's summary shape. One metadata fetch per listed id.
    pub async fn list_inbox(
        &self,
        access_token: &str,
        max_results: u32,
    ) -> AppResult<Vec<EmailSummary>> {
        let query = wire::inbox_list_query(max_results);
        let listing: GmailMessageListResource = self
            .get_json(wire::list_endpoint(), access_token, Some(&query))
            .await?;

        let mut summaries = Vec::new();
        for entry in listing.messages.unwrap_or_default() {
            let endpoint = wire::message_endpoint(&entry.id);
            let query = wire::metadata_query();
            let resource: GmailMessageResource =
                self.get_json(&endpoint, access_token, Some(&query)).await?;
            summaries.push(resource.into_summary());
        }

        Ok(summaries)
    }

    /// Fetch the full message and extract the first text/plain body part.
    /// Falls back to the snippet when no body is extractable.
    pub async fn fetch_body(&self, id: &str, access_token: &str) -> AppResult<String> {
        let endpoint = wire::message_endpoint(id);
        let query = wire::full_query();
        let resource: GmailMessageResource =
            self.get_json(&endpoint, access_token, Some(&query)).await?;

        let snippet = resource.snippet.clone().unwrap_or_default();
        let Some(payload) = resource.payload else {
            return Ok(snippet);
        };

        match extract_plain_text(&payload) {
            Some(body) => Ok(body),
            None => Ok(snippet),
        }
    }

    pub async fn send(
        &self,
        raw_message: &str,
        thread_id: Option<&str>,
        access_token: &str,
    ) -> AppResult<SendReceipt> {
        let request = GmailSendRequest {
            raw: raw_message.to_string(),
            thread_id: thread_id.map(ToOwned::to_owned),
        };
        let response: GmailSendResponse = self
            .post_json(wire::send_endpoint(), access_token, &request)
            .await?;

        Ok(SendReceipt {
            id: response.id,
            thread_id: response.thread_id,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
        query: Option<&[(String, String)]>,
    ) -> AppResult<T> {
        let url = self.endpoint_url(endpoint)?;
        let mut request = self.http.get(url).bearer_auth(access_token);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        self.parse_json_response(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        access_token: &str,
        body: &B,
    ) -> AppResult<T> {
        let url = self.endpoint_url(endpoint)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        self.parse_json_response(response).await
    }

    fn endpoint_url(&self, endpoint: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_path(endpoint.trim_start_matches('/'));
        Ok(url)
    }

    async fn parse_json_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_api_error(status, &body))
    }
}

impl Default for GmailClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct GmailMessageResource {
    id: String,
    #[serde(rename = "threadId")]
    thread_id: Option<String>,
    snippet: Option<String>,
    payload: Option<GmailMessagePart>,
}

impl GmailMessageResource {
    fn into_summary(self) -> EmailSummary {
        let headers = self
            .payload
            .and_then(|payload| payload.headers)
            .unwrap_or_default();

        EmailSummary {
            id: self.id,
            thread_id: self.thread_id,
            sender: header_value(&headers, "From").unwrap_or_else(|| "Unknown".to_string()),
            subject: header_value(&headers, "Subject")
                .unwrap_or_else(|| "No subject".to_string()),
            snippet: self.snippet.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GmailMessagePart {
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    headers: Option<Vec<GmailMessageHeader>>,
    body: Option<GmailPartBody>,
    parts: Option<Vec<GmailMessagePart>>,
}

#[derive(Debug, Deserialize)]
struct GmailPartBody {
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmailMessageHeader {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct GmailMessageListResource {
    messages: Option<Vec<GmailMessageListEntry>>,
}

#[derive(Debug, Deserialize)]
struct GmailMessageListEntry {
    id: String,
}

#[derive(Debug, Serialize)]
struct GmailSendRequest {
    raw: String,
    #[serde(rename = "threadId", skip_serializing_if = "Option::is_none")]
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmailSendResponse {
    id: String,
    #[serde(rename = "threadId")]
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmailApiErrorEnvelope {
    error: GmailApiError,
}

#[derive(Debug, Deserialize)]
struct GmailApiError {
    code: Option<u16>,
    status: Option<String>,
    message: Option<String>,
}

fn header_value(headers: &[GmailMessageHeader], target: &str) -> Option<String> {
    headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case(target))
        .map(|header| header.value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Depth-first walk for the first text/plain part carrying data. The top-level
/// payload body wins when present.
fn extract_plain_text(payload: &GmailMessagePart) -> Option<String> {
    if let Some(data) = payload.body.as_ref().and_then(|body| body.data.as_deref()) {
        return decode_body_data(data);
    }

    walk_parts(payload.parts.as_deref()?)
}

fn walk_parts(parts: &[GmailMessagePart]) -> Option<String> {
    for part in parts {
        if part.mime_type.as_deref() == Some("text/plain") {
            if let Some(data) = part.body.as_ref().and_then(|body| body.data.as_deref()) {
                if let Some(decoded) = decode_body_data(data) {
                    return Some(decoded);
                }
            }
        }

        if let Some(nested) = part.parts.as_deref().and_then(walk_parts) {
            return Some(nested);
        }
    }

    None
}

fn decode_body_data(data: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn map_api_error(status: StatusCode, body: &str) -> AppError {
    let message = parse_api_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "no error details in response body".to_string()
        } else {
            body.to_string()
        }
    });

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return AppError::Auth(format!(
            "gmail api authorization failed ({status}): {message}. run `voxmail auth login`"
        ));
    }

    AppError::Api(format!("gmail api request failed ({status}): {message}"))
}

fn parse_api_error_message(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<GmailApiErrorEnvelope>(body).ok()?;
    let mut parts = Vec::new();

    if let Some(message) = envelope.error.message {
        parts.push(message);
    }

    if let Some(status) = envelope.error.status {
        parts.push(format!("status={status}"));
    }

    if let Some(code) = envelope.error.code {
        parts.push(format!("code={code}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}
