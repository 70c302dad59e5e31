use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::assistant::{DispatchError, Summarizer};
use crate::config::Settings;

/// Inputs shorter than this are not worth a model round trip.
const MIN_SUMMARIZABLE_CHARS: usize = 50;
const TOO_SHORT_SENTINEL: &str = "Email too short to summarize.";
/// Long bodies are trimmed before prompting.
const MAX_INPUT_CHARS: usize = 2000;
const MAX_SUMMARY_TOKENS: u32 = 150;

/// Summarization collaborator speaking the OpenAI-compatible chat-completions
/// protocol against a configurable endpoint.
#[derive(Debug, Clone)]
pub struct SummaryClient {
    http: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl SummaryClient {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            http: Client::new(),
            api_base: settings.summary_api_base(),
            api_key: settings.summary_api_key(),
            model: settings.summary_model(),
        }
    }
}

#[async_trait]
impl Summarizer for SummaryClient {
    async fn summarize(&self, text: &str) -> Result<String, DispatchError> {
        if text.trim().chars().count() < MIN_SUMMARIZABLE_CHARS {
            return Ok(TOO_SHORT_SENTINEL.to_string());
        }

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            DispatchError::Unavailable(
                "summarizer api key not configured; set summary_api_key in the profile \
                 settings or export OPENAI_API_KEY"
                    .to_string(),
            )
        })?;

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Summarize the following email:\n\n{}",
                    truncate_chars(text, MAX_INPUT_CHARS)
                ),
            }],
            max_tokens: MAX_SUMMARY_TOKENS,
        };

        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() || err.is_connect() {
                    DispatchError::Unavailable(err.to_string())
                } else {
                    DispatchError::Provider(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Provider(format!(
                "summarizer request failed ({status}): {}",
                body.trim()
            )));
        }

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| DispatchError::Provider(err.to_string()))?;

        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|summary| !summary.is_empty())
            .ok_or_else(|| {
                DispatchError::Provider("summarizer returned an empty completion".to_string())
            })
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
