use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8787/callback";
const DEFAULT_SUMMARY_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o-mini";
const DEFAULT_INBOX_LIMIT: u32 = 5;

/// Per-profile settings, stored as JSON in the profiles directory. Every field
/// is optional; accessors supply the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub inbox_limit: Option<u32>,
    #[serde(default)]
    pub summary_api_base: Option<String>,
    #[serde(default)]
    pub summary_model: Option<String>,
    #[serde(default)]
    pub summary_api_key: Option<String>,
}

impl Settings {
    pub fn client_id(&self) -> AppResult<&str> {
        self.client_id.as_deref().ok_or_else(|| {
            AppError::Config(
                "missing oauth client_id in profile settings. add it to your profile json"
                    .to_string(),
            )
        })
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn redirect_uri(&self) -> String {
        self.redirect_uri
            .clone()
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string())
    }

    /// Inbox fetch cap, kept small because the results are read out loud.
    pub fn inbox_limit(&self) -> u32 {
        self.inbox_limit.unwrap_or(DEFAULT_INBOX_LIMIT).clamp(1, 10)
    }

    pub fn summary_api_base(&self) -> String {
        self.summary_api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMMARY_API_BASE.to_string())
    }

    pub fn summary_model(&self) -> String {
        self.summary_model
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMMARY_MODEL.to_string())
    }

    pub fn summary_api_key(&self) -> Option<String> {
        self.summary_api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

pub fn load(path: PathBuf) -> AppResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&raw)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_limit_clamps_to_spoken_range() {
        let mut settings = Settings::default();
        assert_eq!(settings.inbox_limit(), 5);

        settings.inbox_limit = Some(0);
        assert_eq!(settings.inbox_limit(), 1);

        settings.inbox_limit = Some(50);
        assert_eq!(settings.inbox_limit(), 10);
    }

    #[test]
    fn missing_client_id_is_a_config_error() {
        let settings = Settings::default();
        assert!(matches!(settings.client_id(), Err(AppError::Config(_))));
    }
}
