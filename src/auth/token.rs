use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at_unix: Option<u64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub email: Option<String>,
}

impl TokenSet {
    const EXPIRY_SKEW_SECS: u64 = 30;

    pub fn is_expired(&self, now: SystemTime) -> bool {
        let Some(expires_at) = self.expires_at_unix else {
            return false;
        };

        let Ok(duration) = now.duration_since(UNIX_EPOCH) else {
            return false;
        };

        duration.as_secs().saturating_add(Self::EXPIRY_SKEW_SECS) >= expires_at
    }

    pub fn expires_in_seconds(&self, now: SystemTime) -> Option<i64> {
        let expires_at = self.expires_at_unix? as i64;
        let now_secs = now.duration_since(UNIX_EPOCH).ok()?.as_secs() as i64;
        Some(expires_at - now_secs)
    }
}

pub fn expires_at_unix(expires_in: Option<u64>) -> Option<u64> {
    let expires_in = expires_in?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(now.saturating_add(expires_in))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at_unix: Option<u64>) -> TokenSet {
        TokenSet {
            access_token: "at".to_string(),
            refresh_token: None,
            expires_at_unix,
            token_type: None,
            scope: None,
            email: None,
        }
    }

    #[test]
    fn token_without_expiry_never_expires() {
        assert!(!token(None).is_expired(SystemTime::now()));
    }

    #[test]
    fn expiry_applies_clock_skew() {
        let now = SystemTime::now();
        let now_secs = now.duration_since(UNIX_EPOCH).unwrap().as_secs();

        // Expires within the skew window: already considered expired.
        assert!(token(Some(now_secs + 10)).is_expired(now));
        assert!(!token(Some(now_secs + 3600)).is_expired(now));
    }

    #[test]
    fn expires_in_counts_down() {
        let now = SystemTime::now();
        let now_secs = now.duration_since(UNIX_EPOCH).unwrap().as_secs();
        let token = token(Some(now_secs + 120));
        let remaining = token.expires_in_seconds(now).unwrap();
        assert!((118..=120).contains(&remaining));
    }
}
