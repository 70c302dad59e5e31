pub mod flow;
pub mod store;
pub mod token;

use std::time::SystemTime;

use serde::Serialize;

use crate::config::Settings;
use crate::error::{AppError, AppResult};

use self::flow::{LoginFlow, OAuthConfig};
use self::store::TokenStore;
use self::token::TokenSet;

#[derive(Debug, Serialize)]
pub struct AuthLoginResult {
    pub profile: String,
    pub opened_browser: bool,
    pub authorization_url: String,
    pub email: Option<String>,
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub profile: String,
    pub logged_in: bool,
    pub email: Option<String>,
    pub expired: Option<bool>,
    pub expires_in_seconds: Option<i64>,
    pub has_refresh_token: Option<bool>,
    pub note: Option<String>,
}

#[derive(Debug, Default)]
pub struct AuthService;

impl AuthService {
    pub async fn login<S: TokenStore>(
        profile: &str,
        settings: &Settings,
        store: &S,
    ) -> AppResult<AuthLoginResult> {
        let config = OAuthConfig::from_settings(settings)?;
        let flow = LoginFlow::begin(&config)?;
        let opened_browser = flow::open_browser(&flow.authorization_url);

        if !opened_browser {
            eprintln!(
                "open this URL in your browser to continue login:\n{}",
                flow.authorization_url
            );
        }

        let code = flow.wait_for_callback(&config).await?;
        let mut token = flow::exchange_auth_code(&config, &code, &flow.code_verifier).await?;
        if let Ok(email) = flow::fetch_account_email(&token.access_token).await {
            token.email = email;
        }
        store.save(profile, &token)?;

        Ok(AuthLoginResult {
            profile: profile.to_string(),
            opened_browser,
            authorization_url: flow.authorization_url,
            email: token.email,
            note: "oauth login completed and token stored".to_string(),
        })
    }

    pub async fn refresh<S: TokenStore>(
        profile: &str,
        settings: &Settings,
        store: &S,
    ) -> AppResult<TokenSet> {
        let config = OAuthConfig::from_settings(settings)?;

        let current = store.load(profile)?.ok_or_else(|| {
            AppError::InvalidInput("not logged in. run `voxmail auth login`".to_string())
        })?;

        if !current.is_expired(SystemTime::now()) {
            return Ok(current);
        }

        let refresh_token = current.refresh_token.clone().ok_or_else(|| {
            AppError::Auth("access token expired and no refresh token is stored".to_string())
        })?;

        let mut refreshed = flow::exchange_refresh_token(&config, &refresh_token).await?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token);
        }
        if refreshed.email.is_none() {
            refreshed.email = current.email;
        }

        store.save(profile, &refreshed)?;
        Ok(refreshed)
    }

    pub async fn status<S: TokenStore>(profile: &str, store: &S) -> AppResult<AuthStatus> {
        let Some(token) = store.load(profile)? else {
            return Ok(AuthStatus {
                profile: profile.to_string(),
                logged_in: false,
                email: None,
                expired: None,
                expires_in_seconds: None,
                has_refresh_token: None,
                note: Some("no token found".to_string()),
            });
        };

        let now = SystemTime::now();
        Ok(AuthStatus {
            profile: profile.to_string(),
            logged_in: true,
            email: token.email.clone(),
            expired: Some(token.is_expired(now)),
            expires_in_seconds: token.expires_in_seconds(now),
            has_refresh_token: Some(token.refresh_token.is_some()),
            note: Some("token loaded from local store".to_string()),
        })
    }

    pub async fn logout<S: TokenStore>(profile: &str, store: &S) -> AppResult<AuthStatus> {
        let note = match store.load(profile)? {
            Some(token) => {
                let revokable = token
                    .refresh_token
                    .as_deref()
                    .unwrap_or(token.access_token.as_str());

                match flow::revoke_token(revokable).await {
                    Ok(()) => "remote token revoked and local credentials removed".to_string(),
                    Err(err) => format!("local credentials removed (revoke failed: {err})"),
                }
            }
            None => "local credentials removed".to_string(),
        };

        store.clear(profile)?;

        Ok(AuthStatus {
            profile: profile.to_string(),
            logged_in: false,
            email: None,
            expired: None,
            expires_in_seconds: None,
            has_refresh_token: None,
            note: Some(note),
        })
    }
}
