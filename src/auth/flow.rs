use std::collections::HashMap;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time;
use url::Url;

use crate::config::Settings;
use crate::error::{AppError, AppResult};

use super::token::{TokenSet, expires_at_unix};

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_REVOKE_ENDPOINT: &str = "https://oauth2.googleapis.com/revoke";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const CALLBACK_TIMEOUT_SECS: u64 = 180;
// Read + send cover everything the assistant does; openid/email identify the
// account in `auth status`.
const OAUTH_SCOPES: &str = "https://www.googleapis.com/auth/gmail.readonly \
    https://www.googleapis.com/auth/gmail.send openid email";

#[derive(Debug)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

impl OAuthConfig {
    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        Ok(Self {
            client_id: settings.client_id()?.to_string(),
            client_secret: settings.client_secret().map(ToOwned::to_owned),
            redirect_uri: settings.redirect_uri(),
        })
    }
}

/// In-flight PKCE authorization: the URL the user must visit plus the secrets
/// needed to finish the exchange.
#[derive(Debug)]
pub struct LoginFlow {
    pub authorization_url: String,
    pub code_verifier: String,
    state: String,
}

impl LoginFlow {
    pub fn begin(config: &OAuthConfig) -> AppResult<Self> {
        let state = random_token(32);
        let code_verifier = random_token(96);
        let code_challenge = pkce_challenge(&code_verifier);

        let mut url = Url::parse(GOOGLE_AUTH_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("scope", OAUTH_SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", &state)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(Self {
            authorization_url: url.to_string(),
            code_verifier,
            state,
        })
    }

    /// Capture the authorization code on the loopback redirect.
    pub async fn wait_for_callback(&self, config: &OAuthConfig) -> AppResult<String> {
        let redirect = Url::parse(&config.redirect_uri)?;
        if redirect.scheme() != "http" {
            return Err(AppError::Config(
                "redirect_uri must use http for local callback capture".to_string(),
            ));
        }

        let host = redirect
            .host_str()
            .ok_or_else(|| AppError::Config("redirect_uri is missing host".to_string()))?;
        let port = redirect
            .port_or_known_default()
            .ok_or_else(|| AppError::Config("redirect_uri is missing port".to_string()))?;
        let path = redirect.path().to_string();

        let listener = TcpListener::bind((host, port)).await.map_err(|err| {
            AppError::Auth(format!(
                "failed to bind oauth callback listener on {host}:{port}: {err}"
            ))
        })?;

        let code = time::timeout(Duration::from_secs(CALLBACK_TIMEOUT_SECS), async {
            let (mut stream, _) = listener.accept().await?;

            let mut buf = vec![0_u8; 8192];
            let size = stream.read(&mut buf).await?;
            if size == 0 {
                return Err(AppError::Auth("empty oauth callback request".to_string()));
            }

            let request = String::from_utf8_lossy(&buf[..size]);
            let request_line = request
                .lines()
                .next()
                .ok_or_else(|| AppError::Auth("malformed oauth callback request".to_string()))?;

            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default();
            let target = parts.next().unwrap_or_default();

            if method != "GET" {
                respond(
                    &mut stream,
                    "405 Method Not Allowed",
                    "oauth callback only accepts GET requests",
                )
                .await?;
                return Err(AppError::Auth(
                    "oauth callback received non-GET request".to_string(),
                ));
            }

            match extract_callback_code(target, &path, &self.state) {
                Ok(code) => {
                    respond(
                        &mut stream,
                        "200 OK",
                        "voxmail auth complete. you can return to the terminal.",
                    )
                    .await?;
                    Ok(code)
                }
                Err(err) => {
                    let _ = respond(
                        &mut stream,
                        "400 Bad Request",
                        &format!("oauth callback error: {err}"),
                    )
                    .await;
                    Err(err)
                }
            }
        })
        .await
        .map_err(|_| AppError::Auth("timed out waiting for oauth callback".to_string()))??;

        Ok(code)
    }
}

pub async fn exchange_auth_code(
    config: &OAuthConfig,
    code: &str,
    code_verifier: &str,
) -> AppResult<TokenSet> {
    let mut form = HashMap::from([
        ("grant_type", "authorization_code".to_string()),
        ("code", code.to_string()),
        ("client_id", config.client_id.clone()),
        ("redirect_uri", config.redirect_uri.clone()),
        ("code_verifier", code_verifier.to_string()),
    ]);

    if let Some(client_secret) = &config.client_secret {
        form.insert("client_secret", client_secret.clone());
    }

    let response = reqwest::Client::new()
        .post(GOOGLE_TOKEN_ENDPOINT)
        .form(&form)
        .send()
        .await?;

    parse_token_response(response).await
}

pub async fn exchange_refresh_token(
    config: &OAuthConfig,
    refresh_token: &str,
) -> AppResult<TokenSet> {
    let mut form = HashMap::from([
        ("grant_type", "refresh_token".to_string()),
        ("refresh_token", refresh_token.to_string()),
        ("client_id", config.client_id.clone()),
    ]);

    if let Some(client_secret) = &config.client_secret {
        form.insert("client_secret", client_secret.clone());
    }

    let response = reqwest::Client::new()
        .post(GOOGLE_TOKEN_ENDPOINT)
        .form(&form)
        .send()
        .await?;

    let mut token = parse_token_response(response).await?;
    if token.refresh_token.is_none() {
        token.refresh_token = Some(refresh_token.to_string());
    }

    Ok(token)
}

pub async fn fetch_account_email(access_token: &str) -> AppResult<Option<String>> {
    let response = reqwest::Client::new()
        .get(GOOGLE_USERINFO_ENDPOINT)
        .bearer_auth(access_token)
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let payload: UserInfoResponse = response.json().await?;
    Ok(payload.email)
}

pub async fn revoke_token(token: &str) -> AppResult<()> {
    let response = reqwest::Client::new()
        .post(GOOGLE_REVOKE_ENDPOINT)
        .form(&HashMap::from([("token", token.to_string())]))
        .send()
        .await?;

    if response.status().is_success() {
        return Ok(());
    }

    Err(AppError::Auth(format!(
        "revoke endpoint returned {}",
        response.status()
    )))
}

pub fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    {
        return std::process::Command::new("open")
            .arg(url)
            .status()
            .is_ok_and(|status| status.success());
    }

    #[cfg(target_os = "linux")]
    {
        return std::process::Command::new("xdg-open")
            .arg(url)
            .status()
            .is_ok_and(|status| status.success());
    }

    #[cfg(target_os = "windows")]
    {
        return std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .status()
            .is_ok_and(|status| status.success());
    }

    #[allow(unreachable_code)]
    false
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    token_type: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: Option<String>,
}

async fn parse_token_response(response: reqwest::Response) -> AppResult<TokenSet> {
    if response.status().is_success() {
        let payload: OAuthTokenResponse = response.json().await?;
        return Ok(TokenSet {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
            expires_at_unix: expires_at_unix(payload.expires_in),
            token_type: payload.token_type,
            scope: payload.scope,
            email: None,
        });
    }

    let status = response.status();
    let body = response.text().await?;
    if let Ok(err_payload) = serde_json::from_str::<OAuthErrorResponse>(&body) {
        let error = err_payload
            .error
            .unwrap_or_else(|| "unknown_oauth_error".to_string());
        let description = err_payload
            .error_description
            .unwrap_or_else(|| "no description".to_string());
        return Err(AppError::Auth(format!(
            "oauth token exchange failed ({status}): {error} ({description})"
        )));
    }

    Err(AppError::Auth(format!(
        "oauth token exchange failed ({status}): {body}"
    )))
}

fn extract_callback_code(
    target: &str,
    expected_path: &str,
    expected_state: &str,
) -> AppResult<String> {
    let callback_url = Url::parse(&format!("http://localhost{target}"))?;
    if callback_url.path() != expected_path {
        return Err(AppError::Auth(format!(
            "oauth callback path mismatch: expected {expected_path}, got {}",
            callback_url.path()
        )));
    }

    let mut code = None;
    let mut state = None;
    let mut oauth_error = None;
    let mut oauth_error_description = None;

    for (key, value) in callback_url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.to_string()),
            "state" => state = Some(value.to_string()),
            "error" => oauth_error = Some(value.to_string()),
            "error_description" => oauth_error_description = Some(value.to_string()),
            _ => {}
        }
    }

    if let Some(error) = oauth_error {
        let description = oauth_error_description.unwrap_or_else(|| "no description".to_string());
        return Err(AppError::Auth(format!(
            "oauth authorization failed: {error} ({description})"
        )));
    }

    let received_state = state
        .ok_or_else(|| AppError::Auth("oauth callback missing state parameter".to_string()))?;
    if received_state != expected_state {
        return Err(AppError::Auth(
            "oauth state mismatch; aborting login".to_string(),
        ));
    }

    code.ok_or_else(|| AppError::Auth("oauth callback missing code parameter".to_string()))
}

async fn respond(
    stream: &mut tokio::net::TcpStream,
    status: &str,
    message: &str,
) -> AppResult<()> {
    let body = format!(
        "<!doctype html><html><body><p>{}</p></body></html>",
        html_escape::encode_safe(message)
    );

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0_u8; len];
    rand::thread_rng().fill(bytes.as_mut_slice());
    URL_SAFE_NO_PAD.encode(bytes)
}

fn pkce_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
