use crate::assistant::FileSessionStore;
use crate::auth::AuthService;
use crate::auth::store::{FileTokenStore, TokenStore};
use crate::config::{self, AppPaths, Settings};
use crate::error::{AppError, AppResult};
use crate::gmail::GmailClient;
use crate::output::Output;
use crate::summarize::SummaryClient;

#[derive(Debug)]
pub struct AppContext {
    pub profile: String,
    pub verbose: u8,
    pub paths: AppPaths,
    pub settings: Settings,
    pub token_store: FileTokenStore,
    pub session_store: FileSessionStore,
    pub gmail_client: GmailClient,
    pub summary_client: SummaryClient,
    pub output: Output,
}

impl AppContext {
    pub fn bootstrap(profile: String, json: bool, verbose: u8) -> AppResult<Self> {
        let profile = config::resolve_profile(&profile);
        let paths = AppPaths::discover()?;
        let settings = config::load_settings(&paths, &profile)?;
        let token_store = FileTokenStore::new(paths.clone());
        let session_store = FileSessionStore::new(paths.clone());
        let gmail_client = GmailClient::new();
        let summary_client = SummaryClient::from_settings(&settings);
        let output = Output::new(json);

        Ok(Self {
            profile,
            verbose,
            paths,
            settings,
            token_store,
            session_store,
            gmail_client,
            summary_client,
            output,
        })
    }

    /// Resolve a usable access token, refreshing an expired one in place.
    pub async fn access_token(&self) -> AppResult<String> {
        let token = self.token_store.load(&self.profile)?.ok_or_else(|| {
            AppError::InvalidInput("not logged in. run `voxmail auth login`".to_string())
        })?;

        if token.is_expired(std::time::SystemTime::now()) {
            let refreshed =
                AuthService::refresh(&self.profile, &self.settings, &self.token_store).await?;
            return Ok(refreshed.access_token);
        }

        Ok(token.access_token)
    }
}
