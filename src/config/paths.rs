use std::fs;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

const APP_DIR: &str = "voxmail";

/// Filesystem layout: profile settings under the config root, tokens and
/// session snapshots under the data root.
#[derive(Debug, Clone)]
pub struct AppPaths {
    profiles_dir: PathBuf,
    tokens_dir: PathBuf,
    sessions_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> AppResult<Self> {
        let config_root = dirs::config_dir()
            .ok_or_else(|| AppError::Config("unable to resolve config directory".to_string()))?;
        let data_root = dirs::data_dir()
            .ok_or_else(|| AppError::Config("unable to resolve data directory".to_string()))?;

        let profiles_dir = config_root.join(APP_DIR).join("profiles");
        let data_dir = data_root.join(APP_DIR);
        let tokens_dir = data_dir.join("tokens");
        let sessions_dir = data_dir.join("sessions");

        fs::create_dir_all(&profiles_dir)?;
        fs::create_dir_all(&tokens_dir)?;
        fs::create_dir_all(&sessions_dir)?;

        Ok(Self {
            profiles_dir,
            tokens_dir,
            sessions_dir,
        })
    }

    pub fn settings_file(&self, profile: &str) -> PathBuf {
        self.profiles_dir.join(format!("{profile}.json"))
    }

    pub fn token_file(&self, profile: &str) -> PathBuf {
        self.tokens_dir.join(format!("{profile}.json"))
    }

    pub fn session_file(&self, profile: &str) -> PathBuf {
        self.sessions_dir.join(format!("{profile}.json"))
    }
}
