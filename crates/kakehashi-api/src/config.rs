use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::provider::Provider;

/// Per-provider credentials for the tracking services.
///
/// Tokens are obtained by the host (OAuth flows live outside this crate);
/// this config only stores and hands them out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub auth: Vec<ProviderAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAuth {
    pub provider: Provider,
    pub access_token: String,
}

impl UserConfig {
    /// Load the user config file, or defaults when none exists yet.
    pub fn load() -> Result<Self, ApiError> {
        let path = Self::config_path();
        if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|e| ApiError::Config(e.to_string()))?;
            toml::from_str(&content).map_err(|e| ApiError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to the user config file.
    pub fn save(&self) -> Result<(), ApiError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ApiError::Config(e.to_string()))?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ApiError::Config(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ApiError::Config(e.to_string()))
    }

    /// Path to the user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "kakehashi")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// The stored access token for a provider, if one is configured.
    pub fn auth_token_for(&self, provider: Provider) -> Option<&str> {
        self.auth
            .iter()
            .find(|a| a.provider == provider)
            .map(|a| a.access_token.as_str())
    }

    /// Insert or replace the token for a provider.
    pub fn set_auth_token(&mut self, provider: Provider, access_token: String) {
        match self.auth.iter_mut().find(|a| a.provider == provider) {
            Some(entry) => entry.access_token = access_token,
            None => self.auth.push(ProviderAuth {
                provider,
                access_token,
            }),
        }
    }
}
