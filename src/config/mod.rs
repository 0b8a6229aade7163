mod api;
mod defaults;
mod identity;
mod validation;

use crate::cli::Args;
use crate::identity::FirebaseSettings;
use crate::storage::FilesystemStore;
use crate::theme::ColorScheme;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

pub use api::ApiConfig;
pub use defaults::{default_auth_endpoint, default_token_endpoint};
pub use identity::IdentityConfig;
pub use validation::{expand_env_var_in_string, expand_home};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default)]
    pub color_scheme: Option<ColorScheme>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: u64,
    pub identity_api_key: Option<String>,
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub data_dir: PathBuf,
    pub color_scheme: ColorScheme,
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self, String> {
        let json_config = match JsonConfig::load() {
            Ok(config) => config,
            Err(e) => return Err(format!("{:#}", e)),
        };
        Self::resolve(args, json_config)
    }

    /// Merge the layers: CLI args > env vars > config file > defaults
    pub fn resolve(args: &Args, json_config: JsonConfig) -> Result<Self, String> {
        let api_base_url = args
            .api_base_url
            .clone()
            .or_else(|| env::var("AIVA_API_BASE_URL").ok())
            .or(json_config.api.base_url.clone())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| json_config.api.base_url_or_default());

        let request_timeout = match env::var("AIVA_REQUEST_TIMEOUT").ok() {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| format!("AIVA_REQUEST_TIMEOUT must be a number of seconds, got '{}'", v))?,
            None => json_config.api.timeout_or_default(),
        };

        // Identity key: env var > JSON config (with ${VAR} expansion)
        let identity_api_key = env::var("AIVA_FIREBASE_API_KEY")
            .ok()
            .or_else(|| {
                json_config
                    .identity
                    .api_key
                    .as_deref()
                    .map(expand_env_var_in_string)
            })
            .filter(|key| !key.is_empty() && !key.contains("${"));

        let auth_endpoint = env::var("AIVA_IDENTITY_ENDPOINT")
            .ok()
            .or(json_config.identity.auth_endpoint.clone())
            .unwrap_or_else(default_auth_endpoint);

        let token_endpoint = env::var("AIVA_TOKEN_ENDPOINT")
            .ok()
            .or(json_config.identity.token_endpoint.clone())
            .unwrap_or_else(default_token_endpoint);

        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| env::var("AIVA_DATA_DIR").ok())
            .or(json_config.storage.data_dir.clone())
            .map(|dir| PathBuf::from(expand_home(&expand_env_var_in_string(&dir))))
            .or_else(FilesystemStore::default_dir)
            .ok_or("Could not determine a data directory; set AIVA_DATA_DIR")?;

        let color_scheme = match env::var("AIVA_COLOR_SCHEME").ok() {
            Some(v) => v.parse::<ColorScheme>()?,
            None => json_config.ui.color_scheme.unwrap_or_default(),
        };

        let verbose = args.verbose
            || env::var("AIVA_VERBOSE")
                .ok()
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .or(json_config.session.verbose)
                .unwrap_or(false);

        Ok(Config {
            api_base_url,
            request_timeout,
            identity_api_key,
            auth_endpoint,
            token_endpoint,
            data_dir,
            color_scheme,
            verbose,
        })
    }

    /// Identity provider settings; only commands that talk to the provider need them.
    pub fn firebase_settings(&self) -> Result<FirebaseSettings, String> {
        let api_key = self
            .identity_api_key
            .clone()
            .ok_or("AIVA_FIREBASE_API_KEY environment variable not set")?;
        Ok(FirebaseSettings {
            api_key,
            auth_endpoint: self.auth_endpoint.clone(),
            token_endpoint: self.token_endpoint.clone(),
        })
    }
}

impl JsonConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // No config file found, return default
        Ok(JsonConfig::default())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))
        }
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Current directory (highest priority - local override)
        paths.push(PathBuf::from(".aiva.yaml"));
        paths.push(PathBuf::from(".aiva.yml"));
        paths.push(PathBuf::from(".aiva.json"));

        // 2. User's config directory (global config)
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("aiva");
            paths.push(config_dir.join("aiva.yaml"));
            paths.push(config_dir.join("aiva.yml"));
            paths.push(config_dir.join("aiva.json"));
        }

        paths
    }
}
