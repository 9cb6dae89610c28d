/// CLI configuration
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempo_api_client::ApiConfig;
use tempo_feed::RefreshTimings;
use thiserror::Error;

const ENV_PREFIX: &str = "TEMPO";
const DEFAULT_CONFIG_FILE: &str = "tempo.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_api")]
    pub api: ApiSettings,

    #[serde(default = "default_refresh")]
    pub refresh: RefreshSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Session code from sign-in; every feed route requires one
    #[serde(default)]
    pub session_code: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Pull-to-refresh timings; the initial load always uses the fixed preset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshSettings {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl CliConfig {
    /// Load from `file` (or `./tempo.toml` if present), then `TEMPO__*` variables
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(file, ENV_PREFIX)
    }

    fn load_with_prefix(file: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder();

        match file {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // e.g. TEMPO__API__SESSION_CODE
        settings = settings.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.api.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must be an http(s) URL, got {:?}",
                url
            )));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "api.request_timeout_secs must be positive".to_string(),
            ));
        }

        self.refresh
            .timings()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(())
    }

    pub fn api_config(&self) -> ApiConfig {
        let config = ApiConfig::new(self.api.base_url.clone())
            .with_timeout(Duration::from_secs(self.api.request_timeout_secs));
        match &self.api.session_code {
            Some(code) => config.with_session(code.clone()),
            None => config,
        }
    }
}

impl RefreshSettings {
    pub fn timings(&self) -> RefreshTimings {
        RefreshTimings {
            min_delay: Duration::from_millis(self.min_delay_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

// Default values
fn default_api() -> ApiSettings {
    ApiSettings {
        base_url: default_base_url(),
        session_code: None,
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_refresh() -> RefreshSettings {
    RefreshSettings {
        min_delay_ms: default_min_delay_ms(),
        timeout_ms: default_timeout_ms(),
    }
}

fn default_min_delay_ms() -> u64 {
    3_000
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api: default_api(),
            refresh: default_refresh(),
        }
    }
}
