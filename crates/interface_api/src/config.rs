//! API configuration

use serde::Deserialize;

use domain_assistant::GeminiConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory holding the workspace JSON files
    pub data_dir: String,
    /// Log level
    pub log_level: String,
    /// Completion service API root
    pub assistant_base_url: String,
    /// Completion service key; suggestions fail with 502 while empty
    pub assistant_api_key: String,
    pub assistant_model: String,
    pub assistant_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let assistant = GeminiConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: "./data".to_string(),
            log_level: "info".to_string(),
            assistant_base_url: assistant.base_url,
            assistant_api_key: assistant.api_key,
            assistant_model: assistant.model,
            assistant_timeout_secs: assistant.timeout_secs,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `QUOTE_`-prefixed environment variables,
    /// falling back to the defaults for anything unset
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("data_dir", defaults.data_dir)?
            .set_default("log_level", defaults.log_level)?
            .set_default("assistant_base_url", defaults.assistant_base_url)?
            .set_default("assistant_api_key", defaults.assistant_api_key)?
            .set_default("assistant_model", defaults.assistant_model)?
            .set_default("assistant_timeout_secs", defaults.assistant_timeout_secs)?
            .add_source(config::Environment::with_prefix("QUOTE").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn assistant(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.assistant_base_url.clone(),
            api_key: self.assistant_api_key.clone(),
            model: self.assistant_model.clone(),
            timeout_secs: self.assistant_timeout_secs,
        }
    }
}
