use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main service configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Vision provider connection settings
    pub vision: VisionConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Recipe catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Configuration for the vision provider
#[derive(Debug, Deserialize, Clone)]
pub struct VisionConfig {
    /// Which adapter to use ("azure" or "google")
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base URL of the vision service
    pub endpoint: String,
    /// API key for authentication
    pub key: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl VisionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Configuration for the HTTP listener
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:8080"
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Largest accepted request body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Configuration for the recipe catalog
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// Path to a JSON catalog; the built-in sample catalog is used when unset
    #[serde(default)]
    pub path: Option<String>,
}

// Default value functions
fn default_provider() -> String {
    "azure".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_VISION__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_VISION__VISION__KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Rejects settings that deserialize but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vision.endpoint.trim().is_empty() {
            return Err(ConfigError::Message(
                "vision.endpoint must not be empty".to_string(),
            ));
        }
        if self.vision.key.trim().is_empty() {
            return Err(ConfigError::Message(
                "vision.key must not be empty".to_string(),
            ));
        }
        if self.vision.timeout == 0 {
            return Err(ConfigError::Message(
                "vision.timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from file and environment variables
///
/// The vision endpoint and key have no defaults; if either is missing the
/// returned error names the missing field.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        .add_source(environment());

    build_config(builder)
}

/// Environment variables with RECIPE_VISION prefix
///
/// Use double underscore for nested: RECIPE_VISION__VISION__ENDPOINT
fn environment() -> Environment {
    Environment::with_prefix("RECIPE_VISION")
        .separator("__")
        .try_parsing(true)
}

fn build_config(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
