use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

pub mod app;
pub mod emulator;
pub mod limits;
pub mod settings;
pub mod validation;

pub use app::AppConfig;
pub use emulator::{EmulatorConfig, StorageConfig};
pub use settings::{CannedMessage, Settings, SettingsOrigin};
pub use validation::{ConfigLoadResult, ConfigValidationError};

/// File read when no `--config` path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Global configuration loading and access
static CONFIG: std::sync::OnceLock<ConfigLoadResult> = std::sync::OnceLock::new();

/// Loads configuration from an optional TOML file and the environment.
///
/// Environment entries override file values; nested keys use `__`
/// (`EMULATOR__CONNECTION_STRING`). A missing default `config.toml` is not an
/// error, a missing explicit path is.
pub fn load_config(path: Option<&Path>) -> ConfigLoadResult {
    dotenv::dotenv().ok();
    let env_source = Environment::default().separator("__");

    let file_source = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let config = match Config::builder()
        .add_source(file_source)
        .add_source(env_source)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            return ConfigLoadResult::LoadError(format!(
                "Configuration loading failed: {e}. Please check your config.toml file and environment variables."
            ));
        }
    };

    match config.try_deserialize::<AppConfig>() {
        Ok(app_config) => match app_config.validate() {
            Ok(()) => ConfigLoadResult::Success(Box::new(app_config)),
            Err(errors) => ConfigLoadResult::ValidationError(errors),
        },
        Err(e) => ConfigLoadResult::DeserializeError(format!("Failed to deserialize config: {e}")),
    }
}

/// Loads the global configuration once; later calls return the first result.
pub fn init_config(path: Option<&Path>) -> &'static ConfigLoadResult {
    CONFIG.get_or_init(|| load_config(path))
}

pub fn get_config() -> &'static ConfigLoadResult {
    init_config(None)
}

/// Additional logging configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}
