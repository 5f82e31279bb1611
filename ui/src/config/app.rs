use super::{
    LoggingConfig,
    emulator::{EmulatorConfig, StorageConfig},
    limits::*,
    validation::ConfigValidationError,
};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    page_size: Option<u32>,
    receive_timeout_secs: Option<u64>,

    #[serde(default)]
    emulator: EmulatorConfig,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl AppConfig {
    /// Validate the configuration against defined limits
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        let page_size = self.page_size();
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
            errors.push(ConfigValidationError::PageSize {
                configured: page_size,
                min_limit: MIN_PAGE_SIZE,
                max_limit: MAX_PAGE_SIZE,
            });
        }

        let timeout = self.receive_timeout_secs();
        if !(MIN_RECEIVE_TIMEOUT_SECS..=MAX_RECEIVE_TIMEOUT_SECS).contains(&timeout) {
            errors.push(ConfigValidationError::ReceiveTimeout {
                configured: timeout,
                min_limit: MIN_RECEIVE_TIMEOUT_SECS,
                max_limit: MAX_RECEIVE_TIMEOUT_SECS,
            });
        }

        if self.storage.configured_sql_port() == Some(0) {
            errors.push(ConfigValidationError::SqlPort { configured: 0 });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Default number of messages for peek, receive and dead-letter
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn receive_timeout_secs(&self) -> u64 {
        self.receive_timeout_secs
            .unwrap_or(DEFAULT_RECEIVE_TIMEOUT_SECS)
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_secs(self.receive_timeout_secs())
    }

    // Configuration section accessors
    pub fn emulator(&self) -> &EmulatorConfig {
        &self.emulator
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }
}
