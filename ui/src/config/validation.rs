use super::app::AppConfig;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid page_size: {configured} (min: {min_limit}, max: {max_limit})")]
    PageSize {
        configured: u32,
        min_limit: u32,
        max_limit: u32,
    },
    #[error("Invalid receive_timeout_secs: {configured} (min: {min_limit}, max: {max_limit})")]
    ReceiveTimeout {
        configured: u64,
        min_limit: u64,
        max_limit: u64,
    },
    #[error("Invalid storage.sql_port: {configured}")]
    SqlPort { configured: u16 },
}

impl ConfigValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigValidationError::PageSize {
                configured,
                min_limit,
                max_limit,
            } => {
                format!(
                    "Page size out of range!\n\
                    Your configured value: {configured}\n\
                    Valid range: {min_limit} - {max_limit}\n\
                    Please update page_size in config.toml to a value between {min_limit} and {max_limit}."
                )
            }
            ConfigValidationError::ReceiveTimeout {
                configured,
                min_limit,
                max_limit,
            } => {
                format!(
                    "Receive timeout out of range!\n\
                    Your configured value: {configured} seconds\n\
                    Valid range: {min_limit} - {max_limit} seconds\n\
                    Please update receive_timeout_secs in config.toml."
                )
            }
            ConfigValidationError::SqlPort { configured } => {
                format!(
                    "SQL port {configured} is not usable.\n\
                    Please update storage.sql_port in config.toml or set ASB_SQL_PORT."
                )
            }
        }
    }
}

/// Configuration loading result
#[derive(Debug)]
pub enum ConfigLoadResult {
    Success(Box<AppConfig>),
    LoadError(String),
    DeserializeError(String),
    ValidationError(Vec<ConfigValidationError>),
}

impl ConfigLoadResult {
    /// The loaded configuration, or a message describing why there is none.
    pub fn config(&self) -> Result<&AppConfig, String> {
        match self {
            ConfigLoadResult::Success(config) => Ok(config),
            ConfigLoadResult::LoadError(msg) | ConfigLoadResult::DeserializeError(msg) => {
                Err(msg.clone())
            }
            ConfigLoadResult::ValidationError(errors) => {
                let messages: Vec<String> = errors.iter().map(|e| e.user_message()).collect();
                Err(format!(
                    "Configuration validation failed:\n{}",
                    messages.join("\n\n")
                ))
            }
        }
    }
}
