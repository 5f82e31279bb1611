use server::common::SourceError;
use server::explorer::ServiceBusError;
use std::fmt::Display;

/// Errors reported by the command-line front end.
///
/// Every variant carries a message meant for the user; [`AppError::exit_code`]
/// separates mistakes in the invocation from failures of the emulator or its
/// storage.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Broker or transport failures
    ServiceBus(String),

    /// The requested entity is not in the catalog
    NotFound(String),

    /// Invalid arguments or input files
    Input(String),

    Config(String),

    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::ServiceBus(msg) => write!(f, "Service Bus Error: {msg}"),
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Input(msg) => write!(f, "Invalid Input: {msg}"),
            AppError::Config(msg) => write!(f, "Configuration Error: {msg}"),
            AppError::Io(msg) => write!(f, "IO Error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Process exit code for this error: 2 for caller mistakes, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::NotFound(_) | AppError::Input(_) => 2,
            _ => 1,
        }
    }
}

impl From<ServiceBusError> for AppError {
    fn from(err: ServiceBusError) -> Self {
        match err {
            ServiceBusError::EntityNotFound(entity) => {
                AppError::NotFound(format!("entity '{entity}' does not exist in the emulator"))
            }
            ServiceBusError::InvalidEntityName(msg) => AppError::Input(msg),
            ServiceBusError::ConfigurationError(msg) => AppError::Config(msg),
            ServiceBusError::SourceUnavailable(msg) => AppError::Io(msg),
            other => AppError::ServiceBus(other.to_string()),
        }
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotConfigured { reason } => AppError::Config(reason),
            other => AppError::Io(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Io(format!("JSON serialization failed: {err}"))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_user_error() {
        let error = AppError::from(ServiceBusError::EntityNotFound("orders".to_string()));
        assert_eq!(
            error,
            AppError::NotFound("entity 'orders' does not exist in the emulator".to_string())
        );
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_transport_errors_keep_their_message() {
        let error = AppError::from(ServiceBusError::MessageSendFailed("link closed".to_string()));
        assert_eq!(error.to_string(), "Service Bus Error: Message send failed: link closed");
        assert_eq!(error.exit_code(), 1);
    }
}
