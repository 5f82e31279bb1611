use crate::common::SourceError;
use std::fmt;

#[derive(Debug, Clone)]
pub enum ServiceBusError {
    /// Connection related errors
    ConnectionFailed(String),

    /// Catalog lookup errors
    EntityNotFound(String),
    InvalidEntityName(String),
    SourceUnavailable(String),

    /// Consumer related errors
    ConsumerCreationFailed(String),

    /// Producer related errors
    ProducerCreationFailed(String),

    /// Message operation errors
    MessageReceiveFailed(String),
    MessageSendFailed(String),
    MessageCompleteFailed(String),
    MessageDeadLetterFailed(String),

    /// Configuration errors
    ConfigurationError(String),

    /// Timeout errors
    OperationTimeout(String),

    /// Generic errors
    InternalError(String),
}

impl fmt::Display for ServiceBusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceBusError::ConnectionFailed(msg) => write!(f, "Connection failed: {msg}"),

            ServiceBusError::EntityNotFound(entity) => write!(f, "Entity not found: {entity}"),
            ServiceBusError::InvalidEntityName(entity) => {
                write!(f, "Invalid entity name: {entity}")
            }
            ServiceBusError::SourceUnavailable(msg) => {
                write!(f, "Entity catalog unavailable: {msg}")
            }

            ServiceBusError::ConsumerCreationFailed(msg) => {
                write!(f, "Consumer creation failed: {msg}")
            }
            ServiceBusError::ProducerCreationFailed(msg) => {
                write!(f, "Producer creation failed: {msg}")
            }

            ServiceBusError::MessageReceiveFailed(msg) => {
                write!(f, "Message receive failed: {msg}")
            }
            ServiceBusError::MessageSendFailed(msg) => write!(f, "Message send failed: {msg}"),
            ServiceBusError::MessageCompleteFailed(msg) => {
                write!(f, "Message complete failed: {msg}")
            }
            ServiceBusError::MessageDeadLetterFailed(msg) => {
                write!(f, "Message dead letter failed: {msg}")
            }

            ServiceBusError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            ServiceBusError::OperationTimeout(msg) => write!(f, "Operation timeout: {msg}"),
            ServiceBusError::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceBusError {}

impl ServiceBusError {
    /// Whether the error means the addressed entity is not in the catalog.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceBusError::EntityNotFound(_))
    }

    /// Errors caused by the caller's input rather than the broker or storage.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ServiceBusError::EntityNotFound(_) | ServiceBusError::InvalidEntityName(_)
        )
    }
}

impl From<SourceError> for ServiceBusError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotConfigured { reason } => ServiceBusError::ConfigurationError(reason),
            other => ServiceBusError::SourceUnavailable(other.to_string()),
        }
    }
}

impl From<azure_core::Error> for ServiceBusError {
    fn from(err: azure_core::Error) -> Self {
        ServiceBusError::InternalError(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ServiceBusError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ServiceBusError::InternalError(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ServiceBusError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ServiceBusError::OperationTimeout(err.to_string())
    }
}

// Result type alias for convenience
pub type ServiceBusResult<T> = Result<T, ServiceBusError>;
