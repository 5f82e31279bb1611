use thiserror::Error;

/// Errors raised while fetching raw entity rows from a record source.
///
/// Record sources are the only part of the catalog pipeline that performs
/// I/O, so these are the only errors a catalog request can produce. Rows that
/// were read successfully but are malformed are not errors; the catalog
/// builder drops them.
///
/// # Examples
///
/// ```no_run
/// use server::common::SourceError;
///
/// fn describe(error: &SourceError) -> &'static str {
///     match error {
///         SourceError::NotFound { .. } => "snapshot missing",
///         SourceError::Io { .. } => "read failed",
///         SourceError::InvalidFormat { .. } => "not a record list",
///         SourceError::NotConfigured { .. } => "no source configured",
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum SourceError {
    /// The snapshot file does not exist.
    #[error("Entity snapshot not found at '{path}'")]
    NotFound { path: String },

    /// The snapshot exists but could not be read.
    #[error("Failed to read entity snapshot '{path}': {reason}")]
    Io { path: String, reason: String },

    /// The snapshot is not a JSON array of entity rows.
    #[error("Entity snapshot '{path}' has an invalid format: {reason}")]
    InvalidFormat { path: String, reason: String },

    #[error("Entity record source is not configured: {reason}")]
    NotConfigured { reason: String },
}

impl SourceError {
    pub fn io(path: impl Into<String>, error: &std::io::Error) -> Self {
        let path = path.into();
        if error.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound { path }
        } else {
            SourceError::Io {
                path,
                reason: error.to_string(),
            }
        }
    }
}
