//! Validated access to environment variables.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvVarError {
    #[error("Environment variable '{name}' not found. Set it in your .env file or environment.")]
    NotFound { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8 characters.")]
    InvalidUtf8 { name: String },

    #[error("Environment variable '{name}' is empty.")]
    Empty { name: String },
}

/// Environment lookups that treat blank values as missing.
///
/// # Examples
///
/// ```no_run
/// use server::utils::EnvUtils;
///
/// let connection = EnvUtils::first_non_empty(&[
///     "ConnectionStrings__myservicebus",
///     "ASB_CONNECTION_STRING",
/// ]);
/// ```
pub struct EnvUtils;

impl EnvUtils {
    /// Trimmed value of `name`.
    ///
    /// # Errors
    ///
    /// [`EnvVarError`] when the variable is unset, blank or not UTF-8.
    pub fn get_validated_var(name: &str) -> Result<String, EnvVarError> {
        match std::env::var(name) {
            Ok(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    Err(EnvVarError::Empty {
                        name: name.to_string(),
                    })
                } else {
                    Ok(trimmed.to_string())
                }
            }
            Err(std::env::VarError::NotPresent) => Err(EnvVarError::NotFound {
                name: name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(EnvVarError::InvalidUtf8 {
                name: name.to_string(),
            }),
        }
    }

    pub fn get_optional_var(name: &str) -> Option<String> {
        Self::get_validated_var(name).ok()
    }

    /// First variable among `names` that holds a non-blank value.
    pub fn first_non_empty(names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| Self::get_optional_var(name))
    }

    /// Parses `name` into `T`, falling back to `default` when unset or invalid.
    pub fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        match Self::get_optional_var(name) {
            Some(value) => value.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid value '{value}' for {name}");
                default
            }),
            None => default,
        }
    }
}
