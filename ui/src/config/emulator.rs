use super::limits::{DEFAULT_RESOURCE_NAME, SQL_PROBE_TIMEOUT_MILLIS};
use crate::constants::env_vars::*;
use serde::Deserialize;
use server::common::SourceError;
use server::source::SnapshotFileSource;
use server::utils::{ConnectionStrings, EnvUtils};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Service Bus emulator connection
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EmulatorConfig {
    connection_string: Option<String>,
    resource_name: Option<String>,
}

impl EmulatorConfig {
    /// Name of the emulator resource, used to find its connection string.
    pub fn resource_name(&self) -> String {
        self.resource_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| EnvUtils::get_optional_var(ASB_RESOURCE_NAME))
            .unwrap_or_else(|| DEFAULT_RESOURCE_NAME.to_string())
    }

    /// Environment variables that may hold the connection string, in lookup order.
    pub fn connection_string_vars(&self) -> Vec<String> {
        let resource = self.resource_name();
        vec![
            format!("{CONNECTION_STRINGS_PREFIX}{resource}"),
            format!("ConnectionStrings:{resource}"),
        ]
    }

    /// Emulator connection string from config, else from the resource's
    /// connection-string variable. Bare hosts are expanded.
    pub fn connection_string(&self) -> Option<String> {
        let configured = self
            .connection_string
            .as_deref()
            .filter(|cs| !cs.trim().is_empty())
            .map(str::to_string);

        let raw = configured.or_else(|| {
            let vars = self.connection_string_vars();
            let names: Vec<&str> = vars.iter().map(String::as_str).collect();
            EnvUtils::first_non_empty(&names)
        })?;

        ConnectionStrings::normalize_emulator(&raw)
    }
}

/// Where the emulator's entity lookup table is read from
#[derive(Debug, Deserialize, Default, Clone)]
pub struct StorageConfig {
    snapshot_path: Option<PathBuf>,
    sql_connection_string: Option<String>,
    sql_port: Option<u16>,
    sql_password: Option<String>,
}

impl StorageConfig {
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Record source for the catalog.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotConfigured`] when no snapshot path is set.
    pub fn record_source(&self) -> Result<SnapshotFileSource, SourceError> {
        self.snapshot_path()
            .map(SnapshotFileSource::new)
            .ok_or_else(|| SourceError::NotConfigured {
                reason: "set storage.snapshot_path in config.toml or pass --snapshot".to_string(),
            })
    }

    pub(super) fn configured_sql_port(&self) -> Option<u16> {
        self.sql_port
    }

    fn sql_port(&self) -> Option<u16> {
        self.sql_port
            .or_else(|| EnvUtils::get_optional_var(ASB_SQL_PORT)?.parse().ok())
    }

    fn sql_password(&self) -> Option<String> {
        self.sql_password
            .clone()
            .filter(|pwd| !pwd.trim().is_empty())
            .or_else(|| EnvUtils::get_optional_var(ASB_SQL_PASSWORD))
    }

    /// Connection string of the SQL storage behind the emulator.
    ///
    /// A configured or exported connection string wins; otherwise one is
    /// assembled from port and password, probing which host answers.
    pub async fn sql_connection_string(&self) -> Option<String> {
        let explicit = self
            .sql_connection_string
            .clone()
            .filter(|cs| !cs.trim().is_empty())
            .or_else(|| EnvUtils::get_optional_var(ASB_SQL_CONNECTION_STRING));
        if explicit.is_some() {
            return explicit;
        }

        let port = self.sql_port()?;
        let password = self.sql_password()?;
        let host = ConnectionStrings::select_sql_host(
            port,
            Duration::from_millis(SQL_PROBE_TIMEOUT_MILLIS),
        )
        .await;
        Some(ConnectionStrings::sql(host, port, &password))
    }
}
