//! Connection strings for the emulator's AMQP endpoint and its SQL storage.

use std::time::Duration;

/// Database holding the emulator's entity lookup table.
pub const SQL_DATABASE: &str = "SbMessageContainerDatabase00001";

/// Hosts probed, in order, when locating the SQL container.
pub const SQL_HOST_CANDIDATES: [&str; 2] = ["127.0.0.1", "host.docker.internal"];

const ENDPOINT_KEY: &str = "Endpoint=";
const PREVIEW_LEN: usize = 50;

/// Helpers for building and inspecting connection strings.
///
/// # Examples
///
/// ```no_run
/// use server::utils::ConnectionStrings;
///
/// let cs = ConnectionStrings::normalize_emulator("localhost:5672").unwrap();
/// assert!(cs.starts_with("Endpoint=sb://localhost:5672;"));
/// ```
pub struct ConnectionStrings;

impl ConnectionStrings {
    /// Turns a bare host (optionally with an http scheme) into an emulator
    /// connection string. Full connection strings are returned unchanged and
    /// blank input yields `None`.
    pub fn normalize_emulator(value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if value
            .get(..ENDPOINT_KEY.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(ENDPOINT_KEY))
        {
            return Some(value.to_string());
        }

        let host = value
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        Some(format!(
            "Endpoint=sb://{host};SharedAccessKeyName=RootManageSharedAccessKey;SharedAccessKey=SAS_KEY_VALUE;UseDevelopmentEmulator=true;"
        ))
    }

    /// Value of the `Endpoint` part, if present.
    pub fn endpoint(connection_string: &str) -> Option<&str> {
        connection_string.split(';').map(str::trim).find_map(|part| {
            let head = part.get(..ENDPOINT_KEY.len())?;
            head.eq_ignore_ascii_case(ENDPOINT_KEY)
                .then(|| &part[ENDPOINT_KEY.len()..])
        })
    }

    /// Start of a connection string, safe to write to logs.
    pub fn preview(connection_string: &str) -> String {
        match connection_string.char_indices().nth(PREVIEW_LEN) {
            Some((idx, _)) => format!("{}...", &connection_string[..idx]),
            None => connection_string.to_string(),
        }
    }

    pub fn sql(host: &str, port: u16, password: &str) -> String {
        format!(
            "Server={host},{port};Database={SQL_DATABASE};User Id=sa;Password={password};TrustServerCertificate=True;"
        )
    }

    /// First candidate host accepting TCP connections on `port`, falling
    /// back to the first candidate so later connection errors name it.
    pub async fn select_sql_host(port: u16, timeout: Duration) -> &'static str {
        for host in SQL_HOST_CANDIDATES {
            match tokio::time::timeout(timeout, tokio::net::TcpStream::connect((host, port))).await
            {
                Ok(Ok(_)) => {
                    log::debug!("SQL storage reachable at {host}:{port}");
                    return host;
                }
                Ok(Err(e)) => log::debug!("SQL storage not reachable at {host}:{port}: {e}"),
                Err(_) => log::debug!("Timed out connecting to {host}:{port}"),
            }
        }
        SQL_HOST_CANDIDATES[0]
    }
}
