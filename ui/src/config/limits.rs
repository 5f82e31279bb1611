/// Bounds for values read from config.toml

pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub const MIN_RECEIVE_TIMEOUT_SECS: u64 = 1;
pub const MAX_RECEIVE_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_RECEIVE_TIMEOUT_SECS: u64 = 5;

/// Resource name used when neither config nor environment provide one
pub const DEFAULT_RESOURCE_NAME: &str = "myservicebus";

/// How long to wait for the SQL storage to accept a connection when probing hosts
pub const SQL_PROBE_TIMEOUT_MILLIS: u64 = 1500;
