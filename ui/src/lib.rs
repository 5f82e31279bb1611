//! # asb-lens
//!
//! Command-line front end for the Azure Service Bus emulator. Lists the
//! entities reconstructed from the emulator's lookup table and peeks,
//! receives, sends and dead-letters messages by entity name.
//!
//! ## Modules
//!
//! - [`cli`] - Command-line arguments
//! - [`commands`] - Command execution against the explorer
//! - [`config`] - `config.toml`, environment and `settings.json` loading
//! - [`constants`] - Environment variable names
//! - [`error`] - Application error type and exit codes
//! - [`logger`] - Logging setup
//! - [`render`] - Text and JSON output
//!
//! The library interface exists so the binary's pieces can be integration tested.

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod logger;
pub mod render;

pub use error::{AppError, AppResult};
