//! Environment and connection-string helpers shared by the library and the CLI.

pub mod connection_string;
pub mod env;

pub use connection_string::ConnectionStrings;
pub use env::{EnvUtils, EnvVarError};
