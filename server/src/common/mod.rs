pub mod errors;

pub use errors::SourceError;
