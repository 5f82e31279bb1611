//! # asb-lens Server Library
//!
//! Core library for exploring the Azure Service Bus emulator. It rebuilds the
//! queue/topic/subscription hierarchy from the emulator's flat entity lookup
//! table, translates names into transport addresses and runs message
//! operations against the resolved entities.
//!
//! ## Modules
//!
//! - [`catalog`] - Raw rows to ordered logical entities
//! - [`address`] - Canonical addresses and existence checks
//! - [`source`] - Providers of raw lookup-table rows
//! - [`transport`] - Peek, receive, send and dead-letter operations
//! - [`explorer`] - Application layer tying catalog and transport together
//! - [`consumer`] / [`producer`] - Receiver and sender wrappers
//! - [`model`] - Message data models
//! - [`utils`] - Environment and connection-string helpers
//! - [`common`] - Shared error types

pub mod address;
pub mod catalog;
pub mod common;
pub mod consumer;
pub mod explorer;
pub mod model;
pub mod producer;
pub mod source;
pub mod transport;
pub mod utils;
