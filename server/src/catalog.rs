//! # Entity Catalog Module
//!
//! Reconstructs the queue/topic/subscription hierarchy of the Service Bus
//! emulator from the flat rows of its entity lookup table.
//!
//! ## Core Components
//!
//! - [`RawEntityRecord`] - One row as stored by the emulator
//! - [`LogicalEntity`] - A queue, topic or subscription with aggregated counts
//! - [`EntityCatalogBuilder`] - Folds raw rows into the ordered catalog
//! - [`naming`] - Name cleaning, shadow suffixes and the classification table
//!
//! ## Usage
//!
//! ```no_run
//! use server::catalog::{EntityCatalogBuilder, EntityKind, RawEntityRecord};
//!
//! let rows = vec![
//!     RawEntityRecord::new(1, "SBEMULATORNS:TOPIC:events", 1, 0),
//!     RawEntityRecord::new(2, "SBEMULATORNS:TOPIC:events|audit", 2, 3),
//!     RawEntityRecord::new(3, "SBEMULATORNS:TOPIC:events|audit|$TRANSFER", 2, 1),
//! ];
//!
//! let catalog = EntityCatalogBuilder::new().build_catalog(&rows);
//! assert_eq!(catalog[0].kind, EntityKind::Topic);
//! assert_eq!(catalog[1].qualified_name(), "events|audit");
//! ```

pub use self::builder::{EntityCatalogBuilder, FoldStrategy, build_catalog, sort_catalog};
pub use self::naming::clean_name;
pub use self::types::{EntityKind, LogicalEntity, RawEntityRecord, RawEntityType};

/// Folding of raw rows into logical entities
pub mod builder;
/// Cleaning and classification of raw entity names
pub mod naming;
/// Raw and logical entity types
pub mod types;
