//! # Entity Explorer
//!
//! Application layer that ties the entity catalog to message operations.
//! Every name-based call reads a fresh catalog from the record source, checks
//! the requested entity against it and only then talks to the transport. The
//! `*_resolved` variants take a [`ResolvedEntity`] from [`EntityExplorer::resolve`]
//! so a caller can validate once and then connect.
//!
//! ```no_run
//! use server::explorer::EntityExplorer;
//! use server::source::SnapshotFileSource;
//! use server::transport::ServiceBusTransport;
//! use std::time::Duration;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = ServiceBusTransport::connect(
//!         "Endpoint=sb://localhost;SharedAccessKeyName=RootManageSharedAccessKey;SharedAccessKey=SAS_KEY_VALUE;UseDevelopmentEmulator=true;",
//!         Duration::from_secs(5),
//!     )
//!     .await?;
//!     let explorer = EntityExplorer::new(SnapshotFileSource::new("entities.json"), transport);
//!
//!     let messages = explorer.peek_messages("events|audit", 10).await?;
//!     println!("{} messages", messages.len());
//!     Ok(())
//! }
//! ```

use crate::address::{AddressResolver, EntityAddress};
use crate::catalog::{EntityCatalogBuilder, LogicalEntity};
use crate::model::{MessageData, MessageModel};
use crate::source::EntityRecordSource;
use crate::transport::MessageTransport;

pub use errors::{ServiceBusError, ServiceBusResult};

pub mod errors;

/// Reason attached to messages moved to a dead-letter queue when none is given.
pub const DEFAULT_DEAD_LETTER_REASON: &str = "Moved by asb-lens";

/// An entity name resolved against the current catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntity {
    pub entity: LogicalEntity,
    pub address: EntityAddress,
}

impl ResolvedEntity {
    /// Fails for dead-letter queues and subscriptions, which only receive
    /// messages through their topic.
    pub fn ensure_sendable(&self) -> ServiceBusResult<()> {
        let address = &self.address;
        if address.is_dead_letter() {
            return Err(ServiceBusError::InvalidEntityName(format!(
                "{address}: messages cannot be sent to a dead-letter queue"
            )));
        }
        if let Some(topic) = address.topic() {
            return Err(ServiceBusError::InvalidEntityName(format!(
                "{}: messages cannot be sent to a subscription; send to topic '{topic}'",
                address.qualified_name()
            )));
        }
        Ok(())
    }
}

pub struct EntityExplorer<S, T> {
    source: S,
    transport: T,
    builder: EntityCatalogBuilder,
}

impl<S, T> EntityExplorer<S, T> {
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<S, T> EntityExplorer<S, T>
where
    S: EntityRecordSource,
{
    pub fn new(source: S, transport: T) -> Self {
        Self {
            source,
            transport,
            builder: EntityCatalogBuilder::new(),
        }
    }

    pub fn with_builder(mut self, builder: EntityCatalogBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Current catalog, ordered queues, topics, then subscriptions.
    pub async fn list_entities(&self) -> ServiceBusResult<Vec<LogicalEntity>> {
        let records = self.source.fetch_records().await?;
        Ok(self.builder.build_catalog(&records))
    }

    /// Resolves a display name, qualified name or address to a catalog entry.
    ///
    /// # Errors
    ///
    /// [`ServiceBusError::InvalidEntityName`] for blank input and
    /// [`ServiceBusError::EntityNotFound`] when the entity is not in the catalog.
    pub async fn resolve(&self, entity: &str) -> ServiceBusResult<ResolvedEntity> {
        if entity.trim().is_empty() {
            return Err(ServiceBusError::InvalidEntityName(entity.to_string()));
        }

        let catalog = self.list_entities().await?;
        let address = AddressResolver::to_address(entity);
        if !AddressResolver::exists(&address, &catalog) {
            log::debug!("'{entity}' ({address}) is not in the catalog");
            return Err(ServiceBusError::EntityNotFound(entity.to_string()));
        }

        let found = AddressResolver::find(&address, &catalog)
            .cloned()
            .ok_or_else(|| ServiceBusError::EntityNotFound(entity.to_string()))?;

        Ok(ResolvedEntity {
            entity: found,
            address: EntityAddress::parse(&address),
        })
    }
}

impl<S, T> EntityExplorer<S, T>
where
    S: EntityRecordSource,
    T: MessageTransport,
{
    pub async fn peek_messages(&self, entity: &str, max: u32) -> ServiceBusResult<Vec<MessageModel>> {
        let resolved = self.resolve(entity).await?;
        self.peek_resolved(&resolved, max).await
    }

    /// Receives and removes messages from the entity.
    pub async fn receive_messages(
        &self,
        entity: &str,
        max: u32,
    ) -> ServiceBusResult<Vec<MessageModel>> {
        let resolved = self.resolve(entity).await?;
        self.receive_resolved(&resolved, max).await
    }

    /// Sends a message and returns its message id. See [`Self::send_resolved`].
    pub async fn send_message(&self, entity: &str, message: &MessageData) -> ServiceBusResult<String> {
        let resolved = self.resolve(entity).await?;
        self.send_resolved(&resolved, message).await
    }

    /// Moves up to `max` messages of the entity's main queue to its dead-letter queue.
    pub async fn dead_letter_messages(
        &self,
        entity: &str,
        max: u32,
        reason: Option<&str>,
    ) -> ServiceBusResult<Vec<MessageModel>> {
        let resolved = self.resolve(entity).await?;
        self.dead_letter_resolved(&resolved, max, reason).await
    }
}

/// Operations on an entity already resolved against the catalog, for callers
/// that validate a name once and then connect.
impl<S, T> EntityExplorer<S, T>
where
    T: MessageTransport,
{
    pub async fn peek_resolved(
        &self,
        resolved: &ResolvedEntity,
        max: u32,
    ) -> ServiceBusResult<Vec<MessageModel>> {
        self.transport.peek(&resolved.address, max).await
    }

    pub async fn receive_resolved(
        &self,
        resolved: &ResolvedEntity,
        max: u32,
    ) -> ServiceBusResult<Vec<MessageModel>> {
        self.transport.receive(&resolved.address, max).await
    }

    /// Sends a message and returns its message id.
    ///
    /// Dead-letter queues and subscriptions cannot be written to directly and
    /// are rejected before the transport is touched. Messages for a
    /// subscription go to its topic.
    pub async fn send_resolved(
        &self,
        resolved: &ResolvedEntity,
        message: &MessageData,
    ) -> ServiceBusResult<String> {
        resolved.ensure_sendable()?;
        self.transport.send(&resolved.address, message).await
    }

    pub async fn dead_letter_resolved(
        &self,
        resolved: &ResolvedEntity,
        max: u32,
        reason: Option<&str>,
    ) -> ServiceBusResult<Vec<MessageModel>> {
        if resolved.address.is_dead_letter() {
            return Err(ServiceBusError::InvalidEntityName(format!(
                "{}: messages are already in a dead-letter queue",
                resolved.address
            )));
        }
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(DEFAULT_DEAD_LETTER_REASON);
        self.transport.dead_letter(&resolved.address, max, reason).await
    }
}
