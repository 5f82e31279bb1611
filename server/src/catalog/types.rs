use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity type byte as stored in the emulator's entity lookup table.
///
/// The byte is not fully reliable on its own: some storage layouts tag a
/// queue and its `$TRANSFER` shadow both as [`RawEntityType::Queue`], and
/// subscriptions are recognised from the pipe in their name rather than from
/// this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEntityType {
    Queue,
    Topic,
    Subscription,
    /// Subscription row carrying the `$DEFAULT` rule variant
    SubscriptionDefault,
    /// Any value the emulator has not been observed to write
    Unknown(u8),
}

impl From<u8> for RawEntityType {
    fn from(value: u8) -> Self {
        match value {
            0 => RawEntityType::Queue,
            1 => RawEntityType::Topic,
            2 => RawEntityType::Subscription,
            3 => RawEntityType::SubscriptionDefault,
            other => RawEntityType::Unknown(other),
        }
    }
}

/// One row of the emulator's flat entity lookup table.
///
/// Field aliases accept both the snake_case names used by snapshot files and
/// the column names produced by the lookup-table query.
///
/// # Examples
///
/// ```no_run
/// use server::catalog::RawEntityRecord;
///
/// let record = RawEntityRecord::new(7, "SBEMULATORNS:QUEUE:orders", 0, 5);
/// assert_eq!(record.message_count, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntityRecord {
    /// Storage-assigned id, not stable across emulator rebuilds
    #[serde(alias = "EntityId", alias = "Id")]
    pub id: i64,
    /// Opaque key shared by the main, `$TRANSFER` and `$DEFAULT` rows of one entity
    #[serde(default, alias = "EntityGroupId", alias = "GroupId")]
    pub group_id: Option<String>,
    #[serde(alias = "EntityName", alias = "Name")]
    pub raw_name: String,
    #[serde(default, alias = "EntityType", alias = "Type")]
    pub type_byte: u8,
    #[serde(default, alias = "MessageCount")]
    pub message_count: u64,
}

impl RawEntityRecord {
    pub fn new(id: i64, raw_name: impl Into<String>, type_byte: u8, message_count: u64) -> Self {
        Self {
            id,
            group_id: None,
            raw_name: raw_name.into(),
            type_byte,
            message_count,
        }
    }

    /// Attaches a grouping key to the record.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn entity_type(&self) -> RawEntityType {
        RawEntityType::from(self.type_byte)
    }
}

/// Kind of a reconstructed, user-facing entity.
///
/// The declaration order is the catalog display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Queue,
    Topic,
    Subscription,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Queue => write!(f, "Queue"),
            EntityKind::Topic => write!(f, "Topic"),
            EntityKind::Subscription => write!(f, "Subscription"),
        }
    }
}

/// A queue, topic or subscription with the message counts of every raw row
/// that was folded into it.
///
/// # Examples
///
/// ```no_run
/// use server::catalog::{EntityKind, LogicalEntity};
///
/// let sub = LogicalEntity::subscription(3, "events", "audit");
/// assert_eq!(sub.kind, EntityKind::Subscription);
/// assert_eq!(sub.display_name, "audit");
/// assert_eq!(sub.qualified_name(), "events|audit");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalEntity {
    pub kind: EntityKind,
    /// First non-zero raw id folded into this entity, 0 when none was seen
    pub canonical_id: i64,
    /// Cleaned name; only the subscription's own segment for subscriptions
    pub display_name: String,
    /// Cleaned parent topic name, set for subscriptions only
    pub parent_name: Option<String>,
    pub active_count: u64,
    pub dead_letter_count: u64,
}

impl LogicalEntity {
    pub fn new(kind: EntityKind, canonical_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            kind,
            canonical_id,
            display_name: display_name.into(),
            parent_name: None,
            active_count: 0,
            dead_letter_count: 0,
        }
    }

    pub fn queue(canonical_id: i64, name: impl Into<String>) -> Self {
        Self::new(EntityKind::Queue, canonical_id, name)
    }

    pub fn topic(canonical_id: i64, name: impl Into<String>) -> Self {
        Self::new(EntityKind::Topic, canonical_id, name)
    }

    pub fn subscription(
        canonical_id: i64,
        topic: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let mut entity = Self::new(EntityKind::Subscription, canonical_id, name);
        entity.parent_name = Some(topic.into());
        entity
    }

    /// Sets both counters, mostly useful when building catalogs by hand.
    pub fn with_counts(mut self, active: u64, dead_letter: u64) -> Self {
        self.active_count = active;
        self.dead_letter_count = dead_letter;
        self
    }

    /// Full name of the entity: `topic|subscription` for subscriptions,
    /// the display name otherwise.
    pub fn qualified_name(&self) -> String {
        match (&self.kind, &self.parent_name) {
            (EntityKind::Subscription, Some(parent)) => {
                format!("{parent}|{}", self.display_name)
            }
            _ => self.display_name.clone(),
        }
    }

    pub fn total_count(&self) -> u64 {
        self.active_count.saturating_add(self.dead_letter_count)
    }
}
