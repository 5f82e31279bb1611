//! Translation between catalog names and the addresses the transport expects.
//!
//! Queues and topics are addressed by their lower-cased name, subscriptions
//! by `{topic}/subscriptions/{subscription}`. Dead-letter sub-queues append
//! `/$DeadLetterQueue` with that exact casing.

use crate::catalog::naming::{SUBSCRIPTION_SEPARATOR, clean_name, strip_suffix_ignore_case};
use crate::catalog::{EntityKind, LogicalEntity};
use std::fmt;

/// Marker of the dead-letter sub-queue, in the casing the transport requires.
pub const DEAD_LETTER_MARKER: &str = "$DeadLetterQueue";

/// Path segment between a topic and its subscription.
pub const SUBSCRIPTIONS_SEGMENT: &str = "/subscriptions/";

/// A parsed, normalised entity address.
///
/// # Examples
///
/// ```no_run
/// use server::address::EntityAddress;
///
/// let address = EntityAddress::parse("Events|Audit/$deadletterqueue");
/// assert!(address.is_subscription());
/// assert!(address.is_dead_letter());
/// assert_eq!(address.to_string(), "events/subscriptions/audit/$DeadLetterQueue");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityAddress {
    entity_path: String,
    subscription: Option<(String, String)>,
    dead_letter: bool,
}

impl EntityAddress {
    /// Parses a display name, qualified name (`topic|sub`), raw lookup-table
    /// name or transport address. Parsing never fails.
    pub fn parse(input: &str) -> Self {
        let clean = clean_name(input);
        let (body, dead_letter) = split_dead_letter_marker(&clean);
        let lower = body.to_lowercase();

        match split_subscription(&lower) {
            Some((topic, subscription)) => Self::subscription_path(topic, subscription, dead_letter),
            None => Self {
                entity_path: lower,
                subscription: None,
                dead_letter,
            },
        }
    }

    /// Address of a catalog entry's main queue.
    pub fn for_entity(entity: &LogicalEntity) -> Self {
        match (entity.kind, entity.parent_name.as_deref()) {
            (EntityKind::Subscription, Some(parent)) => Self::subscription_path(
                &parent.to_lowercase(),
                &entity.display_name.to_lowercase(),
                false,
            ),
            _ => Self {
                entity_path: entity.display_name.to_lowercase(),
                subscription: None,
                dead_letter: false,
            },
        }
    }

    fn subscription_path(topic: &str, subscription: &str, dead_letter: bool) -> Self {
        Self {
            entity_path: format!("{topic}{SUBSCRIPTIONS_SEGMENT}{subscription}"),
            subscription: Some((topic.to_string(), subscription.to_string())),
            dead_letter,
        }
    }

    /// Path of the entity itself, without any dead-letter suffix.
    pub fn entity_path(&self) -> &str {
        &self.entity_path
    }

    pub fn is_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_dead_letter(&self) -> bool {
        self.dead_letter
    }

    pub fn topic(&self) -> Option<&str> {
        self.subscription.as_ref().map(|(topic, _)| topic.as_str())
    }

    pub fn subscription_name(&self) -> Option<&str> {
        self.subscription.as_ref().map(|(_, name)| name.as_str())
    }

    /// Catalog key of the addressed entity: `topic|subscription` or the path.
    pub fn qualified_name(&self) -> String {
        match &self.subscription {
            Some((topic, name)) => format!("{topic}{SUBSCRIPTION_SEPARATOR}{name}"),
            None => self.entity_path.clone(),
        }
    }

    /// The same entity's dead-letter sub-queue.
    pub fn dead_letter(&self) -> Self {
        Self {
            dead_letter: true,
            ..self.clone()
        }
    }

    /// The same entity's main queue.
    pub fn main(&self) -> Self {
        Self {
            dead_letter: false,
            ..self.clone()
        }
    }
}

impl fmt::Display for EntityAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entity_path)?;
        if self.dead_letter {
            write!(f, "/{DEAD_LETTER_MARKER}")?;
        }
        Ok(())
    }
}

fn split_dead_letter_marker(name: &str) -> (&str, bool) {
    match strip_suffix_ignore_case(name, DEAD_LETTER_MARKER) {
        Some(base) => {
            let base = base
                .strip_suffix(['/', SUBSCRIPTION_SEPARATOR])
                .unwrap_or(base);
            (base.trim(), true)
        }
        None => (name, false),
    }
}

/// Splits on the `/subscriptions/` segment when present, else on the first
/// pipe. Subscription names may themselves contain pipes.
fn split_subscription(lower: &str) -> Option<(&str, &str)> {
    let candidate = match lower.find(SUBSCRIPTIONS_SEGMENT) {
        Some(idx) => Some((&lower[..idx], &lower[idx + SUBSCRIPTIONS_SEGMENT.len()..])),
        None => lower
            .trim_end_matches(SUBSCRIPTION_SEPARATOR)
            .split_once(SUBSCRIPTION_SEPARATOR),
    };
    candidate.filter(|(topic, subscription)| !topic.is_empty() && !subscription.is_empty())
}

/// Converts catalog names into transport addresses and checks them against a
/// catalog.
///
/// Callers are expected to call [`AddressResolver::exists`] before handing an
/// address to the transport and to report `false` as "entity not found".
pub struct AddressResolver;

impl AddressResolver {
    /// Canonical transport address for a display name, qualified name or
    /// address. Never fails; unknown shapes produce a best-effort address.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use server::address::AddressResolver;
    ///
    /// assert_eq!(AddressResolver::to_address("Orders"), "orders");
    /// assert_eq!(AddressResolver::to_address("events|sub1"), "events/subscriptions/sub1");
    /// ```
    pub fn to_address(display_name_or_path: &str) -> String {
        EntityAddress::parse(display_name_or_path).to_string()
    }

    /// Finds the catalog entry an address refers to.
    ///
    /// Subscription-shaped addresses only match subscriptions, everything else
    /// only matches queues and topics. A dead-letter address matches the entity
    /// that owns the sub-queue.
    pub fn find<'a>(address: &str, catalog: &'a [LogicalEntity]) -> Option<&'a LogicalEntity> {
        let target = EntityAddress::parse(address);
        if target.entity_path.is_empty() {
            return None;
        }

        catalog.iter().find(|entity| {
            let is_subscription = entity.kind == EntityKind::Subscription;
            is_subscription == target.is_subscription()
                && EntityAddress::for_entity(entity).entity_path == target.entity_path
        })
    }

    /// Whether an address refers to an entity in the catalog.
    pub fn exists(address: &str, catalog: &[LogicalEntity]) -> bool {
        Self::find(address, catalog).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<LogicalEntity> {
        vec![
            LogicalEntity::queue(1, "Orders"),
            LogicalEntity::topic(2, "events"),
            LogicalEntity::subscription(3, "events", "sub1"),
        ]
    }

    #[test]
    fn test_to_address_for_queues_and_topics() {
        assert_eq!(AddressResolver::to_address("Orders"), "orders");
        assert_eq!(AddressResolver::to_address("SBEMULATORNS:QUEUE:Orders"), "orders");
        assert_eq!(AddressResolver::to_address("/input-queue"), "input-queue");
    }

    #[test]
    fn test_to_address_for_subscriptions() {
        assert_eq!(
            AddressResolver::to_address("events|sub1"),
            "events/subscriptions/sub1"
        );
        assert_eq!(
            AddressResolver::to_address("SBEMULATORNS:TOPIC:Events|Sub1"),
            "events/subscriptions/sub1"
        );
        assert_eq!(
            AddressResolver::to_address("events/Subscriptions/sub1"),
            "events/subscriptions/sub1"
        );
    }

    #[test]
    fn test_to_address_keeps_dead_letter_marker_casing() {
        assert_eq!(
            AddressResolver::to_address("Events|Sub1/$deadletterqueue"),
            "events/subscriptions/sub1/$DeadLetterQueue"
        );
        assert_eq!(
            AddressResolver::to_address("events|sub1|$DeadLetterQueue"),
            "events/subscriptions/sub1/$DeadLetterQueue"
        );
        assert_eq!(
            AddressResolver::to_address("Orders/$DEADLETTERQUEUE"),
            "orders/$DeadLetterQueue"
        );
    }

    #[test]
    fn test_to_address_is_stable_on_addresses() {
        let address = AddressResolver::to_address("events|sub1/$DeadLetterQueue");
        assert_eq!(AddressResolver::to_address(&address), address);
    }

    #[test]
    fn test_exists_matches_each_kind() {
        let catalog = catalog();

        assert!(AddressResolver::exists("orders", &catalog));
        assert!(AddressResolver::exists("ORDERS", &catalog));
        assert!(AddressResolver::exists("events", &catalog));
        assert!(AddressResolver::exists("events/subscriptions/sub1", &catalog));
        assert!(AddressResolver::exists("events|sub1", &catalog));
        assert!(!AddressResolver::exists("payments", &catalog));
        assert!(!AddressResolver::exists("events/subscriptions/sub2", &catalog));
    }

    #[test]
    fn test_exists_accepts_dead_letter_addresses() {
        let catalog = catalog();

        assert!(AddressResolver::exists(
            "events/subscriptions/sub1/$DeadLetterQueue",
            &catalog
        ));
        assert!(AddressResolver::exists("orders/$deadletterqueue", &catalog));
        assert!(!AddressResolver::exists(
            "events/subscriptions/sub1/$DeadLetterQueue",
            &catalog[..2]
        ));
    }

    #[test]
    fn test_subscription_name_does_not_match_queue() {
        let catalog = vec![
            LogicalEntity::queue(1, "sub1"),
            LogicalEntity::subscription(2, "events", "other"),
        ];

        assert!(!AddressResolver::exists("events|sub1", &catalog));
        assert!(AddressResolver::exists("sub1", &catalog));
    }

    #[test]
    fn test_subscription_names_with_pipes_round_trip() {
        let catalog = vec![
            LogicalEntity::topic(1, "events"),
            LogicalEntity::subscription(2, "events", "sub|extra"),
        ];

        let address = AddressResolver::to_address("events|sub|extra");
        assert_eq!(address, "events/subscriptions/sub|extra");
        assert_eq!(AddressResolver::to_address(&address), address);
        assert!(AddressResolver::exists(&address, &catalog));
        assert!(AddressResolver::exists("events|sub|extra", &catalog));
        assert!(AddressResolver::exists(
            "events/subscriptions/sub|extra/$DeadLetterQueue",
            &catalog
        ));

        let parsed = EntityAddress::parse(&address);
        assert_eq!(parsed.topic(), Some("events"));
        assert_eq!(parsed.subscription_name(), Some("sub|extra"));
    }

    #[test]
    fn test_exists_rejects_empty_address() {
        assert!(!AddressResolver::exists("", &catalog()));
        assert!(!AddressResolver::exists("$DeadLetterQueue", &catalog()));
    }

    #[test]
    fn test_entity_address_accessors() {
        let address = EntityAddress::parse("events|sub1");
        assert_eq!(address.topic(), Some("events"));
        assert_eq!(address.subscription_name(), Some("sub1"));
        assert_eq!(address.qualified_name(), "events|sub1");
        assert_eq!(
            address.dead_letter().to_string(),
            "events/subscriptions/sub1/$DeadLetterQueue"
        );
        assert_eq!(address.dead_letter().main(), address);
    }
}
