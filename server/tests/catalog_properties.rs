use proptest::prelude::*;
use server::address::AddressResolver;
use server::catalog::{EntityCatalogBuilder, EntityKind, FoldStrategy, RawEntityRecord, clean_name};

/// One generated logical entity and the raw rows that describe it.
#[derive(Debug, Clone)]
struct GeneratedEntity {
    kind: EntityKind,
    name: String,
    parent: Option<String>,
    active: u64,
    dead_letter: u64,
    default_rule: Option<u64>,
}

impl GeneratedEntity {
    fn rows(&self, first_id: i64) -> Vec<RawEntityRecord> {
        let (tag, name, type_byte) = match self.kind {
            EntityKind::Queue => ("QUEUE", self.name.clone(), 0),
            EntityKind::Topic => ("TOPIC", self.name.clone(), 1),
            EntityKind::Subscription => (
                "TOPIC",
                format!("{}|{}", self.parent.as_deref().unwrap_or_default(), self.name),
                2,
            ),
        };
        let group = format!("group-{first_id}");

        let mut rows = vec![
            RawEntityRecord::new(first_id, format!("SBEMULATORNS:{tag}:{name}"), type_byte, self.active)
                .with_group(group.clone()),
            RawEntityRecord::new(
                first_id + 1,
                format!("SBEMULATORNS:{tag}:{name}|$TRANSFER"),
                type_byte,
                self.dead_letter,
            )
            .with_group(group.clone()),
        ];
        if let Some(count) = self.default_rule {
            rows.push(
                RawEntityRecord::new(
                    first_id + 2,
                    format!("SBEMULATORNS:{tag}:{name}|$DEFAULT"),
                    3,
                    count,
                )
                .with_group(group),
            );
        }
        rows
    }

    fn expected_active(&self) -> u64 {
        self.active + self.default_rule.unwrap_or(0)
    }
}

fn entity_strategy() -> impl Strategy<Value = (u8, u64, u64, Option<u64>)> {
    (0u8..4, 0u64..1000, 0u64..1000, proptest::option::of(0u64..1000))
}

/// Entities with names unique per kind, plus their rows in shuffled order.
fn catalog_strategy() -> impl Strategy<Value = (Vec<GeneratedEntity>, Vec<RawEntityRecord>)> {
    prop::collection::vec(entity_strategy(), 0..20).prop_flat_map(|specs| {
        let entities: Vec<GeneratedEntity> = specs
            .into_iter()
            .enumerate()
            .map(|(i, (kind, active, dead_letter, default_rule))| match kind {
                0 => GeneratedEntity {
                    kind: EntityKind::Queue,
                    name: format!("queue{i}"),
                    parent: None,
                    active,
                    dead_letter,
                    default_rule: None,
                },
                1 => GeneratedEntity {
                    kind: EntityKind::Topic,
                    name: format!("Topic{i}"),
                    parent: None,
                    active,
                    dead_letter,
                    default_rule: None,
                },
                // Kind 3 is a subscription whose own name carries further pipes
                _ => GeneratedEntity {
                    kind: EntityKind::Subscription,
                    name: if kind == 3 {
                        format!("sub{i}|part{i}")
                    } else {
                        format!("sub{i}")
                    },
                    parent: Some(format!("topic{}", i % 3)),
                    active,
                    dead_letter,
                    default_rule,
                },
            })
            .collect();

        let rows: Vec<RawEntityRecord> = entities
            .iter()
            .enumerate()
            .flat_map(|(i, entity)| entity.rows(i as i64 * 10 + 1))
            .collect();

        (Just(entities), Just(rows).prop_shuffle())
    })
}

/// Order-independent view of a catalog entry.
fn summary(catalog: &[server::catalog::LogicalEntity]) -> Vec<(EntityKind, String, Option<String>, u64, u64)> {
    catalog
        .iter()
        .map(|e| {
            (
                e.kind,
                e.display_name.clone(),
                e.parent_name.clone(),
                e.active_count,
                e.dead_letter_count,
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn test_clean_name_is_idempotent(raw in ".{0,40}") {
        let once = clean_name(&raw);
        prop_assert_eq!(clean_name(&once), once);
    }

    #[test]
    fn test_clean_name_is_idempotent_for_marker_heavy_names(
        parts in prop::collection::vec(
            prop::sample::select(vec!["SBEMULATORNS", "QUEUE", "TOPIC", ":", "|", "-", "_", "/", "name", "$TRANSFER"]),
            0..8,
        )
    ) {
        let raw = parts.concat();
        let once = clean_name(&raw);
        prop_assert_eq!(clean_name(&once), once);
    }

    #[test]
    fn test_every_row_is_counted_exactly_once((entities, rows) in catalog_strategy()) {
        let catalog = EntityCatalogBuilder::new().build_catalog(&rows);

        let row_total: u64 = rows.iter().map(|r| r.message_count).sum();
        let catalog_total: u64 = catalog.iter().map(|e| e.total_count()).sum();
        prop_assert_eq!(row_total, catalog_total);

        prop_assert_eq!(catalog.len(), entities.len());
        for entity in &entities {
            let found = catalog.iter().find(|e| {
                e.kind == entity.kind
                    && e.display_name == entity.name
                    && e.parent_name == entity.parent
            });
            prop_assert!(found.is_some(), "missing {:?}", entity);
            let found = found.unwrap();
            prop_assert_eq!(found.active_count, entity.expected_active());
            prop_assert_eq!(found.dead_letter_count, entity.dead_letter);
        }
    }

    #[test]
    fn test_fold_strategies_agree_on_consistent_rows((_entities, rows) in catalog_strategy()) {
        let by_group = EntityCatalogBuilder::with_strategy(FoldStrategy::PreferGroupId).build_catalog(&rows);
        let by_name = EntityCatalogBuilder::with_strategy(FoldStrategy::NameOnly).build_catalog(&rows);
        prop_assert_eq!(summary(&by_group), summary(&by_name));
    }

    #[test]
    fn test_catalog_order_ignores_input_order((_entities, rows) in catalog_strategy()) {
        let forward = EntityCatalogBuilder::new().build_catalog(&rows);
        let mut reversed_rows = rows.clone();
        reversed_rows.reverse();
        let reversed = EntityCatalogBuilder::new().build_catalog(&reversed_rows);

        prop_assert_eq!(summary(&forward), summary(&reversed));

        let kinds: Vec<EntityKind> = forward.iter().map(|e| e.kind).collect();
        let mut sorted_kinds = kinds.clone();
        sorted_kinds.sort();
        prop_assert_eq!(kinds, sorted_kinds);
    }

    #[test]
    fn test_every_catalog_entry_resolves((_entities, rows) in catalog_strategy()) {
        let catalog = EntityCatalogBuilder::new().build_catalog(&rows);

        for entity in &catalog {
            let address = AddressResolver::to_address(&entity.qualified_name());
            prop_assert!(AddressResolver::exists(&address, &catalog), "{} not found", address);
            prop_assert_eq!(AddressResolver::to_address(&address), address.clone());

            let dead_letter = format!("{address}/$DeadLetterQueue");
            prop_assert!(AddressResolver::exists(&dead_letter, &catalog));
        }
    }

    #[test]
    fn test_subscription_address_shape(topic in "[a-zA-Z][a-zA-Z0-9]{0,10}", sub in "[a-zA-Z][a-zA-Z0-9]{0,10}") {
        let address = AddressResolver::to_address(&format!("{topic}|{sub}"));
        prop_assert_eq!(
            address,
            format!("{}/subscriptions/{}", topic.to_lowercase(), sub.to_lowercase())
        );
    }
}
