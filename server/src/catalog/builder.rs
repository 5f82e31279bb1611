use super::naming::{Classification, ShadowKind, classify};
use super::types::{EntityKind, LogicalEntity, RawEntityRecord};
use std::collections::HashMap;

/// How raw rows are assigned to logical entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FoldStrategy {
    /// Use the storage group id when the rows sharing it agree on the base
    /// name, fall back to name-derived folding otherwise.
    #[default]
    PreferGroupId,
    /// Ignore group ids and fold purely on the cleaned names.
    NameOnly,
}

/// Folds raw lookup-table rows into the queue/topic/subscription catalog.
///
/// The builder is stateless between calls; every call recomputes the catalog
/// from the rows it is given.
///
/// # Examples
///
/// ```no_run
/// use server::catalog::{EntityCatalogBuilder, RawEntityRecord};
///
/// let records = vec![
///     RawEntityRecord::new(1, "SBEMULATORNS:QUEUE:orders", 0, 5),
///     RawEntityRecord::new(2, "SBEMULATORNS:QUEUE:orders|$TRANSFER", 0, 2),
/// ];
///
/// let catalog = EntityCatalogBuilder::new().build_catalog(&records);
/// assert_eq!(catalog.len(), 1);
/// assert_eq!(catalog[0].active_count, 5);
/// assert_eq!(catalog[0].dead_letter_count, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityCatalogBuilder {
    strategy: FoldStrategy,
}

/// Key identifying one logical entity. Names are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FoldKey {
    kind: EntityKind,
    parent: Option<String>,
    base: String,
}

impl FoldKey {
    fn of(class: &Classification) -> Self {
        Self {
            kind: class.kind,
            parent: class.parent.as_deref().map(str::to_lowercase),
            base: class.base_key(),
        }
    }
}

struct ClassifiedRecord<'a> {
    record: &'a RawEntityRecord,
    class: Classification,
}

/// Accumulator for every row folded into one entity.
struct FoldGroup {
    kind: EntityKind,
    display_name: String,
    parent_name: Option<String>,
    canonical_id: i64,
    active_count: u64,
    dead_letter_count: u64,
}

impl FoldGroup {
    fn open(class: &Classification) -> Self {
        Self {
            kind: class.kind,
            display_name: class.own_name.clone(),
            parent_name: class.parent.clone(),
            canonical_id: 0,
            active_count: 0,
            dead_letter_count: 0,
        }
    }

    fn absorb(&mut self, record: &RawEntityRecord, shadow: ShadowKind) {
        if self.canonical_id == 0 && record.id != 0 {
            self.canonical_id = record.id;
        }
        if shadow.is_dead_letter() {
            self.dead_letter_count = self.dead_letter_count.saturating_add(record.message_count);
        } else {
            self.active_count = self.active_count.saturating_add(record.message_count);
        }
    }

    fn into_entity(self) -> LogicalEntity {
        LogicalEntity {
            kind: self.kind,
            canonical_id: self.canonical_id,
            display_name: self.display_name,
            parent_name: self.parent_name,
            active_count: self.active_count,
            dead_letter_count: self.dead_letter_count,
        }
    }
}

impl EntityCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: FoldStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> FoldStrategy {
        self.strategy
    }

    /// Builds the ordered catalog from raw rows.
    ///
    /// Rows without a usable name are dropped. The result holds one entity per
    /// distinct `(kind, base name, parent)` and is ordered queues first, then
    /// topics, then subscriptions grouped by parent topic, each tier
    /// alphabetical ignoring case.
    pub fn build_catalog(&self, records: &[RawEntityRecord]) -> Vec<LogicalEntity> {
        let mut classified: Vec<ClassifiedRecord<'_>> = records
            .iter()
            .filter_map(|record| {
                classify(&record.raw_name, record.entity_type())
                    .map(|class| ClassifiedRecord { record, class })
            })
            .collect();

        let dropped = records.len() - classified.len();
        if dropped > 0 {
            log::debug!("Skipped {dropped} entity rows without a usable name");
        }

        if self.strategy == FoldStrategy::PreferGroupId {
            reconcile_groups(&mut classified);
        }

        let mut groups: Vec<FoldGroup> = Vec::new();
        let mut slots: HashMap<FoldKey, usize> = HashMap::new();
        for item in &classified {
            let slot = *slots.entry(FoldKey::of(&item.class)).or_insert_with(|| {
                groups.push(FoldGroup::open(&item.class));
                groups.len() - 1
            });
            groups[slot].absorb(item.record, item.class.shadow);
        }

        let mut catalog: Vec<LogicalEntity> =
            groups.into_iter().map(FoldGroup::into_entity).collect();
        sort_catalog(&mut catalog);

        log::debug!(
            "Built catalog of {} entities from {} rows",
            catalog.len(),
            records.len()
        );
        catalog
    }
}

/// Builds the catalog with the default strategy.
pub fn build_catalog(records: &[RawEntityRecord]) -> Vec<LogicalEntity> {
    EntityCatalogBuilder::new().build_catalog(records)
}

struct GroupOwner {
    base_key: String,
    kind: EntityKind,
}

/// Gives every row of a storage group the classification of its strongest
/// member, so a `$TRANSFER` row tagged with the queue type byte still folds
/// into its topic. Rows whose base name disagrees with the first row of their
/// group keep their own classification.
fn reconcile_groups(items: &mut [ClassifiedRecord<'_>]) {
    let mut owners: HashMap<&str, GroupOwner> = HashMap::new();

    for item in items.iter() {
        let Some(group_id) = group_id_of(item.record) else {
            continue;
        };
        let base_key = item.class.base_key();
        let owner = owners.entry(group_id).or_insert_with(|| GroupOwner {
            base_key: base_key.clone(),
            kind: item.class.kind,
        });
        if owner.base_key == base_key {
            owner.kind = owner.kind.max(item.class.kind);
        } else {
            log::debug!(
                "Group {group_id} mixes names '{}' and '{}', folding by name",
                owner.base_key,
                base_key
            );
        }
    }

    for item in items.iter_mut() {
        let record = item.record;
        let Some(owner) = group_id_of(record).and_then(|group_id| owners.get(group_id)) else {
            continue;
        };
        if owner.base_key == item.class.base_key() && owner.kind != item.class.kind {
            log::debug!(
                "Reclassifying '{}' from {} to {} using its group",
                record.raw_name,
                item.class.kind,
                owner.kind
            );
            item.class.kind = owner.kind;
        }
    }
}

fn group_id_of(record: &RawEntityRecord) -> Option<&str> {
    record
        .group_id
        .as_deref()
        .map(str::trim)
        .filter(|group_id| !group_id.is_empty())
}

/// Orders a catalog the way it is displayed. The sort is stable.
pub fn sort_catalog(catalog: &mut [LogicalEntity]) {
    catalog.sort_by_cached_key(|entity| {
        (
            entity.kind,
            entity
                .parent_name
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or_default(),
            entity.display_name.to_lowercase(),
        )
    });
}
