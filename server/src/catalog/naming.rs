//! Name cleaning and classification rules for the emulator's lookup table.
//!
//! Raw names look like `SBEMULATORNS:QUEUE:orders`,
//! `SBEMULATORNS:QUEUE:orders|$TRANSFER` or
//! `SBEMULATORNS:TOPIC:events|audit|$DEFAULT`. Everything that interprets
//! those strings lives here so the precedence rules can be read in one place:
//!
//! | Signal | Decides | Precedence |
//! |---|---|---|
//! | `|` in the base name | Subscription, split on the first pipe | wins over the type byte |
//! | type byte `1` | Topic | wins over a missing `TOPIC:` tag |
//! | anything else | Queue | default, including unknown type bytes |
//! | `$TRANSFER` suffix | dead-letter shadow | independent of the type byte |
//! | `$DEFAULT` suffix | active variant of the same entity | independent of the type byte |

use super::types::{EntityKind, RawEntityType};

/// Prefix carried by every row that belongs to the emulated namespace.
pub const NAMESPACE_MARKER: &str = "SBEMULATORNS";

/// Suffix of the transfer/dead-letter shadow rows.
pub const TRANSFER_SUFFIX: &str = "$TRANSFER";

/// Suffix of a subscription's default-rule variant rows.
pub const DEFAULT_SUFFIX: &str = "$DEFAULT";

/// Separator between a topic and its subscription in raw and qualified names.
pub const SUBSCRIPTION_SEPARATOR: char = '|';

/// Characters stripped from the front of names and in front of shadow suffixes.
pub const NAME_SEPARATORS: [char; 7] = ['|', '/', '\\', ':', '.', '-', '_'];

const TYPE_TAGS: [&str; 2] = ["QUEUE", "TOPIC"];
const TYPE_TAG_TERMINATORS: [char; 2] = [':', '|'];

pub fn is_separator(c: char) -> bool {
    NAME_SEPARATORS.contains(&c)
}

/// ASCII case-insensitive `strip_prefix`.
pub fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

/// ASCII case-insensitive `strip_suffix`.
pub fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    let tail = value.get(split..)?;
    if tail.eq_ignore_ascii_case(suffix) {
        Some(&value[..split])
    } else {
        None
    }
}

fn strip_type_tag(value: &str) -> Option<&str> {
    TYPE_TAGS.iter().find_map(|tag| {
        strip_prefix_ignore_case(value, tag)?.strip_prefix(TYPE_TAG_TERMINATORS)
    })
}

fn clean_once(name: &str) -> &str {
    let stripped = strip_prefix_ignore_case(name, NAMESPACE_MARKER).unwrap_or(name);
    let stripped = stripped.trim_start_matches(is_separator);
    let stripped = strip_type_tag(stripped).unwrap_or(stripped);
    stripped.trim_start_matches(is_separator).trim()
}

/// Removes the namespace marker, the `QUEUE`/`TOPIC` tag and any leading
/// separators from a raw or user-supplied entity name.
///
/// The rules are applied until the name stops changing, so cleaning an
/// already clean name returns it unchanged.
///
/// # Examples
///
/// ```no_run
/// use server::catalog::naming::clean_name;
///
/// assert_eq!(clean_name("SBEMULATORNS:QUEUE:orders"), "orders");
/// assert_eq!(clean_name("sbemulatorns|topic|events|audit"), "events|audit");
/// assert_eq!(clean_name("orders"), "orders");
/// ```
pub fn clean_name(raw: &str) -> String {
    let mut current = raw.trim();
    loop {
        let next = clean_once(current);
        if next.len() == current.len() {
            return next.to_string();
        }
        current = next;
    }
}

/// Which variant of a logical entity a raw row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowKind {
    /// The entity's own row
    Main,
    /// `$TRANSFER` row, its count is the dead-letter count
    Transfer,
    /// `$DEFAULT` subscription rule row, counted as active
    DefaultRule,
}

impl ShadowKind {
    pub fn is_dead_letter(self) -> bool {
        matches!(self, ShadowKind::Transfer)
    }
}

fn strip_shadow_token<'a>(name: &'a str, token: &str) -> Option<&'a str> {
    let base = strip_suffix_ignore_case(name, token)?;
    Some(base.strip_suffix(is_separator).unwrap_or(base))
}

/// Splits a clean name into its base name and the shadow variant it denotes.
///
/// A `$DEFAULT` suffix may sit underneath a `$TRANSFER` suffix; the row is
/// then still a dead-letter shadow.
pub fn split_shadow_suffix(clean: &str) -> (&str, ShadowKind) {
    let (base, transfer) = match strip_shadow_token(clean, TRANSFER_SUFFIX) {
        Some(base) => (base, true),
        None => (clean, false),
    };
    let (base, default_rule) = match strip_shadow_token(base, DEFAULT_SUFFIX) {
        Some(base) => (base, true),
        None => (base, false),
    };

    let shadow = if transfer {
        ShadowKind::Transfer
    } else if default_rule {
        ShadowKind::DefaultRule
    } else {
        ShadowKind::Main
    };
    (base, shadow)
}

/// Outcome of interpreting one raw row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: EntityKind,
    /// Fold name: `topic|subscription` for subscriptions, the plain name otherwise
    pub base_name: String,
    pub parent: Option<String>,
    /// Name shown to users; the subscription segment for subscriptions
    pub own_name: String,
    pub shadow: ShadowKind,
}

impl Classification {
    /// Case-insensitive form of the base name used for folding.
    pub fn base_key(&self) -> String {
        self.base_name.to_lowercase()
    }
}

/// Interprets a raw lookup-table row.
///
/// Returns `None` for rows that carry no usable name: empty or whitespace
/// names, or names that consist only of markers and suffixes.
///
/// # Examples
///
/// ```no_run
/// use server::catalog::{EntityKind, RawEntityType};
/// use server::catalog::naming::{classify, ShadowKind};
///
/// let class = classify("SBEMULATORNS:TOPIC:events|sub1|$TRANSFER", RawEntityType::Subscription).unwrap();
/// assert_eq!(class.kind, EntityKind::Subscription);
/// assert_eq!(class.parent.as_deref(), Some("events"));
/// assert_eq!(class.own_name, "sub1");
/// assert_eq!(class.shadow, ShadowKind::Transfer);
/// ```
pub fn classify(raw_name: &str, entity_type: RawEntityType) -> Option<Classification> {
    if raw_name.trim().is_empty() {
        return None;
    }

    let clean = clean_name(raw_name);
    let (base, shadow) = split_shadow_suffix(&clean);
    let base = base.trim_end_matches(SUBSCRIPTION_SEPARATOR).trim();
    if base.is_empty() {
        return None;
    }

    if let Some((parent, own)) = base
        .split_once(SUBSCRIPTION_SEPARATOR)
        .filter(|(parent, own)| !parent.is_empty() && !own.is_empty())
    {
        return Some(Classification {
            kind: EntityKind::Subscription,
            base_name: base.to_string(),
            parent: Some(parent.to_string()),
            own_name: own.to_string(),
            shadow,
        });
    }

    let kind = match entity_type {
        RawEntityType::Topic => EntityKind::Topic,
        _ => EntityKind::Queue,
    };

    Some(Classification {
        kind,
        base_name: base.to_string(),
        parent: None,
        own_name: base.to_string(),
        shadow,
    })
}
