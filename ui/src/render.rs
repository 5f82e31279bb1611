//! Plain-text and JSON output of command results.

use crate::error::AppResult;
use server::catalog::{EntityKind, LogicalEntity};
use server::explorer::ResolvedEntity;
use server::model::MessageModel;
use server::address::EntityAddress;

const SECRET_KEYS: [&str; 2] = ["Password", "SharedAccessKey"];
const MASK: &str = "****";

/// Catalog as an aligned table, one entity per line.
pub fn entities_table(catalog: &[LogicalEntity]) -> String {
    if catalog.is_empty() {
        return "No entities found".to_string();
    }

    let rows: Vec<[String; 5]> = catalog
        .iter()
        .map(|entity| {
            [
                entity.kind.to_string(),
                entity.qualified_name(),
                entity.active_count.to_string(),
                entity.dead_letter_count.to_string(),
                EntityAddress::for_entity(entity).to_string(),
            ]
        })
        .collect();

    let header = ["KIND", "NAME", "ACTIVE", "DLQ", "ADDRESS"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(&header.map(str::to_string), &widths));
    lines.extend(rows.iter().map(|row| format_row(row, &widths)));
    lines.join("\n")
}

fn format_row(cells: &[String; 5], widths: &[usize; 5]) -> String {
    let [kind, name, active, dlq, address] = cells;
    format!(
        "{kind:<w0$}  {name:<w1$}  {active:>w2$}  {dlq:>w3$}  {address}",
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3],
    )
}

pub fn entities_json(catalog: &[LogicalEntity]) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(catalog)?)
}

pub fn resolved_entity(resolved: &ResolvedEntity) -> String {
    let entity = &resolved.entity;
    let mut lines = vec![
        format!("Kind:        {}", entity.kind),
        format!("Name:        {}", entity.qualified_name()),
    ];
    if entity.kind == EntityKind::Subscription {
        if let Some(parent) = &entity.parent_name {
            lines.push(format!("Topic:       {parent}"));
        }
    }
    lines.push(format!("Id:          {}", entity.canonical_id));
    lines.push(format!("Active:      {}", entity.active_count));
    lines.push(format!("Dead-letter: {}", entity.dead_letter_count));
    lines.push(format!("Address:     {}", resolved.address));
    if !resolved.address.is_dead_letter() {
        lines.push(format!("DLQ address: {}", resolved.address.dead_letter()));
    }
    lines.join("\n")
}

/// Messages as text blocks separated by blank lines.
pub fn messages(messages: &[MessageModel]) -> String {
    if messages.is_empty() {
        return "No messages".to_string();
    }

    messages
        .iter()
        .map(message)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Header line, one line per set broker property, then the body.
fn message(msg: &MessageModel) -> String {
    let mut lines = vec![format!(
        "#{} {} [{:?}] enqueued {} deliveries {}",
        msg.sequence, msg.id, msg.state, msg.enqueued_at, msg.delivery_count
    )];

    let expires = msg.expires_at.map(|at| at.to_string());
    let fields = [
        ("Expires", expires.as_deref()),
        ("Content-Type", msg.content_type.as_deref()),
        ("Correlation-Id", msg.correlation_id.as_deref()),
        ("Session-Id", msg.session_id.as_deref()),
        ("Subject", msg.subject.as_deref()),
    ];
    lines.extend(
        fields
            .into_iter()
            .filter_map(|(label, value)| value.map(|value| format!("  {label}: {value}"))),
    );

    if !msg.application_properties.is_empty() {
        let properties = msg
            .application_properties
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("  Properties: {properties}"));
    }

    lines.push(msg.body.to_display_string());
    lines.join("\n")
}

/// Replaces secret values in a `key=value;` connection string.
pub fn mask_secrets(connection_string: &str) -> String {
    connection_string
        .split(';')
        .map(|part| match part.split_once('=') {
            Some((key, _)) if SECRET_KEYS.iter().any(|s| key.trim().eq_ignore_ascii_case(s)) => {
                format!("{key}={MASK}")
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}
