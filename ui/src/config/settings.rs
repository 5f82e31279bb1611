//! Message composition settings: content types, common application
//! properties and canned messages per entity.
//!
//! Settings come from the `AsbEmulatorUi__SettingsOverride` environment
//! variable (a JSON document), else from the first `settings.json` found
//! among [`settings_candidates`], else from defaults. Field names are
//! accepted in PascalCase, camelCase or snake_case. Settings are read only.

use crate::constants::env_vars::{SETTINGS_OVERRIDE, SETTINGS_OVERRIDE_UPPER};
use azure_core::time::parse_rfc3339;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use server::address::AddressResolver;
use server::model::MessageData;
use server::utils::EnvUtils;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(
        rename = "ContentTypes",
        alias = "contentTypes",
        alias = "content_types"
    )]
    pub content_types: Vec<String>,

    #[serde(
        rename = "DefaultContentType",
        alias = "defaultContentType",
        alias = "default_content_type"
    )]
    pub default_content_type: String,

    #[serde(
        rename = "CommonApplicationProperties",
        alias = "commonApplicationProperties",
        alias = "common_application_properties",
        deserialize_with = "property_pairs"
    )]
    pub common_application_properties: Vec<PropertyPair>,

    /// Canned messages keyed by entity name, then by scenario name
    #[serde(
        rename = "CannedMessages",
        alias = "cannedMessages",
        alias = "canned_messages"
    )]
    pub canned_messages: BTreeMap<String, BTreeMap<String, CannedMessage>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            content_types: vec![
                "application/json".to_string(),
                "text/plain".to_string(),
                "application/xml".to_string(),
                "application/octet-stream".to_string(),
            ],
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            common_application_properties: vec![PropertyPair::new("MessageType", "MT_EVENT")],
            canned_messages: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyPair {
    #[serde(rename = "Key", alias = "key")]
    pub key: String,
    #[serde(rename = "Value", alias = "value")]
    pub value: String,
}

impl PropertyPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannedMessage {
    #[serde(rename = "ContentType", alias = "contentType", alias = "content_type")]
    pub content_type: String,
    #[serde(rename = "Body", alias = "body", deserialize_with = "body_text")]
    pub body: String,
    #[serde(
        rename = "BrokerProperties",
        alias = "brokerProperties",
        alias = "broker_properties"
    )]
    pub broker_properties: BTreeMap<String, Value>,
    #[serde(
        rename = "ApplicationProperties",
        alias = "applicationProperties",
        alias = "application_properties"
    )]
    pub application_properties: BTreeMap<String, Value>,
}

impl Default for CannedMessage {
    fn default() -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            body: String::new(),
            broker_properties: BTreeMap::new(),
            application_properties: BTreeMap::new(),
        }
    }
}

impl CannedMessage {
    fn broker_property(&self, name: &str) -> Option<String> {
        self.broker_properties
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value_text(value))
            .filter(|value| !value.is_empty())
    }

    /// Message to send for this scenario.
    ///
    /// Common properties are applied first so the message's own application
    /// properties win. `ContentType`, `MessageId`, `CorrelationId`,
    /// `SessionId`, `Subject`, `PartitionKey`, `TimeToLive` (seconds) and
    /// `ScheduledEnqueueTime` (RFC 3339) broker properties are mapped onto the
    /// message. Values that do not parse are logged and skipped.
    pub fn to_message_data(&self, common: &[PropertyPair]) -> MessageData {
        let mut properties: HashMap<String, String> = common
            .iter()
            .map(|pair| (pair.key.clone(), pair.value.clone()))
            .collect();
        properties.extend(
            self.application_properties
                .iter()
                .map(|(key, value)| (key.clone(), value_text(value))),
        );

        let content_type = self
            .broker_property("ContentType")
            .or_else(|| Some(self.content_type.clone()).filter(|ct| !ct.trim().is_empty()));

        let time_to_live_secs = self.broker_property("TimeToLive").and_then(|ttl| {
            ttl.trim()
                .parse::<u64>()
                .map_err(|e| log::warn!("Ignoring TimeToLive '{ttl}': {e}"))
                .ok()
        });

        let scheduled_enqueue_time = self
            .broker_property("ScheduledEnqueueTime")
            .and_then(|at| {
                parse_rfc3339(at.trim())
                    .map_err(|e| log::warn!("Ignoring ScheduledEnqueueTime '{at}': {e}"))
                    .ok()
            });

        MessageData {
            content: self.body.clone(),
            content_type,
            message_id: self.broker_property("MessageId"),
            correlation_id: self.broker_property("CorrelationId"),
            session_id: self.broker_property("SessionId"),
            subject: self.broker_property("Subject"),
            partition_key: self.broker_property("PartitionKey"),
            time_to_live_secs,
            scheduled_enqueue_time,
            properties: Some(properties).filter(|p| !p.is_empty()),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn entity_messages(&self, entity: &str) -> Option<&BTreeMap<String, CannedMessage>> {
        let wanted = AddressResolver::to_address(entity);
        self.canned_messages
            .iter()
            .find(|(key, _)| AddressResolver::to_address(key) == wanted)
            .map(|(_, messages)| messages)
    }

    /// Canned message for an entity and scenario. The entity may be given in
    /// any form that resolves to the same address as the settings key.
    pub fn canned_message(&self, entity: &str, scenario: &str) -> Option<&CannedMessage> {
        self.entity_messages(entity)?
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(scenario.trim()))
            .map(|(_, message)| message)
    }

    pub fn scenarios(&self, entity: &str) -> Vec<&str> {
        self.entity_messages(entity)
            .map(|messages| messages.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn common_properties(&self) -> HashMap<String, String> {
        self.common_application_properties
            .iter()
            .map(|pair| (pair.key.clone(), pair.value.clone()))
            .collect()
    }
}

/// Where the active settings were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsOrigin {
    Override,
    File(PathBuf),
    Defaults,
}

impl fmt::Display for SettingsOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsOrigin::Override => write!(f, "{SETTINGS_OVERRIDE} environment variable"),
            SettingsOrigin::File(path) => write!(f, "{}", path.display()),
            SettingsOrigin::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Paths probed for `settings.json`, in order.
pub fn settings_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(SETTINGS_FILE));
        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(SETTINGS_FILE));
        }
        candidates.push(exe_dir.join("..").join(SETTINGS_FILE));
        candidates.push(exe_dir.join("..").join("..").join(SETTINGS_FILE));
    } else if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(SETTINGS_FILE));
    }

    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("asb-lens").join(SETTINGS_FILE));
    }

    candidates.dedup();
    candidates
}

/// Loads settings from the override variable, else the candidate files.
pub fn load_settings() -> (Settings, SettingsOrigin) {
    let override_json = EnvUtils::first_non_empty(&[SETTINGS_OVERRIDE, SETTINGS_OVERRIDE_UPPER]);
    load_settings_from(override_json.as_deref(), &settings_candidates())
}

/// Settings from an override document or the first existing candidate file.
///
/// An unparsable override falls through to the files; an unparsable file
/// yields the defaults.
pub fn load_settings_from(
    override_json: Option<&str>,
    candidates: &[PathBuf],
) -> (Settings, SettingsOrigin) {
    if let Some(json) = override_json.filter(|json| !json.trim().is_empty()) {
        match Settings::from_json(json) {
            Ok(settings) => return (settings, SettingsOrigin::Override),
            Err(e) => log::warn!("Ignoring invalid settings override: {e}"),
        }
    }

    let Some(path) = candidates.iter().find(|path| path.is_file()) else {
        log::debug!("No {SETTINGS_FILE} found, using default settings");
        return (Settings::default(), SettingsOrigin::Defaults);
    };

    match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| Settings::from_json(&json).map_err(|e| e.to_string()))
    {
        Ok(settings) => {
            log::debug!("Loaded settings from {}", path.display());
            (settings, SettingsOrigin::File(path.clone()))
        }
        Err(e) => {
            log::warn!("Ignoring settings file {}: {e}", path.display());
            (Settings::default(), SettingsOrigin::Defaults)
        }
    }
}

/// Text form of a JSON property value; strings are not quoted.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn body_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Accepts `[{"Key": .., "Value": ..}]` as well as a plain object.
fn property_pairs<'de, D>(deserializer: D) -> Result<Vec<PropertyPair>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<PropertyPair>),
        Map(BTreeMap<String, Value>),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::List(pairs) => pairs,
        Repr::Map(map) => map
            .into_iter()
            .map(|(key, value)| PropertyPair::new(key, value_text(&value)))
            .collect(),
    })
}
