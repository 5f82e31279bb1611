use azservicebus::prelude::ServiceBusPeekedMessage;
use azservicebus::primitives::service_bus_message_state::ServiceBusMessageState;
use azservicebus::ServiceBusReceivedMessage;
use azure_core::time::OffsetDateTime;
use fe2o3_amqp_types::messaging::ApplicationProperties;
use fe2o3_amqp_types::primitives::SimpleValue;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::convert::TryFrom;

/// A message read from a queue or subscription, as shown to users.
///
/// # Examples
///
/// ```no_run
/// use server::model::{MessageModel, MessageState, BodyData};
/// use azure_core::time::OffsetDateTime;
///
/// let message = MessageModel::new(
///     12345,
///     "message-id-123".to_string(),
///     OffsetDateTime::now_utc(),
///     1,
///     MessageState::Active,
///     BodyData::RawString("Hello, world!".to_string()),
/// );
/// ```
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct MessageModel {
    /// The sequence number assigned by the broker
    pub sequence: i64,
    pub id: String,
    #[serde(with = "azure_core::time::iso8601")]
    pub enqueued_at: OffsetDateTime,
    #[serde(with = "azure_core::time::iso8601::option")]
    pub expires_at: Option<OffsetDateTime>,
    pub delivery_count: usize,
    pub state: MessageState,
    pub content_type: Option<String>,
    pub correlation_id: Option<String>,
    pub session_id: Option<String>,
    pub subject: Option<String>,
    /// Application properties rendered as text
    pub application_properties: BTreeMap<String, String>,
    pub body: BodyData,
}

/// Broker-side state of a message.
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MessageState {
    #[default]
    Active,
    Deferred,
    Scheduled,
    /// Moved to the dead-letter sub-queue by this application
    DeadLettered,
    /// Removed from the entity by a receive
    Completed,
}

impl From<ServiceBusMessageState> for MessageState {
    fn from(state: ServiceBusMessageState) -> Self {
        match state {
            ServiceBusMessageState::Active => MessageState::Active,
            ServiceBusMessageState::Deferred => MessageState::Deferred,
            ServiceBusMessageState::Scheduled => MessageState::Scheduled,
        }
    }
}

impl MessageModel {
    pub fn new(
        sequence: i64,
        id: String,
        enqueued_at: OffsetDateTime,
        delivery_count: usize,
        state: MessageState,
        body: BodyData,
    ) -> Self {
        Self {
            sequence,
            id,
            enqueued_at,
            expires_at: None,
            delivery_count,
            state,
            content_type: None,
            correlation_id: None,
            session_id: None,
            subject: None,
            application_properties: BTreeMap::new(),
            body,
        }
    }

    /// Returns the same message with a different state.
    pub fn with_state(mut self, state: MessageState) -> Self {
        self.state = state;
        self
    }

    /// Converts peeked messages, skipping those that cannot be converted.
    pub fn try_convert_messages_collect(
        messages: Vec<ServiceBusPeekedMessage>,
    ) -> Vec<MessageModel> {
        messages
            .into_iter()
            .filter_map(|msg| match MessageModel::try_from(msg) {
                Ok(model) => Some(model),
                Err(e) => {
                    log::warn!("Skipping peeked message that could not be converted: {e:?}");
                    None
                }
            })
            .collect()
    }

    /// Converts received messages, skipping those that cannot be converted.
    pub fn try_convert_received_collect(
        messages: &[ServiceBusReceivedMessage],
        state: MessageState,
    ) -> Vec<MessageModel> {
        messages
            .iter()
            .filter_map(|msg| match MessageModel::try_from(msg) {
                Ok(model) => Some(model.with_state(state)),
                Err(e) => {
                    log::warn!("Skipping received message that could not be converted: {e:?}");
                    None
                }
            })
            .collect()
    }

    /// JSON bodies are kept structured, anything else is shown as text.
    fn parse_body(bytes: &[u8]) -> BodyData {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(val) => BodyData::ValidJson(val),
            Err(_) => BodyData::RawString(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// Body of a message: structured JSON or raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyData {
    ValidJson(Value),
    /// Raw string data, including invalid JSON
    RawString(String),
}

impl BodyData {
    /// Text suitable for display; JSON is pretty-printed.
    pub fn to_display_string(&self) -> String {
        match self {
            BodyData::ValidJson(val) => {
                serde_json::to_string_pretty(val).unwrap_or_else(|_| val.to_string())
            }
            BodyData::RawString(s) => s.clone(),
        }
    }
}

impl Serialize for BodyData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            BodyData::ValidJson(val) => val.serialize(serializer),
            BodyData::RawString(s) => serializer.serialize_str(s),
        }
    }
}

/// Errors that can occur when converting broker messages to [`MessageModel`].
#[derive(Debug)]
pub enum MessageModelError {
    MissingMessageId,
    MissingMessageBody,
    MissingDeliveryCount,
}

impl TryFrom<ServiceBusPeekedMessage> for MessageModel {
    type Error = MessageModelError;

    fn try_from(msg: ServiceBusPeekedMessage) -> Result<Self, Self::Error> {
        let id = msg
            .message_id()
            .ok_or(MessageModelError::MissingMessageId)?
            .to_string();

        let bytes = msg
            .body()
            .map_err(|_| MessageModelError::MissingMessageBody)?;

        let delivery_count = msg
            .delivery_count()
            .ok_or(MessageModelError::MissingDeliveryCount)? as usize;

        Ok(Self {
            sequence: msg.sequence_number(),
            id,
            enqueued_at: msg.enqueued_time(),
            expires_at: Some(msg.expires_at()),
            delivery_count,
            state: MessageState::from(msg.state()),
            content_type: msg.content_type().map(str::to_string),
            correlation_id: msg.correlation_id().map(|id| id.to_string()),
            session_id: msg.session_id().map(str::to_string),
            subject: msg.subject().map(str::to_string),
            application_properties: application_properties_text(msg.application_properties()),
            body: MessageModel::parse_body(bytes),
        })
    }
}

impl TryFrom<&ServiceBusReceivedMessage> for MessageModel {
    type Error = MessageModelError;

    fn try_from(msg: &ServiceBusReceivedMessage) -> Result<Self, Self::Error> {
        let id = msg
            .message_id()
            .ok_or(MessageModelError::MissingMessageId)?
            .to_string();

        let bytes = msg
            .body()
            .map_err(|_| MessageModelError::MissingMessageBody)?;

        let delivery_count = msg
            .delivery_count()
            .ok_or(MessageModelError::MissingDeliveryCount)? as usize;

        Ok(Self {
            sequence: msg.sequence_number(),
            id,
            enqueued_at: msg.enqueued_time(),
            expires_at: Some(msg.expires_at()),
            delivery_count,
            state: MessageState::Active,
            content_type: msg.content_type().map(str::to_string),
            correlation_id: msg.correlation_id().map(|id| id.to_string()),
            session_id: msg.session_id().map(str::to_string),
            subject: msg.subject().map(str::to_string),
            application_properties: application_properties_text(msg.application_properties()),
            body: MessageModel::parse_body(bytes),
        })
    }
}

/// Application properties of a broker message, values as display text.
pub fn application_properties_text(
    properties: Option<&ApplicationProperties>,
) -> BTreeMap<String, String> {
    properties
        .map(|props| {
            props
                .iter()
                .map(|(key, value)| (key.clone(), simple_value_text(value)))
                .collect()
        })
        .unwrap_or_default()
}

/// Text form of an AMQP property value; strings are not quoted.
pub fn simple_value_text(value: &SimpleValue) -> String {
    match value {
        SimpleValue::Null => String::new(),
        SimpleValue::Bool(v) => v.to_string(),
        SimpleValue::Ubyte(v) => v.to_string(),
        SimpleValue::Ushort(v) => v.to_string(),
        SimpleValue::Uint(v) => v.to_string(),
        SimpleValue::Ulong(v) => v.to_string(),
        SimpleValue::Byte(v) => v.to_string(),
        SimpleValue::Short(v) => v.to_string(),
        SimpleValue::Int(v) => v.to_string(),
        SimpleValue::Long(v) => v.to_string(),
        SimpleValue::Float(v) => v.0.to_string(),
        SimpleValue::Double(v) => v.0.to_string(),
        SimpleValue::Char(v) => v.to_string(),
        SimpleValue::String(v) => v.clone(),
        SimpleValue::Symbol(v) => v.0.clone(),
        other => format!("{other:?}"),
    }
}

/// Content and metadata of a message to send.
///
/// # Examples
///
/// ```no_run
/// use server::model::MessageData;
/// use std::collections::HashMap;
///
/// let message = MessageData::new(r#"{"orderId": 42}"#)
///     .with_content_type("application/json")
///     .with_properties(HashMap::from([("MessageType".to_string(), "MT_EVENT".to_string())]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub content: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub partition_key: Option<String>,
    #[serde(default)]
    pub time_to_live_secs: Option<u64>,
    #[serde(default, with = "azure_core::time::iso8601::option")]
    pub scheduled_enqueue_time: Option<OffsetDateTime>,
    /// Custom application properties
    #[serde(default)]
    pub properties: Option<HashMap<String, String>>,
}

impl MessageData {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_partition_key(mut self, partition_key: impl Into<String>) -> Self {
        self.partition_key = Some(partition_key.into());
        self
    }

    pub fn with_time_to_live_secs(mut self, seconds: u64) -> Self {
        self.time_to_live_secs = Some(seconds);
        self
    }

    pub fn with_scheduled_enqueue_time(mut self, at: OffsetDateTime) -> Self {
        self.scheduled_enqueue_time = Some(at);
        self
    }

    pub fn with_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// The message id to send with, generating one when none was given.
    pub fn message_id_or_generate(&self) -> String {
        self.message_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}
