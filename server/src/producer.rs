use azservicebus::{
    ServiceBusClient, ServiceBusMessage, ServiceBusSender, ServiceBusSenderOptions,
};
use fe2o3_amqp_types::messaging::ApplicationProperties;
use fe2o3_amqp_types::primitives::SimpleValue;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::address::EntityAddress;
use crate::explorer::errors::{ServiceBusError, ServiceBusResult};
use crate::model::MessageData;

/// A sender bound to one queue or topic.
///
/// # Examples
///
/// ```no_run
/// use server::model::MessageData;
/// use server::producer::Producer;
///
/// let data = MessageData::new("hello").with_content_type("text/plain");
/// let message = Producer::create_message(&data, &data.message_id_or_generate());
/// ```
#[derive(Debug)]
pub struct Producer {
    sender: Arc<Mutex<Option<ServiceBusSender>>>,
}

impl PartialEq for Producer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.sender, &other.sender)
    }
}

impl Producer {
    pub fn new(sender: ServiceBusSender) -> Self {
        Self {
            sender: Arc::new(Mutex::new(Some(sender))),
        }
    }

    pub async fn send_message(&mut self, message: ServiceBusMessage) -> ServiceBusResult<()> {
        let mut guard = self.sender.lock().await;
        let sender = guard
            .as_mut()
            .ok_or_else(|| ServiceBusError::InternalError("Sender already disposed".to_string()))?;
        sender
            .send_message(message)
            .await
            .map_err(|e| ServiceBusError::MessageSendFailed(e.to_string()))
    }

    /// Builds the broker message for `data` with the given message id.
    ///
    /// Values the broker rejects (over-long identifiers, a time to live
    /// beyond the allowed maximum) are logged and left unset.
    pub fn create_message(data: &MessageData, message_id: &str) -> ServiceBusMessage {
        let mut message = ServiceBusMessage::new(data.content.as_bytes().to_vec());

        if let Err(e) = message.set_message_id(message_id) {
            log::warn!("Failed to set message ID {message_id}: {e}");
        }

        if let Some(content_type) = &data.content_type {
            message.set_content_type(content_type.clone());
        }

        if let Some(correlation_id) = &data.correlation_id {
            message.set_correlation_id(correlation_id.clone());
        }

        if let Some(subject) = &data.subject {
            message.set_subject(subject.clone());
        }

        if let Some(partition_key) = &data.partition_key {
            if let Err(e) = message.set_partition_key(partition_key.clone()) {
                log::warn!("Failed to set partition key {partition_key}: {e}");
            }
        }

        // Session id after the partition key; the broker requires them to match
        if let Some(session_id) = &data.session_id {
            if let Err(e) = message.set_session_id(session_id.clone()) {
                log::warn!("Failed to set session ID {session_id}: {e}");
            }
        }

        if let Some(seconds) = data.time_to_live_secs {
            if let Err(e) = message.set_time_to_live(Duration::from_secs(seconds)) {
                log::warn!("Failed to set time to live of {seconds}s: {e}");
            }
        }

        if let Some(at) = data.scheduled_enqueue_time {
            message.set_scheduled_enqueue_time(at);
        }

        if let Some(properties) = data.properties.as_ref().filter(|p| !p.is_empty()) {
            let mut keys: Vec<&String> = properties.keys().collect();
            keys.sort();

            let application_properties = message
                .application_properties_mut()
                .get_or_insert_with(ApplicationProperties::default);
            for key in keys {
                application_properties
                    .insert(key.clone(), SimpleValue::from(properties[key].as_str()));
            }
        }

        message
    }

    pub async fn dispose(&self) -> ServiceBusResult<()> {
        let mut guard = self.sender.lock().await;
        if let Some(sender) = guard.take() {
            sender
                .dispose()
                .await
                .map_err(|e| ServiceBusError::InternalError(format!("Sender dispose failed: {e}")))?;
        }
        Ok(())
    }
}

pub trait ServiceBusClientProducerExt {
    /// Opens a sender on the addressed queue or topic.
    fn create_producer_for_address(
        &mut self,
        address: &EntityAddress,
        options: ServiceBusSenderOptions,
    ) -> impl std::future::Future<Output = ServiceBusResult<Producer>> + Send;
}

impl<RP> ServiceBusClientProducerExt for ServiceBusClient<RP>
where
    RP: azservicebus::ServiceBusRetryPolicy
        + From<azservicebus::ServiceBusRetryOptions>
        + Send
        + Sync
        + 'static,
{
    async fn create_producer_for_address(
        &mut self,
        address: &EntityAddress,
        options: ServiceBusSenderOptions,
    ) -> ServiceBusResult<Producer> {
        let sender = self
            .create_sender(address.entity_path(), options)
            .await
            .map_err(|e| ServiceBusError::ProducerCreationFailed(format!("{address}: {e}")))?;

        Ok(Producer::new(sender))
    }
}
