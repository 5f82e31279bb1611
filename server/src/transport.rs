//! Message operations against resolved entity addresses.

use crate::address::EntityAddress;
use crate::consumer::{Consumer, ServiceBusClientExt};
use crate::explorer::errors::{ServiceBusError, ServiceBusResult};
use crate::model::{MessageData, MessageModel, MessageState};
use crate::producer::{Producer, ServiceBusClientProducerExt};
use async_trait::async_trait;
use azservicebus::core::BasicRetryPolicy;
use azservicebus::{
    ServiceBusClient, ServiceBusClientOptions, ServiceBusReceiverOptions, ServiceBusSenderOptions,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Broker operations the explorer needs.
///
/// Addresses handed to a transport have already been checked against the
/// catalog.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Browses up to `max` messages without locking or removing them.
    async fn peek(&self, address: &EntityAddress, max: u32) -> ServiceBusResult<Vec<MessageModel>>;

    /// Receives and completes up to `max` messages.
    async fn receive(
        &self,
        address: &EntityAddress,
        max: u32,
    ) -> ServiceBusResult<Vec<MessageModel>>;

    /// Sends one message and returns the message id it was sent with.
    async fn send(&self, address: &EntityAddress, message: &MessageData) -> ServiceBusResult<String>;

    /// Receives up to `max` messages and moves them to the dead-letter sub-queue.
    async fn dead_letter(
        &self,
        address: &EntityAddress,
        max: u32,
        reason: &str,
    ) -> ServiceBusResult<Vec<MessageModel>>;
}

/// [`MessageTransport`] backed by an AMQP connection to the emulator.
///
/// A receiver or sender is opened for every call and disposed when the call
/// finishes, so nothing stays attached to an entity between commands.
pub struct ServiceBusTransport {
    client: Arc<Mutex<ServiceBusClient<BasicRetryPolicy>>>,
    receive_timeout: Duration,
}

impl ServiceBusTransport {
    pub async fn connect(connection_string: &str, receive_timeout: Duration) -> ServiceBusResult<Self> {
        let client = ServiceBusClient::new_from_connection_string(
            connection_string,
            ServiceBusClientOptions::default(),
        )
        .await
        .map_err(|e| {
            ServiceBusError::ConnectionFailed(format!("Failed to create ServiceBus client: {e}"))
        })?;

        log::info!("Connected to Service Bus");
        Ok(Self::from_client(Arc::new(Mutex::new(client)), receive_timeout))
    }

    pub fn from_client(
        client: Arc<Mutex<ServiceBusClient<BasicRetryPolicy>>>,
        receive_timeout: Duration,
    ) -> Self {
        Self {
            client,
            receive_timeout,
        }
    }

    async fn open_consumer(&self, address: &EntityAddress) -> ServiceBusResult<Consumer> {
        let mut client = self.client.lock().await;
        client
            .create_consumer_for_address(address, ServiceBusReceiverOptions::default())
            .await
    }

    async fn open_producer(&self, address: &EntityAddress) -> ServiceBusResult<Producer> {
        let mut client = self.client.lock().await;
        client
            .create_producer_for_address(address, ServiceBusSenderOptions::default())
            .await
    }

    async fn close_consumer(consumer: Consumer) {
        if let Err(e) = consumer.dispose().await {
            log::warn!("Failed to dispose receiver: {e}");
        }
    }
}

#[async_trait]
impl MessageTransport for ServiceBusTransport {
    async fn peek(&self, address: &EntityAddress, max: u32) -> ServiceBusResult<Vec<MessageModel>> {
        let mut consumer = self.open_consumer(address).await?;
        let result = consumer.peek_messages(max, None).await;
        Self::close_consumer(consumer).await;

        let messages = result?;
        log::debug!("Peeked {} messages from {address}", messages.len());
        Ok(messages)
    }

    async fn receive(
        &self,
        address: &EntityAddress,
        max: u32,
    ) -> ServiceBusResult<Vec<MessageModel>> {
        let mut consumer = self.open_consumer(address).await?;
        let result = async {
            let received = consumer
                .receive_messages_with_timeout(max, self.receive_timeout)
                .await?;
            consumer.complete_messages(&received).await?;
            Ok::<_, ServiceBusError>(MessageModel::try_convert_received_collect(
                &received,
                MessageState::Completed,
            ))
        }
        .await;
        Self::close_consumer(consumer).await;

        let messages = result?;
        log::info!("Received {} messages from {address}", messages.len());
        Ok(messages)
    }

    async fn send(&self, address: &EntityAddress, message: &MessageData) -> ServiceBusResult<String> {
        let message_id = message.message_id_or_generate();
        let service_bus_message = Producer::create_message(message, &message_id);

        let mut producer = self.open_producer(address).await?;
        let result = producer.send_message(service_bus_message).await;
        if let Err(e) = producer.dispose().await {
            log::warn!("Failed to dispose sender: {e}");
        }

        result?;
        log::info!("Sent message {message_id} to {address}");
        Ok(message_id)
    }

    async fn dead_letter(
        &self,
        address: &EntityAddress,
        max: u32,
        reason: &str,
    ) -> ServiceBusResult<Vec<MessageModel>> {
        let mut consumer = self.open_consumer(address).await?;
        let result = async {
            let received = consumer
                .receive_messages_with_timeout(max, self.receive_timeout)
                .await?;
            for message in &received {
                consumer
                    .dead_letter_message(message, Some(reason.to_string()), None)
                    .await?;
            }
            Ok::<_, ServiceBusError>(MessageModel::try_convert_received_collect(
                &received,
                MessageState::DeadLettered,
            ))
        }
        .await;
        Self::close_consumer(consumer).await;

        let messages = result?;
        log::info!("Moved {} messages from {address} to its dead-letter queue", messages.len());
        Ok(messages)
    }
}
