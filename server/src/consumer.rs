use azservicebus::receiver::DeadLetterOptions;
use azservicebus::{
    ServiceBusClient, ServiceBusReceivedMessage, ServiceBusReceiver, ServiceBusReceiverOptions,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::address::EntityAddress;
use crate::explorer::errors::{ServiceBusError, ServiceBusResult};
use crate::model::MessageModel;

/// A receiver bound to one queue, subscription or dead-letter sub-queue.
#[derive(Debug)]
pub struct Consumer {
    receiver: Arc<Mutex<Option<ServiceBusReceiver>>>,
}

impl PartialEq for Consumer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.receiver, &other.receiver)
    }
}

impl Consumer {
    pub fn new(receiver: ServiceBusReceiver) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(Some(receiver))),
        }
    }

    pub async fn peek_messages(
        &mut self,
        max_count: u32,
        from_sequence_number: Option<i64>,
    ) -> ServiceBusResult<Vec<MessageModel>> {
        let mut guard = self.receiver.lock().await;
        let receiver = guard.as_mut().ok_or_else(disposed)?;
        let messages = receiver
            .peek_messages(max_count, from_sequence_number)
            .await
            .map_err(|e| ServiceBusError::MessageReceiveFailed(e.to_string()))?;
        Ok(MessageModel::try_convert_messages_collect(messages))
    }

    /// Receives up to `max_count` messages; an elapsed timeout yields an empty batch.
    pub async fn receive_messages_with_timeout(
        &mut self,
        max_count: u32,
        timeout: Duration,
    ) -> ServiceBusResult<Vec<ServiceBusReceivedMessage>> {
        let mut guard = self.receiver.lock().await;
        let receiver = guard.as_mut().ok_or_else(disposed)?;
        match tokio::time::timeout(timeout, receiver.receive_messages(max_count)).await {
            Ok(result) => result.map_err(|e| ServiceBusError::MessageReceiveFailed(e.to_string())),
            Err(_) => {
                log::debug!("receive_messages timed out after {timeout:?}, returning empty result");
                Ok(Vec::new())
            }
        }
    }

    /// Completes every message, continuing past failures.
    pub async fn complete_messages(
        &mut self,
        messages: &[ServiceBusReceivedMessage],
    ) -> ServiceBusResult<()> {
        let mut guard = self.receiver.lock().await;
        let receiver = guard.as_mut().ok_or_else(disposed)?;

        let mut failed_count = 0;
        for message in messages {
            if let Err(e) = receiver.complete_message(message).await {
                failed_count += 1;
                let message_id = message
                    .message_id()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                log::error!(
                    "Failed to complete message {} (sequence: {}): {}",
                    message_id,
                    message.sequence_number(),
                    e
                );
            }
        }

        log::debug!(
            "Completed {} out of {} messages",
            messages.len() - failed_count,
            messages.len()
        );

        if failed_count > 0 {
            return Err(ServiceBusError::MessageCompleteFailed(format!(
                "Failed to complete {failed_count} out of {} messages",
                messages.len()
            )));
        }
        Ok(())
    }

    pub async fn dead_letter_message(
        &mut self,
        message: &ServiceBusReceivedMessage,
        reason: Option<String>,
        error_description: Option<String>,
    ) -> ServiceBusResult<()> {
        let mut guard = self.receiver.lock().await;
        let receiver = guard.as_mut().ok_or_else(disposed)?;
        let options = DeadLetterOptions {
            dead_letter_reason: reason,
            dead_letter_error_description: error_description,
            properties_to_modify: None,
        };
        receiver
            .dead_letter_message(message, options)
            .await
            .map_err(|e| ServiceBusError::MessageDeadLetterFailed(e.to_string()))
    }

    pub async fn dispose(&self) -> ServiceBusResult<()> {
        let mut guard = self.receiver.lock().await;
        if let Some(receiver) = guard.take() {
            receiver
                .dispose()
                .await
                .map_err(|e| ServiceBusError::InternalError(format!("Receiver dispose failed: {e}")))?;
        }
        Ok(())
    }
}

fn disposed() -> ServiceBusError {
    ServiceBusError::InternalError("Receiver already disposed".to_string())
}

pub trait ServiceBusClientExt {
    /// Opens a receiver on the addressed entity, using the address as the link path.
    fn create_consumer_for_address(
        &mut self,
        address: &EntityAddress,
        options: ServiceBusReceiverOptions,
    ) -> impl Future<Output = ServiceBusResult<Consumer>> + Send;
}

impl<RP> ServiceBusClientExt for ServiceBusClient<RP>
where
    RP: azservicebus::ServiceBusRetryPolicy
        + From<azservicebus::ServiceBusRetryOptions>
        + Send
        + Sync
        + 'static,
{
    async fn create_consumer_for_address(
        &mut self,
        address: &EntityAddress,
        options: ServiceBusReceiverOptions,
    ) -> ServiceBusResult<Consumer> {
        let receiver = self
            .create_receiver_for_queue(address.to_string(), options)
            .await
            .map_err(|e| ServiceBusError::ConsumerCreationFailed(format!("{address}: {e}")))?;

        Ok(Consumer::new(receiver))
    }
}
