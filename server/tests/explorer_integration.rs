use async_trait::async_trait;
use azure_core::time::OffsetDateTime;
use claims::*;
use server::address::EntityAddress;
use server::catalog::RawEntityRecord;
use server::explorer::{EntityExplorer, ServiceBusError, ServiceBusResult};
use server::model::{BodyData, MessageData, MessageModel, MessageState};
use server::source::{SnapshotFileSource, StaticRecordSource};
use server::transport::MessageTransport;
use std::io::Write;
use std::sync::Mutex;

mod helpers {
    use super::*;

    /// Records every call and answers with one canned message.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub calls: Mutex<Vec<String>>,
    }

    impl RecordingTransport {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    pub fn message(state: MessageState) -> MessageModel {
        MessageModel::new(
            1,
            "msg-1".to_string(),
            OffsetDateTime::UNIX_EPOCH,
            0,
            state,
            BodyData::RawString("hello".to_string()),
        )
    }

    #[async_trait]
    impl MessageTransport for RecordingTransport {
        async fn peek(&self, address: &EntityAddress, max: u32) -> ServiceBusResult<Vec<MessageModel>> {
            self.record(format!("peek {address} {max}"));
            Ok(vec![message(MessageState::Active)])
        }

        async fn receive(
            &self,
            address: &EntityAddress,
            max: u32,
        ) -> ServiceBusResult<Vec<MessageModel>> {
            self.record(format!("receive {address} {max}"));
            Ok(vec![message(MessageState::Completed)])
        }

        async fn send(&self, address: &EntityAddress, message: &MessageData) -> ServiceBusResult<String> {
            self.record(format!("send {address} {}", message.content));
            Ok(message.message_id_or_generate())
        }

        async fn dead_letter(
            &self,
            address: &EntityAddress,
            max: u32,
            reason: &str,
        ) -> ServiceBusResult<Vec<MessageModel>> {
            self.record(format!("dead-letter {address} {max} {reason}"));
            Ok(vec![message(MessageState::DeadLettered)])
        }
    }

    pub fn rows() -> Vec<RawEntityRecord> {
        vec![
            RawEntityRecord::new(1, "SBEMULATORNS:QUEUE:orders", 0, 5),
            RawEntityRecord::new(2, "SBEMULATORNS:QUEUE:orders|$TRANSFER", 0, 2),
            RawEntityRecord::new(3, "SBEMULATORNS:TOPIC:events", 1, 0),
            RawEntityRecord::new(4, "SBEMULATORNS:TOPIC:events|sub1", 2, 3),
            RawEntityRecord::new(5, "SBEMULATORNS:TOPIC:events|sub1|$TRANSFER", 2, 1),
        ]
    }

    pub fn explorer() -> EntityExplorer<StaticRecordSource, RecordingTransport> {
        EntityExplorer::new(StaticRecordSource::new(rows()), RecordingTransport::default())
    }
}

use helpers::*;

#[tokio::test]
async fn test_list_entities_folds_shadows() {
    let explorer = explorer();

    let catalog = assert_ok!(explorer.list_entities().await);

    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog[0].display_name, "orders");
    assert_eq!((catalog[0].active_count, catalog[0].dead_letter_count), (5, 2));
    assert_eq!(catalog[1].display_name, "events");
    assert_eq!(catalog[2].qualified_name(), "events|sub1");
    assert_eq!((catalog[2].active_count, catalog[2].dead_letter_count), (3, 1));
}

#[tokio::test]
async fn test_resolve_subscription_by_display_forms() {
    let explorer = explorer();

    for name in ["events|sub1", "Events|Sub1", "events/subscriptions/sub1"] {
        let resolved = assert_ok!(explorer.resolve(name).await);
        assert_eq!(resolved.address.to_string(), "events/subscriptions/sub1");
        assert_eq!(resolved.entity.display_name, "sub1");
    }
}

#[tokio::test]
async fn test_resolve_unknown_entity_is_not_found() {
    let explorer = explorer();

    let error = assert_err!(explorer.resolve("payments").await);
    assert!(error.is_not_found());

    let error = assert_err!(explorer.resolve("   ").await);
    assert_matches!(error, ServiceBusError::InvalidEntityName(_));
}

#[tokio::test]
async fn test_peek_dead_letter_queue_uses_exact_marker() {
    let explorer = explorer();

    let messages = assert_ok!(
        explorer
            .peek_messages("events|sub1/$deadletterqueue", 10)
            .await
    );

    assert_eq!(messages.len(), 1);
    assert_eq!(
        explorer_calls(&explorer),
        vec!["peek events/subscriptions/sub1/$DeadLetterQueue 10".to_string()]
    );
}

#[tokio::test]
async fn test_transport_not_called_for_unknown_entity() {
    let explorer = explorer();

    assert_err!(explorer.receive_messages("missing", 5).await);
    assert_err!(
        explorer
            .send_message("missing", &MessageData::new("x"))
            .await
    );

    assert!(explorer_calls(&explorer).is_empty());
}

#[tokio::test]
async fn test_send_rejects_dead_letter_queue() {
    let explorer = explorer();

    let error = assert_err!(
        explorer
            .send_message("orders/$DeadLetterQueue", &MessageData::new("x"))
            .await
    );
    assert_matches!(error, ServiceBusError::InvalidEntityName(_));

    let id = assert_ok!(
        explorer
            .send_message("Orders", &MessageData::new("body").with_message_id("id-1"))
            .await
    );
    assert_eq!(id, "id-1");
    assert_eq!(explorer_calls(&explorer), vec!["send orders body".to_string()]);
}

#[tokio::test]
async fn test_send_rejects_subscription() {
    let explorer = explorer();

    for name in ["events|sub1", "events/subscriptions/sub1", "Events|Sub1"] {
        let error = assert_err!(explorer.send_message(name, &MessageData::new("x")).await);
        assert_matches!(error, ServiceBusError::InvalidEntityName(_));
        assert!(error.to_string().contains("'events'"), "{error}");
    }
    assert!(explorer_calls(&explorer).is_empty());

    assert_ok!(explorer.send_message("events", &MessageData::new("x")).await);
    assert_eq!(explorer_calls(&explorer), vec!["send events x".to_string()]);
}

#[tokio::test]
async fn test_resolved_operations_reuse_one_lookup() {
    let explorer = explorer();

    let resolved = assert_ok!(explorer.resolve("events|sub1/$DeadLetterQueue").await);
    assert_ok!(explorer.peek_resolved(&resolved, 2).await);
    assert_err!(
        explorer
            .dead_letter_resolved(&resolved, 1, None)
            .await
    );
    assert_err!(
        explorer
            .send_resolved(&resolved, &MessageData::new("x"))
            .await
    );

    let topic = assert_ok!(explorer.resolve("events").await);
    assert_ok!(explorer.send_resolved(&topic, &MessageData::new("y")).await);

    assert_eq!(
        explorer_calls(&explorer),
        vec![
            "peek events/subscriptions/sub1/$DeadLetterQueue 2".to_string(),
            "send events y".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_dead_letter_uses_default_reason() {
    let explorer = explorer();

    let moved = assert_ok!(explorer.dead_letter_messages("orders", 3, None).await);
    assert_eq!(moved[0].state, MessageState::DeadLettered);
    assert_ok!(explorer.dead_letter_messages("orders", 1, Some("poison")).await);

    assert_eq!(
        explorer_calls(&explorer),
        vec![
            format!("dead-letter orders 3 {}", server::explorer::DEFAULT_DEAD_LETTER_REASON),
            "dead-letter orders 1 poison".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_snapshot_source_feeds_explorer() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&rows()).unwrap().as_bytes())
        .unwrap();

    let explorer = EntityExplorer::new(
        SnapshotFileSource::new(file.path()),
        RecordingTransport::default(),
    );

    let catalog = assert_ok!(explorer.list_entities().await);
    assert_eq!(catalog.len(), 3);
    assert_ok!(explorer.resolve("events|sub1").await);
}

#[tokio::test]
async fn test_missing_snapshot_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let explorer = EntityExplorer::new(
        SnapshotFileSource::new(dir.path().join("nope.json")),
        RecordingTransport::default(),
    );

    let error = assert_err!(explorer.list_entities().await);
    assert_matches!(error, ServiceBusError::SourceUnavailable(_));
}

fn explorer_calls<S>(explorer: &EntityExplorer<S, RecordingTransport>) -> Vec<String> {
    explorer.transport().calls()
}
