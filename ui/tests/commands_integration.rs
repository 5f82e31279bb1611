use asb_lens::AppError;
use asb_lens::cli::{Command, SendArgs};
use asb_lens::commands::{CommandContext, run};
use asb_lens::config::{AppConfig, Settings, SettingsOrigin};
use claims::{assert_err, assert_ok};
use std::fs;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"[
    {"EntityId": 1, "EntityName": "SBEMULATORNS:QUEUE:orders", "EntityType": 0, "MessageCount": 4},
    {"EntityId": 2, "EntityName": "SBEMULATORNS:QUEUE:orders|$TRANSFER", "EntityType": 0, "MessageCount": 2},
    {"EntityId": 3, "EntityName": "SBEMULATORNS:TOPIC:events", "EntityType": 1, "MessageCount": 0},
    {"EntityId": 4, "EntityName": "SBEMULATORNS:TOPIC:events|audit", "EntityType": 2, "MessageCount": 7},
    {"EntityId": 5, "EntityName": "SBEMULATORNS:TOPIC:events|audit|$DEFAULT", "EntityType": 2, "MessageCount": 1},
    {"EntityId": 6, "EntityName": "sys:internal", "EntityType": 0, "MessageCount": 9}
]"#;

struct Fixture {
    dir: TempDir,
    config: AppConfig,
    settings: Settings,
    origin: SettingsOrigin,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("entities.json"), SNAPSHOT).unwrap();
        Self {
            dir,
            config: AppConfig::default(),
            settings: Settings::from_json(
                r#"{"CannedMessages": {"orders": {"Created": {"Body": "{}"}}}}"#,
            )
            .unwrap(),
            origin: SettingsOrigin::Defaults,
        }
    }

    async fn run(&self, command: Command) -> Result<String, AppError> {
        let snapshot = self.dir.path().join("entities.json");
        let ctx = CommandContext {
            config: &self.config,
            settings: &self.settings,
            settings_origin: &self.origin,
            snapshot: Some(snapshot.as_path()),
        };
        run(command, &ctx).await
    }
}

#[tokio::test]
async fn test_entities_lists_folded_catalog() {
    let fixture = Fixture::new();

    let output = assert_ok!(fixture.run(Command::Entities { json: false }).await);
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("Queue"));
    assert!(lines[1].contains("orders"));
    assert!(lines[2].starts_with("Topic"));
    assert!(lines[3].starts_with("Subscription"));
    assert!(lines[3].ends_with("events/subscriptions/audit"));
    assert!(!output.contains("internal"));
}

#[tokio::test]
async fn test_entities_json_carries_counts() {
    let fixture = Fixture::new();

    let output = assert_ok!(fixture.run(Command::Entities { json: true }).await);
    let catalog: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(catalog[0]["display_name"], "orders");
    assert_eq!(catalog[0]["active_count"], 4);
    assert_eq!(catalog[0]["dead_letter_count"], 2);
    assert_eq!(catalog[2]["parent_name"], "events");
    assert_eq!(catalog[2]["active_count"], 8);
}

#[tokio::test]
async fn test_resolve_shows_addresses() {
    let fixture = Fixture::new();

    let output = assert_ok!(
        fixture
            .run(Command::Resolve {
                name: "Events|Audit".to_string()
            })
            .await
    );

    assert!(output.contains("Address:     events/subscriptions/audit"));
    assert!(output.contains("DLQ address: events/subscriptions/audit/$DeadLetterQueue"));
}

#[tokio::test]
async fn test_unknown_entity_fails_before_connecting() {
    let fixture = Fixture::new();

    let error = assert_err!(
        fixture
            .run(Command::Peek {
                entity: "payments".to_string(),
                max: None
            })
            .await
    );

    assert_eq!(error.exit_code(), 2);
    assert!(matches!(error, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_send_to_subscription_fails_before_connecting() {
    let fixture = Fixture::new();

    let error = assert_err!(
        fixture
            .run(Command::Send(SendArgs {
                entity: "events/subscriptions/audit".to_string(),
                body: Some("{}".to_string()),
                file: None,
                content_type: None,
                properties: Vec::new(),
                session_id: None,
                correlation_id: None,
                message_id: None,
                subject: None,
                partition_key: None,
                time_to_live_secs: None,
            }))
            .await
    );

    assert_eq!(error.exit_code(), 2);
    assert!(matches!(error, AppError::Input(_)));
    assert!(error.to_string().contains("send to topic 'events'"));

    let error = assert_err!(
        fixture
            .run(Command::Canned {
                entity: "orders/$DeadLetterQueue".to_string(),
                scenario: "Created".to_string()
            })
            .await
    );
    assert!(matches!(error, AppError::Input(_)));
}

#[tokio::test]
async fn test_unknown_canned_scenario_fails_before_connecting() {
    let fixture = Fixture::new();

    let error = assert_err!(
        fixture
            .run(Command::Canned {
                entity: "orders".to_string(),
                scenario: "Shipped".to_string()
            })
            .await
    );

    assert!(error.to_string().contains("available scenarios: Created"));
}

#[tokio::test]
async fn test_missing_snapshot_reports_io_error() {
    let fixture = Fixture::new();
    let missing = fixture.dir.path().join("nope.json");
    let ctx = CommandContext {
        config: &fixture.config,
        settings: &fixture.settings,
        settings_origin: &fixture.origin,
        snapshot: Some(missing.as_path()),
    };

    let error = assert_err!(run(Command::Entities { json: false }, &ctx).await);
    assert!(matches!(error, AppError::Io(_)));
}

#[tokio::test]
async fn test_config_command_masks_nothing_it_does_not_have() {
    let fixture = Fixture::new();

    let output = assert_ok!(fixture.run(Command::Config).await);

    assert!(output.contains("Page size:            20"));
    assert!(output.contains("Settings:             built-in defaults"));
    assert!(output.contains("entities.json"));
}
