//! Execution of parsed CLI commands.
//!
//! Every command reads a fresh catalog and resolves its entity once, before a
//! connection to the emulator is opened, so unknown entities and bad input
//! are reported without a running broker.

use crate::cli::{Command, SendArgs};
use crate::config::{AppConfig, Settings, SettingsOrigin};
use crate::error::{AppError, AppResult};
use crate::render;
use server::explorer::{EntityExplorer, ResolvedEntity};
use server::model::MessageData;
use server::source::SnapshotFileSource;
use server::transport::ServiceBusTransport;
use std::path::Path;

/// Everything a command needs besides its own arguments.
pub struct CommandContext<'a> {
    pub config: &'a AppConfig,
    pub settings: &'a Settings,
    pub settings_origin: &'a SettingsOrigin,
    /// `--snapshot` override of `storage.snapshot_path`
    pub snapshot: Option<&'a Path>,
}

impl CommandContext<'_> {
    fn record_source(&self) -> AppResult<SnapshotFileSource> {
        match self.snapshot {
            Some(path) => Ok(SnapshotFileSource::new(path)),
            None => Ok(self.config.storage().record_source()?),
        }
    }

    fn catalog_explorer(&self) -> AppResult<EntityExplorer<SnapshotFileSource, ()>> {
        Ok(EntityExplorer::new(self.record_source()?, ()))
    }

    async fn resolve(&self, entity: &str) -> AppResult<ResolvedEntity> {
        Ok(self.catalog_explorer()?.resolve(entity).await?)
    }

    async fn explorer(&self) -> AppResult<EntityExplorer<SnapshotFileSource, ServiceBusTransport>> {
        let emulator = self.config.emulator();
        let connection_string = emulator.connection_string().ok_or_else(|| {
            AppError::Config(format!(
                "no emulator connection string; set emulator.connection_string in config.toml or {}",
                emulator.connection_string_vars().join(" / ")
            ))
        })?;

        let transport =
            ServiceBusTransport::connect(&connection_string, self.config.receive_timeout()).await?;
        Ok(EntityExplorer::new(self.record_source()?, transport))
    }

    fn max_or_page_size(&self, max: Option<u32>) -> u32 {
        max.filter(|max| *max > 0)
            .unwrap_or_else(|| self.config.page_size())
    }
}

/// Runs a command and returns the text to print.
pub async fn run(command: Command, ctx: &CommandContext<'_>) -> AppResult<String> {
    match command {
        Command::Entities { json } => {
            let catalog = ctx.catalog_explorer()?.list_entities().await?;
            log::info!("Listing {} entities", catalog.len());
            if json {
                render::entities_json(&catalog)
            } else {
                Ok(render::entities_table(&catalog))
            }
        }
        Command::Resolve { name } => {
            let resolved = ctx.resolve(&name).await?;
            Ok(render::resolved_entity(&resolved))
        }
        Command::Peek { entity, max } => {
            let resolved = ctx.resolve(&entity).await?;
            let messages = ctx
                .explorer()
                .await?
                .peek_resolved(&resolved, ctx.max_or_page_size(max))
                .await?;
            Ok(render::messages(&messages))
        }
        Command::Receive { entity, max } => {
            let resolved = ctx.resolve(&entity).await?;
            let messages = ctx
                .explorer()
                .await?
                .receive_resolved(&resolved, ctx.max_or_page_size(max))
                .await?;
            Ok(render::messages(&messages))
        }
        Command::Send(args) => {
            let resolved = ctx.resolve(&args.entity).await?;
            resolved.ensure_sendable()?;
            let message = compose_message(&args, ctx.settings).await?;
            let message_id = ctx.explorer().await?.send_resolved(&resolved, &message).await?;
            Ok(format!("Sent message {message_id} to {}", resolved.address))
        }
        Command::Canned { entity, scenario } => {
            let resolved = ctx.resolve(&entity).await?;
            resolved.ensure_sendable()?;
            let message = canned_message_data(ctx.settings, &entity, &scenario)?;
            let message_id = ctx.explorer().await?.send_resolved(&resolved, &message).await?;
            Ok(format!(
                "Sent canned message '{scenario}' ({message_id}) to {}",
                resolved.address
            ))
        }
        Command::DeadLetter { entity, max, reason } => {
            let resolved = ctx.resolve(&entity).await?;
            let moved = ctx
                .explorer()
                .await?
                .dead_letter_resolved(&resolved, ctx.max_or_page_size(max), reason.as_deref())
                .await?;
            Ok(format!(
                "Moved {} message(s) to {}\n\n{}",
                moved.len(),
                resolved.address.dead_letter(),
                render::messages(&moved)
            ))
        }
        Command::Config => Ok(describe_config(ctx).await),
    }
}

/// Message for `send`: arguments first, then settings defaults.
pub async fn compose_message(args: &SendArgs, settings: &Settings) -> AppResult<MessageData> {
    let content = match (&args.body, &args.file) {
        (Some(body), _) => body.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Input(format!("cannot read message body from {}: {e}", path.display()))
        })?,
        (None, None) => {
            return Err(AppError::Input("a message body is required (--body or --file)".to_string()));
        }
    };

    let mut properties = settings.common_properties();
    properties.extend(args.properties.iter().cloned());

    let mut message = MessageData::new(content).with_content_type(
        args.content_type
            .clone()
            .unwrap_or_else(|| settings.default_content_type.clone()),
    );
    if !properties.is_empty() {
        message = message.with_properties(properties);
    }
    if let Some(session_id) = &args.session_id {
        message = message.with_session_id(session_id);
    }
    if let Some(correlation_id) = &args.correlation_id {
        message = message.with_correlation_id(correlation_id);
    }
    if let Some(message_id) = &args.message_id {
        message = message.with_message_id(message_id);
    }
    if let Some(subject) = &args.subject {
        message = message.with_subject(subject);
    }
    if let Some(partition_key) = &args.partition_key {
        message = message.with_partition_key(partition_key);
    }
    if let Some(seconds) = args.time_to_live_secs {
        message = message.with_time_to_live_secs(seconds);
    }
    Ok(message)
}

/// Message for a canned scenario, or an error naming the scenarios that exist.
pub fn canned_message_data(settings: &Settings, entity: &str, scenario: &str) -> AppResult<MessageData> {
    match settings.canned_message(entity, scenario) {
        Some(canned) => Ok(canned.to_message_data(&settings.common_application_properties)),
        None => {
            let available = settings.scenarios(entity);
            let hint = if available.is_empty() {
                format!("no canned messages are configured for '{entity}'")
            } else {
                format!("available scenarios: {}", available.join(", "))
            };
            Err(AppError::NotFound(format!(
                "canned message '{scenario}' for '{entity}' ({hint})"
            )))
        }
    }
}

async fn describe_config(ctx: &CommandContext<'_>) -> String {
    let emulator = ctx.config.emulator();
    let storage = ctx.config.storage();

    let connection_string = emulator
        .connection_string()
        .map(|cs| render::mask_secrets(&cs))
        .unwrap_or_else(|| "not set".to_string());
    let snapshot = ctx
        .snapshot
        .or_else(|| storage.snapshot_path())
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "not set".to_string());
    let sql = storage
        .sql_connection_string()
        .await
        .map(|cs| render::mask_secrets(&cs))
        .unwrap_or_else(|| "not set".to_string());

    [
        format!("Resource name:        {}", emulator.resource_name()),
        format!("Connection string:    {connection_string}"),
        format!("Connection variables: {}", emulator.connection_string_vars().join(", ")),
        format!("Snapshot:             {snapshot}"),
        format!("SQL storage:          {sql}"),
        format!("Page size:            {}", ctx.config.page_size()),
        format!("Receive timeout:      {}s", ctx.config.receive_timeout_secs()),
        format!("Settings:             {}", ctx.settings_origin),
        format!("Default content type: {}", ctx.settings.default_content_type),
        format!("Canned entities:      {}", ctx.settings.canned_messages.len()),
    ]
    .join("\n")
}
