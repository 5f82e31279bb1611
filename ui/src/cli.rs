use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// asb-lens - inspect and drive a local Azure Service Bus emulator
#[derive(Parser, Debug)]
#[command(name = "asb-lens")]
#[command(version)]
#[command(about = "Browse queues, topics and subscriptions of the Service Bus emulator", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml in the working directory)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Entity lookup snapshot to read instead of storage.snapshot_path
    #[arg(short = 's', long = "snapshot", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Log to stderr at debug level
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List queues, topics and subscriptions with their message counts
    Entities {
        /// Print the catalog as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Show the catalog entry and transport address for a name
    Resolve {
        /// Display name, `topic|subscription` or address
        name: String,
    },

    /// Read messages without removing them
    Peek {
        entity: String,
        /// Maximum number of messages (default: page_size from config)
        #[arg(short = 'n', long = "max")]
        max: Option<u32>,
    },

    /// Receive and complete messages
    Receive {
        entity: String,
        #[arg(short = 'n', long = "max")]
        max: Option<u32>,
    },

    /// Send a message
    Send(SendArgs),

    /// Send a canned message from settings.json
    Canned { entity: String, scenario: String },

    /// Move messages to the entity's dead-letter queue
    DeadLetter {
        entity: String,
        #[arg(short = 'n', long = "max")]
        max: Option<u32>,
        /// Dead-letter reason recorded on each message
        #[arg(long = "reason")]
        reason: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    pub entity: String,

    /// Message body
    #[arg(short = 'b', long = "body", conflicts_with = "file", required_unless_present = "file")]
    pub body: Option<String>,

    /// Read the message body from a file
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Content type (default: DefaultContentType from settings)
    #[arg(long = "content-type")]
    pub content_type: Option<String>,

    /// Application property, repeatable
    #[arg(short = 'p', long = "property", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub properties: Vec<(String, String)>,

    #[arg(long = "session-id")]
    pub session_id: Option<String>,

    #[arg(long = "correlation-id")]
    pub correlation_id: Option<String>,

    #[arg(long = "message-id")]
    pub message_id: Option<String>,

    #[arg(long = "subject")]
    pub subject: Option<String>,

    #[arg(long = "partition-key")]
    pub partition_key: Option<String>,

    /// Time to live in seconds
    #[arg(long = "ttl", value_name = "SECONDS")]
    pub time_to_live_secs: Option<u64>,
}

/// Parses `KEY=VALUE`; the value may itself contain `=`.
pub fn parse_key_val(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{input}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{input}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("Tenant=t1"),
            Ok(("Tenant".to_string(), "t1".to_string()))
        );
        assert_eq!(
            parse_key_val("Filter=a=b"),
            Ok(("Filter".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_parse_send_command() {
        let cli = Cli::try_parse_from([
            "asb-lens",
            "--snapshot",
            "entities.json",
            "send",
            "events|audit",
            "--body",
            "{}",
            "-p",
            "Tenant=t1",
            "--session-id",
            "s-1",
            "--ttl",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.snapshot, Some(PathBuf::from("entities.json")));
        let Command::Send(args) = cli.command else {
            panic!("expected send command");
        };
        assert_eq!(args.entity, "events|audit");
        assert_eq!(args.body.as_deref(), Some("{}"));
        assert_eq!(args.properties, vec![("Tenant".to_string(), "t1".to_string())]);
        assert_eq!(args.session_id.as_deref(), Some("s-1"));
        assert_eq!(args.time_to_live_secs, Some(30));
    }

    #[test]
    fn test_send_requires_a_body_source() {
        assert!(Cli::try_parse_from(["asb-lens", "send", "orders"]).is_err());
        assert!(
            Cli::try_parse_from(["asb-lens", "send", "orders", "-b", "x", "-f", "body.json"])
                .is_err()
        );
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["asb-lens", "dead-letter", "orders", "-n", "3", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::DeadLetter { entity, max, reason } => {
                assert_eq!(entity, "orders");
                assert_eq!(max, Some(3));
                assert_eq!(reason, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
