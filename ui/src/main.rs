use asb_lens::cli::Cli;
use asb_lens::commands::{self, CommandContext};
use asb_lens::config::{self, settings};
use asb_lens::{AppError, logger};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match config::init_config(cli.config.as_deref()).config() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", AppError::Config(message));
            std::process::exit(1);
        }
    };

    if let Err(e) = logger::setup_logger(config.logging(), cli.verbose) {
        eprintln!("Warning: Failed to initialize logger: {e}");
    }
    log::info!("Starting asb-lens {}", env!("CARGO_PKG_VERSION"));

    let (settings, settings_origin) = settings::load_settings();
    log::debug!("Using settings from {settings_origin}");

    let ctx = CommandContext {
        config,
        settings: &settings,
        settings_origin: &settings_origin,
        snapshot: cli.snapshot.as_deref(),
    };

    match commands::run(cli.command, &ctx).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
