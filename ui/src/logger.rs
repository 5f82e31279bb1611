use crate::config::LoggingConfig;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fs::OpenOptions;

/// Log file used when none is configured
pub const DEFAULT_LOG_FILE: &str = "asb-lens.log";

pub fn level_filter(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info, // Default to Info for any other value
    }
}

/// Installs the global logger.
///
/// Output goes to the configured log file (or [`DEFAULT_LOG_FILE`]) so
/// command output on stdout stays clean. With `verbose` it goes to stderr at
/// debug level or finer instead.
pub fn setup_logger(config: &LoggingConfig, verbose: bool) -> Result<(), log::SetLoggerError> {
    let mut log_level = level_filter(config.level());
    if verbose {
        log_level = log_level.max(LevelFilter::Debug);
    }

    let colors = ColoredLevelConfig::new()
        .trace(Color::BrightBlack)
        .debug(Color::BrightBlue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    let base_config = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(log_level)
        // The AMQP stack is chatty at debug level
        .level_for("fe2o3_amqp", LevelFilter::Warn)
        .level_for("azservicebus", LevelFilter::Info);

    if verbose {
        base_config.chain(std::io::stderr()).apply()?;
    } else {
        let file_path = config.file().unwrap_or(DEFAULT_LOG_FILE);
        match OpenOptions::new().create(true).append(true).open(file_path) {
            Ok(file) => base_config.chain(file).apply()?,
            Err(e) => {
                eprintln!("Warning: Failed to open log file '{file_path}': {e}");
                eprintln!("Continuing without file logging.");
                base_config.apply()?;
            }
        }
    }

    log::info!("Logger initialized with level: {log_level}");
    Ok(())
}
