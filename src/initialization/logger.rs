//! Logger initialization.
//!
//! This module provides the logger setup with the crate's custom formatting.

use std::io::{IsTerminal, Write};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting, either plain text or one
/// JSON object per line. Plain output is colored only when stderr is a terminal.
///
/// `RUST_LOG` is read first and the `level` argument is applied on top of it,
/// so `--log-level` always wins while per-module `RUST_LOG` filters still work.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Show every query attempt
/// ns_audit ns1.example.net --log-level trace
///
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=hickory_resolver=debug ns_audit ns1.example.net
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let color = std::io::stderr().is_terminal();
    if color {
        colored::control::set_override(true);
    }

    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    // Malformed or truncated replies are already reported as failed attempts
    builder.filter_module("hickory_proto", LevelFilter::Error);
    builder.filter_module("hickory_resolver", LevelFilter::Warn);
    builder.filter_module("ns_audit", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(move |buf, record| {
                let level = record.level();
                if !color {
                    return writeln!(
                        buf,
                        "{} {} [{}] {}",
                        chrono::Local::now().format("%H:%M:%S"),
                        record.target(),
                        level,
                        record.args()
                    );
                }
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S"),
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init so a second call (tests) reports an error instead of panicking
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}
