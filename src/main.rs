//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `ns_audit` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Summary output and exit code
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use ns_audit::initialization::init_logger_with;
use ns_audit::{print_summary, run_audit, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try the current directory first, then the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::from(Opt::parse());

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let fail_on = config.fail_on;
    match run_audit(config).await {
        Ok(report) => {
            print_summary(&report.totals);
            log::info!(
                "Audited {} domain{} in {:.1}s",
                report.totals.domains,
                if report.totals.domains == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
            let code = report.exit_code(fail_on);
            if code != 0 {
                process::exit(code);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("ns_audit error: {:#}", e);
            process::exit(1);
        }
    }
}
