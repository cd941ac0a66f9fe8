//! Application glue around the audit core.
//!
//! This module provides domain input, the console report, progress logging,
//! shutdown handling, and statistics printing used by the run loop and binary.

pub mod input;
pub mod logging;
pub mod report;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use input::{domains_from_reader, read_domains};
pub use logging::log_progress;
pub use report::ReportSink;
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_finding_statistics, print_summary};
