//! Error handling and audit statistics.
//!
//! This module provides:
//! - Startup error types (configuration, initialization)
//! - Per-domain audit errors and transport errors
//! - Finding kinds and severities
//! - Thread-safe audit counters
//!
//! Findings are graded as:
//! - **Critical**: the domain could not be audited
//! - **Error**: the registrar delegation differs from the required set
//! - **Warning**: the registrar and the zone disagree with each other

mod stats;
mod types;

// Re-export public API
pub use stats::{AuditStats, AuditTotals};
pub use types::{
    AuditError, ConfigError, ExchangeError, FailureType, FindingKind, InitializationError,
    Severity,
};
