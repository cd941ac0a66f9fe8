//! Error type definitions.
//!
//! This module defines the startup errors, the per-domain audit errors, and the
//! finding/failure categories counted in run statistics.

use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),
}

/// Invalid configuration discovered at startup.
///
/// These are the only process-fatal conditions; everything that goes wrong
/// for an individual domain is an [`AuditError`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No required name servers were supplied.
    #[error("At least one required name server must be given")]
    NoRequiredNameServers,

    /// A required name server is not a usable hostname.
    #[error("Invalid required name server '{0}'")]
    InvalidNameServer(String),

    /// A numeric setting that must be positive was zero.
    #[error("Configuration value '{field}' must be greater than zero")]
    ZeroValue {
        /// Name of the offending setting.
        field: &'static str,
    },
}

/// Failure of a single transport attempt against a name server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// No reply arrived within the attempt's timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Socket-level failure (bind, send or receive).
    #[error("network error: {0}")]
    Io(String),

    /// The server name could not be turned into an address.
    #[error("cannot resolve server address: {0}")]
    Resolve(String),

    /// The reply could not be decoded, or did not belong to our query.
    #[error("malformed reply: {0}")]
    Malformed(String),

    /// The reply had the TC bit set, so its sections are incomplete.
    #[error("truncated reply (TC bit set)")]
    Truncated,
}

/// Domain-scoped audit failures.
///
/// None of these stop the run: the auditor attaches them to the domain's
/// result and the worker moves on to its next domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// The input line is not a usable domain name.
    #[error("Invalid domain name '{0}'")]
    InvalidDomain(String),

    /// The resolver returned no NS records for a zone or its parent.
    #[error("Could not find NS for {zone}")]
    NoAuthority {
        /// Zone that has no name servers.
        zone: String,
    },

    /// The resolver itself failed (NXDOMAIN, timeout, network error).
    #[error("NS lookup for {name} failed: {message}")]
    Lookup {
        /// Name that was looked up.
        name: String,
        /// Underlying resolver error.
        message: String,
    },

    /// Every attempt of a targeted query failed.
    #[error("Query for {target} at {server} gave up after {attempts} attempt(s): {last_error}")]
    QueryExhausted {
        /// Name that was queried.
        target: String,
        /// Server that was queried.
        server: String,
        /// Number of attempts made.
        attempts: usize,
        /// Error from the final attempt.
        last_error: String,
    },

    /// A targeted query returned a non-success response code.
    #[error("Bad response for domain {domain}: {code}")]
    BadResponse {
        /// Name that was queried.
        domain: String,
        /// Response code returned by the server.
        code: String,
    },
}

impl AuditError {
    /// The statistics bucket this error is counted in.
    pub fn failure_type(&self) -> FailureType {
        match self {
            AuditError::InvalidDomain(_) => FailureType::InvalidDomain,
            AuditError::NoAuthority { .. } => FailureType::NoAuthority,
            AuditError::Lookup { .. } => FailureType::LookupFailed,
            AuditError::QueryExhausted { .. } => FailureType::QueryExhausted,
            AuditError::BadResponse { .. } => FailureType::BadResponse,
        }
    }
}

/// Categories of per-domain audit failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureType {
    /// See [`AuditError::InvalidDomain`].
    InvalidDomain,
    /// See [`AuditError::NoAuthority`].
    NoAuthority,
    /// See [`AuditError::Lookup`].
    LookupFailed,
    /// See [`AuditError::QueryExhausted`].
    QueryExhausted,
    /// See [`AuditError::BadResponse`].
    BadResponse,
}

impl FailureType {
    /// Label used in the end-of-run summary.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureType::InvalidDomain => "Invalid domain name",
            FailureType::NoAuthority => "No NS records for zone or parent",
            FailureType::LookupFailed => "System resolver lookup failed",
            FailureType::QueryExhausted => "Query retries exhausted",
            FailureType::BadResponse => "Non-success response code",
        }
    }
}

/// How serious a comparison finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Not a real problem on its own, but the two views disagree.
    Warning,
    /// The registrar delegation does not match the required set.
    Error,
    /// The domain could not be audited at all.
    Critical,
}

impl Severity {
    /// Prefix of a report line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// Kinds of findings the comparator can produce for a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FindingKind {
    /// The domain could not be audited.
    AuditFailed,
    /// A required server is missing from the registrar delegation.
    RequiredNotInRegistrar,
    /// The registrar delegates to a server that is not required.
    RegistrarNotRequired,
    /// The zone claims a server the registrar does not delegate to.
    ZoneNotInRegistrar,
    /// The registrar delegates to a server the zone does not acknowledge.
    RegistrarNotInZone,
}

impl FindingKind {
    /// Description used in report lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::AuditFailed => "Audit failed",
            FindingKind::RequiredNotInRegistrar => "Required, not in registrar",
            FindingKind::RegistrarNotRequired => "In registrar, not required",
            FindingKind::ZoneNotInRegistrar => "In zone, not in registrar",
            FindingKind::RegistrarNotInZone => "In registrar, not in zone",
        }
    }

    /// Severity of this kind of finding.
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::AuditFailed => Severity::Critical,
            FindingKind::RequiredNotInRegistrar | FindingKind::RegistrarNotRequired => {
                Severity::Error
            }
            FindingKind::ZoneNotInRegistrar | FindingKind::RegistrarNotInZone => {
                Severity::Warning
            }
        }
    }
}
