//! Per-domain audit results.

use crate::dns::NameServerSet;
use crate::error_handling::AuditError;

/// What an audit of one domain produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Both views of the delegation were retrieved.
    Delegation {
        /// NS records the parent zone delegates to (registrar view).
        registrar_ns: NameServerSet,
        /// NS records the zone publishes for itself (zone view).
        zone_ns: NameServerSet,
    },
    /// The audit stopped at the first failure.
    Failed(AuditError),
}

/// The audit result for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAuditResult {
    /// Fully-qualified domain name, lowercase with a trailing dot.
    pub domain: String,
    /// Delegation sets or the error that stopped the audit.
    pub outcome: AuditOutcome,
}

impl DomainAuditResult {
    /// A successful result.
    pub fn delegation(domain: &str, registrar_ns: NameServerSet, zone_ns: NameServerSet) -> Self {
        Self {
            domain: domain.to_string(),
            outcome: AuditOutcome::Delegation {
                registrar_ns,
                zone_ns,
            },
        }
    }

    /// A failed result.
    pub fn failed(domain: &str, error: AuditError) -> Self {
        Self {
            domain: domain.to_string(),
            outcome: AuditOutcome::Failed(error),
        }
    }

    /// The error that stopped the audit, if any.
    pub fn error(&self) -> Option<&AuditError> {
        match &self.outcome {
            AuditOutcome::Failed(e) => Some(e),
            AuditOutcome::Delegation { .. } => None,
        }
    }
}
