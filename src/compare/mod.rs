//! Delegation comparison.
//!
//! Three sets are compared for each domain: the required set from the
//! operator, the registrar's delegation and the zone's own NS records. Each of
//! the four directed differences that is non-empty becomes one finding.

use crate::audit::{AuditOutcome, DomainAuditResult};
use crate::dns::NameServerSet;
use crate::error_handling::{AuditError, FindingKind, Severity};

/// One discrepancy found for a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// The domain could not be audited.
    AuditFailed(AuditError),
    /// A set difference that should have been empty.
    Mismatch {
        /// Which difference this is.
        kind: FindingKind,
        /// Hostnames in the difference (never empty).
        members: NameServerSet,
    },
}

impl Finding {
    /// What kind of finding this is.
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::AuditFailed(_) => FindingKind::AuditFailed,
            Finding::Mismatch { kind, .. } => *kind,
        }
    }

    /// How serious the finding is.
    pub fn severity(&self) -> Severity {
        self.kind().severity()
    }

    /// Renders the finding as a single report line.
    pub fn render(&self) -> String {
        match self {
            Finding::AuditFailed(e) => format!("{}: {e}", Severity::Critical.as_str()),
            Finding::Mismatch { kind, members } => {
                format!("{}: {}: {members}", kind.severity().as_str(), kind.as_str())
            }
        }
    }
}

/// All findings for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// The audited domain.
    pub domain: String,
    /// Findings in report order.
    pub findings: Vec<Finding>,
    /// Number of issues (one per finding).
    pub issue_count: usize,
}

impl Comparison {
    /// Returns `true` if nothing was found.
    pub fn is_clean(&self) -> bool {
        self.issue_count == 0
    }

    /// The most serious finding's severity, if any.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.findings.iter().map(Finding::severity).max()
    }

    /// Report lines for this domain: `OK`, or one line per finding.
    pub fn render_lines(&self) -> Vec<String> {
        if self.findings.is_empty() {
            return vec!["OK".to_string()];
        }
        self.findings.iter().map(Finding::render).collect()
    }
}

/// Compares a domain's delegation against the required set.
///
/// A failed audit yields exactly one critical finding. Otherwise the four
/// differences are checked independently, so the issue count is between 0 and 4.
pub fn compare(required: &NameServerSet, result: &DomainAuditResult) -> Comparison {
    let findings = match &result.outcome {
        AuditOutcome::Failed(e) => vec![Finding::AuditFailed(e.clone())],
        AuditOutcome::Delegation {
            registrar_ns,
            zone_ns,
        } => [
            (FindingKind::ZoneNotInRegistrar, zone_ns.difference(registrar_ns)),
            (FindingKind::RegistrarNotInZone, registrar_ns.difference(zone_ns)),
            (
                FindingKind::RequiredNotInRegistrar,
                required.difference(registrar_ns),
            ),
            (
                FindingKind::RegistrarNotRequired,
                registrar_ns.difference(required),
            ),
        ]
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .map(|(kind, members)| Finding::Mismatch { kind, members })
        .collect(),
    };

    Comparison {
        domain: result.domain.clone(),
        issue_count: findings.len(),
        findings,
    }
}
