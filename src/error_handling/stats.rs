//! Audit statistics tracking.
//!
//! This module provides thread-safe counters for findings and audit failures,
//! updated by the pipeline's aggregator and read for the end-of-run summary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{FailureType, FindingKind, Severity};
use crate::compare::{Comparison, Finding};

/// Thread-safe audit statistics tracker.
///
/// All finding kinds and failure types are initialized to zero on creation.
///
/// # Thread Safety
///
/// This struct is thread-safe and can be shared across multiple tasks using `Arc`.
pub struct AuditStats {
    domains: AtomicUsize,
    domains_with_issues: AtomicUsize,
    domains_with_errors: AtomicUsize,
    issues: AtomicUsize,
    findings: HashMap<FindingKind, AtomicUsize>,
    failures: HashMap<FailureType, AtomicUsize>,
}

impl Default for AuditStats {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStats {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        let mut findings = HashMap::new();
        for kind in FindingKind::iter() {
            findings.insert(kind, AtomicUsize::new(0));
        }

        let mut failures = HashMap::new();
        for failure in FailureType::iter() {
            failures.insert(failure, AtomicUsize::new(0));
        }

        AuditStats {
            domains: AtomicUsize::new(0),
            domains_with_issues: AtomicUsize::new(0),
            domains_with_errors: AtomicUsize::new(0),
            issues: AtomicUsize::new(0),
            findings,
            failures,
        }
    }

    /// Counts one domain's comparison.
    pub fn record(&self, comparison: &Comparison) {
        self.domains.fetch_add(1, Ordering::Relaxed);
        if comparison.is_clean() {
            return;
        }
        self.domains_with_issues.fetch_add(1, Ordering::Relaxed);
        self.issues
            .fetch_add(comparison.issue_count, Ordering::Relaxed);
        if comparison
            .worst_severity()
            .is_some_and(|s| s >= Severity::Error)
        {
            self.domains_with_errors.fetch_add(1, Ordering::Relaxed);
        }

        for finding in &comparison.findings {
            if let Some(counter) = self.findings.get(&finding.kind()) {
                counter.fetch_add(1, Ordering::Relaxed);
            }
            if let Finding::AuditFailed(e) = finding {
                if let Some(counter) = self.failures.get(&e.failure_type()) {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Number of domains recorded so far.
    pub fn domains(&self) -> usize {
        self.domains.load(Ordering::SeqCst)
    }

    /// Get the count for a finding kind.
    pub fn finding_count(&self, kind: FindingKind) -> usize {
        self.findings
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Get the count for a failure type.
    pub fn failure_count(&self, failure: FailureType) -> usize {
        self.failures
            .get(&failure)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Snapshot of the counters.
    pub fn totals(&self) -> AuditTotals {
        AuditTotals {
            domains: self.domains(),
            domains_with_issues: self.domains_with_issues.load(Ordering::SeqCst),
            domains_with_errors: self.domains_with_errors.load(Ordering::SeqCst),
            issues: self.issues.load(Ordering::SeqCst),
            findings: FindingKind::iter()
                .map(|k| (k, self.finding_count(k)))
                .collect(),
            failures: FailureType::iter()
                .map(|f| (f, self.failure_count(f)))
                .collect(),
        }
    }
}

/// Final counts of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditTotals {
    /// Domains processed.
    pub domains: usize,
    /// Domains with at least one finding.
    pub domains_with_issues: usize,
    /// Domains with at least one error or critical finding.
    pub domains_with_errors: usize,
    /// Findings across all domains.
    pub issues: usize,
    /// Findings per kind.
    pub findings: HashMap<FindingKind, usize>,
    /// Audit failures per type.
    pub failures: HashMap<FailureType, usize>,
}

impl AuditTotals {
    /// Domains without any finding.
    pub fn clean_domains(&self) -> usize {
        self.domains.saturating_sub(self.domains_with_issues)
    }

    /// `part` as a whole percentage of all domains (0 when nothing was processed).
    pub fn percent(&self, part: usize) -> usize {
        if self.domains == 0 {
            0
        } else {
            part * 100 / self.domains
        }
    }

    /// Count for one finding kind.
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.get(&kind).copied().unwrap_or(0)
    }
}
