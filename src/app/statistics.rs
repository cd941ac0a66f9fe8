//! End-of-run statistics.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{AuditTotals, FailureType, FindingKind};

/// Formats the stats block printed after the report.
pub fn format_summary(totals: &AuditTotals) -> String {
    let clean = totals.clean_domains();
    format!(
        "\nStats\n-----\n\
         Domains: {}\n\
         Domains with Errors/Warnings: {} ({}%)\n\
         Domains without Errors/Warnings: {} ({}%)\n\
         Total Errors: {}\n",
        totals.domains,
        totals.domains_with_issues,
        totals.percent(totals.domains_with_issues),
        clean,
        totals.percent(clean),
        totals.issues,
    )
}

/// Prints the stats block to stdout.
pub fn print_summary(totals: &AuditTotals) {
    print!("{}", format_summary(totals));
}

/// Logs per-kind finding and failure counts.
pub fn print_finding_statistics(totals: &AuditTotals) {
    if totals.issues > 0 {
        info!("Finding Counts ({} total):", totals.issues);
        for kind in FindingKind::iter() {
            let count = totals.count(kind);
            if count > 0 {
                info!("   {} ({}): {}", kind.as_str(), kind.severity().as_str(), count);
            }
        }
    }

    let failures: usize = totals.failures.values().sum();
    if failures > 0 {
        info!("Audit Failures ({} total):", failures);
        for failure in FailureType::iter() {
            let count = totals.failures.get(&failure).copied().unwrap_or(0);
            if count > 0 {
                info!("   {}: {}", failure.as_str(), count);
            }
        }
    }
}
