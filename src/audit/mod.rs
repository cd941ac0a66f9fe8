//! Domain auditing.
//!
//! An audit asks two servers the same question ("NS for this domain?"): a
//! server of the parent zone, whose referral is what the registrar has on
//! file, and one of the domain's own servers, whose answer is what the zone
//! publishes. The first failure ends the audit and is kept in the result.

mod types;

use std::sync::Arc;

use crate::dns::{
    extract_ns_set, normalize_fqdn, NameServerSet, ParentLocator, QueryEngine, Section,
};
use crate::error_handling::AuditError;

pub use types::{AuditOutcome, DomainAuditResult};

/// Retrieves the registrar and zone views of a domain's delegation.
pub struct DomainAuditor {
    locator: ParentLocator,
    engine: Arc<QueryEngine>,
}

impl DomainAuditor {
    /// Creates an auditor from a locator and a query engine.
    pub fn new(locator: ParentLocator, engine: Arc<QueryEngine>) -> Self {
        Self { locator, engine }
    }

    /// Audits one domain. Never fails: errors end up in the result's outcome.
    ///
    /// The result is keyed by the normalized FQDN, the same name that is
    /// queried, so `EXAMPLE.com` and `example.com.` report identically.
    pub async fn audit(&self, domain: &str) -> DomainAuditResult {
        let domain = normalize_fqdn(domain);
        let domain = domain.as_str();
        match self.delegation_sets(domain).await {
            Ok((registrar_ns, zone_ns)) => {
                log::debug!("{domain}: registrar {registrar_ns}, zone {zone_ns}");
                DomainAuditResult::delegation(domain, registrar_ns, zone_ns)
            }
            Err(e) => {
                log::warn!("Failed to audit {domain}: {e}");
                DomainAuditResult::failed(domain, e)
            }
        }
    }

    async fn delegation_sets(
        &self,
        domain: &str,
    ) -> Result<(NameServerSet, NameServerSet), AuditError> {
        let location = self.locator.locate(domain).await?;

        let referral = self
            .engine
            .query_ns(&location.domain, &location.parent_ns)
            .await?;
        let registrar_ns = extract_ns_set(&referral, Section::Authority)?;

        let answer = self
            .engine
            .query_ns(&location.domain, &location.zone_ns)
            .await?;
        let zone_ns = extract_ns_set(&answer, Section::Answer)?;

        Ok((registrar_ns, zone_ns))
    }
}
