//! Parent zone discovery.
//!
//! For a domain we need two servers to ask: one of its parent zone's servers
//! (for the registrar's delegation) and one of its own servers (for what the
//! zone says about itself). Both come from the system resolver; the parent's
//! answer is shared across domains through [`ParentCache`].

use std::sync::Arc;

use super::cache::ParentCache;
use super::name::{is_valid_domain, normalize_fqdn, parent_zone};
use super::resolver::NsLookup;
use super::types::ParentLocation;
use crate::error_handling::AuditError;

/// Finds the parent-zone server and the zone's own server for a domain.
pub struct ParentLocator {
    resolver: Arc<dyn NsLookup>,
    cache: Arc<ParentCache>,
}

impl ParentLocator {
    /// Creates a locator using `resolver` for lookups and `cache` for parent zones.
    pub fn new(resolver: Arc<dyn NsLookup>, cache: Arc<ParentCache>) -> Self {
        Self { resolver, cache }
    }

    /// The cache shared with other locators.
    pub fn cache(&self) -> &Arc<ParentCache> {
        &self.cache
    }

    /// Locates the servers to query for `domain`.
    ///
    /// # Errors
    ///
    /// - [`AuditError::InvalidDomain`] if the name is empty or malformed
    /// - [`AuditError::NoAuthority`] if the domain or its parent has no NS records
    /// - [`AuditError::Lookup`] if the resolver fails
    pub async fn locate(&self, domain: &str) -> Result<ParentLocation, AuditError> {
        let domain = normalize_fqdn(domain);
        if !is_valid_domain(&domain) {
            return Err(AuditError::InvalidDomain(domain));
        }
        let parent = parent_zone(&domain).ok_or_else(|| AuditError::InvalidDomain(domain.clone()))?;

        let zone_ns = self.first_ns(&domain).await?;

        let parent_ns = self
            .cache
            .get_or_resolve(&parent, || async {
                log::debug!("Parent {parent} not cached, resolving");
                self.first_ns(&parent).await
            })
            .await?;

        log::debug!("Domain: {domain}, Parent: {parent}, ParentNS: {parent_ns}, ZoneNS: {zone_ns}");

        Ok(ParentLocation {
            domain,
            parent_zone: parent,
            parent_ns,
            zone_ns,
        })
    }

    async fn first_ns(&self, zone: &str) -> Result<String, AuditError> {
        self.resolver
            .lookup_ns(zone)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AuditError::NoAuthority {
                zone: zone.to_string(),
            })
    }
}
