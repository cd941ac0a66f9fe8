//! System resolver lookups.
//!
//! The locator only needs one question answered by the host's resolver: "what
//! are the NS records for this name". [`NsLookup`] is that seam; the production
//! implementation sits on top of `hickory-resolver`.

use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;

use crate::error_handling::AuditError;

/// Looks up the NS records of a name through a recursive resolver.
#[async_trait]
pub trait NsLookup: Send + Sync {
    /// Returns the name-server hostnames for `name`, in resolver order.
    ///
    /// An existing name without NS records yields an empty vector; resolver
    /// failures (NXDOMAIN, timeouts, network errors) yield [`AuditError::Lookup`].
    async fn lookup_ns(&self, name: &str) -> Result<Vec<String>, AuditError>;
}

#[async_trait]
impl NsLookup for TokioAsyncResolver {
    async fn lookup_ns(&self, name: &str) -> Result<Vec<String>, AuditError> {
        match self.lookup(name, RecordType::NS).await {
            Ok(lookup) => {
                let nameservers: Vec<String> = lookup
                    .iter()
                    .filter_map(|rdata| {
                        if let RData::NS(ns) = rdata {
                            Some(ns.to_utf8())
                        } else {
                            None
                        }
                    })
                    .collect();
                Ok(nameservers)
            }
            Err(e) => match e.kind() {
                // NODATA: the name exists but has no NS records of its own
                ResolveErrorKind::NoRecordsFound { response_code, .. }
                    if *response_code == ResponseCode::NoError =>
                {
                    Ok(Vec::new())
                }
                _ => {
                    log::debug!("NS lookup for {name} failed: {e}");
                    Err(AuditError::Lookup {
                        name: name.to_string(),
                        message: e.to_string(),
                    })
                }
            },
        }
    }
}

/// Resolves a name-server hostname to an IP address.
///
/// IP literals are returned as-is without touching the resolver.
///
/// # Errors
///
/// Returns an error if DNS resolution fails or no addresses are found.
pub async fn resolve_host_to_ip(
    host: &str,
    resolver: &TokioAsyncResolver,
) -> Result<IpAddr, anyhow::Error> {
    if let Ok(ip) = host.trim_end_matches('.').parse::<IpAddr>() {
        return Ok(ip);
    }
    let response = resolver.lookup_ip(host).await?;
    response
        .iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No IP addresses found for {host}"))
}
