//! DNS resolver and parent cache initialization.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{DNS_ATTEMPTS, DNS_TIMEOUT_SECS};
use crate::dns::ParentCache;
use crate::error_handling::InitializationError;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;

/// Initializes the system resolver used to find each domain's servers.
///
/// The host's configuration (`/etc/resolv.conf`) is used so that audits see
/// what the machine's own resolver sees. If it cannot be read, the library's
/// default upstreams are used instead.
///
/// Timeouts and attempts are tightened on either configuration, and `ndots`
/// is zeroed so bare TLD lookups are never expanded with a search domain.
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if no usable configuration
/// can be built.
pub fn init_resolver() -> Result<Arc<TokioAsyncResolver>, InitializationError> {
    let (config, mut opts) = match read_system_conf() {
        Ok((config, opts)) => (config, opts),
        Err(e) => {
            log::warn!("Failed to read system DNS configuration, using defaults: {e}");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };
    if config.name_servers().is_empty() {
        return Err(InitializationError::DnsResolverError(
            "no upstream name servers configured".to_string(),
        ));
    }

    opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
    opts.attempts = DNS_ATTEMPTS;
    opts.ndots = 0;

    Ok(Arc::new(TokioAsyncResolver::tokio(config, opts)))
}

/// Creates the parent-zone cache shared by all workers.
pub fn init_parent_cache(ttl: Option<Duration>) -> Arc<ParentCache> {
    if let Some(ttl) = ttl {
        log::info!("Parent zone cache entries expire after {}s", ttl.as_secs());
    }
    Arc::new(ParentCache::with_ttl(ttl))
}
