//! DNS delegation lookups.
//!
//! This module covers everything that talks to DNS:
//! - name normalization and parent-zone derivation
//! - the system resolver seam ([`NsLookup`]) and the parent-zone cache
//! - parent discovery ([`ParentLocator`])
//! - targeted, non-recursive NS queries with retries ([`QueryEngine`])
//! - NS set extraction from a reply section

mod cache;
mod extract;
mod locator;
mod name;
mod query;
mod resolver;
mod types;

// Re-export public API
pub use cache::ParentCache;
pub use extract::extract_ns_set;
pub use locator::ParentLocator;
pub use name::{is_valid_domain, normalize_fqdn, parent_zone};
pub use query::{build_ns_query, reply_matches, DnsExchange, QueryEngine, QuerySettings, UdpExchange};
pub use resolver::{resolve_host_to_ip, NsLookup};
pub use types::{NameServerSet, ParentLocation, Section};
