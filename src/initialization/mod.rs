//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger
//! - System DNS resolver
//! - Parent-zone cache
//! - Targeted query transport and engine
//!
//! All initialization functions return proper error types for error handling.

mod logger;
mod resolver;

use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;

use crate::dns::{DnsExchange, QueryEngine, QuerySettings, UdpExchange};

// Re-export public API
pub use logger::init_logger_with;
pub use resolver::{init_parent_cache, init_resolver};

/// Initializes the engine used for targeted NS queries.
///
/// Queries go over UDP to `port`; server hostnames are resolved through
/// `resolver`.
pub fn init_query_engine(
    resolver: Arc<TokioAsyncResolver>,
    port: u16,
    settings: QuerySettings,
) -> Arc<QueryEngine> {
    let exchange: Arc<dyn DnsExchange> = Arc::new(UdpExchange::new(resolver, port));
    Arc::new(QueryEngine::new(exchange, settings))
}
