//! Configuration constants.
//!
//! Defaults for the CLI and library configuration, plus fixed operational
//! parameters.

/// Default number of worker tasks.
pub const DEFAULT_WORKERS: usize = 4;
/// Default capacity of the domain and result queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;
/// Progress log interval in seconds.
pub const LOGGING_INTERVAL: usize = 5;

// Targeted NS queries
/// Base per-attempt timeout in seconds.
/// With the linear policy the third attempt waits 15s.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 5;
/// Attempts per targeted query before giving up.
pub const DEFAULT_QUERY_ATTEMPTS: usize = 3;
/// Pause between attempts in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 0;
/// Standard DNS port.
pub const DNS_PORT: u16 = 53;
/// UDP payload size advertised in the EDNS OPT record of every query.
pub const EDNS_UDP_PAYLOAD: u16 = 4096;
/// Receive buffer for UDP replies, matching the advertised payload size.
pub const UDP_RECV_BUFFER_SIZE: usize = EDNS_UDP_PAYLOAD as usize;

// System resolver
/// System resolver timeout in seconds.
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// System resolver attempts per lookup.
pub const DNS_ATTEMPTS: usize = 2;

/// Default domain list, one domain per line.
pub const DEFAULT_DOMAINS_FILE: &str = "domains.txt";
