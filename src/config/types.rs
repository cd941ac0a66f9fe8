//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_DOMAINS_FILE, DEFAULT_QUERY_ATTEMPTS, DEFAULT_QUERY_TIMEOUT_SECS,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_RETRY_DELAY_MS, DEFAULT_WORKERS, DNS_PORT,
};
use crate::dns::{is_valid_domain, normalize_fqdn, NameServerSet, QuerySettings};
use crate::error_handling::ConfigError;
use crate::pipeline::PipelineConfig;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// How the per-attempt timeout grows across retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TimeoutPolicy {
    /// Attempt *i* waits `i × base`.
    Linear,
    /// Every attempt waits `base`.
    Fixed,
}

impl TimeoutPolicy {
    /// Timeout for the 1-based `attempt`.
    pub fn timeout_for(self, attempt: usize, base: Duration) -> Duration {
        match self {
            TimeoutPolicy::Fixed => base,
            TimeoutPolicy::Linear => {
                let factor = u32::try_from(attempt.max(1)).unwrap_or(u32::MAX);
                base.saturating_mul(factor)
            }
        }
    }
}

/// When the process should exit non-zero after a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    /// Always exit 0 once the run completes.
    Never,
    /// Exit 2 if any domain has a finding, warnings included.
    AnyIssue,
    /// Exit 2 only if a domain has an error or critical finding.
    ErrorsOnly,
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Check domains.txt against two required servers
/// ns_audit ns1.example.net ns2.example.net
///
/// # Read domains from stdin, fail the build on any error
/// cat zones.txt | ns_audit ns1.example.net --domains - --fail-on errors-only
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "ns_audit",
    version,
    about = "Checks that registrar delegations and zone NS records match a required set of name servers."
)]
pub struct Opt {
    /// Name servers every domain must be delegated to
    #[arg(required = true, value_name = "NAMESERVER")]
    pub required_ns: Vec<String>,

    /// File with one domain per line ('-' reads stdin)
    #[arg(long, env = "NS_AUDIT_DOMAINS", default_value = DEFAULT_DOMAINS_FILE)]
    pub domains: PathBuf,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Number of concurrent workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Capacity of the domain queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Base timeout for each query attempt, in seconds
    #[arg(long, default_value_t = DEFAULT_QUERY_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// How the timeout grows between attempts: linear|fixed
    #[arg(long, value_enum, default_value_t = TimeoutPolicy::Linear)]
    pub timeout_policy: TimeoutPolicy,

    /// Attempts per query before the domain is reported as failed
    #[arg(long, default_value_t = DEFAULT_QUERY_ATTEMPTS)]
    pub attempts: usize,

    /// Pause between attempts, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,

    /// Forget cached parent-zone servers after this many seconds (default: never)
    #[arg(long)]
    pub parent_cache_ttl_secs: Option<u64>,

    /// Port to send targeted queries to
    #[arg(long, default_value_t = DNS_PORT)]
    pub dns_port: u16,

    /// Exit policy: never|any-issue|errors-only
    #[arg(long, value_enum, default_value_t = FailOn::Never)]
    pub fail_on: FailOn,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use ns_audit::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     required_ns: vec!["ns1.example.net".to_string()],
///     domains_file: PathBuf::from("domains.txt"),
///     workers: 8,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Required name servers
    pub required_ns: Vec<String>,

    /// File to read domains from (`-` for stdin)
    pub domains_file: PathBuf,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Worker tasks
    pub workers: usize,

    /// Domain queue capacity
    pub queue_capacity: usize,

    /// Base per-attempt query timeout in seconds
    pub timeout_secs: u64,

    /// Timeout growth policy
    pub timeout_policy: TimeoutPolicy,

    /// Attempts per targeted query
    pub attempts: usize,

    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,

    /// Parent cache TTL in seconds (`None` = process lifetime)
    pub parent_cache_ttl_secs: Option<u64>,

    /// Port for targeted queries
    pub dns_port: u16,

    /// Exit policy
    pub fail_on: FailOn,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            required_ns: Vec::new(),
            domains_file: PathBuf::from(DEFAULT_DOMAINS_FILE),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            timeout_policy: TimeoutPolicy::Linear,
            attempts: DEFAULT_QUERY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            parent_cache_ttl_secs: None,
            dns_port: DNS_PORT,
            fail_on: FailOn::Never,
        }
    }
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            required_ns: opt.required_ns,
            domains_file: opt.domains,
            log_level: opt.log_level,
            log_format: opt.log_format,
            workers: opt.workers,
            queue_capacity: opt.queue_capacity,
            timeout_secs: opt.timeout_secs,
            timeout_policy: opt.timeout_policy,
            attempts: opt.attempts,
            retry_delay_ms: opt.retry_delay_ms,
            parent_cache_ttl_secs: opt.parent_cache_ttl_secs,
            dns_port: opt.dns_port,
            fail_on: opt.fail_on,
        }
    }
}

impl Config {
    /// Checks the configuration before any task starts.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: no required servers, a required server
    /// that is not a valid hostname, or a zero count/timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_ns.is_empty() {
            return Err(ConfigError::NoRequiredNameServers);
        }
        if let Some(bad) = self
            .required_ns
            .iter()
            .find(|ns| !is_valid_domain(&normalize_fqdn(ns)))
        {
            return Err(ConfigError::InvalidNameServer(bad.clone()));
        }
        for (field, value) in [
            ("workers", self.workers as u64),
            ("queue_capacity", self.queue_capacity as u64),
            ("attempts", self.attempts as u64),
            ("timeout_secs", self.timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroValue { field });
            }
        }
        Ok(())
    }

    /// The required servers as a normalized set.
    pub fn required_set(&self) -> NameServerSet {
        self.required_ns.iter().collect()
    }

    /// Retry settings for the query engine.
    pub fn query_settings(&self) -> QuerySettings {
        QuerySettings {
            max_attempts: self.attempts,
            base_timeout: Duration::from_secs(self.timeout_secs),
            timeout_policy: self.timeout_policy,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Pipeline sizing.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
        }
    }

    /// Parent cache TTL, if configured.
    pub fn parent_cache_ttl(&self) -> Option<Duration> {
        self.parent_cache_ttl_secs.map(Duration::from_secs)
    }
}
