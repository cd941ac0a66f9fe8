//! ns_audit library: DNS delegation auditing
//!
//! For every domain in a list, this library compares three sets of name
//! servers: the ones the parent zone delegates to (what the registrar has on
//! file), the ones the zone itself publishes, and a required set supplied by
//! the operator. Disagreements are reported per domain and summarized at the end.
//!
//! # Example
//!
//! ```no_run
//! use ns_audit::{run_audit, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     required_ns: vec!["ns1.example.net".into(), "ns2.example.net".into()],
//!     domains_file: std::path::PathBuf::from("domains.txt"),
//!     ..Default::default()
//! };
//!
//! let report = run_audit(config).await?;
//! println!("Audited {} domains, {} with issues",
//!          report.totals.domains, report.totals.domains_with_issues);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
pub mod audit;
pub mod compare;
pub mod config;
pub mod dns;
pub mod error_handling;
pub mod initialization;
pub mod pipeline;

#[cfg(test)]
mod test_helpers;

// Re-export public API
pub use app::{domains_from_reader, print_summary, read_domains, ReportSink};
pub use config::{Config, FailOn, LogFormat, LogLevel, Opt, TimeoutPolicy};
pub use run::{run_audit, run_audit_with, AuditReport};

// Internal run module (wires the audit core to its inputs and outputs)
mod run {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::{Context, Result};
    use futures::Stream;
    use log::info;
    use tokio_util::sync::CancellationToken;

    use crate::app::{
        log_progress, print_finding_statistics, read_domains, shutdown_gracefully, ReportSink,
    };
    use crate::audit::DomainAuditor;
    use crate::compare::Comparison;
    use crate::config::{Config, FailOn, LOGGING_INTERVAL};
    use crate::dns::{NameServerSet, NsLookup, ParentLocator};
    use crate::error_handling::{AuditStats, AuditTotals};
    use crate::initialization::{init_parent_cache, init_query_engine, init_resolver};
    use crate::pipeline::{run_pipeline, PipelineConfig};

    /// Results of an audit run.
    #[derive(Debug, Clone, Default)]
    pub struct AuditReport {
        /// Final counts
        pub totals: AuditTotals,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    impl AuditReport {
        /// Process exit code for a completed run under `policy`.
        ///
        /// `0` when the policy is satisfied, `2` when it trips. Fatal errors
        /// (exit `1`) never produce a report.
        pub fn exit_code(&self, policy: FailOn) -> i32 {
            let tripped = match policy {
                FailOn::Never => false,
                FailOn::AnyIssue => self.totals.domains_with_issues > 0,
                FailOn::ErrorsOnly => self.totals.domains_with_errors > 0,
            };
            if tripped {
                2
            } else {
                0
            }
        }
    }

    /// Runs an audit with the provided configuration.
    ///
    /// Reads the domain list, audits every domain against the required set,
    /// prints each domain's block to stdout and returns the totals.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The configuration is invalid
    /// - The domain list cannot be opened
    /// - The DNS resolver cannot be initialized
    pub async fn run_audit(config: Config) -> Result<AuditReport> {
        config.validate().context("Invalid configuration")?;
        let required = Arc::new(config.required_set());
        info!("Loaded, checking for name servers: {required}");

        let domains = read_domains(&config.domains_file).await?;

        let resolver = init_resolver().context("Failed to initialize DNS resolver")?;
        let cache = init_parent_cache(config.parent_cache_ttl());
        let engine = init_query_engine(
            Arc::clone(&resolver),
            config.dns_port,
            config.query_settings(),
        );
        let locator = ParentLocator::new(resolver as Arc<dyn NsLookup>, cache);
        let auditor = Arc::new(DomainAuditor::new(locator, engine));

        let mut sink = ReportSink::stdout();
        let report = run_audit_with(
            domains,
            auditor,
            required,
            config.pipeline_config(),
            |comparison: &Comparison| sink.print(comparison),
        )
        .await;

        print_finding_statistics(&report.totals);
        Ok(report)
    }

    /// Runs the pipeline over `domains` with an already-built auditor.
    ///
    /// Progress is logged every few seconds while the pipeline runs.
    pub async fn run_audit_with<S, F>(
        domains: S,
        auditor: Arc<DomainAuditor>,
        required: Arc<NameServerSet>,
        pipeline: PipelineConfig,
        sink: F,
    ) -> AuditReport
    where
        S: Stream<Item = String> + Send + 'static,
        F: FnMut(&Comparison),
    {
        let start_time = Instant::now();
        let stats = Arc::new(AuditStats::new());

        let cancel = CancellationToken::new();
        let cancel_logging = cancel.child_token();
        let stats_for_logging = Arc::clone(&stats);
        let logging_task = tokio::task::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL as u64));
            // The first tick completes immediately
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        log_progress(start_time, &stats_for_logging);
                    }
                    _ = cancel_logging.cancelled() => {
                        break;
                    }
                }
            }
        });

        info!(
            "Starting {} workers (queue capacity {})",
            pipeline.workers, pipeline.queue_capacity
        );
        let totals = run_pipeline(domains, auditor, required, pipeline, Arc::clone(&stats), sink).await;

        shutdown_gracefully(cancel, Some(logging_task)).await;
        log_progress(start_time, &stats);

        AuditReport {
            totals,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        }
    }
}
