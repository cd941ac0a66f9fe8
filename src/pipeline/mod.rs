//! Concurrent audit pipeline.
//!
//! One producer task feeds domains into a bounded queue, a fixed pool of
//! workers audits and compares them, and the calling task aggregates the
//! comparisons as they come back. Completion is signalled only by channel
//! closure: workers stop when the queue is closed and drained, and the
//! aggregator stops once every worker has dropped its output sender.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use tokio::sync::{mpsc, Mutex};

use crate::audit::DomainAuditor;
use crate::compare::{compare, Comparison};
use crate::dns::NameServerSet;
use crate::error_handling::{AuditStats, AuditTotals};

/// Pipeline sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of worker tasks.
    pub workers: usize,
    /// Capacity of the input and output queues.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: crate::config::DEFAULT_WORKERS,
            queue_capacity: crate::config::DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Audits every domain in `domains` and returns the run totals.
///
/// `sink` is called once per domain, from the calling task, in completion
/// order. `stats` is updated before each `sink` call so progress loggers
/// reading it concurrently see live counts.
pub async fn run_pipeline<S, F>(
    domains: S,
    auditor: Arc<DomainAuditor>,
    required: Arc<NameServerSet>,
    config: PipelineConfig,
    stats: Arc<AuditStats>,
    mut sink: F,
) -> AuditTotals
where
    S: Stream<Item = String> + Send + 'static,
    F: FnMut(&Comparison),
{
    let workers = config.workers.max(1);
    let capacity = config.queue_capacity.max(1);

    let (domain_tx, domain_rx) = mpsc::channel::<String>(capacity);
    let (result_tx, mut result_rx) = mpsc::channel::<Comparison>(capacity);

    let producer = tokio::spawn(async move {
        let mut domains = Box::pin(domains);
        let mut queued = 0usize;
        while let Some(domain) = domains.next().await {
            if domain_tx.send(domain).await.is_err() {
                warn!("All workers have stopped, no longer queuing domains");
                break;
            }
            queued += 1;
        }
        info!("Finished queuing {queued} domains");
    });

    let domain_rx = Arc::new(Mutex::new(domain_rx));
    let mut handles = Vec::with_capacity(workers);
    for id in 0..workers {
        let domain_rx = Arc::clone(&domain_rx);
        let result_tx = result_tx.clone();
        let auditor = Arc::clone(&auditor);
        let required = Arc::clone(&required);
        handles.push(tokio::spawn(async move {
            debug!("Starting worker {id}");
            loop {
                // Lock only for the receive so other workers can take the next domain
                let next = domain_rx.lock().await.recv().await;
                let Some(domain) = next else { break };

                let result = auditor.audit(&domain).await;
                let comparison = compare(&required, &result);
                if result_tx.send(comparison).await.is_err() {
                    warn!("Result channel closed, worker {id} stopping");
                    break;
                }
            }
            debug!("Worker {id} finished");
        }));
    }
    // The aggregator below ends when the last worker's clone is dropped
    drop(result_tx);

    while let Some(comparison) = result_rx.recv().await {
        stats.record(&comparison);
        sink(&comparison);
    }

    for handle in handles {
        if let Err(join_error) = handle.await {
            warn!("Worker panicked: {join_error:?}");
        }
    }
    if let Err(join_error) = producer.await {
        warn!("Domain producer panicked: {join_error:?}");
    }

    stats.totals()
}
