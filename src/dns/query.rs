//! Targeted NS queries with retries.
//!
//! Unlike the system resolver, these queries go straight to one chosen server
//! (the parent's or the zone's own) with recursion turned off, so we see
//! exactly what that server publishes.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_resolver::proto::rr::{Name, RecordType};
use hickory_resolver::TokioAsyncResolver;
use tokio::net::UdpSocket;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;

use super::resolver::resolve_host_to_ip;
use crate::config::{TimeoutPolicy, EDNS_UDP_PAYLOAD, UDP_RECV_BUFFER_SIZE};
use crate::error_handling::{AuditError, ExchangeError};

/// Sends one DNS message to one server and waits for the reply.
///
/// Implementations make a single attempt; retrying is the [`QueryEngine`]'s job.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    /// Sends `request` to `server` and returns its reply, or fails after `timeout`.
    async fn exchange(
        &self,
        request: &Message,
        server: &str,
        timeout: Duration,
    ) -> Result<Message, ExchangeError>;
}

/// Plain UDP transport (RFC 1035) to a name server.
///
/// Server hostnames are resolved to an address with the system resolver; IP
/// literals are used directly.
pub struct UdpExchange {
    resolver: Arc<TokioAsyncResolver>,
    port: u16,
}

impl UdpExchange {
    /// Creates a transport sending to `port` on each server.
    pub fn new(resolver: Arc<TokioAsyncResolver>, port: u16) -> Self {
        Self { resolver, port }
    }

    async fn server_addr(&self, server: &str) -> Result<SocketAddr, ExchangeError> {
        let ip = resolve_host_to_ip(server, &self.resolver)
            .await
            .map_err(|e| ExchangeError::Resolve(format!("{server}: {e}")))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    async fn send_and_receive(
        &self,
        request: &Message,
        server: &str,
    ) -> Result<Message, ExchangeError> {
        let addr = self.server_addr(server).await?;
        let query_bytes = request
            .to_vec()
            .map_err(|e| ExchangeError::Malformed(format!("failed to encode query: {e}")))?;

        let bind_addr = match addr.ip() {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| ExchangeError::Io(format!("failed to bind UDP socket: {e}")))?;
        socket
            .connect(addr)
            .await
            .map_err(|e| ExchangeError::Io(format!("failed to connect to {addr}: {e}")))?;
        socket
            .send(&query_bytes)
            .await
            .map_err(|e| ExchangeError::Io(format!("failed to send query to {addr}: {e}")))?;

        let mut recv_buf = vec![0u8; UDP_RECV_BUFFER_SIZE];
        let len = socket
            .recv(&mut recv_buf)
            .await
            .map_err(|e| ExchangeError::Io(format!("failed to receive from {addr}: {e}")))?;

        let response = Message::from_vec(&recv_buf[..len])
            .map_err(|e| ExchangeError::Malformed(format!("failed to parse reply: {e}")))?;
        if !reply_matches(request, &response) {
            return Err(ExchangeError::Malformed(
                "reply ID or question does not match query".to_string(),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl DnsExchange for UdpExchange {
    async fn exchange(
        &self,
        request: &Message,
        server: &str,
        timeout: Duration,
    ) -> Result<Message, ExchangeError> {
        // Resolving the server's address counts against the attempt's timeout
        tokio::time::timeout(timeout, self.send_and_receive(request, server))
            .await
            .map_err(|_| ExchangeError::Timeout(timeout))?
    }
}

/// Rejects a reply with the TC bit set: its sections may be missing records.
fn reject_truncated(response: Message) -> Result<Message, ExchangeError> {
    if response.truncated() {
        Err(ExchangeError::Truncated)
    } else {
        Ok(response)
    }
}

/// Checks that a reply answers our query (same ID, same question).
pub fn reply_matches(request: &Message, response: &Message) -> bool {
    if request.id() != response.id() {
        return false;
    }
    match (request.queries().first(), response.queries().first()) {
        (Some(q), Some(r)) => {
            q.name() == r.name()
                && q.query_type() == r.query_type()
                && q.query_class() == r.query_class()
        }
        _ => false,
    }
}

/// Builds a non-recursive NS query for `target`.
///
/// The query advertises EDNS with a 4096-byte UDP payload so large referrals
/// are not cut to the classic 512-byte limit.
///
/// # Errors
///
/// Returns [`AuditError::InvalidDomain`] if `target` is not a valid DNS name.
pub fn build_ns_query(target: &str) -> Result<Message, AuditError> {
    let name =
        Name::from_str(target).map_err(|_| AuditError::InvalidDomain(target.to_string()))?;

    let mut message = Message::new();
    message.set_id(rand::random::<u16>());
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(false);
    message.add_query(Query::query(name, RecordType::NS));

    let mut edns = Edns::new();
    edns.set_max_payload(EDNS_UDP_PAYLOAD);
    message.set_edns(edns);
    Ok(message)
}

/// Retry and timeout settings for targeted queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
    /// Maximum number of attempts per query (at least 1).
    pub max_attempts: usize,
    /// Base per-attempt timeout.
    pub base_timeout: Duration,
    /// How the timeout grows from one attempt to the next.
    pub timeout_policy: TimeoutPolicy,
    /// Pause between a failed attempt and the next one.
    pub retry_delay: Duration,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_attempts: crate::config::DEFAULT_QUERY_ATTEMPTS,
            base_timeout: Duration::from_secs(crate::config::DEFAULT_QUERY_TIMEOUT_SECS),
            timeout_policy: TimeoutPolicy::Linear,
            retry_delay: Duration::from_millis(crate::config::DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// Sends NS queries to a specific server, retrying with growing timeouts.
pub struct QueryEngine {
    exchange: Arc<dyn DnsExchange>,
    settings: QuerySettings,
}

impl QueryEngine {
    /// Creates an engine sending through `exchange`.
    pub fn new(exchange: Arc<dyn DnsExchange>, settings: QuerySettings) -> Self {
        Self { exchange, settings }
    }

    /// The engine's retry settings.
    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// Asks `server` for the NS records of `target`.
    ///
    /// Attempt *i* (1-based) waits for the timeout given by the configured
    /// [`TimeoutPolicy`]. A truncated reply counts as a failed attempt. The
    /// first complete reply is returned as-is; its response code is checked
    /// later by the extractor.
    ///
    /// # Errors
    ///
    /// - [`AuditError::InvalidDomain`] if `target` cannot be put in a query
    /// - [`AuditError::QueryExhausted`] if every attempt failed
    pub async fn query_ns(&self, target: &str, server: &str) -> Result<Message, AuditError> {
        let request = build_ns_query(target)?;
        let settings = self.settings;
        let retries = settings.max_attempts.saturating_sub(1);
        let strategy = FixedInterval::new(settings.retry_delay).take(retries);

        let attempt_count = AtomicUsize::new(0);
        let (request, exchange, attempt_count) = (&request, &self.exchange, &attempt_count);

        let result = Retry::spawn(strategy, move || {
            let attempt = attempt_count.fetch_add(1, Ordering::SeqCst) + 1;
            let timeout = settings
                .timeout_policy
                .timeout_for(attempt, settings.base_timeout);
            async move {
                log::trace!("Querying {server} for {target} NS (attempt {attempt}, timeout {timeout:?})");
                exchange
                    .exchange(request, server, timeout)
                    .await
                    .and_then(reject_truncated)
                    .inspect_err(|e| {
                        log::debug!("NS query for {target} at {server} failed on attempt {attempt}: {e}")
                    })
            }
        })
        .await;

        result.map_err(|e| AuditError::QueryExhausted {
            target: target.to_string(),
            server: server.to_string(),
            attempts: attempt_count.load(Ordering::SeqCst),
            last_error: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ns_response, truncated, ScriptedExchange};
    use crate::dns::types::Section;
    use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
    use hickory_resolver::proto::op::ResponseCode;

    fn fast_settings(max_attempts: usize) -> QuerySettings {
        QuerySettings {
            max_attempts,
            base_timeout: Duration::from_millis(10),
            timeout_policy: TimeoutPolicy::Linear,
            retry_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_build_ns_query() {
        let message = build_ns_query("example.com.").expect("valid name");
        assert_eq!(message.message_type(), MessageType::Query);
        assert!(!message.recursion_desired());
        assert_eq!(message.queries().len(), 1);
        let query = &message.queries()[0];
        assert_eq!(query.query_type(), RecordType::NS);
        assert_eq!(query.name().to_utf8(), "example.com.");

        let edns = message.extensions().as_ref().expect("EDNS advertised");
        assert_eq!(edns.max_payload(), EDNS_UDP_PAYLOAD);
    }

    #[test]
    fn test_reply_matches() {
        let request = build_ns_query("example.com.").expect("valid name");
        let mut reply = ns_response("example.com.", Section::Answer, &["ns1.example.com."]);
        reply.set_id(request.id());
        assert!(reply_matches(&request, &reply));

        reply.set_id(request.id().wrapping_add(1));
        assert!(!reply_matches(&request, &reply));

        let mut other = ns_response("other.com.", Section::Answer, &[]);
        other.set_id(request.id());
        assert!(!reply_matches(&request, &other));
    }

    #[tokio::test]
    async fn test_query_succeeds_first_attempt() {
        let exchange = Arc::new(ScriptedExchange::new().respond(
            "a.gtld-servers.net.",
            "example.com.",
            ns_response("example.com.", Section::Authority, &["ns1.example.com."]),
        ));
        let engine = QueryEngine::new(Arc::clone(&exchange) as Arc<dyn DnsExchange>, fast_settings(3));

        let response = engine
            .query_ns("example.com.", "a.gtld-servers.net.")
            .await
            .expect("query should succeed");
        assert_eq!(response.name_servers().len(), 1);
        assert_eq!(exchange.attempts(), 1);
    }

    #[tokio::test]
    async fn test_query_retries_until_success() {
        let exchange = Arc::new(
            ScriptedExchange::new()
                .respond(
                    "ns1.example.com.",
                    "example.com.",
                    ns_response("example.com.", Section::Answer, &["ns1.example.com."]),
                )
                .fail_first(2),
        );
        let engine = QueryEngine::new(Arc::clone(&exchange) as Arc<dyn DnsExchange>, fast_settings(3));

        let response = engine
            .query_ns("example.com.", "ns1.example.com.")
            .await
            .expect("third attempt should succeed");
        assert_eq!(response.response_code(), ResponseCode::NoError);
        assert_eq!(exchange.attempts(), 3);
    }

    #[tokio::test]
    async fn test_query_exhaustion_reports_attempts_and_last_error() {
        let exchange = Arc::new(ScriptedExchange::new().fail_first(usize::MAX));
        let engine = QueryEngine::new(Arc::clone(&exchange) as Arc<dyn DnsExchange>, fast_settings(4));

        let err = engine
            .query_ns("example.com.", "ns1.example.com.")
            .await
            .expect_err("all attempts fail");
        match err {
            AuditError::QueryExhausted {
                target,
                server,
                attempts,
                last_error,
            } => {
                assert_eq!(target, "example.com.");
                assert_eq!(server, "ns1.example.com.");
                assert_eq!(attempts, 4);
                // Linear policy: the fourth attempt waited 4 x 10ms
                assert!(last_error.contains("40ms"), "{last_error}");
            }
            other => panic!("expected QueryExhausted, got {other:?}"),
        }
        assert_eq!(exchange.attempts(), 4);
    }

    #[tokio::test]
    async fn test_linear_timeouts_increase_per_attempt() {
        let exchange = Arc::new(ScriptedExchange::new().fail_first(usize::MAX));
        let engine = QueryEngine::new(Arc::clone(&exchange) as Arc<dyn DnsExchange>, fast_settings(3));

        let _ = engine.query_ns("example.com.", "ns1.example.com.").await;
        assert_eq!(
            exchange.timeouts(),
            vec![
                Duration::from_millis(10),
                Duration::from_millis(20),
                Duration::from_millis(30)
            ]
        );
    }

    #[tokio::test]
    async fn test_fixed_timeouts_stay_constant() {
        let exchange = Arc::new(ScriptedExchange::new().fail_first(usize::MAX));
        let settings = QuerySettings {
            timeout_policy: TimeoutPolicy::Fixed,
            ..fast_settings(3)
        };
        let engine = QueryEngine::new(Arc::clone(&exchange) as Arc<dyn DnsExchange>, settings);

        let _ = engine.query_ns("example.com.", "ns1.example.com.").await;
        assert_eq!(exchange.timeouts(), vec![Duration::from_millis(10); 3]);
    }

    #[tokio::test]
    async fn test_single_attempt_does_not_retry() {
        let exchange = Arc::new(ScriptedExchange::new().fail_first(1));
        let engine = QueryEngine::new(Arc::clone(&exchange) as Arc<dyn DnsExchange>, fast_settings(1));

        let err = engine
            .query_ns("example.com.", "ns1.example.com.")
            .await
            .expect_err("single failing attempt");
        assert!(matches!(err, AuditError::QueryExhausted { attempts: 1, .. }));
        assert_eq!(exchange.attempts(), 1);
    }

    #[tokio::test]
    async fn test_invalid_target_is_not_sent() {
        let exchange = Arc::new(ScriptedExchange::new());
        let engine = QueryEngine::new(Arc::clone(&exchange) as Arc<dyn DnsExchange>, fast_settings(3));

        let label = "a".repeat(64);
        let err = engine
            .query_ns(&format!("{label}.com."), "ns1.example.com.")
            .await
            .expect_err("overlong label");
        assert!(matches!(err, AuditError::InvalidDomain(_)));
        assert_eq!(exchange.attempts(), 0);
    }

    #[tokio::test]
    async fn test_truncated_reply_is_a_failed_attempt() {
        let exchange = Arc::new(ScriptedExchange::new().respond(
            "a.gtld-servers.net.",
            "example.com.",
            truncated(ns_response("example.com.", Section::Authority, &[])),
        ));
        let engine = QueryEngine::new(Arc::clone(&exchange) as Arc<dyn DnsExchange>, fast_settings(3));

        let err = engine
            .query_ns("example.com.", "a.gtld-servers.net.")
            .await
            .expect_err("truncated replies are never accepted");
        match err {
            AuditError::QueryExhausted {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("truncated"), "{last_error}");
            }
            other => panic!("expected QueryExhausted, got {other:?}"),
        }
        assert_eq!(exchange.attempts(), 3);
    }

    fn resolver_with_upstream(upstream: SocketAddr) -> Arc<TokioAsyncResolver> {
        let config = ResolverConfig::from_parts(
            None,
            vec![],
            vec![NameServerConfig::new(upstream, Protocol::Udp)],
        );
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(5);
        opts.attempts = 1;
        Arc::new(TokioAsyncResolver::tokio(config, opts))
    }

    #[tokio::test]
    async fn test_udp_exchange_round_trip() {
        let server = UdpSocket::bind("127.0.0.1:0").await.expect("bind server");
        let server_addr = server.local_addr().expect("server address");

        let responder = tokio::spawn(async move {
            let mut buf = vec![0u8; UDP_RECV_BUFFER_SIZE];
            let (len, peer) = server.recv_from(&mut buf).await.expect("query received");
            let query = Message::from_vec(&buf[..len]).expect("query decodes");
            assert!(query.extensions().is_some(), "query should carry EDNS");

            let mut reply = ns_response("example.com.", Section::Answer, &["ns1.example.com."]);
            reply.set_id(query.id());
            let bytes = reply.to_vec().expect("reply encodes");
            server.send_to(&bytes, peer).await.expect("reply sent");
        });

        let exchange = UdpExchange::new(resolver_with_upstream(server_addr), server_addr.port());
        let request = build_ns_query("example.com.").expect("valid name");
        let response = exchange
            .exchange(&request, "127.0.0.1", Duration::from_secs(2))
            .await
            .expect("reply from local server");
        assert_eq!(response.answers().len(), 1);
        responder.await.expect("responder finished");
    }

    #[tokio::test]
    async fn test_udp_exchange_timeout_covers_server_resolution() {
        // An upstream that never answers keeps the hostname lookup pending
        let silent = UdpSocket::bind("127.0.0.1:0").await.expect("bind silent upstream");
        let upstream = silent.local_addr().expect("upstream address");
        let exchange = UdpExchange::new(resolver_with_upstream(upstream), 53);
        let request = build_ns_query("example.com.").expect("valid name");

        let timeout = Duration::from_millis(200);
        let started = std::time::Instant::now();
        let err = exchange
            .exchange(&request, "ns1.example.com.", timeout)
            .await
            .expect_err("no reply can arrive");

        assert_eq!(err, ExchangeError::Timeout(timeout));
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "attempt overran its timeout: {:?}",
            started.elapsed()
        );
        drop(silent);
    }
}
