#![allow(dead_code)]

// Shared fakes for integration tests.
//
// A fixed-table system resolver and an in-memory DNS "network" that answers
// targeted NS queries per (server, name), so full audits run without sockets.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_resolver::proto::rr::rdata::NS;
use hickory_resolver::proto::rr::{Name, RData, Record, RecordType};

use ns_audit::audit::DomainAuditor;
use ns_audit::dns::{
    DnsExchange, NsLookup, ParentCache, ParentLocator, QueryEngine, QuerySettings, Section,
};
use ns_audit::error_handling::{AuditError, ExchangeError};
use ns_audit::TimeoutPolicy;

/// System resolver answering from a table.
#[derive(Default)]
pub struct TableLookup {
    records: HashMap<String, Vec<String>>,
    pub calls: AtomicUsize,
}

impl TableLookup {
    pub fn with_ns(mut self, name: &str, hosts: &[&str]) -> Self {
        self.records
            .insert(name.to_string(), hosts.iter().map(|h| h.to_string()).collect());
        self
    }
}

#[async_trait]
impl NsLookup for TableLookup {
    async fn lookup_ns(&self, name: &str) -> Result<Vec<String>, AuditError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records.get(name).cloned().ok_or_else(|| AuditError::Lookup {
            name: name.to_string(),
            message: "NXDomain".to_string(),
        })
    }
}

/// Targeted-query network: canned replies per (server, name).
#[derive(Default)]
pub struct FakeNetwork {
    replies: HashMap<(String, String), Message>,
    pub attempts: AtomicUsize,
}

impl FakeNetwork {
    pub fn delegation(mut self, server: &str, domain: &str, hosts: &[&str]) -> Self {
        self.replies.insert(
            (server.to_string(), domain.to_string()),
            ns_reply(domain, Section::Authority, hosts),
        );
        self
    }

    pub fn zone(mut self, server: &str, domain: &str, hosts: &[&str]) -> Self {
        self.replies.insert(
            (server.to_string(), domain.to_string()),
            ns_reply(domain, Section::Answer, hosts),
        );
        self
    }

    pub fn refuse(mut self, server: &str, domain: &str) -> Self {
        let mut reply = ns_reply(domain, Section::Answer, &[]);
        reply.set_response_code(ResponseCode::Refused);
        self.replies
            .insert((server.to_string(), domain.to_string()), reply);
        self
    }
}

#[async_trait]
impl DnsExchange for FakeNetwork {
    async fn exchange(
        &self,
        request: &Message,
        server: &str,
        timeout: Duration,
    ) -> Result<Message, ExchangeError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let name = request
            .queries()
            .first()
            .map(|q| q.name().to_utf8())
            .unwrap_or_default();
        let mut reply = self
            .replies
            .get(&(server.to_string(), name))
            .cloned()
            .ok_or(ExchangeError::Timeout(timeout))?;
        reply.set_id(request.id());
        Ok(reply)
    }
}

pub fn ns_reply(domain: &str, section: Section, hosts: &[&str]) -> Message {
    let owner = Name::from_str(domain).expect("valid owner");
    let mut message = Message::new();
    message.set_message_type(MessageType::Response);
    message.add_query(Query::query(owner.clone(), RecordType::NS));
    for host in hosts {
        let target = Name::from_str(host).expect("valid host");
        let record = Record::from_rdata(owner.clone(), 3600, RData::NS(NS(target)));
        match section {
            Section::Authority => message.add_name_server(record),
            Section::Answer => message.add_answer(record),
        };
    }
    message
}

pub fn fast_settings() -> QuerySettings {
    QuerySettings {
        max_attempts: 2,
        base_timeout: Duration::from_millis(5),
        timeout_policy: TimeoutPolicy::Linear,
        retry_delay: Duration::ZERO,
    }
}

pub fn build_auditor(lookup: Arc<TableLookup>, network: Arc<FakeNetwork>) -> Arc<DomainAuditor> {
    let locator = ParentLocator::new(lookup as Arc<dyn NsLookup>, Arc::new(ParentCache::new()));
    let engine = QueryEngine::new(network as Arc<dyn DnsExchange>, fast_settings());
    Arc::new(DomainAuditor::new(locator, Arc::new(engine)))
}
