//! Shared fakes for unit tests: a canned system resolver and a scripted
//! transport, plus builders for DNS replies.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_resolver::proto::rr::rdata::{A, NS};
use hickory_resolver::proto::rr::{Name, RData, Record, RecordType};

use crate::dns::{DnsExchange, NsLookup, Section};
use crate::error_handling::{AuditError, ExchangeError};

/// [`NsLookup`] answering from a fixed table and counting calls per name.
#[derive(Default)]
pub struct StaticLookup {
    records: HashMap<String, Vec<String>>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ns(mut self, name: &str, hosts: &[&str]) -> Self {
        self.records.insert(
            name.to_string(),
            hosts.iter().map(|h| h.to_string()).collect(),
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl NsLookup for StaticLookup {
    async fn lookup_ns(&self, name: &str) -> Result<Vec<String>, AuditError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.records
            .get(name)
            .cloned()
            .ok_or_else(|| AuditError::Lookup {
                name: name.to_string(),
                message: "no record found (NXDomain)".to_string(),
            })
    }
}

/// [`DnsExchange`] returning canned replies keyed by `(server, target)`.
///
/// The first `fail_first` attempts time out regardless of server, and servers
/// registered with `fail_server` always time out.
#[derive(Default)]
pub struct ScriptedExchange {
    responses: HashMap<(String, String), Message>,
    failing_servers: HashSet<String>,
    fail_first: usize,
    timeouts: Mutex<Vec<Duration>>,
    queried: Mutex<Vec<(String, String)>>,
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, server: &str, target: &str, response: Message) -> Self {
        self.responses
            .insert((server.to_string(), target.to_string()), response);
        self
    }

    pub fn fail_first(mut self, attempts: usize) -> Self {
        self.fail_first = attempts;
        self
    }

    pub fn fail_server(mut self, server: &str) -> Self {
        self.failing_servers.insert(server.to_string());
        self
    }

    pub fn attempts(&self) -> usize {
        self.timeouts.lock().unwrap().len()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().unwrap().clone()
    }

    /// `(server, target)` pairs in the order they were queried.
    pub fn queried(&self) -> Vec<(String, String)> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsExchange for ScriptedExchange {
    async fn exchange(
        &self,
        request: &Message,
        server: &str,
        timeout: Duration,
    ) -> Result<Message, ExchangeError> {
        let target = request
            .queries()
            .first()
            .map(|q| q.name().to_utf8())
            .unwrap_or_default();
        let attempt = {
            let mut timeouts = self.timeouts.lock().unwrap();
            timeouts.push(timeout);
            timeouts.len()
        };
        self.queried
            .lock()
            .unwrap()
            .push((server.to_string(), target.clone()));

        if attempt <= self.fail_first || self.failing_servers.contains(server) {
            return Err(ExchangeError::Timeout(timeout));
        }
        let mut response = self
            .responses
            .get(&(server.to_string(), target.clone()))
            .cloned()
            .ok_or_else(|| ExchangeError::Io(format!("no script for {target} at {server}")))?;
        response.set_id(request.id());
        Ok(response)
    }
}

fn name(value: &str) -> Name {
    Name::from_str(value).unwrap()
}

fn response_for(target: &str) -> Message {
    let mut message = Message::new();
    message.set_message_type(MessageType::Response);
    message.set_op_code(OpCode::Query);
    message.add_query(Query::query(name(target), RecordType::NS));
    message
}

/// A NoError reply carrying NS records for `target` in `section`.
pub fn ns_response(target: &str, section: Section, hosts: &[&str]) -> Message {
    let mut message = response_for(target);
    for host in hosts {
        let record = Record::from_rdata(name(target), 3600, RData::NS(NS(name(host))));
        match section {
            Section::Authority => message.add_name_server(record),
            Section::Answer => message.add_answer(record),
        };
    }
    message
}

/// Adds an A record for `host` to `section` (glue-like noise).
pub fn with_a_record(mut message: Message, section: Section, host: &str) -> Message {
    let record = Record::from_rdata(name(host), 3600, RData::A(A::new(192, 0, 2, 1)));
    match section {
        Section::Authority => message.add_name_server(record),
        Section::Answer => message.add_answer(record),
    };
    message
}

/// Marks a reply as truncated (TC bit set).
pub fn truncated(mut message: Message) -> Message {
    message.set_truncated(true);
    message
}

/// An empty reply with the given response code.
pub fn error_response(target: &str, code: ResponseCode) -> Message {
    let mut message = response_for(target);
    message.set_response_code(code);
    message
}
