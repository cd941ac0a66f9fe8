//! NS record extraction from targeted query replies.

use hickory_resolver::proto::op::{Message, ResponseCode};
use hickory_resolver::proto::rr::{RData, Record};

use super::types::{NameServerSet, Section};
use crate::error_handling::AuditError;

/// Collects the NS targets found in one section of `response`.
///
/// Records of other types (glue A/AAAA, SOA in a negative answer) are ignored.
/// The queried name, used in the error, is taken from the reply's question.
///
/// # Errors
///
/// Returns [`AuditError::BadResponse`] if the response code is not `NoError`.
pub fn extract_ns_set(response: &Message, section: Section) -> Result<NameServerSet, AuditError> {
    let code = response.response_code();
    if code != ResponseCode::NoError {
        let domain = response
            .queries()
            .first()
            .map(|q| q.name().to_utf8())
            .unwrap_or_default();
        return Err(AuditError::BadResponse {
            domain,
            code: code.to_string(),
        });
    }

    let records: &[Record] = match section {
        Section::Authority => response.name_servers(),
        Section::Answer => response.answers(),
    };

    Ok(records
        .iter()
        .filter_map(|record| match record.data() {
            Some(RData::NS(ns)) => Some(ns.to_utf8()),
            _ => None,
        })
        .collect())
}
