//! DNS query filtering module.
//!
//! Sinkholes queries whose question name is on the blocklist by answering
//! them locally with a refusal instead of resolving them.

mod blocklist;

pub use blocklist::Blocklist;

use crate::dns::{DnsMessage, build_blocked_response};

/// Check if a DNS query should be blocked and return an appropriate response.
///
/// Returns `Some(response)` if the query should be blocked, `None` if it should
/// be resolved upstream. Queries without a decoded question are never blocked.
pub fn filter_query(blocklist: &Blocklist, query: &DnsMessage) -> Option<Vec<u8>> {
    let domain = query.question_name()?;

    if blocklist.is_blocked(domain) {
        Some(build_blocked_response(query.as_bytes()))
    } else {
        None
    }
}
