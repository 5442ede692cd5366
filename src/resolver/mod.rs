//! DNS query resolution logic.
//!
//! Handles the per-request pipeline:
//! 1. Parse the client query
//! 2. Filter (sinkhole blocklisted names)
//! 3. Resolve iteratively from the root and finalize the upstream response
//!
//! The server handles the I/O, the resolver handles decisions.

mod iterative;
mod lookup;

pub use iterative::{
    IterativeResolver, ROOT_SERVERS, Resolution, ResolutionError, ResolutionState, ResolverConfig,
};
pub use lookup::{HostLookup, SystemLookup};

use thiserror::Error;

use crate::dns::{DecodeError, DnsMessage, finalize_upstream_response};
use crate::filter::{Blocklist, filter_query};
use crate::transport::Exchange;

/// Action to take for a DNS query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryAction {
    /// Query is blocked, return this response immediately.
    Blocked { response: Vec<u8>, domain: String },
    /// Query should be resolved upstream.
    Resolve { domain: String },
}

/// What goes back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Blocked { response: Vec<u8>, domain: String },
    Resolved {
        response: Vec<u8>,
        domain: String,
        hops: u32,
    },
}

impl Reply {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Reply::Blocked { response, .. } | Reply::Resolved { response, .. } => response,
        }
    }

    pub fn domain(&self) -> &str {
        match self {
            Reply::Blocked { domain, .. } | Reply::Resolved { domain, .. } => domain,
        }
    }
}

/// Why a request was dropped without a reply.
#[derive(Error, Debug)]
pub enum HandleError {
    #[error("malformed query: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Resolver handles DNS query processing decisions.
///
/// Holds the blocklist and the iterative engine; it keeps no state between
/// requests.
#[derive(Debug)]
pub struct Resolver<L = SystemLookup> {
    blocklist: Blocklist,
    engine: IterativeResolver<L>,
}

impl Resolver<SystemLookup> {
    /// Create a resolver using the system resolver for server names.
    pub fn new(blocklist: Blocklist, config: ResolverConfig) -> Self {
        Self::with_engine(blocklist, IterativeResolver::new(config))
    }
}

impl<L: HostLookup> Resolver<L> {
    pub fn with_engine(blocklist: Blocklist, engine: IterativeResolver<L>) -> Self {
        Self { blocklist, engine }
    }

    /// Process a DNS query and decide what action to take.
    ///
    /// Client datagrams must be queries with a decoded question; anything
    /// else is rejected so it can neither slip past the blocklist nor be
    /// forwarded upstream.
    pub fn process_query(&self, query: &[u8]) -> Result<QueryAction, DecodeError> {
        let message = DnsMessage::parse(query.to_vec())?;
        if message.response_flag() {
            return Err(DecodeError::NotAQuery);
        }
        let Some(domain) = message.question_name() else {
            return Err(DecodeError::MissingQuestion(message.response_code()));
        };
        let domain = domain.to_string();

        if let Some(response) = filter_query(&self.blocklist, &message) {
            return Ok(QueryAction::Blocked { response, domain });
        }

        Ok(QueryAction::Resolve { domain })
    }

    /// Produce the reply for one client query.
    ///
    /// Blocked queries are answered without touching `exchange`.
    pub async fn handle<E: Exchange>(
        &self,
        query: &[u8],
        exchange: &mut E,
    ) -> Result<Reply, HandleError> {
        match self.process_query(query)? {
            QueryAction::Blocked { response, domain } => Ok(Reply::Blocked { response, domain }),
            QueryAction::Resolve { domain } => {
                let resolution = self.engine.resolve(exchange, query).await?;

                Ok(Reply::Resolved {
                    response: finalize_upstream_response(&resolution.response),
                    domain,
                    hops: resolution.hops,
                })
            }
        }
    }

    /// Returns the number of domains in the blocklist.
    pub fn blocked_count(&self) -> usize {
        self.blocklist.len()
    }
}
