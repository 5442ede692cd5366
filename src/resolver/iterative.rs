//! Iterative resolution from the root down.
//!
//! Starting at a randomly chosen root server, the query is sent unmodified
//! to each server in the delegation chain until one of them answers, returns
//! an error, has nothing left to delegate to, or the hop budget runs out.
//! No delegation state survives the call.

use rand::seq::IndexedRandom;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

use super::lookup::{HostLookup, SystemLookup};
use crate::dns::{DecodeError, DnsMessage, RCODE_NOERROR};
use crate::transport::{DNS_PORT, Exchange};

/// The 13 root server identities.
pub const ROOT_SERVERS: [&str; 13] = [
    "a.root-servers.net",
    "b.root-servers.net",
    "c.root-servers.net",
    "d.root-servers.net",
    "e.root-servers.net",
    "f.root-servers.net",
    "g.root-servers.net",
    "h.root-servers.net",
    "i.root-servers.net",
    "j.root-servers.net",
    "k.root-servers.net",
    "l.root-servers.net",
    "m.root-servers.net",
];

/// Tunables for the delegation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Candidates for the first hop, host names or literal addresses.
    pub root_servers: Vec<String>,
    /// Destination port on every upstream server.
    pub upstream_port: u16,
    /// How long to wait for each reply.
    pub timeout: Duration,
    /// Sends per hop before the server is given up on.
    pub max_attempts: u32,
    /// Servers queried per request, the root included.
    pub max_iterations: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            root_servers: ROOT_SERVERS.iter().map(|s| s.to_string()).collect(),
            upstream_port: DNS_PORT,
            timeout: Duration::from_millis(1500),
            max_attempts: 3,
            max_iterations: 16,
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("no root servers configured")]
    NoRootServers,

    #[error("{server} did not respond after {attempts} attempts")]
    Unreachable { server: SocketAddr, attempts: u32 },

    #[error("lookup of {host} failed: {source}")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("no address found for {0}")]
    NoAddress(String),

    #[error("referral from {0} names no server")]
    MissingDelegation(SocketAddr),

    #[error("malformed upstream response: {0}")]
    Decode(#[from] DecodeError),

    #[error("upstream I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Final upstream response of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Raw response bytes as received from the last server.
    pub response: Vec<u8>,
    /// Number of servers queried.
    pub hops: u32,
    /// Server that produced `response`.
    pub server: SocketAddr,
}

/// Progress through the delegation chain for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionState {
    pub server: SocketAddr,
    pub hop: u32,
    pub attempt: u32,
}

impl ResolutionState {
    fn start(server: SocketAddr) -> Self {
        Self {
            server,
            hop: 1,
            attempt: 0,
        }
    }

    fn delegate(&mut self, server: SocketAddr) {
        self.server = server;
        self.hop += 1;
        self.attempt = 0;
    }
}

enum Step {
    Done,
    Delegate(String),
}

/// The delegation-following resolver.
#[derive(Debug)]
pub struct IterativeResolver<L = SystemLookup> {
    config: ResolverConfig,
    lookup: L,
}

impl IterativeResolver<SystemLookup> {
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_lookup(config, SystemLookup)
    }
}

impl<L: HostLookup> IterativeResolver<L> {
    pub fn with_lookup(config: ResolverConfig, lookup: L) -> Self {
        Self { config, lookup }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `query` through `exchange`, returning the last response.
    ///
    /// The response bytes are returned exactly as received; flag rewriting
    /// is left to the caller.
    pub async fn resolve<E: Exchange>(
        &self,
        exchange: &mut E,
        query: &[u8],
    ) -> Result<Resolution, ResolutionError> {
        let root = self
            .config
            .root_servers
            .choose(&mut rand::rng())
            .ok_or(ResolutionError::NoRootServers)?;
        let mut state = ResolutionState::start(self.server_addr(root).await?);
        debug!(%root, server = %state.server, "starting resolution");

        loop {
            let response = self.query_hop(exchange, query, &mut state).await?;
            let message = DnsMessage::parse(response)?;

            match self.evaluate(&message, &state)? {
                Step::Done => {
                    debug!(
                        hops = state.hop,
                        server = %state.server,
                        rcode = message.response_code(),
                        answers = message.answer_count(),
                        "resolution finished"
                    );
                    return Ok(Resolution {
                        response: message.into_bytes(),
                        hops: state.hop,
                        server: state.server,
                    });
                }
                Step::Delegate(host) => {
                    let next = self.server_addr(&host).await?;
                    trace!(hop = state.hop, %host, server = %next, "following delegation");
                    state.delegate(next);
                }
            }
        }
    }

    /// Send the query to the current server, resending on silence.
    async fn query_hop<E: Exchange>(
        &self,
        exchange: &mut E,
        query: &[u8],
        state: &mut ResolutionState,
    ) -> Result<Vec<u8>, ResolutionError> {
        while state.attempt < self.config.max_attempts {
            state.attempt += 1;
            exchange.send(state.server, query).await?;

            match exchange.recv(self.config.timeout).await {
                Ok(Some(response)) => return Ok(response),
                Ok(None) => {
                    debug!(server = %state.server, attempt = state.attempt, "upstream timed out");
                }
                Err(e) => {
                    debug!(server = %state.server, attempt = state.attempt, error = %e, "upstream receive failed");
                }
            }
        }

        Err(ResolutionError::Unreachable {
            server: state.server,
            attempts: state.attempt,
        })
    }

    fn evaluate(
        &self,
        message: &DnsMessage,
        state: &ResolutionState,
    ) -> Result<Step, ResolutionError> {
        if message.answer_count() > 0
            || message.response_code() != RCODE_NOERROR
            || message.authority_count() == 0
            || state.hop >= self.config.max_iterations
        {
            return Ok(Step::Done);
        }

        match message.delegation() {
            Some(host) => Ok(Step::Delegate(host.to_string())),
            None => Err(ResolutionError::MissingDelegation(state.server)),
        }
    }

    /// Address of a server given by name; literal addresses skip the lookup.
    async fn server_addr(&self, host: &str) -> Result<SocketAddr, ResolutionError> {
        let port = self.config.upstream_port;
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, port));
        }

        let addrs = self
            .lookup
            .lookup(host)
            .await
            .map_err(|source| ResolutionError::Lookup {
                host: host.to_string(),
                source,
            })?;

        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .map(|ip| SocketAddr::new(*ip, port))
            .ok_or_else(|| ResolutionError::NoAddress(host.to_string()))
    }
}
