//! Upstream transport for the resolver.
//!
//! The resolution engine talks to name servers through [`Exchange`]: send a
//! datagram to a server, then wait a bounded time for one back. The UDP
//! implementation owns a socket for the lifetime of a single client request.

pub mod udp;

#[cfg(test)]
pub(crate) mod mock;

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

/// Maximum size of a DNS packet (with some headroom).
pub const MAX_DNS_PACKET_SIZE: usize = 4096;

/// Well-known DNS server port.
pub const DNS_PORT: u16 = 53;

/// One request/response channel to upstream name servers.
pub trait Exchange {
    /// Send `packet` to `server`.
    fn send(&mut self, server: SocketAddr, packet: &[u8]) -> impl Future<Output = io::Result<()>>;

    /// Wait for the reply from the server last sent to.
    ///
    /// Returns `Ok(None)` if nothing arrives within `timeout`.
    fn recv(&mut self, timeout: Duration) -> impl Future<Output = io::Result<Option<Vec<u8>>>>;
}
