//! Sinkhole server orchestration.
//!
//! Binds the client-facing UDP socket and serves one query at a time: each
//! datagram is handled to completion (including the whole delegation chain)
//! before the next one is read.

use std::io;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::UdpSocket;
use tracing::{info, warn};

use crate::resolver::{HostLookup, Reply, Resolver, SystemLookup};
use crate::transport::MAX_DNS_PACKET_SIZE;
use crate::transport::udp::UdpExchange;

/// Default port clients send queries to.
pub const DEFAULT_PORT: u16 = 5300;

/// The client-facing sinkhole server.
pub struct Server<L = SystemLookup> {
    socket: UdpSocket,
    resolver: Resolver<L>,
}

impl<L: HostLookup> Server<L> {
    /// Bind the listening socket.
    pub async fn bind(addr: SocketAddr, resolver: Resolver<L>) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;

        Ok(Self { socket, resolver })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serve queries forever.
    pub async fn run(self) {
        info!(
            addr = ?self.socket.local_addr().ok(),
            blocked = self.resolver.blocked_count(),
            "sinkhole listening"
        );

        let mut buf = [0u8; MAX_DNS_PACKET_SIZE];
        loop {
            let (len, client) = match self.socket.recv_from(&mut buf).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "UDP recv error");
                    continue;
                }
            };

            self.serve(&buf[..len], client).await;
        }
    }

    /// Handle one datagram; failures drop the request without a reply.
    async fn serve(&self, query: &[u8], client: SocketAddr) {
        let start = Instant::now();
        let mut exchange = UdpExchange::new();

        let reply = match self.resolver.handle(query, &mut exchange).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(%client, error = %e, "request dropped");
                return;
            }
        };

        if let Err(e) = self.socket.send_to(reply.bytes(), client).await {
            warn!(%client, error = %e, "UDP response error");
            return;
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        match &reply {
            Reply::Blocked { domain, .. } => {
                info!(%client, %domain, elapsed_ms, "BLOCKED");
            }
            Reply::Resolved { domain, hops, .. } => {
                info!(%client, %domain, hops, elapsed_ms, "RESOLVED");
            }
        }
    }
}
