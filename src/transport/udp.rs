//! UDP exchange with upstream name servers.
//!
//! The socket is bound lazily on the first send and connected to whichever
//! server is being queried. Datagrams queued before a reconnect, or whose ID
//! does not match the last query sent, are discarded while waiting.
//! Dropping the exchange closes the socket.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::trace;

use super::{Exchange, MAX_DNS_PACKET_SIZE};

/// Per-request upstream socket.
#[derive(Debug, Default)]
pub struct UdpExchange {
    socket: Option<UdpSocket>,
    peer: Option<SocketAddr>,
    query_id: Option<[u8; 2]>,
}

impl UdpExchange {
    /// Create an exchange; no socket is opened until the first send.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Exchange for UdpExchange {
    async fn send(&mut self, server: SocketAddr, packet: &[u8]) -> io::Result<()> {
        let socket = match self.socket.take() {
            Some(socket) if socket.local_addr()?.is_ipv4() == server.is_ipv4() => socket,
            _ => {
                self.peer = None;
                let socket = UdpSocket::bind(unspecified_for(server)).await?;
                trace!(local = %socket.local_addr()?, "bound upstream socket");
                socket
            }
        };
        let socket = self.socket.insert(socket);

        if self.peer != Some(server) {
            socket.connect(server).await?;
            self.peer = Some(server);
        }

        socket.send(packet).await?;
        self.query_id = packet.get(..2).map(|id| [id[0], id[1]]);

        Ok(())
    }

    async fn recv(&mut self, timeout: Duration) -> io::Result<Option<Vec<u8>>> {
        let Some(socket) = self.socket.as_ref() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "receive before any send",
            ));
        };

        let deadline = Instant::now() + timeout;
        let mut buf = vec![0u8; MAX_DNS_PACKET_SIZE];
        loop {
            let (len, from) =
                match tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await {
                    Ok(result) => result?,
                    Err(_) => return Ok(None),
                };

            if self.peer != Some(from) {
                trace!(%from, "discarding datagram from previous peer");
                continue;
            }
            if self.query_id.is_some_and(|id| len < 2 || buf[..2] != id) {
                trace!(%from, "discarding response with mismatched id");
                continue;
            }

            buf.truncate(len);
            return Ok(Some(buf));
        }
    }
}

fn unspecified_for(server: SocketAddr) -> SocketAddr {
    if server.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    }
}
