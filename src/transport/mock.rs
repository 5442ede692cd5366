//! Scripted in-memory exchange for driving the resolver in tests.

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use super::Exchange;

/// What the scripted server does in response to one send.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Reply(Vec<u8>),
    Drop,
    Fail(io::ErrorKind),
}

/// An exchange that records every send and replays scripted outcomes.
///
/// Each `recv` consumes one scripted outcome; once the script is exhausted
/// every receive times out.
#[derive(Debug, Default)]
pub(crate) struct MockExchange {
    script: VecDeque<Scripted>,
    pub(crate) sent: Vec<(SocketAddr, Vec<u8>)>,
}

impl MockExchange {
    pub(crate) fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Servers the exchange was asked to send to, in order.
    pub(crate) fn servers(&self) -> Vec<SocketAddr> {
        self.sent.iter().map(|(server, _)| *server).collect()
    }
}

impl Exchange for MockExchange {
    async fn send(&mut self, server: SocketAddr, packet: &[u8]) -> io::Result<()> {
        self.sent.push((server, packet.to_vec()));
        Ok(())
    }

    async fn recv(&mut self, _timeout: Duration) -> io::Result<Option<Vec<u8>>> {
        match self.script.pop_front() {
            Some(Scripted::Reply(bytes)) => Ok(Some(bytes)),
            Some(Scripted::Fail(kind)) => Err(io::Error::from(kind)),
            Some(Scripted::Drop) | None => Ok(None),
        }
    }
}
