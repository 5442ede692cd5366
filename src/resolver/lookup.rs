//! Host name lookup for root and delegated name servers.

use std::future::Future;
use std::io;
use std::net::IpAddr;

/// Turns a server host name into addresses.
pub trait HostLookup {
    fn lookup(&self, host: &str) -> impl Future<Output = io::Result<Vec<IpAddr>>>;
}

/// Lookup through the operating system's resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLookup;

impl HostLookup for SystemLookup {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;

        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}
