//! Sinkhole - an iterative DNS resolver with a domain blocklist.
//!
//! This library exposes the codec, resolver and server for the binary and
//! for testing.

pub mod dns;
pub mod filter;
pub mod logging;
pub mod resolver;
pub mod server;
pub mod transport;
