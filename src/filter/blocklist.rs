//! Blocklist of sinkholed domains.
//!
//! Loaded once at startup from a line-oriented file and consulted for every
//! incoming query by exact name match.

use rustc_hash::FxHashSet;
use std::fs;
use std::io;
use std::path::Path;

/// A set of blocked domains for efficient lookup.
#[derive(Debug, Default)]
pub struct Blocklist {
    domains: FxHashSet<String>,
}

impl Blocklist {
    /// An empty blocklist; nothing is blocked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a blocklist file, one domain per line.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;

        Ok(Self::from_lines(&contents))
    }

    /// Build a blocklist from newline separated entries.
    ///
    /// Blank lines and `#` comments are skipped, and a trailing root dot is
    /// dropped so `example.com.` and `example.com` are the same entry.
    pub fn from_lines(contents: &str) -> Self {
        let domains = contents
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                Some(line.strip_suffix('.').unwrap_or(line).to_string())
            })
            .collect();

        Self { domains }
    }

    /// Check if a domain is on the list. Matching is exact.
    pub fn is_blocked(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// Returns the number of domains in the blocklist.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
