//! DNS override data handed to the resolver.
//!
//! # Data Flow
//! ```text
//! <config-dir>/hosts/*.hosts      → hosts.rs → HostsCache (domain → address)
//! <config-dir>/whitelist_domain.txt → load_domain_list → Vec<String>
//! ```
//!
//! # Design Decisions
//! - Hosts files are merged in file-name order, last write wins
//! - A malformed hosts file aborts bootstrap; the allowlist is optional and
//!   an unreadable one is treated as empty

pub mod hosts;

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::config::read_lines;

pub use hosts::{hosts_files, load_hosts_dir, parse_hosts_line, HOSTS_SUFFIX};

/// Static domain → address overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HostsCache {
    entries: HashMap<String, String>,
}

impl HostsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address override for `domain`, if any.
    pub fn lookup(&self, domain: &str) -> Option<&str> {
        self.entries.get(domain).map(String::as_str)
    }

    pub fn insert(&mut self, domain: impl Into<String>, address: impl Into<String>) {
        self.entries.insert(domain.into(), address.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<(String, String)> for HostsCache {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

/// Read the domain allowlist, one pattern per line.
///
/// Any read error yields an empty list.
pub fn load_domain_list(path: &Path) -> Vec<String> {
    match read_lines(path) {
        Ok(domains) => domains,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Domain list unavailable, using none");
            Vec::new()
        }
    }
}
