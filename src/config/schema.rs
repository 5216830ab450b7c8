//! The configuration mapping and its built-in defaults.
//!
//! Settings are flat `key -> value` strings. Typed values (flags, proxy
//! status, timeout) are derived from this mapping at bootstrap; the mapping
//! itself stays the source of truth for anything the relay components look up
//! by name.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

/// Names of the recognized settings.
pub mod keys {
    pub const TIMEOUT: &str = "timeout";
    pub const LOCATION: &str = "location";
    pub const IP_TYPE: &str = "ip-type";
    pub const DATA_KEY: &str = "data-key";
    pub const HEAD: &str = "head";
    pub const PROXY_STATUS: &str = "proxy-status";
    pub const USER: &str = "user";
    pub const USER_CHECK: &str = "user-check";
    pub const LISTEN: &str = "listen";
    pub const RELAYER: &str = "relayer";
    pub const HTTP: &str = "http";
    pub const SOCKS: &str = "socks";
    pub const ET: &str = "et";
    pub const DEBUG: &str = "debug";
    pub const CIPHER: &str = "cipher";

    // Supplied at runtime rather than by default.
    pub const CONFIG: &str = "config";
    pub const CONFIG_DIR: &str = "config-dir";
    pub const MOD_DIR: &str = "mod-dir";
}

/// Built-in defaults, present in every fresh [`ConfigMap`].
pub const DEFAULTS: &[(&str, &str)] = &[
    (keys::TIMEOUT, "0"),
    (keys::LOCATION, "1;CN;CHN;China"),
    (keys::IP_TYPE, "46"),
    (keys::DATA_KEY, "34"),
    (keys::HEAD, "eagle_tunnel"),
    (keys::PROXY_STATUS, "enable"),
    (keys::USER, "null:null"),
    (keys::USER_CHECK, "off"),
    (keys::LISTEN, "0.0.0.0"),
    (keys::RELAYER, "127.0.0.1"),
    (keys::HTTP, "off"),
    (keys::SOCKS, "off"),
    (keys::ET, "off"),
    (keys::DEBUG, "off"),
    (keys::CIPHER, "simple"),
];

/// Value that turns a switch setting on. Anything else is off.
pub const ON: &str = "on";

/// Flat mapping from setting name to setting value.
///
/// Entries are overwritten but never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigMap {
    entries: BTreeMap<String, String>,
}

impl ConfigMap {
    /// An empty mapping, without defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapping pre-populated with [`DEFAULTS`].
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        for (key, value) in DEFAULTS {
            map.set(*key, *value);
        }
        map
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Insert `key` only if it is absent. Returns whether it was inserted.
    pub fn insert_default(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    /// True when `key` is set to exactly `"on"`.
    pub fn is_on(&self, key: &str) -> bool {
        self.get(key) == Some(ON)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Diagnostic dump: one `key: value` line per entry.
    pub fn dump(&self) -> String {
        let mut text = String::new();
        for (key, value) in self.iter() {
            let _ = writeln!(text, "{}: {}", key, value);
        }
        text
    }

    /// Render the given keys, in order, as `key = value` lines with CRLF
    /// endings. Missing keys render with an empty value.
    pub fn export(&self, keys: &[&str]) -> String {
        let mut text = String::new();
        for key in keys {
            let _ = write!(text, "{} = {}\r\n", key, self.get(key).unwrap_or_default());
        }
        text
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ConfigMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
