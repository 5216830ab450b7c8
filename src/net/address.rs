//! Endpoint string canonicalization.
//!
//! Listen and relayer endpoints may be written with or without a port. This
//! module fills in [`DEFAULT_PORT`] where none is given so the relay layer
//! always receives a `host:port` string. It is purely syntactic: hostnames
//! are neither resolved nor validated.

use std::net::IpAddr;

use crate::config::ConfigMap;

/// Port assumed for endpoints written without one.
pub const DEFAULT_PORT: u16 = 8080;

/// Append [`DEFAULT_PORT`] to `endpoint` if it has no port.
///
/// - `[v6]` gets the port appended
/// - a bare IPv4 address gets the port appended
/// - a bare IPv6 address is bracketed first, so the result stays parseable
/// - anything else (`ip:port`, `[v6]:port`, `host:port`, hostnames) is
///   returned unchanged
///
/// The function is idempotent.
pub fn canonicalize(endpoint: &str) -> String {
    if endpoint.starts_with('[') {
        if endpoint.ends_with(']') {
            return format!("{}:{}", endpoint, DEFAULT_PORT);
        }
        return endpoint.to_string();
    }
    match endpoint.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => format!("{}:{}", endpoint, DEFAULT_PORT),
        Ok(IpAddr::V6(_)) => format!("[{}]:{}", endpoint, DEFAULT_PORT),
        Err(_) => endpoint.to_string(),
    }
}

/// Canonicalize the endpoint stored under `key`, writing the result back.
///
/// Returns the canonical value, or `None` when `key` is not set.
pub fn canonicalize_entry<'a>(config: &'a mut ConfigMap, key: &str) -> Option<&'a str> {
    let canonical = canonicalize(config.get(key)?);
    config.set(key, canonical);
    config.get(key)
}
