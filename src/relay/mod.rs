//! Typed relay settings derived from the configuration mapping.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::config::{keys, ConfigMap};

/// How traffic is routed through the relayer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyStatus {
    /// Proxy every connection.
    #[default]
    Enable,
    /// Proxy only destinations outside the configured location.
    Smart,
}

impl ProxyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyStatus::Enable => "enable",
            ProxyStatus::Smart => "smart",
        }
    }
}

impl fmt::Display for ProxyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown proxy status {0:?}, expected enable or smart")]
pub struct ParseProxyStatusError(pub String);

impl FromStr for ProxyStatus {
    type Err = ParseProxyStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enable" => Ok(ProxyStatus::Enable),
            "smart" => Ok(ProxyStatus::Smart),
            other => Err(ParseProxyStatusError(other.to_string())),
        }
    }
}

/// Which ingress protocols the relayer accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngressProtocols {
    pub socks5: bool,
    pub http: bool,
    pub et: bool,
}

impl IngressProtocols {
    /// Read the `socks`, `http` and `et` switches.
    pub fn from_config(config: &ConfigMap) -> Self {
        Self {
            socks5: config.is_on(keys::SOCKS),
            http: config.is_on(keys::HTTP),
            et: config.is_on(keys::ET),
        }
    }

    pub fn any(&self) -> bool {
        self.socks5 || self.http || self.et
    }
}
