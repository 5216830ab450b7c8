//! Relay bootstrap library: turns plain-text config artifacts into typed
//! settings for the relay components.

pub mod config;
pub mod dns;
pub mod extensions;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;
pub mod users;

pub use config::{ConfigError, ConfigMap};
pub use lifecycle::{bootstrap, Bootstrap, Bootstrapper, ConfigFilePolicy};
