//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     defaults + runtime entries
//!     → config file → config-dir
//!     → users → local user → protocol flags → endpoints → proxy status
//!     → (config-dir only) domain list → hosts → timeout → debug → mods
//!     → Bootstrap
//! ```
//!
//! # Design Decisions
//! - Ordered startup: each step may depend on settings written by the last
//! - Fail fast with a breadcrumb of step names
//! - The result is a plain value owned by the caller, not global state

pub mod startup;

pub use startup::{bootstrap, Bootstrap, BootstrapSummary, Bootstrapper, ConfigFilePolicy};
