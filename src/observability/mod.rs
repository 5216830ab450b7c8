//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems emit tracing events with structured fields
//!     → logging.rs (env filter + fmt layer on stderr)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` wins over everything else
//! - `debug = on` in the config raises the crate's level after bootstrap

pub mod logging;
