//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     + runtime entries (CLI flags, --set)
//!     + config file
//!         → lines.rs (comments, blank lines, whitespace)
//!         → loader.rs (key = value, staged merge)
//!     → ConfigMap
//!     → lifecycle::startup derives typed settings
//! ```
//!
//! # Design Decisions
//! - Later sources overwrite earlier ones; nothing is ever removed
//! - Derived defaults (e.g. `config-dir`) never override explicit values
//! - A malformed file is rejected whole, never half-applied

pub mod error;
pub mod lines;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, StepContext};
pub use lines::{clean_bytes, clean_line, read_lines, Lines};
pub use loader::{load_config, merge_lines, parse_key_value};
pub use schema::{keys, ConfigMap, DEFAULTS};
