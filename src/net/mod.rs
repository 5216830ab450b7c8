//! Network address handling.
//!
//! No I/O happens here; endpoints are only inspected and normalized.

pub mod address;

pub use address::{canonicalize, DEFAULT_PORT};
