//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Raise the log level once the config asks for debug output

use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "relay_bootstrap=info";

/// Filter applied by [`LogHandle::enable_debug`].
pub const DEBUG_FILTER: &str = "relay_bootstrap=debug";

/// Handle for adjusting the log filter after startup.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogHandle {
    /// Switch to [`DEBUG_FILTER`] unless `RUST_LOG` was set explicitly.
    pub fn enable_debug(&self) {
        if self.from_env {
            return;
        }
        if let Err(e) = self.filter.reload(EnvFilter::new(DEBUG_FILTER)) {
            tracing::warn!(error = %e, "Failed to raise log level");
        }
    }
}

/// Install the global subscriber. Call once, before bootstrap.
pub fn init() -> LogHandle {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(DEFAULT_FILTER), false),
    };
    let (filter_layer, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    LogHandle {
        filter: handle,
        from_env,
    }
}
