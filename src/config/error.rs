//! Configuration error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::users::UserError;

/// Errors that can occur while reading and applying configuration.
///
/// Every step of bootstrap wraps the errors leaving it in [`ConfigError::Step`],
/// so the rendered message reads as a breadcrumb trail:
/// `bootstrap -> hosts -> invalid hosts line: 1.2.3.4`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be opened.
    #[error("cannot open {}: {source}", .path.display())]
    FileAccess {
        /// Path that could not be opened.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// A directory could not be enumerated.
    #[error("cannot read directory {}: {source}", .path.display())]
    DirectoryAccess {
        /// Directory that could not be listed.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// An I/O error happened in the middle of reading a file.
    #[error("failed reading {}: {source}", .path.display())]
    ReadFailure {
        /// File being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// A config line without a `=` separator.
    #[error("invalid line: {line}")]
    InvalidFormat { line: String },

    /// A hosts line without both an address and a domain.
    #[error("invalid hosts line: {line}")]
    InvalidHostsLine { line: String },

    /// A line of the users list could not be parsed.
    #[error("invalid user: {0}")]
    InvalidUser(#[source] UserError),

    /// The `user` setting could not be parsed.
    #[error("invalid local user: {0}")]
    InvalidLocalUser(#[source] UserError),

    #[error("invalid proxy-status: {0}")]
    InvalidProxyStatus(String),

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    /// An error annotated with the name of the step it escaped from.
    #[error("{step} -> {source}")]
    Step {
        step: &'static str,
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Wrap this error with the name of the step it is leaving.
    pub fn in_step(self, step: &'static str) -> Self {
        ConfigError::Step {
            step,
            source: Box::new(self),
        }
    }

    /// The innermost error, with every [`ConfigError::Step`] wrapper peeled off.
    pub fn root_cause(&self) -> &ConfigError {
        let mut err = self;
        while let ConfigError::Step { source, .. } = err {
            err = source.as_ref();
        }
        err
    }

    /// Step names from outermost to innermost.
    pub fn breadcrumbs(&self) -> Vec<&'static str> {
        let mut steps = Vec::new();
        let mut err = self;
        while let ConfigError::Step { step, source } = err {
            steps.push(*step);
            err = source.as_ref();
        }
        steps
    }

    /// True when the error is a file that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.root_cause(),
            ConfigError::FileAccess { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

/// Attach a step name to the error side of a `Result`.
pub trait StepContext<T> {
    fn step(self, step: &'static str) -> Result<T, ConfigError>;
}

impl<T> StepContext<T> for Result<T, ConfigError> {
    fn step(self, step: &'static str) -> Result<T, ConfigError> {
        self.map_err(|e| e.in_step(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumb_display() {
        let err = ConfigError::InvalidHostsLine {
            line: "1.2.3.4".into(),
        }
        .in_step("hosts")
        .in_step("bootstrap");

        assert_eq!(
            err.to_string(),
            "bootstrap -> hosts -> invalid hosts line: 1.2.3.4"
        );
        assert_eq!(err.breadcrumbs(), vec!["bootstrap", "hosts"]);
        assert!(matches!(
            err.root_cause(),
            ConfigError::InvalidHostsLine { .. }
        ));
    }

    #[test]
    fn test_not_found_detection() {
        let missing = ConfigError::FileAccess {
            path: "users.list".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(missing.is_not_found());
        assert!(missing.in_step("users").is_not_found());

        let denied = ConfigError::FileAccess {
            path: "users.list".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        };
        assert!(!denied.is_not_found());
    }
}
