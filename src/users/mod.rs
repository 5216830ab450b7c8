//! User credentials and the user directory.
//!
//! # Format
//! ```text
//! id:password[:speed_limit[:kind]]
//!
//! alice:secret
//! bob:hunter2:512
//! carol:pass:0:private
//! ```
//! `speed_limit` is in KB/s, `0` meaning unlimited. `kind` is `shared`
//! (default) or `private`.
//!
//! # Design Decisions
//! - The directory is rebuilt from scratch on every load
//! - A missing users list means "no users", any other read error is fatal
//! - Line parsing goes through [`UserParser`] so the format can be replaced

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, Lines};

/// Reasons a user line can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("expected id:password, got {0:?}")]
    MissingField(String),

    #[error("empty user id in {0:?}")]
    EmptyId(String),

    #[error("empty password for user {0}")]
    EmptyPassword(String),

    #[error("invalid speed limit {0:?}")]
    InvalidSpeedLimit(String),

    #[error("unknown user kind {0:?}")]
    UnknownKind(String),
}

/// Whether a user's connections may be shared across clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    #[default]
    Shared,
    Private,
}

impl FromStr for UserKind {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared" => Ok(UserKind::Shared),
            "private" => Ok(UserKind::Private),
            other => Err(UserError::UnknownKind(other.to_string())),
        }
    }
}

/// A user identity with its credential and limits.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// KB/s, `None` for unlimited.
    pub speed_limit: Option<u32>,
    pub kind: UserKind,
}

impl User {
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
            speed_limit: None,
            kind: UserKind::default(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .field("speed_limit", &self.speed_limit)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Turns one cleaned line into a [`User`].
pub trait UserParser {
    fn parse_user(&self, line: &str) -> Result<User, UserError>;
}

/// Parser for the `id:password[:speed_limit[:kind]]` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialParser;

impl UserParser for CredentialParser {
    fn parse_user(&self, line: &str) -> Result<User, UserError> {
        let mut fields = line.split(':').map(str::trim);
        let (id, password) = match (fields.next(), fields.next()) {
            (Some(id), Some(password)) => (id, password),
            _ => return Err(UserError::MissingField(line.to_string())),
        };
        if id.is_empty() {
            return Err(UserError::EmptyId(line.to_string()));
        }
        if password.is_empty() {
            return Err(UserError::EmptyPassword(id.to_string()));
        }

        let mut user = User::new(id, password);
        if let Some(limit) = fields.next() {
            let limit: u32 = limit
                .parse()
                .map_err(|_| UserError::InvalidSpeedLimit(limit.to_string()))?;
            user.speed_limit = (limit > 0).then_some(limit);
        }
        if let Some(kind) = fields.next() {
            user.kind = kind.parse()?;
        }
        Ok(user)
    }
}

impl FromStr for User {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CredentialParser.parse_user(s)
    }
}

/// Users keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user, replacing any previous entry with the same id.
    pub fn insert(&mut self, user: User) -> Option<User> {
        self.users.insert(user.id.clone(), user)
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }
}

/// Build a fresh directory from the users list at `path`.
///
/// A file that does not exist yields an empty directory.
pub fn load_users(path: &Path, parser: &dyn UserParser) -> Result<UserDirectory, ConfigError> {
    let mut directory = UserDirectory::new();
    let lines = match Lines::open(path) {
        Ok(lines) => lines,
        Err(e) if e.is_not_found() => {
            tracing::debug!(path = %path.display(), "No users list, continuing without users");
            return Ok(directory);
        }
        Err(e) => return Err(e),
    };

    for line in lines {
        let user = parser.parse_user(&line?).map_err(ConfigError::InvalidUser)?;
        directory.insert(user);
    }

    tracing::debug!(path = %path.display(), users = directory.len(), "Users list loaded");
    Ok(directory)
}
