//! Configuration loading from disk.

use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::lines::Lines;
use crate::config::schema::ConfigMap;

/// Split a cleaned line on its first `=` into a trimmed `(key, value)` pair.
///
/// Any further `=` characters belong to the value.
pub fn parse_key_value(line: &str) -> Result<(String, String), ConfigError> {
    let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::InvalidFormat {
        line: line.to_string(),
    })?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Merge `key = value` lines into `config`, later lines winning.
///
/// Parsing is staged: nothing is written to `config` unless every line
/// parses. Read errors from the line source abort the merge the same way.
pub fn merge_lines<I, S>(config: &mut ConfigMap, lines: I) -> Result<usize, ConfigError>
where
    I: IntoIterator<Item = Result<S, ConfigError>>,
    S: AsRef<str>,
{
    let mut staged = Vec::new();
    for line in lines {
        let line = line?;
        staged.push(parse_key_value(line.as_ref())?);
    }
    let count = staged.len();
    config.extend(staged);
    Ok(count)
}

/// Read `path` and merge its settings into `config`.
pub fn load_config(config: &mut ConfigMap, path: &Path) -> Result<usize, ConfigError> {
    let count = merge_lines(config, Lines::open(path)?)?;
    tracing::debug!(path = %path.display(), settings = count, "Config file merged");
    Ok(count)
}
