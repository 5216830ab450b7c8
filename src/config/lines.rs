//! Cleaned line reading for the plain-text config formats.
//!
//! All of the files read during bootstrap (main config, users list, hosts,
//! domain allowlist) share one lexical convention:
//! - `#` starts a comment that runs to the end of the line
//! - surrounding whitespace is insignificant
//! - tabs count as single spaces
//! - blank lines are ignored

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;

/// Apply the cleaning rules to one physical line.
///
/// Returns `None` when nothing is left.
pub fn clean_line(raw: &str) -> Option<String> {
    let content = match raw.find('#') {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    Some(content.replace('\t', " "))
}

/// Clean one raw line of bytes.
///
/// The comment is cut before decoding, so bytes that are not UTF-8 inside a
/// comment never reach the text. Any left in the content are replaced with
/// U+FFFD.
pub fn clean_bytes(raw: &[u8]) -> Option<String> {
    let content = match raw.iter().position(|&b| b == b'#') {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    clean_line(&String::from_utf8_lossy(content))
}

/// Lazy iterator over the cleaned lines of a file.
///
/// The file handle is owned by the iterator and closed when it is dropped.
/// After the first read error the iterator yields that error once and then
/// ends.
#[derive(Debug)]
pub struct Lines {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    done: bool,
}

impl Lines {
    /// Open `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            buf: Vec::new(),
            done: false,
        })
    }
}

impl Iterator for Lines {
    type Item = Result<String, ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {
                    if let Some(line) = clean_bytes(&self.buf) {
                        return Some(Ok(line));
                    }
                }
                Err(source) => {
                    self.done = true;
                    return Some(Err(ConfigError::ReadFailure {
                        path: self.path.clone(),
                        source,
                    }));
                }
            }
        }
    }
}

impl FusedIterator for Lines {}

/// Read every cleaned line of `path` into memory.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>, ConfigError> {
    Lines::open(path)?.collect()
}
