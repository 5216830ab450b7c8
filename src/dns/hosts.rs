//! Hosts directory aggregation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, Lines};
use crate::dns::HostsCache;

/// File-name suffix of hosts files.
pub const HOSTS_SUFFIX: &str = ".hosts";

/// Parse one cleaned hosts line into `(address, domain)`.
///
/// Runs of spaces collapse to one; fields after the domain are ignored.
pub fn parse_hosts_line(line: &str) -> Result<(String, String), ConfigError> {
    let mut collapsed = line.to_string();
    loop {
        let next = collapsed.replace("  ", " ");
        if next == collapsed {
            break;
        }
        collapsed = next;
    }

    let invalid = || ConfigError::InvalidHostsLine {
        line: collapsed.clone(),
    };
    let mut fields = collapsed.split(' ');
    let address = fields.next().map(str::trim).unwrap_or_default();
    let domain = fields.next().map(str::trim).ok_or_else(invalid)?;
    if address.is_empty() || domain.is_empty() {
        return Err(invalid());
    }
    Ok((address.to_string(), domain.to_string()))
}

/// Regular files in `dir` ending in [`HOSTS_SUFFIX`], sorted by file name.
pub fn hosts_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let dir_err = |source| ConfigError::DirectoryAccess {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_err)? {
        let entry = entry.map_err(dir_err)?;
        if entry.file_type().map_err(dir_err)?.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(HOSTS_SUFFIX) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Merge every hosts file in `dir` into `cache`.
///
/// Each file is applied only once it has parsed completely, so a bad line
/// leaves `cache` as it was before that file. Returns the number of entries
/// read.
pub fn load_hosts_dir(dir: &Path, cache: &mut HostsCache) -> Result<usize, ConfigError> {
    let mut total = 0;
    for path in hosts_files(dir)? {
        let mut staged = Vec::new();
        for line in Lines::open(&path)? {
            let (address, domain) = parse_hosts_line(&line?)?;
            staged.push((domain, address));
        }
        tracing::debug!(path = %path.display(), entries = staged.len(), "Hosts file merged");
        total += staged.len();
        cache.extend(staged);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hosts_line() {
        assert_eq!(
            parse_hosts_line("1.2.3.4 example.com").unwrap(),
            ("1.2.3.4".to_string(), "example.com".to_string())
        );
        assert_eq!(
            parse_hosts_line("1.2.3.4     example.com   alias.com").unwrap(),
            ("1.2.3.4".to_string(), "example.com".to_string())
        );
        assert_eq!(
            parse_hosts_line("::1   localhost").unwrap(),
            ("::1".to_string(), "localhost".to_string())
        );
    }

    #[test]
    fn test_single_field_is_invalid() {
        let err = parse_hosts_line("1.2.3.4").unwrap_err();
        match err {
            ConfigError::InvalidHostsLine { line } => assert_eq!(line, "1.2.3.4"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_hosts_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.hosts"), "").unwrap();
        fs::write(dir.path().join("a.hosts"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.hosts")).unwrap();

        let files = hosts_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.hosts", "b.hosts"]);
    }

    #[test]
    fn test_missing_dir_is_directory_access() {
        let dir = tempfile::tempdir().unwrap();
        let err = hosts_files(&dir.path().join("hosts")).unwrap_err();
        assert!(matches!(err, ConfigError::DirectoryAccess { .. }));
    }

    #[test]
    fn test_later_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.hosts"), "1.1.1.1 example.com\n3.3.3.3 only-a.com\n").unwrap();
        fs::write(dir.path().join("b.hosts"), "2.2.2.2\texample.com # override\n").unwrap();

        let mut cache = HostsCache::new();
        let count = load_hosts_dir(dir.path(), &mut cache).unwrap();

        assert_eq!(count, 3);
        assert_eq!(cache.lookup("example.com"), Some("2.2.2.2"));
        assert_eq!(cache.lookup("only-a.com"), Some("3.3.3.3"));
    }

    #[test]
    fn test_bad_file_leaves_cache_as_before_it() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.hosts"), "1.1.1.1 example.com\n").unwrap();
        fs::write(dir.path().join("b.hosts"), "2.2.2.2 example.com\n1.2.3.4\n").unwrap();

        let mut cache = HostsCache::new();
        let err = load_hosts_dir(dir.path(), &mut cache).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidHostsLine { .. }));
        assert_eq!(cache.lookup("example.com"), Some("1.1.1.1"));
        assert_eq!(cache.len(), 1);
    }
}
