//! Startup orchestration.
//!
//! # Responsibilities
//! - Merge the config file named by `config` into the defaults
//! - Resolve `config-dir` and the files that live under it
//! - Derive typed settings from the mapping
//! - Load optional extension modules
//!
//! # Design Decisions
//! - Fail fast: any step error is fatal, wrapped with the step name
//! - Exceptions: missing users list, unreadable domain list, and individual
//!   extension failures
//! - Steps run in order because later ones read what earlier ones wrote

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::{keys, load_config, ConfigError, ConfigMap, StepContext};
use crate::dns::{load_domain_list, load_hosts_dir, HostsCache};
use crate::extensions::{load_extensions, DylibActivator, ExtensionReport, ModuleActivator};
use crate::net::address::canonicalize_entry;
use crate::relay::{IngressProtocols, ProxyStatus};
use crate::users::{load_users, CredentialParser, User, UserDirectory, UserParser};

pub const USERS_FILE: &str = "users.list";
pub const DOMAIN_LIST_FILE: &str = "whitelist_domain.txt";
pub const HOSTS_DIR: &str = "hosts";

/// What to do when the file named by `config` cannot be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigFilePolicy {
    /// Log a warning and continue with the settings already present.
    #[default]
    Lenient,
    /// Fail bootstrap.
    Strict,
}

/// Everything bootstrap produced, ready for the relay components.
#[derive(Debug)]
pub struct Bootstrap {
    /// Final settings, with canonical `listen` and `relayer`.
    pub config: ConfigMap,
    /// Config file that was merged, if one was named.
    pub config_path: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub users: UserDirectory,
    pub local_user: User,
    pub protocols: IngressProtocols,
    pub proxy_status: ProxyStatus,
    pub whitelist_domains: Vec<String>,
    pub hosts: HostsCache,
    /// `None` when `timeout` is 0 or negative.
    pub timeout: Option<Duration>,
    pub debug: bool,
    pub extensions: ExtensionReport,
    /// False when bootstrap stopped early because no `config-dir` exists.
    pub complete: bool,
}

impl Bootstrap {
    /// Canonical listen endpoint.
    pub fn listen(&self) -> &str {
        self.config.get(keys::LISTEN).unwrap_or_default()
    }

    /// Canonical relayer endpoint.
    pub fn relayer(&self) -> &str {
        self.config.get(keys::RELAYER).unwrap_or_default()
    }

    pub fn summary(&self) -> BootstrapSummary<'_> {
        BootstrapSummary {
            config: &self.config,
            config_path: self.config_path.as_deref(),
            local_user: &self.local_user.id,
            users: self.users.len(),
            protocols: self.protocols,
            proxy_status: self.proxy_status,
            whitelist_domains: self.whitelist_domains.len(),
            hosts: self.hosts.len(),
            timeout_secs: self.timeout.map(|t| t.as_secs()),
            debug: self.debug,
            extensions_loaded: self.extensions.loaded_paths().collect(),
            extensions_failed: self.extensions.failed.iter().map(ToString::to_string).collect(),
            complete: self.complete,
        }
    }
}

/// Serializable view of a [`Bootstrap`] for diagnostics.
#[derive(Debug, Serialize)]
pub struct BootstrapSummary<'a> {
    pub config: &'a ConfigMap,
    pub config_path: Option<&'a Path>,
    pub local_user: &'a str,
    pub users: usize,
    pub protocols: IngressProtocols,
    pub proxy_status: ProxyStatus,
    pub whitelist_domains: usize,
    pub hosts: usize,
    pub timeout_secs: Option<u64>,
    pub debug: bool,
    pub extensions_loaded: Vec<&'a Path>,
    pub extensions_failed: Vec<String>,
    pub complete: bool,
}

/// Runs the bootstrap sequence with pluggable collaborators.
#[derive(Debug, Clone, Default)]
pub struct Bootstrapper<P = CredentialParser, A = DylibActivator> {
    config_file_policy: ConfigFilePolicy,
    user_parser: P,
    activator: A,
}

impl Bootstrapper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: UserParser, A: ModuleActivator> Bootstrapper<P, A> {
    pub fn config_file_policy(mut self, policy: ConfigFilePolicy) -> Self {
        self.config_file_policy = policy;
        self
    }

    pub fn user_parser<Q: UserParser>(self, user_parser: Q) -> Bootstrapper<Q, A> {
        Bootstrapper {
            config_file_policy: self.config_file_policy,
            user_parser,
            activator: self.activator,
        }
    }

    pub fn activator<B: ModuleActivator>(self, activator: B) -> Bootstrapper<P, B> {
        Bootstrapper {
            config_file_policy: self.config_file_policy,
            user_parser: self.user_parser,
            activator,
        }
    }

    /// Turn the initial settings into a [`Bootstrap`].
    ///
    /// `config` normally comes from [`ConfigMap::with_defaults`] plus any
    /// runtime entries (`config`, `config-dir`, `mod-dir`, overrides).
    pub fn run(&self, config: ConfigMap) -> Result<Bootstrap, ConfigError> {
        self.run_steps(config).step("bootstrap")
    }

    fn run_steps(&self, mut config: ConfigMap) -> Result<Bootstrap, ConfigError> {
        let config_path = config.get(keys::CONFIG).map(PathBuf::from);
        if let Some(path) = &config_path {
            self.read_config_file(&mut config, path)?;
        }

        let config_dir = config.get(keys::CONFIG_DIR).map(PathBuf::from);

        let users = match &config_dir {
            Some(dir) => load_users(&dir.join(USERS_FILE), &self.user_parser).step("users")?,
            None => UserDirectory::new(),
        };

        let user_setting = config.get(keys::USER).unwrap_or_default();
        let local_user = self
            .user_parser
            .parse_user(user_setting)
            .map_err(ConfigError::InvalidLocalUser)
            .step("local-user")?;

        let protocols = IngressProtocols::from_config(&config);

        canonicalize_entry(&mut config, keys::LISTEN);
        canonicalize_entry(&mut config, keys::RELAYER);

        let proxy_status = set_proxy_status(&mut config).step("proxy-status")?;

        let mut bootstrap = Bootstrap {
            config,
            config_path,
            config_dir: None,
            users,
            local_user,
            protocols,
            proxy_status,
            whitelist_domains: Vec::new(),
            hosts: HostsCache::new(),
            timeout: None,
            debug: false,
            extensions: ExtensionReport::default(),
            complete: false,
        };

        let Some(config_dir) = config_dir else {
            tracing::debug!("No config-dir, skipping file-based settings");
            return Ok(bootstrap);
        };

        bootstrap.whitelist_domains = load_domain_list(&config_dir.join(DOMAIN_LIST_FILE));
        load_hosts_dir(&config_dir.join(HOSTS_DIR), &mut bootstrap.hosts).step("hosts")?;

        bootstrap.timeout = parse_timeout(bootstrap.config.get(keys::TIMEOUT).unwrap_or_default())
            .step("timeout")?;

        bootstrap.debug = bootstrap.config.is_on(keys::DEBUG);

        if let Some(mod_dir) = bootstrap.config.get(keys::MOD_DIR) {
            let mod_dir = PathBuf::from(mod_dir);
            bootstrap.extensions = load_extensions(&mod_dir, &self.activator).step("mods")?;
        }

        bootstrap.config_dir = Some(config_dir);
        bootstrap.complete = true;

        tracing::info!(
            listen = %bootstrap.listen(),
            relayer = %bootstrap.relayer(),
            proxy_status = %bootstrap.proxy_status,
            users = bootstrap.users.len(),
            hosts = bootstrap.hosts.len(),
            extensions = bootstrap.extensions.loaded.len(),
            "Bootstrap complete"
        );
        Ok(bootstrap)
    }

    /// Merge the config file and derive `config-dir` from its location.
    fn read_config_file(&self, config: &mut ConfigMap, path: &Path) -> Result<(), ConfigError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        config.insert_default(keys::CONFIG_DIR, dir.to_string_lossy());

        match load_config(config, path).step("config") {
            Ok(_) => Ok(()),
            Err(e) => match self.config_file_policy {
                ConfigFilePolicy::Strict => Err(e),
                ConfigFilePolicy::Lenient => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                    Ok(())
                }
            },
        }
    }
}

/// Bootstrap with the default collaborators and lenient config-file handling.
pub fn bootstrap(config: ConfigMap) -> Result<Bootstrap, ConfigError> {
    Bootstrapper::new().run(config)
}

/// Parse `proxy-status`, writing the value back only when it is valid.
fn set_proxy_status(config: &mut ConfigMap) -> Result<ProxyStatus, ConfigError> {
    let raw = config.get(keys::PROXY_STATUS).unwrap_or_default().to_string();
    let status: ProxyStatus = raw
        .parse()
        .map_err(|_| ConfigError::InvalidProxyStatus(raw.clone()))?;
    config.set(keys::PROXY_STATUS, raw);
    Ok(status)
}

/// Parse `timeout` as a 32-bit count of seconds; zero or negative disables it.
fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: i32 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))?;
    Ok(u64::try_from(secs)
        .ok()
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("0").unwrap(), None);
        assert_eq!(parse_timeout("30").unwrap(), Some(Duration::from_secs(30)));
        assert!(matches!(parse_timeout("soon"), Err(ConfigError::InvalidTimeout(_))));
        assert!(matches!(parse_timeout(""), Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn test_parse_timeout_is_signed_32_bit() {
        assert_eq!(parse_timeout("-5").unwrap(), None);
        assert_eq!(
            parse_timeout("2147483647").unwrap(),
            Some(Duration::from_secs(i32::MAX as u64))
        );
        assert!(matches!(parse_timeout("2147483648"), Err(ConfigError::InvalidTimeout(_))));
        assert!(matches!(parse_timeout("3000000000"), Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn test_proxy_status_committed_only_on_success() {
        let mut config = ConfigMap::with_defaults();
        config.set(keys::PROXY_STATUS, "smart");
        assert_eq!(set_proxy_status(&mut config).unwrap(), ProxyStatus::Smart);
        assert_eq!(config.get(keys::PROXY_STATUS), Some("smart"));

        config.set(keys::PROXY_STATUS, "sometimes");
        let err = set_proxy_status(&mut config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProxyStatus(ref s) if s == "sometimes"));
    }

    #[test]
    fn test_defaults_only_is_partial() {
        let bootstrap = bootstrap(ConfigMap::with_defaults()).unwrap();

        assert!(!bootstrap.complete);
        assert!(bootstrap.users.is_empty());
        assert_eq!(bootstrap.local_user.id, "null");
        assert_eq!(bootstrap.listen(), "0.0.0.0:8080");
        assert_eq!(bootstrap.relayer(), "127.0.0.1:8080");
        assert_eq!(bootstrap.proxy_status, ProxyStatus::Enable);
        assert!(!bootstrap.protocols.any());
        assert!(bootstrap.hosts.is_empty());
    }

    #[test]
    fn test_invalid_local_user_is_fatal() {
        let mut config = ConfigMap::with_defaults();
        config.set(keys::USER, "nobody");

        let err = bootstrap(config).unwrap_err();
        assert_eq!(err.breadcrumbs(), vec!["bootstrap", "local-user"]);
        assert!(matches!(err.root_cause(), ConfigError::InvalidLocalUser(_)));
    }

    #[test]
    fn test_config_dir_from_bare_file_name() {
        let mut config = ConfigMap::new();
        Bootstrapper::new()
            .read_config_file(&mut config, Path::new("missing-relay.conf"))
            .unwrap();
        assert_eq!(config.get(keys::CONFIG_DIR), Some("."));
    }
}
