//! relay-bootstrap
//!
//! Reads the relay's configuration artifacts and prints the resulting
//! settings.
//!
//! ```text
//!  --config relay.conf ─┐
//!  --set key=value ─────┼─▶ ConfigMap ─▶ bootstrap ─▶ Bootstrap ─▶ stdout
//!  defaults ────────────┘        │
//!                                ├── <config-dir>/users.list
//!                                ├── <config-dir>/whitelist_domain.txt
//!                                ├── <config-dir>/hosts/*.hosts
//!                                └── <mod-dir>/*.so
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use relay_bootstrap::config::{keys, parse_key_value, ConfigMap};
use relay_bootstrap::lifecycle::{Bootstrapper, ConfigFilePolicy};
use relay_bootstrap::observability::logging;

#[derive(Parser)]
#[command(name = "relay-bootstrap")]
#[command(about = "Load and normalize relay configuration", long_about = None)]
struct Cli {
    /// Main config file (key = value lines)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding users.list, hosts/ and whitelist_domain.txt
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Directory of extension modules to load
    #[arg(long)]
    mod_dir: Option<PathBuf>,

    /// Extra setting, applied before the config file
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_setting)]
    settings: Vec<(String, String)>,

    /// Fail if the config file cannot be read
    #[arg(long)]
    strict_config: bool,

    /// Print a JSON summary instead of the key: value dump
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn initial_config(&self) -> ConfigMap {
        let mut config = ConfigMap::with_defaults();
        config.extend(self.settings.iter().cloned());
        if let Some(path) = &self.config {
            config.set(keys::CONFIG, path.to_string_lossy());
        }
        if let Some(dir) = &self.config_dir {
            config.set(keys::CONFIG_DIR, dir.to_string_lossy());
        }
        if let Some(dir) = &self.mod_dir {
            config.set(keys::MOD_DIR, dir.to_string_lossy());
        }
        config
    }
}

fn parse_setting(raw: &str) -> Result<(String, String), String> {
    parse_key_value(raw).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log = logging::init();

    tracing::info!("relay-bootstrap v{} starting", env!("CARGO_PKG_VERSION"));

    let policy = if cli.strict_config {
        ConfigFilePolicy::Strict
    } else {
        ConfigFilePolicy::Lenient
    };

    let bootstrap = match Bootstrapper::new()
        .config_file_policy(policy)
        .run(cli.initial_config())
    {
        Ok(bootstrap) => bootstrap,
        Err(e) => {
            tracing::error!(error = %e, "Bootstrap failed");
            return ExitCode::FAILURE;
        }
    };

    if bootstrap.debug {
        log.enable_debug();
    }

    if cli.json {
        match serde_json::to_string_pretty(&bootstrap.summary()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render summary");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", bootstrap.config.dump());
    }

    ExitCode::SUCCESS
}
