//! `load_config` module: loads the optional YAML config and applies environment overrides,
//! producing the [`PegelConfig`] the core pipeline runs with.
//!
//! # Responsibilities
//! - Parse the user-supplied YAML file; every key is optional and falls back to the built-in default
//! - Apply `DREISAM_PEGEL_FEED_URL` and `DREISAM_PEGEL_STATION_PREFIX` from the environment
//! - Report clear errors for unreadable or malformed files
//!
//! Credentials are not part of this config; they come from the credentials file
//! handed to the `bot` command, see [`crate::mastodon`].
use anyhow::Result;
use dreisam_pegel_core::config::PegelConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const ENV_FEED_URL: &str = "DREISAM_PEGEL_FEED_URL";
pub const ENV_STATION_PREFIX: &str = "DREISAM_PEGEL_STATION_PREFIX";

/// Loads the config file if one is given, otherwise starts from defaults,
/// then applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<PegelConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path.as_ref())?,
        None => {
            info!("No config file given, using defaults");
            PegelConfig::default()
        }
    };

    if let Ok(url) = std::env::var(ENV_FEED_URL) {
        info!(feed_url = %url, "Feed URL overridden from env");
        config.feed_url = url;
    }
    if let Ok(prefix) = std::env::var(ENV_STATION_PREFIX) {
        info!(station_prefix = %prefix, "Station prefix overridden from env");
        config.station_prefix = prefix;
    }

    config.trace_loaded();
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<PegelConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path,
                e
            ));
        }
    };

    // An empty file is a valid "all defaults" config.
    if content.trim().is_empty() {
        return Ok(PegelConfig::default());
    }

    match serde_yaml::from_str::<PegelConfig>(&content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
