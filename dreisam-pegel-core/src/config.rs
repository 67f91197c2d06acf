use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_FEED_URL: &str = "https://www.hvz.baden-wuerttemberg.de/js/hvz_peg_stmn.js";
pub const DEFAULT_STATION_PREFIX: &str = "['00389',";
pub const DEFAULT_STATION_LABEL: &str = "Dreisam-Pegel";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/104.0.0.0 Safari/537.36";

/// Which feed to read, which station to pick from it and how to label it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PegelConfig {
    pub feed_url: String,
    /// Literal start of the station's record line, leading whitespace ignored.
    pub station_prefix: String,
    pub station_label: String,
    pub cache_ttl_secs: u64,
    pub user_agent: String,
}

impl Default for PegelConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            station_prefix: DEFAULT_STATION_PREFIX.to_string(),
            station_label: DEFAULT_STATION_LABEL.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl PegelConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn trace_loaded(&self) {
        info!(
            feed_url = %self.feed_url,
            station_prefix = %self.station_prefix,
            cache_ttl_secs = self.cache_ttl_secs,
            "Loaded PegelConfig"
        );
        debug!(?self, "PegelConfig loaded (full debug)");
    }
}

