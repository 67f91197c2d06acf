//! High-level pipeline: fetch → parse → history update → trend.
//!
//! Every step is fail-fast. An error in any step aborts the run with no
//! partial result and, in particular, without touching the ledger if the
//! fetch, the parse or the ledger read failed.
//!
//! # Files under the data directory
//! - `cache`: raw feed body, reused while younger than the configured TTL
//! - `history`: the ledger, see [`crate::history`]

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use tracing::{error, info};

use crate::config::PegelConfig;
use crate::contract::{FeedSource, Snapshot};
use crate::download::fetch_or_cached;
use crate::error::PegelError;
use crate::history::{append_if_newer, compute_trend, read_ledger, recent_window, write_ledger};
use crate::parse::parse_station;

pub const CACHE_FILE: &str = "cache";
pub const HISTORY_FILE: &str = "history";

/// Span of history handed to the chart.
pub const RECENT_DAYS: i64 = 7;

pub fn cache_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CACHE_FILE)
}

pub fn history_path(data_dir: &Path) -> PathBuf {
    data_dir.join(HISTORY_FILE)
}

/// Run the pipeline once and return the resulting snapshot.
///
/// The ledger is rewritten on every successful run, even when the reading
/// was already recorded.
pub async fn get_snapshot<S>(
    config: &PegelConfig,
    source: &S,
    data_dir: &Path,
) -> Result<Snapshot, PegelError>
where
    S: FeedSource + ?Sized,
{
    info!(data_dir = %data_dir.display(), "[PEGEL] Starting snapshot pipeline");

    let feed = fetch_or_cached(
        source,
        &config.feed_url,
        &cache_path(data_dir),
        config.cache_ttl(),
    )
    .await
    .map_err(|e| {
        error!(error = %e, "[PEGEL][ERROR] Fetch failed");
        e
    })?;

    let reading = parse_station(&feed, &config.station_prefix)?;
    info!(timestamp = %reading.timestamp, value = reading.value, "[PEGEL] Current reading");

    let history = history_path(data_dir);
    let mut ledger = read_ledger(&history)?;
    let appended = append_if_newer(&mut ledger, reading);
    info!(appended, entries = ledger.len(), "[PEGEL] Ledger updated in memory");

    write_ledger(&history, &ledger)?;

    // A ledger entry newer than the feed wins; otherwise the fresh reading is current.
    let current = match ledger.last() {
        Some(last) if last.timestamp > reading.timestamp => *last,
        _ => reading,
    };
    let trend = compute_trend(&ledger);
    let recent = recent_window(&ledger, current.timestamp, TimeDelta::days(RECENT_DAYS));

    info!(
        value = current.value,
        trend = ?trend,
        recent = recent.len(),
        "[PEGEL] Snapshot ready"
    );
    Ok(Snapshot {
        current,
        trend,
        recent,
    })
}
