//! This module implements the CLI interface for dreisam-pegel: command parsing,
//! the `bot` and `show` entrypoints, and the glue between the core pipeline and
//! the Mastodon client.
//!
//! All gauge logic (fetching, ledger, trend, message, chart, schedule) lives in
//! [`dreisam-pegel-core`]. This module only wires it together.
//!
//! ## Commands
//! - `bot`: update the history and, inside the posting window, post the status with the chart.
//! - `show`: update the history, print the reading and trend, write the chart to a file.
//!
//! [`dreisam-pegel-core`]: ../../dreisam-pegel-core/
use crate::load_config::load_config;
use crate::mastodon::MastodonClient;
use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use clap::{Parser, Subcommand};
use dreisam_pegel_core::chart::render_chart;
use dreisam_pegel_core::config::PegelConfig;
use dreisam_pegel_core::contract::{FeedSource, Visibility, TIME_LAYOUT};
use dreisam_pegel_core::download::HttpFeedSource;
use dreisam_pegel_core::message::{compose_message, ComposedMessage};
use dreisam_pegel_core::pipeline::get_snapshot;
use dreisam_pegel_core::publish::publish;
use dreisam_pegel_core::schedule::should_post;
use std::path::{Path, PathBuf};

/// CLI for dreisam-pegel: track the Dreisam gauge and post updates.
#[derive(Parser)]
#[clap(
    name = "dreisam-pegel",
    version,
    about = "Track the Dreisam gauge at Ebnet and post updates to Mastodon"
)]
pub struct Cli {
    /// Optional YAML config file (feed URL, station, cache TTL)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Update the history and post a status if the schedule allows it
    Bot {
        /// Path to the Mastodon credentials JSON file
        #[clap(long)]
        credentials: PathBuf,
        /// Directory holding the feed cache and the history ledger
        #[clap(long)]
        data_dir: PathBuf,
        /// Post regardless of the time of day
        #[clap(long)]
        force: bool,
    },
    /// Update the history, print the current reading and write the chart
    Show {
        /// Directory holding the feed cache and the history ledger
        #[clap(long)]
        data_dir: PathBuf,
        /// Where to write the chart PNG
        #[clap(long, default_value = "chart.png")]
        chart: PathBuf,
    },
}

/// A status that passed the schedule gate.
#[derive(Debug)]
pub struct Update {
    pub message: ComposedMessage,
    /// `None` if rendering failed; the status then goes out text-only.
    pub chart: Option<Vec<u8>>,
}

/// Run the pipeline and decide whether to post.
///
/// Returns `Ok(None)` when the schedule gate holds the post back. The history is
/// updated either way.
pub async fn prepare_update<S>(
    config: &PegelConfig,
    source: &S,
    data_dir: &Path,
    now: NaiveTime,
    force: bool,
) -> Result<Option<Update>>
where
    S: FeedSource + ?Sized,
{
    let snapshot = get_snapshot(config, source, data_dir)
        .await
        .context("failed to get pegel data")?;
    let message = compose_message(&snapshot, &config.station_label);

    if !force && !should_post(&now, message.is_warning) {
        tracing::info!(
            now = %now,
            warning = message.is_warning,
            "Outside posting schedule, not posting"
        );
        return Ok(None);
    }

    let chart = match render_chart(&snapshot) {
        Ok(png) => Some(png),
        Err(e) => {
            tracing::warn!(error = %e, "Cannot create chart");
            None
        }
    };

    Ok(Some(Update { message, chart }))
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config(cli.config.as_deref())?;
    let source = HttpFeedSource::from_config(&config)?;

    match cli.command {
        Commands::Bot {
            credentials,
            data_dir,
            force,
        } => {
            tracing::info!(command = "bot", data_dir = %data_dir.display(), force, "Starting bot run");
            let now = Local::now().time();
            let Some(update) = prepare_update(&config, &source, &data_dir, now, force).await? else {
                return Ok(());
            };

            let client = MastodonClient::from_credentials_file(&credentials)
                .context("failed to read mastodon config")?;
            publish(&client, &update.message, update.chart, Visibility::Unlisted)
                .await
                .context("failed to send status")?;
            tracing::info!(command = "bot", "Bot run complete");
            Ok(())
        }
        Commands::Show { data_dir, chart } => {
            tracing::info!(command = "show", data_dir = %data_dir.display(), "Showing current reading");
            let snapshot = get_snapshot(&config, &source, &data_dir)
                .await
                .context("cannot get pegel")?;

            println!("{}", snapshot.current.timestamp.format(TIME_LAYOUT));
            println!("{}", snapshot.current.value);
            for delta in &snapshot.trend {
                println!("{delta}");
            }

            let png = render_chart(&snapshot).context("cannot create chart")?;
            std::fs::write(&chart, png)
                .with_context(|| format!("cannot write chart to {}", chart.display()))?;
            tracing::info!(command = "show", chart = %chart.display(), "Chart written");
            Ok(())
        }
    }
}
