//! # contract: shared data types and the two I/O seams
//!
//! The pipeline talks to the outside world in exactly two places:
//! - [`FeedSource`]: one HTTP GET of the gauge feed.
//! - [`Poster`]: media upload and status post on the social account.
//!
//! Both traits are annotated for `mockall` so tests can count and script
//! calls without touching the network. The real implementations are
//! [`crate::download::HttpFeedSource`] and the Mastodon client in the CLI crate.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use mockall::automock;

use crate::error::{PegelError, PostError};

/// Timestamp layout used by the ledger, the status text and the chart.
pub const TIME_LAYOUT: &str = "%Y-%m-%d %H:%M";

/// One gauge reading. Minute precision, UTC, no timezone conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedMeasurement {
    pub timestamp: NaiveDateTime,
    /// Water level in centimeters.
    pub value: i64,
}

impl TimedMeasurement {
    pub fn new(timestamp: NaiveDateTime, value: i64) -> Self {
        Self { timestamp, value }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub current: TimedMeasurement,
    /// Deltas between consecutive ledger entries, most recent first, at most 5.
    pub trend: Vec<i64>,
    /// Ledger entries of the week ending at `current`, oldest first.
    pub recent: Vec<TimedMeasurement>,
}

/// Source of the raw gauge feed.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the raw feed body. Non-2xx answers are errors.
    async fn download(&self, url: &str) -> Result<Vec<u8>, PegelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    #[default]
    Unlisted,
    Private,
    Direct,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
            Visibility::Direct => "direct",
        }
    }
}

/// A status ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatus {
    pub text: String,
    pub visibility: Visibility,
    /// Ids returned by earlier [`Poster::upload_media`] calls.
    pub media_ids: Vec<String>,
}

/// An uploaded attachment as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub id: String,
}

/// A posted status as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedStatus {
    pub id: String,
    pub url: Option<String>,
}

/// Social-media account the bot posts to.
///
/// Transport and authentication are entirely up to the implementor.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Poster: Send + Sync {
    /// Upload a PNG image and return its attachment id.
    async fn upload_media(&self, png: Vec<u8>) -> Result<MediaAttachment, PostError>;

    /// Post a status, optionally referencing uploaded media.
    async fn post_status(&self, status: NewStatus) -> Result<PostedStatus, PostError>;
}
