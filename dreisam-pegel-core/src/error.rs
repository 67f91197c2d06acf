use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort snapshot production.
///
/// Every variant is terminal for the current run: the pipeline neither
/// retries nor degrades, it hands the error to the caller.
#[derive(Debug, Error)]
pub enum PegelError {
    #[error("failed to fetch {url}: {message}")]
    Fetch {
        url: String,
        /// Set when the server answered with a non-2xx status.
        status: Option<u16>,
        message: String,
    },

    #[error("station with prefix {prefix:?} not found in feed")]
    StationNotFound { prefix: String },

    #[error("cannot parse line {line:?}: {reason}")]
    Parse { line: String, reason: String },

    #[error("storage error on {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PegelError {
    pub fn parse(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            line: line.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// HTTP status carried by a fetch failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PegelError::Fetch { status, .. } => *status,
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to draw")]
    Empty,

    #[error("failed to encode png: {0}")]
    Encode(#[from] image::ImageError),
}

/// Errors returned by a [`crate::contract::Poster`].
#[derive(Debug, Error)]
pub enum PostError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint} answered with status {status}: {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },
}
