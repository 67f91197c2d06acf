#![doc = "Mastodon integration: implements the core `Poster` trait against a Mastodon server's REST API."]
//
//! # Mastodon client
//!
//! Bridges [`dreisam_pegel_core::contract::Poster`] to a real account.
//!
//! - Construct [`MastodonClient`] from a credentials file (JSON with `Server`,
//!   `ClientID`, `ClientSecret` and `AccessToken`), as written by the usual
//!   Mastodon app-registration tooling.
//! - Media goes to `POST /api/v2/media`, statuses to `POST /api/v1/statuses`.
//! - Only the access token is used for requests; client id and secret are carried
//!   along so the same file works with other tooling.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use dreisam_pegel_core::contract::{MediaAttachment, NewStatus, PostedStatus, Poster};
use dreisam_pegel_core::error::PostError;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

pub const MEDIA_PATH: &str = "/api/v2/media";
pub const STATUSES_PATH: &str = "/api/v1/statuses";

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonCredentials {
    #[serde(rename = "Server")]
    pub server: String,
    #[serde(rename = "ClientID", default)]
    pub client_id: String,
    #[serde(rename = "ClientSecret", default)]
    pub client_secret: String,
    #[serde(rename = "AccessToken")]
    pub access_token: String,
}

impl MastodonCredentials {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading credentials file {}", path.display()))?;
        let creds: MastodonCredentials = serde_json::from_str(&raw)
            .with_context(|| format!("unmarshalling credentials file {}", path.display()))?;
        tracing::info!(
            server = %creds.server,
            access_token_set = !creds.access_token.is_empty(),
            "Loaded Mastodon credentials"
        );
        Ok(creds)
    }
}

#[derive(Deserialize)]
struct MediaResponse {
    id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

pub struct MastodonClient {
    client: reqwest::Client,
    server: String,
    access_token: String,
}

impl MastodonClient {
    pub fn new(credentials: MastodonCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            server: credentials.server.trim_end_matches('/').to_string(),
            access_token: credentials.access_token,
        }
    }

    pub fn from_credentials_file(path: &Path) -> Result<Self> {
        Ok(Self::new(MastodonCredentials::from_file(path)?))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }

    async fn check(endpoint: &str, resp: reqwest::Response) -> Result<reqwest::Response, PostError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
        tracing::error!(endpoint, status = %status, body = %body, "Mastodon API returned error");
        Err(PostError::Rejected {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

fn transport(endpoint: &str, e: impl std::fmt::Display) -> PostError {
    PostError::Transport {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl Poster for MastodonClient {
    async fn upload_media(&self, png: Vec<u8>) -> Result<MediaAttachment, PostError> {
        tracing::info!(size = png.len(), "Uploading media attachment");
        let part = Part::bytes(png)
            .file_name("chart.png")
            .mime_str("image/png")
            .map_err(|e| transport(MEDIA_PATH, e))?;
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(self.endpoint(MEDIA_PATH))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to upload media");
                transport(MEDIA_PATH, e)
            })?;
        let media: MediaResponse = Self::check(MEDIA_PATH, resp)
            .await?
            .json()
            .await
            .map_err(|e| transport(MEDIA_PATH, e))?;

        tracing::info!(media_id = %media.id, "Uploaded media attachment");
        Ok(MediaAttachment { id: media.id })
    }

    async fn post_status(&self, status: NewStatus) -> Result<PostedStatus, PostError> {
        tracing::info!(
            visibility = status.visibility.as_str(),
            media = status.media_ids.len(),
            "Posting status"
        );
        let mut params: Vec<(&str, String)> = vec![
            ("status", status.text),
            ("visibility", status.visibility.as_str().to_string()),
        ];
        params.extend(status.media_ids.into_iter().map(|id| ("media_ids[]", id)));

        let resp = self
            .client
            .post(self.endpoint(STATUSES_PATH))
            .bearer_auth(&self.access_token)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to post status");
                transport(STATUSES_PATH, e)
            })?;
        let posted: StatusResponse = Self::check(STATUSES_PATH, resp)
            .await?
            .json()
            .await
            .map_err(|e| transport(STATUSES_PATH, e))?;

        tracing::info!(status_id = %posted.id, "Posted status");
        Ok(PostedStatus {
            id: posted.id,
            url: posted.url,
        })
    }
}
