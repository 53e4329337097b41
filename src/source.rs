//! Capabilities the pipeline consumes and the errors they produce.
//!
//! The pipeline never talks to Slack directly. It asks a [`ThreadSource`] for
//! the ordered reply list and a [`MediaDownloader`] for attachment bytes, so
//! tests can stand in fakes and the orchestration stays service-agnostic.

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::slack::Message;

/// Fetch failures abort the whole run; there is no partial thread.
#[derive(Debug, Error)]
pub enum ThreadFetchError {
    #[error("thread request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("thread request returned status {0}")]
    Status(StatusCode),
    #[error("service refused the request: {0}")]
    Api(String),
}

/// Download failures are per-attachment; the caller logs and moves on.
#[derive(Debug, Error)]
pub enum MediaDownloadError {
    #[error("media request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("media request returned status {0}")]
    Status(StatusCode),
    #[error("failed to write media file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Provider of a thread's full, ordered message list.
#[async_trait]
pub trait ThreadSource: Send + Sync {
    /// Fetch the root message and every reply, in service order.
    async fn fetch_replies(
        &self,
        channel_id: &str,
        thread_ts: &str,
    ) -> Result<Vec<Message>, ThreadFetchError>;
}

/// Provider of raw attachment bytes.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, MediaDownloadError>;
}
