//! End-to-end archival orchestration.
//!
//! One run takes a permalink and leaves behind a complete bundle. The raw
//! message list lands on disk as soon as the thread arrives, before any
//! media or rendering work, so a later failure never costs the fetched
//! thread. Nothing is cleaned up on failure; whatever was written stays.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::archive::{self, ArchiveError};
use crate::bundle::ThreadBundle;
use crate::media::{self, DownloadReport};
use crate::render;
use crate::slack::{InvalidUrlError, ThreadIdentifier, parse_thread_url};
use crate::source::{MediaDownloader, ThreadFetchError, ThreadSource};

/// Where in the run a log line (or a failure) comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    Fetching,
    Downloading,
    Rendering,
    Archiving,
    Done,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Fetching => "fetching",
            Self::Downloading => "downloading",
            Self::Rendering => "rendering",
            Self::Archiving => "archiving",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid thread URL: {0}")]
    InvalidUrl(#[from] InvalidUrlError),
    #[error("failed to fetch thread: {0}")]
    Fetch(#[from] ThreadFetchError),
    #[error("failed to encode raw thread data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to package archive: {0}")]
    Archive(#[from] ArchiveError),
}

/// What one successful run produced.
#[derive(Debug, Clone)]
pub struct ArchiveSummary {
    pub thread: ThreadIdentifier,
    pub bundle_dir: PathBuf,
    pub archive_path: PathBuf,
    pub message_count: usize,
    pub media: DownloadReport,
}

/// Drives one thread from permalink to packed bundle.
pub struct ArchivePipeline<S> {
    source: S,
    output_dir: PathBuf,
}

impl<S> ArchivePipeline<S>
where
    S: ThreadSource + MediaDownloader,
{
    #[must_use]
    pub fn new(source: S, output_dir: PathBuf) -> Self {
        Self { source, output_dir }
    }

    /// Archive one thread end to end.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] for the stage that gave out. Media
    /// downloads are the exception: individual failures are logged and the
    /// run continues without those files.
    pub async fn run(&self, url: &str) -> Result<ArchiveSummary, PipelineError> {
        let mut stage = Stage::Resolving;
        match self.run_inner(url, &mut stage).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                error!(stage = %stage, "Archive run failed: {e}");
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        url: &str,
        stage: &mut Stage,
    ) -> Result<ArchiveSummary, PipelineError> {
        info!(stage = %stage, url, "Resolving thread permalink");
        let thread = parse_thread_url(url)?;
        info!(
            channel_id = %thread.channel_id,
            thread_ts = %thread.thread_timestamp,
            "Resolved thread"
        );

        let bundle = ThreadBundle::new(&self.output_dir, &thread.thread_id);
        bundle
            .ensure_dirs()
            .await
            .map_err(|source| PipelineError::Storage {
                path: bundle.root().to_path_buf(),
                source,
            })?;

        *stage = Stage::Fetching;
        info!(stage = %stage, "Fetching thread replies");
        let messages = self
            .source
            .fetch_replies(&thread.channel_id, &thread.thread_timestamp)
            .await?;
        info!(count = messages.len(), "Fetched thread messages");

        // Raw data first. Media and rendering can fail later without
        // costing the fetched thread.
        let raw = serde_json::to_string_pretty(&messages)?;
        write_bundle_file(&bundle.raw_data_path(), &raw).await?;
        debug!(path = %bundle.raw_data_path().display(), "Wrote raw thread data");

        *stage = Stage::Downloading;
        info!(stage = %stage, "Downloading image attachments");
        let (annotated, report) =
            media::fetch_thread_media(&self.source, messages, &bundle.images_dir()).await;
        info!(
            resolved = report.resolved,
            failed = report.failed,
            "Image downloads finished"
        );

        *stage = Stage::Rendering;
        debug!(stage = %stage, "Rendering conversation document");
        let document = render::render_document(&annotated);
        write_bundle_file(&bundle.document_path(), &document).await?;

        *stage = Stage::Archiving;
        info!(stage = %stage, "Packing bundle archive");
        let archive_path = archive::pack_bundle(&bundle).await?;

        *stage = Stage::Done;
        info!(
            stage = %stage,
            archive = %archive_path.display(),
            "Thread archived"
        );

        Ok(ArchiveSummary {
            bundle_dir: bundle.root().to_path_buf(),
            archive_path,
            message_count: annotated.len(),
            media: report,
            thread,
        })
    }
}

async fn write_bundle_file(path: &Path, contents: &str) -> Result<(), PipelineError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| PipelineError::Storage {
            path: path.to_path_buf(),
            source,
        })
}
