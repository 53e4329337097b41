//! Attachment download planning and fan-out.
//!
//! Local file names are assigned up front by walking messages in order, so
//! `image_3.png` refers to the same attachment on every run no matter which
//! download finishes first. The downloads themselves run concurrently under
//! one join; a failed download costs that one file and nothing else.

use std::path::Path;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::bundle::IMAGES_DIR;
use crate::slack::Message;
use crate::source::{MediaDownloadError, MediaDownloader};

/// A message paired with the media that actually resolved for it.
#[derive(Debug, Clone)]
pub struct AnnotatedMessage {
    pub message: Message,
    pub media: Vec<ResolvedMedia>,
}

/// A successfully downloaded attachment, as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub local_file_name: String,
    /// Bundle-relative path (`images/<file>`), usable as a markdown link.
    pub relative_path: String,
    pub original_name: String,
}

/// One download slot. The local name is fixed before any bytes move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDownload {
    pub message_index: usize,
    pub source_url: String,
    pub original_name: String,
    pub file_name: String,
    pub relative_path: String,
}

/// Totals for the run summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadReport {
    pub resolved: usize,
    pub failed: usize,
}

/// Assign `image_<N>.<ext>` names to every downloadable attachment.
///
/// The counter is shared across the whole thread and advances in
/// message-then-attachment order, so numbering is deterministic. Non-image
/// attachments are skipped without a trace.
#[must_use]
pub fn plan_downloads(messages: &[Message]) -> Vec<PlannedDownload> {
    let mut plan = Vec::new();
    let mut counter: usize = 1;

    for (message_index, message) in messages.iter().enumerate() {
        for attachment in &message.attachments {
            if let Some(ext) = image_extension(&attachment.mime_type) {
                let file_name = format!("image_{counter}.{ext}");
                plan.push(PlannedDownload {
                    message_index,
                    source_url: attachment.source_url.clone(),
                    original_name: attachment.original_name.clone(),
                    relative_path: format!("{IMAGES_DIR}/{file_name}"),
                    file_name,
                });
                counter += 1;
            }
        }
    }

    plan
}

/// Extension straight from the mime subtype: `image/png` is `png`,
/// `image/svg+xml` stays `svg+xml`.
fn image_extension(mime_type: &str) -> Option<&str> {
    mime_type
        .strip_prefix("image/")
        .filter(|subtype| !subtype.is_empty())
}

/// Download every planned attachment concurrently and write the bodies into
/// `images_dir`.
///
/// Failures are logged and swallowed per attachment; the parent message just
/// ends up with one fewer [`ResolvedMedia`]. Never fails the run.
pub async fn fetch_thread_media<D>(
    downloader: &D,
    messages: Vec<Message>,
    images_dir: &Path,
) -> (Vec<AnnotatedMessage>, DownloadReport)
where
    D: MediaDownloader + ?Sized,
{
    let plan = plan_downloads(&messages);

    let mut annotated: Vec<AnnotatedMessage> = messages
        .into_iter()
        .map(|message| AnnotatedMessage {
            message,
            media: Vec::new(),
        })
        .collect();

    if plan.is_empty() {
        return (annotated, DownloadReport::default());
    }

    let downloads = plan
        .iter()
        .map(|planned| fetch_one(downloader, planned, images_dir));
    let results = join_all(downloads).await;

    let mut report = DownloadReport::default();
    for (planned, result) in plan.iter().zip(results) {
        match result {
            Ok(()) => {
                annotated[planned.message_index].media.push(ResolvedMedia {
                    local_file_name: planned.file_name.clone(),
                    relative_path: planned.relative_path.clone(),
                    original_name: planned.original_name.clone(),
                });
                report.resolved += 1;
            }
            Err(e) => {
                warn!(
                    url = %planned.source_url,
                    file = %planned.file_name,
                    "Failed to download image: {e}"
                );
                report.failed += 1;
            }
        }
    }

    (annotated, report)
}

async fn fetch_one<D>(
    downloader: &D,
    planned: &PlannedDownload,
    images_dir: &Path,
) -> Result<(), MediaDownloadError>
where
    D: MediaDownloader + ?Sized,
{
    let bytes = downloader.download(&planned.source_url).await?;

    let path = images_dir.join(&planned.file_name);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| MediaDownloadError::Io {
            path: path.clone(),
            source,
        })?;

    debug!(path = %path.display(), bytes = bytes.len(), "Saved image attachment");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    fn message_with_files(files: serde_json::Value) -> Message {
        serde_json::from_value(json!({ "ts": "1700000000.000100", "files": files }))
            .expect("Failed to build test message")
    }

    #[test]
    fn test_plan_numbers_across_messages() {
        let messages = vec![
            message_with_files(json!([
                { "name": "a.png", "mimetype": "image/png", "url_private": "https://f/a" },
                { "name": "b.jpg", "mimetype": "image/jpeg", "url_private": "https://f/b" }
            ])),
            message_with_files(json!([
                { "name": "c.gif", "mimetype": "image/gif", "url_private": "https://f/c" }
            ])),
        ];

        let plan = plan_downloads(&messages);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].file_name, "image_1.png");
        assert_eq!(plan[1].file_name, "image_2.jpeg");
        assert_eq!(plan[2].file_name, "image_3.gif");
        assert_eq!(plan[2].message_index, 1);
        assert_eq!(plan[0].relative_path, "images/image_1.png");
    }

    #[test]
    fn test_plan_skips_non_images() {
        let messages = vec![message_with_files(json!([
            { "name": "notes.pdf", "mimetype": "application/pdf", "url_private": "https://f/n" },
            { "name": "pic.png", "mimetype": "image/png", "url_private": "https://f/p" },
            { "name": "clip.mp4", "mimetype": "video/mp4", "url_private": "https://f/c" }
        ]))];

        let plan = plan_downloads(&messages);

        assert_eq!(plan.len(), 1, "Only the image should be planned");
        assert_eq!(plan[0].file_name, "image_1.png");
        assert_eq!(plan[0].original_name, "pic.png");
    }

    #[test]
    fn test_extension_is_subtype_verbatim() {
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("image/svg+xml"), Some("svg+xml"));
        assert_eq!(image_extension("application/pdf"), None);
        assert_eq!(image_extension("image/"), None);
    }

    #[test]
    fn test_plan_empty_without_attachments() {
        let messages: Vec<Message> = vec![
            serde_json::from_value(json!({ "ts": "1700000000.000100", "text": "hi" }))
                .expect("Failed to build test message"),
        ];
        assert!(plan_downloads(&messages).is_empty());
    }

    /// Serves fixed bytes for every URL except ones containing "missing".
    struct FakeDownloader;

    #[async_trait]
    impl MediaDownloader for FakeDownloader {
        async fn download(&self, url: &str) -> Result<Vec<u8>, MediaDownloadError> {
            if url.contains("missing") {
                Err(MediaDownloadError::Status(reqwest::StatusCode::NOT_FOUND))
            } else {
                Ok(url.as_bytes().to_vec())
            }
        }
    }

    #[tokio::test]
    async fn test_failed_download_spares_siblings() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let messages = vec![message_with_files(json!([
            { "name": "a.png", "mimetype": "image/png", "url_private": "https://f/a" },
            { "name": "b.png", "mimetype": "image/png", "url_private": "https://f/missing" },
            { "name": "c.png", "mimetype": "image/png", "url_private": "https://f/c" }
        ]))];

        let (annotated, report) = fetch_thread_media(&FakeDownloader, messages, dir.path()).await;

        assert_eq!(report.resolved, 2);
        assert_eq!(report.failed, 1);

        let media = &annotated[0].media;
        assert_eq!(media.len(), 2, "Failed download should leave no entry");
        assert_eq!(media[0].local_file_name, "image_1.png");
        assert_eq!(media[1].local_file_name, "image_3.png");

        assert!(dir.path().join("image_1.png").is_file());
        assert!(
            !dir.path().join("image_2.png").exists(),
            "Failed download should leave no file behind"
        );
        assert!(dir.path().join("image_3.png").is_file());
    }

    #[tokio::test]
    async fn test_no_media_returns_messages_untouched() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let messages: Vec<Message> =
            vec![serde_json::from_value(json!({ "ts": "1700000000.000100", "text": "plain" }))
                .expect("Failed to build test message")];

        let (annotated, report) = fetch_thread_media(&FakeDownloader, messages, dir.path()).await;

        assert_eq!(annotated.len(), 1);
        assert!(annotated[0].media.is_empty());
        assert_eq!(report.resolved, 0);
        assert_eq!(report.failed, 0);
    }
}
