//! On-disk layout of one thread bundle.

use std::path::{Path, PathBuf};

pub const RAW_DATA_FILE: &str = "raw_data.json";
pub const DOCUMENT_FILE: &str = "conversation.md";
pub const IMAGES_DIR: &str = "images";
const ARCHIVE_SUFFIX: &str = "_archive.zip";

/// Paths for everything one archival run writes.
///
/// The whole bundle lives under `<output_dir>/<thread_id>/` and is owned by a
/// single run; nothing outside that directory is touched.
#[derive(Debug, Clone)]
pub struct ThreadBundle {
    root: PathBuf,
    thread_id: String,
}

impl ThreadBundle {
    #[must_use]
    pub fn new(output_dir: &Path, thread_id: &str) -> Self {
        Self {
            root: output_dir.join(thread_id),
            thread_id: thread_id.to_string(),
        }
    }

    /// Create the bundle directory and its images subdirectory.
    ///
    /// Idempotent: re-archiving a thread reuses the directories and
    /// overwrites files in place.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::create_dir_all(self.images_dir()).await
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn raw_data_path(&self) -> PathBuf {
        self.root.join(RAW_DATA_FILE)
    }

    #[must_use]
    pub fn document_path(&self) -> PathBuf {
        self.root.join(DOCUMENT_FILE)
    }

    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// The zip lives beside the files it packs, named after the thread.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(format!("{}{ARCHIVE_SUFFIX}", self.thread_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_layout() {
        let bundle = ThreadBundle::new(Path::new("/tmp/out"), "1741754154975769");

        assert_eq!(bundle.root(), Path::new("/tmp/out/1741754154975769"));
        assert_eq!(
            bundle.raw_data_path(),
            Path::new("/tmp/out/1741754154975769/raw_data.json")
        );
        assert_eq!(
            bundle.document_path(),
            Path::new("/tmp/out/1741754154975769/conversation.md")
        );
        assert_eq!(
            bundle.images_dir(),
            Path::new("/tmp/out/1741754154975769/images")
        );
        assert_eq!(
            bundle.archive_path(),
            Path::new("/tmp/out/1741754154975769/1741754154975769_archive.zip")
        );
    }

    #[tokio::test]
    async fn test_ensure_dirs_is_idempotent() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let bundle = ThreadBundle::new(dir.path(), "123456789012345");

        bundle.ensure_dirs().await.expect("First create should succeed");
        assert!(bundle.images_dir().is_dir());

        bundle
            .ensure_dirs()
            .await
            .expect("Recreating existing directories should succeed");
    }
}
