//! Bundle packaging.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::task::JoinError;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::bundle::{DOCUMENT_FILE, IMAGES_DIR, ThreadBundle};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip write failed: {0}")]
    Zip(#[from] ZipError),
    #[error("archive task panicked: {0}")]
    Join(#[from] JoinError),
}

/// Pack the rendered document and the images directory into the bundle's
/// zip file, returning the archive path.
///
/// Missing inputs are skipped; an archive with nothing in it is still a
/// valid result. The zip write runs on the blocking pool.
///
/// # Errors
///
/// Returns an error if the zip file cannot be created or an entry cannot be
/// written.
pub async fn pack_bundle(bundle: &ThreadBundle) -> Result<PathBuf, ArchiveError> {
    let archive_path = bundle.archive_path();
    let document_path = bundle.document_path();
    let images_dir = bundle.images_dir();

    tokio::task::spawn_blocking(move || write_archive(&archive_path, &document_path, &images_dir))
        .await?
}

fn write_archive(
    archive_path: &Path,
    document_path: &Path,
    images_dir: &Path,
) -> Result<PathBuf, ArchiveError> {
    let file = std::fs::File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    if document_path.is_file() {
        zip.start_file(DOCUMENT_FILE, options)?;
        std::io::Write::write_all(&mut zip, &std::fs::read(document_path)?)?;
    }

    if images_dir.is_dir() {
        let mut entries: Vec<_> = std::fs::read_dir(images_dir)?.collect::<Result<_, _>>()?;
        // Deterministic entry order regardless of readdir order
        entries.sort_by_key(std::fs::DirEntry::file_name);

        for entry in entries {
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            zip.start_file(format!("{IMAGES_DIR}/{name}"), options)?;
            std::io::Write::write_all(&mut zip, &std::fs::read(entry.path())?)?;
        }
    }

    zip.finish()?;
    Ok(archive_path.to_path_buf())
}
