//! Resolving stored blobs for download.

use crate::constants::{DEFAULT_CONTENT_TYPE, SNIFF_LEN};
use crate::{io_error, FilesError, PathSandbox};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// An open blob ready to be streamed to a caller.
///
/// `file` is positioned at the start of the content. Read it incrementally; blobs are
/// unbounded in size.
#[derive(Debug)]
pub struct BlobDownload {
    pub file: File,

    /// Name to present to the caller (for example in `Content-Disposition`)
    pub filename: String,

    /// Detected media type, or `application/octet-stream`
    pub content_type: String,

    pub size_bytes: u64,
}

/// Opens the blob at `stored_relative_path` for streaming.
///
/// The media type is sniffed from the leading bytes, then guessed from the file extension,
/// then defaults to [`DEFAULT_CONTENT_TYPE`].
///
/// # Errors
///
/// Returns `FilesError::NotFound` if the stored path is missing or blank, if the sandbox
/// rejects it, or if no regular file exists there. Returns `FilesError::Io` if the file exists
/// but cannot be opened or read.
pub fn load_blob(
    sandbox: &PathSandbox,
    stored_relative_path: Option<&str>,
    display_filename: &str,
) -> Result<BlobDownload, FilesError> {
    let relative = stored_relative_path
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| FilesError::NotFound("Stored file path is missing".into()))?;

    // A hostile stored path is indistinguishable from a missing file to the caller.
    let path = sandbox.resolve(relative).map_err(|e| match e {
        FilesError::ContainmentViolation(_) => {
            FilesError::NotFound(format!("Stored file path is invalid: {}", relative))
        }
        other => other,
    })?;

    let metadata = match fs::metadata(&path) {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => {
            return Err(FilesError::NotFound(format!(
                "Stored file not found: {}",
                relative
            )))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(FilesError::NotFound(format!(
                "Stored file not found: {}",
                relative
            )))
        }
        Err(e) => return Err(io_error(e, format!("Failed to inspect {}", path.display()))),
    };

    let mut file = File::open(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FilesError::NotFound(format!("Stored file not found: {}", relative)),
        _ => io_error(e, format!("Failed to open {}", path.display())),
    })?;

    let content_type = detect_content_type(&mut file, &path)
        .map_err(|e| io_error(e, format!("Failed to detect file type of {}", path.display())))?;

    Ok(BlobDownload {
        file,
        filename: display_filename.to_owned(),
        content_type,
        size_bytes: metadata.len(),
    })
}

/// Sniffs the media type and rewinds `file` afterwards.
fn detect_content_type(file: &mut File, path: &Path) -> std::io::Result<String> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    file.by_ref().take(SNIFF_LEN).read_to_end(&mut head)?;
    file.seek(SeekFrom::Start(0))?;

    let content_type = infer::get(&head)
        .map(|kind| kind.mime_type().to_owned())
        .or_else(|| mime_guess::from_path(path).first_raw().map(str::to_owned))
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned());

    Ok(content_type)
}
