//! Committing uploaded bytes to the storage tree.
//!
//! Bytes are streamed into a staging file created in the destination folder and then moved
//! into place without replacing anything that already exists. A reader therefore sees either
//! no file or the complete file at the returned path, and a failed upload leaves nothing
//! behind.

use crate::constants::STAGING_FILE_PREFIX;
use crate::{io_error, FilesError, PathSandbox};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};

/// Result of a successful blob write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Path relative to the storage anchor, `/`-separated
    pub relative_path: String,

    /// Number of bytes written
    pub size_bytes: u64,

    /// Hexadecimal SHA-256 digest of the written content
    pub sha256: String,
}

/// Writes `content` to `<anchor>/<folder>/<stored_name>`.
///
/// The folder and the final file path are each resolved through the sandbox. The folder is
/// created if missing (concurrent creation is fine). The stream is never buffered whole in
/// memory.
///
/// # Errors
///
/// Returns `FilesError` if:
/// - `content` yields no bytes (`EmptyUpload`, nothing is created on disk)
/// - the folder or file path escapes the anchor (`ContainmentViolation`)
/// - a file already exists at the target path (I/O, `AlreadyExists`)
/// - directory creation, copying, syncing or the final move fails (I/O)
pub fn write_blob(
    sandbox: &PathSandbox,
    folder: &str,
    stored_name: &str,
    content: impl Read,
) -> Result<StoredBlob, FilesError> {
    let mut reader = BufReader::new(content);
    if reader
        .fill_buf()
        .map_err(|e| io_error(e, "Failed to read upload"))?
        .is_empty()
    {
        return Err(FilesError::EmptyUpload);
    }

    let directory = sandbox.resolve(folder)?;
    fs::create_dir_all(&directory).map_err(|e| {
        io_error(
            e,
            format!("Failed to create storage directory {}", directory.display()),
        )
    })?;

    let target = sandbox.resolve(&format!("{}/{}", folder, stored_name))?;
    if target.parent() != Some(directory.as_path()) {
        return Err(FilesError::ContainmentViolation(format!(
            "{}/{}",
            folder, stored_name
        )));
    }

    let mut staging = tempfile::Builder::new()
        .prefix(STAGING_FILE_PREFIX)
        .tempfile_in(&directory)
        .map_err(|e| {
            io_error(
                e,
                format!("Failed to create staging file in {}", directory.display()),
            )
        })?;

    let mut hasher = Sha256::new();
    let size_bytes = copy_hashing(&mut reader, staging.as_file_mut(), &mut hasher)
        .map_err(|e| io_error(e, format!("Failed to write file to {}", target.display())))?;

    staging
        .as_file()
        .sync_all()
        .map_err(|e| io_error(e, format!("Failed to sync file {}", target.display())))?;

    staging
        .persist_noclobber(&target)
        .map_err(|e| io_error(e.error, format!("Failed to move file to {}", target.display())))?;

    let relative_path = sandbox.relativize(&target)?;
    let sha256 = hex::encode(hasher.finalize());

    tracing::debug!(path = %relative_path, size_bytes, "blob committed");

    Ok(StoredBlob {
        relative_path,
        size_bytes,
        sha256,
    })
}

fn copy_hashing(
    reader: &mut impl Read,
    writer: &mut impl Write,
    hasher: &mut Sha256,
) -> std::io::Result<u64> {
    let mut buffer = [0u8; 64 * 1024];
    let mut total = 0u64;

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
        writer.write_all(&buffer[..read])?;
        total += read as u64;
    }

    writer.flush()?;
    Ok(total)
}
