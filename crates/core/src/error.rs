use crate::metadata::MetadataError;
use hub_files::FilesError;
use hub_types::{ProjectId, RecordId};

#[derive(Debug, thiserror::Error)]
pub enum FileServiceError {
    #[error(transparent)]
    Storage(#[from] FilesError),
    #[error("file record not found: {0}")]
    RecordNotFound(RecordId),
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    #[error("metadata store error: {0}")]
    Metadata(#[from] MetadataError),
}

pub type FileServiceResult<T> = std::result::Result<T, FileServiceError>;

/// Caller-facing classification of a [`FileServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input tried to reach outside the storage root; a client error
    ContainmentViolation,
    /// Record, project or stored blob is absent
    NotFound,
    /// Upload carried no bytes
    EmptyUpload,
    /// Malformed request or configuration value
    InvalidInput,
    /// Underlying storage or metadata failure
    IoFailure,
}

impl FileServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(FilesError::ContainmentViolation(_)) => ErrorKind::ContainmentViolation,
            Self::Storage(FilesError::NotFound(_))
            | Self::RecordNotFound(_)
            | Self::ProjectNotFound(_) => ErrorKind::NotFound,
            Self::Storage(FilesError::EmptyUpload) => ErrorKind::EmptyUpload,
            Self::Storage(FilesError::InvalidRouteTemplate(_)) => ErrorKind::InvalidInput,
            Self::Storage(FilesError::InvalidRootDirectory(_))
            | Self::Storage(FilesError::Io(_))
            | Self::Metadata(_) => ErrorKind::IoFailure,
        }
    }
}
