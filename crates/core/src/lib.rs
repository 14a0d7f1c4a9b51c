//! # Hub Core
//!
//! Core business logic for project hub file records.
//!
//! This crate links metadata records to the blobs stored by `hub_files`:
//! - Storing uploads as new records, or replacing the content of an existing record
//! - Resolving a record back to a streamable download
//! - Metadata-only create/update/delete, with download routes never persisted as paths
//!
//! **No API concerns**: HTTP routing, multipart parsing and authentication belong in `api-rest`.
//! Persistence of the records themselves is abstracted behind [`FileRecordStore`] and
//! [`ProjectDirectory`].

pub mod config;
pub mod constants;
pub mod error;
pub mod metadata;
pub mod record;
pub mod service;

pub use config::CoreConfig;
pub use error::{ErrorKind, FileServiceError, FileServiceResult};
pub use hub_files::{BlobDownload, FilesError};
pub use hub_types::{NonEmptyText, ProjectId, RecordId, TextError};
pub use metadata::{FileRecordStore, InMemoryMetadata, MetadataError, ProjectDirectory};
pub use record::{FileRecord, FileRecordDto};
pub use service::FileService;
