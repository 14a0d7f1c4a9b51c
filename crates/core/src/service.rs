//! File record service.
//!
//! [`FileService`] joins the metadata store and the blob storage in `hub_files`. Every path it
//! touches goes through the configured sandbox, and callers only ever see download routes.
//!
//! # Replace ordering
//!
//! Replacing content writes the new blob, saves the record pointing at it, and only then removes
//! the old blob. Removal is best-effort: if it fails the replace still succeeds and the old blob
//! is left behind. Deleting a record never removes its blob.

use crate::config::CoreConfig;
use crate::metadata::{FileRecordStore, ProjectDirectory};
use crate::record::{FileRecord, FileRecordDto};
use crate::{FileServiceError, FileServiceResult};
use hub_files::{
    discard_blob, load_blob, project_folder, sanitize_filename, stored_name, write_blob,
    BlobDownload, FilesError, StoredBlob, FALLBACK_FILENAME,
};
use hub_types::{NonEmptyText, ProjectId, RecordId};
use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;

/// Store, replace and retrieve operations for file records.
#[derive(Clone)]
pub struct FileService {
    cfg: Arc<CoreConfig>,
    records: Arc<dyn FileRecordStore>,
    projects: Arc<dyn ProjectDirectory>,
}

impl FileService {
    pub fn new(
        cfg: Arc<CoreConfig>,
        records: Arc<dyn FileRecordStore>,
        projects: Arc<dyn ProjectDirectory>,
    ) -> Self {
        Self {
            cfg,
            records,
            projects,
        }
    }

    /// Stores an upload as a new file record.
    ///
    /// The blob lands in `project-{id}/` or `unassigned/` under a fresh random name. If the
    /// record cannot be saved afterwards, the blob is removed again.
    ///
    /// # Errors
    ///
    /// - `EmptyUpload` if `content` has no bytes
    /// - `ProjectNotFound` if `project_id` names an unknown project
    /// - storage errors from writing the blob, metadata errors from saving the record
    pub fn store(
        &self,
        content: impl Read,
        filename: Option<&str>,
        project_id: Option<ProjectId>,
    ) -> FileServiceResult<FileRecordDto> {
        let content = non_empty(content)?;
        if let Some(project_id) = project_id {
            self.require_project(project_id)?;
        }

        let safe_name = sanitize_filename(filename);
        let blob = self.write(project_id, &safe_name, content)?;

        let record = FileRecord {
            id: None,
            filename: Some(safe_name),
            stored_relative_path: Some(blob.relative_path.clone()),
            project_id,
        };
        let saved = self.save_or_discard(record, &blob)?;

        tracing::info!(
            record_id = ?saved.id,
            path = %blob.relative_path,
            size_bytes = blob.size_bytes,
            sha256 = %blob.sha256,
            "stored file"
        );
        Ok(self.to_dto(&saved))
    }

    /// Replaces the content of an existing record.
    ///
    /// The record keeps its project; the new blob goes into that project's folder. The previous
    /// blob is removed after the record has been saved, and a failure to remove it is logged
    /// rather than returned.
    ///
    /// # Errors
    ///
    /// - `EmptyUpload` if `content` has no bytes
    /// - `RecordNotFound` if there is no record `id`
    /// - storage errors from writing the blob, metadata errors from saving the record
    pub fn replace_content(
        &self,
        id: RecordId,
        content: impl Read,
        filename: Option<&str>,
    ) -> FileServiceResult<FileRecordDto> {
        let content = non_empty(content)?;
        let mut record = self.find_record(id)?;

        let safe_name = sanitize_filename(filename);
        let blob = self.write(record.project_id, &safe_name, content)?;

        let previous = record
            .stored_relative_path
            .replace(blob.relative_path.clone());
        record.filename = Some(safe_name);
        let saved = self.save_or_discard(record, &blob)?;

        let cleanup = discard_blob(self.cfg.sandbox(), previous.as_deref());

        tracing::info!(
            record_id = %id,
            path = %blob.relative_path,
            previous = ?previous,
            cleanup = ?cleanup,
            size_bytes = blob.size_bytes,
            "replaced file content"
        );
        Ok(self.to_dto(&saved))
    }

    /// Opens the blob behind record `id` for streaming.
    ///
    /// # Errors
    ///
    /// `RecordNotFound` if there is no such record; `Storage(NotFound)` if the record has no
    /// stored path, the path is rejected by the sandbox, or no file exists there.
    pub fn retrieve(&self, id: RecordId) -> FileServiceResult<BlobDownload> {
        let record = self.find_record(id)?;
        let display_name = record
            .filename
            .as_ref()
            .map(NonEmptyText::as_str)
            .unwrap_or(FALLBACK_FILENAME);

        let download = load_blob(
            self.cfg.sandbox(),
            record.stored_relative_path.as_deref(),
            display_name,
        )?;

        tracing::debug!(
            record_id = %id,
            content_type = %download.content_type,
            "opened file for download"
        );
        Ok(download)
    }

    /// Creates a metadata-only record from `dto`.
    pub fn create(&self, dto: &FileRecordDto) -> FileServiceResult<FileRecordDto> {
        let mut record = FileRecord::default();
        self.apply_dto(&mut record, dto)?;
        let saved = self.records.save(record)?;
        Ok(self.to_dto(&saved))
    }

    /// Updates the metadata of record `id` from `dto`.
    ///
    /// A `path` that is one of our download routes is ignored. Any other non-blank `path` must
    /// resolve inside the storage root and replaces the stored path.
    pub fn update(&self, id: RecordId, dto: &FileRecordDto) -> FileServiceResult<FileRecordDto> {
        let mut record = self.find_record(id)?;
        self.apply_dto(&mut record, dto)?;
        let saved = self.records.save(record)?;
        Ok(self.to_dto(&saved))
    }

    pub fn find(&self, id: RecordId) -> FileServiceResult<Option<FileRecordDto>> {
        Ok(self.records.find(id)?.map(|record| self.to_dto(&record)))
    }

    pub fn list(&self) -> FileServiceResult<Vec<FileRecordDto>> {
        Ok(self
            .records
            .list()?
            .iter()
            .map(|record| self.to_dto(record))
            .collect())
    }

    /// Deletes record `id`. The blob stays on disk.
    pub fn delete(&self, id: RecordId) -> FileServiceResult<()> {
        if !self.records.delete(id)? {
            return Err(FileServiceError::RecordNotFound(id));
        }
        tracing::info!(record_id = %id, "deleted file record");
        Ok(())
    }

    fn write(
        &self,
        project_id: Option<ProjectId>,
        safe_name: &NonEmptyText,
        content: impl Read,
    ) -> FileServiceResult<StoredBlob> {
        Ok(write_blob(
            self.cfg.sandbox(),
            &project_folder(project_id),
            &stored_name(safe_name),
            content,
        )?)
    }

    fn save_or_discard(
        &self,
        record: FileRecord,
        blob: &StoredBlob,
    ) -> FileServiceResult<FileRecord> {
        match self.records.save(record) {
            Ok(saved) => Ok(saved),
            Err(e) => {
                tracing::error!(
                    path = %blob.relative_path,
                    error = %e,
                    "failed to save file record"
                );
                discard_blob(self.cfg.sandbox(), Some(&blob.relative_path));
                Err(e.into())
            }
        }
    }

    fn find_record(&self, id: RecordId) -> FileServiceResult<FileRecord> {
        self.records
            .find(id)?
            .ok_or(FileServiceError::RecordNotFound(id))
    }

    fn require_project(&self, id: ProjectId) -> FileServiceResult<()> {
        if self.projects.project_exists(id)? {
            Ok(())
        } else {
            Err(FileServiceError::ProjectNotFound(id))
        }
    }

    fn apply_dto(&self, record: &mut FileRecord, dto: &FileRecordDto) -> FileServiceResult<()> {
        record.filename = dto
            .filename
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(|name| sanitize_filename(Some(name)));

        if let Some(path) = dto.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            if self.cfg.routes().looks_like_route(path) {
                tracing::debug!(path = %path, "ignoring download route supplied as path");
            } else {
                let sandbox = self.cfg.sandbox();
                let resolved = sandbox.resolve(path)?;
                record.stored_relative_path = Some(sandbox.relativize(&resolved)?);
            }
        }

        record.project_id = match dto.project_id {
            Some(project_id) => {
                self.require_project(project_id)?;
                Some(project_id)
            }
            None => None,
        };

        Ok(())
    }

    fn to_dto(&self, record: &FileRecord) -> FileRecordDto {
        FileRecordDto {
            id: record.id,
            filename: record.filename.as_ref().map(|name| name.to_string()),
            path: self.cfg.routes().encode(record.id),
            project_id: record.project_id,
        }
    }
}

/// Fails with `EmptyUpload` unless `content` yields at least one byte.
fn non_empty<R: Read>(content: R) -> FileServiceResult<BufReader<R>> {
    let mut reader = BufReader::new(content);
    if reader.fill_buf().map_err(FilesError::from)?.is_empty() {
        return Err(FilesError::EmptyUpload.into());
    }
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{InMemoryMetadata, MetadataError, MetadataResult};
    use crate::ErrorKind;
    use hub_files::DEFAULT_DOWNLOAD_ROUTE_TEMPLATE;
    use std::fs;
    use std::io::{self, Read};
    use std::path::Path;
    use tempfile::TempDir;

    fn test_cfg(storage_dir: &Path) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(storage_dir, DEFAULT_DOWNLOAD_ROUTE_TEMPLATE)
                .expect("CoreConfig::new should succeed"),
        )
    }

    fn test_service(temp_dir: &TempDir) -> (FileService, Arc<InMemoryMetadata>) {
        let metadata = Arc::new(InMemoryMetadata::new());
        metadata.add_project(ProjectId::new(42)).unwrap();
        let service = FileService::new(
            test_cfg(&temp_dir.path().join("storage")),
            metadata.clone(),
            metadata.clone(),
        );
        (service, metadata)
    }

    fn read_download(mut download: BlobDownload) -> Vec<u8> {
        let mut buffer = Vec::new();
        download.file.read_to_end(&mut buffer).unwrap();
        buffer
    }

    fn stored_path(metadata: &InMemoryMetadata, id: RecordId) -> String {
        metadata
            .find(id)
            .unwrap()
            .unwrap()
            .stored_relative_path
            .unwrap()
    }

    /// Store that refuses every write.
    struct ReadOnlyStore;

    impl FileRecordStore for ReadOnlyStore {
        fn find(&self, _id: RecordId) -> MetadataResult<Option<FileRecord>> {
            Ok(None)
        }

        fn save(&self, _record: FileRecord) -> MetadataResult<FileRecord> {
            Err(MetadataError::Unavailable("read-only".into()))
        }

        fn delete(&self, _id: RecordId) -> MetadataResult<bool> {
            Ok(false)
        }

        fn list(&self) -> MetadataResult<Vec<FileRecord>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_store_and_retrieve_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);

        let dto = service
            .store(&b"a,b\n1,2\n"[..], Some("report.csv"), Some(ProjectId::new(42)))
            .expect("store should succeed");

        let id = dto.id.expect("stored record has an id");
        assert_eq!(dto.filename.as_deref(), Some("report.csv"));
        assert_eq!(dto.project_id, Some(ProjectId::new(42)));
        assert_eq!(dto.path, Some(format!("/api/files/{}/download", id)));

        let path = stored_path(&metadata, id);
        assert!(path.starts_with("project-42/"));
        assert!(path.ends_with("-report.csv"));

        let download = service.retrieve(id).expect("retrieve should succeed");
        assert_eq!(download.filename, "report.csv");
        assert_eq!(download.content_type, "text/csv");
        assert_eq!(read_download(download), b"a,b\n1,2\n");
    }

    #[test]
    fn test_store_without_project_goes_to_unassigned() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);

        let dto = service.store(&b"notes"[..], None, None).unwrap();

        let path = stored_path(&metadata, dto.id.unwrap());
        assert!(path.starts_with("unassigned/"));
        assert!(path.ends_with("-file"));
        assert_eq!(dto.filename.as_deref(), Some("file"));
    }

    #[test]
    fn test_store_sanitises_filename() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);

        let dto = service
            .store(&b"root:x:0:0"[..], Some("../../etc/passwd"), None)
            .unwrap();

        assert_eq!(dto.filename.as_deref(), Some("passwd"));
        let path = stored_path(&metadata, dto.id.unwrap());
        assert_eq!(path.matches('/').count(), 1);
        assert!(temp_dir
            .path()
            .join("storage")
            .join(&path)
            .is_file());
    }

    #[test]
    fn test_store_same_filename_twice_does_not_collide() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);

        let first = service
            .store(&b"one"[..], Some("report.csv"), Some(ProjectId::new(42)))
            .unwrap();
        let second = service
            .store(&b"two"[..], Some("report.csv"), Some(ProjectId::new(42)))
            .unwrap();

        let first_path = stored_path(&metadata, first.id.unwrap());
        let second_path = stored_path(&metadata, second.id.unwrap());
        assert_ne!(first_path, second_path);

        assert_eq!(read_download(service.retrieve(first.id.unwrap()).unwrap()), b"one");
        assert_eq!(read_download(service.retrieve(second.id.unwrap()).unwrap()), b"two");
    }

    #[test]
    fn test_store_rejects_empty_upload() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);

        let err = service
            .store(io::empty(), Some("empty.txt"), None)
            .expect_err("empty upload should fail");

        assert_eq!(err.kind(), ErrorKind::EmptyUpload);
        assert!(metadata.list().unwrap().is_empty());
    }

    #[test]
    fn test_store_rejects_unknown_project_before_writing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, _metadata) = test_service(&temp_dir);

        let err = service
            .store(&b"data"[..], Some("a.txt"), Some(ProjectId::new(7)))
            .expect_err("unknown project should fail");

        assert!(matches!(err, FileServiceError::ProjectNotFound(id) if id == ProjectId::new(7)));
        assert!(!temp_dir.path().join("storage").join("project-7").exists());
    }

    #[test]
    fn test_store_discards_blob_when_record_save_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let metadata = Arc::new(InMemoryMetadata::new());
        let service = FileService::new(
            test_cfg(&temp_dir.path().join("storage")),
            Arc::new(ReadOnlyStore),
            metadata,
        );

        let err = service
            .store(&b"data"[..], Some("a.txt"), None)
            .expect_err("save failure should surface");

        assert_eq!(err.kind(), ErrorKind::IoFailure);
        let unassigned = temp_dir.path().join("storage").join("unassigned");
        assert_eq!(fs::read_dir(unassigned).unwrap().count(), 0);
    }

    #[test]
    fn test_replace_content_swaps_blob_and_removes_old() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);
        let dto = service
            .store(&b"old"[..], Some("v1.txt"), Some(ProjectId::new(42)))
            .unwrap();
        let id = dto.id.unwrap();
        let old_path = stored_path(&metadata, id);

        let replaced = service
            .replace_content(id, &b"new content"[..], Some("v2.txt"))
            .expect("replace should succeed");

        assert_eq!(replaced.id, Some(id));
        assert_eq!(replaced.filename.as_deref(), Some("v2.txt"));
        assert_eq!(replaced.project_id, Some(ProjectId::new(42)));

        let new_path = stored_path(&metadata, id);
        assert_ne!(new_path, old_path);
        assert!(new_path.starts_with("project-42/"));
        assert!(!temp_dir.path().join("storage").join(&old_path).exists());

        let download = service.retrieve(id).unwrap();
        assert_eq!(download.filename, "v2.txt");
        assert_eq!(read_download(download), b"new content");
    }

    #[test]
    fn test_replace_content_succeeds_when_cleanup_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);
        let dto = service.store(&b"old"[..], Some("a.txt"), None).unwrap();
        let id = dto.id.unwrap();

        // Point the record at a directory; removing it as a file fails.
        let mut record = metadata.find(id).unwrap().unwrap();
        record.stored_relative_path = Some("unassigned".into());
        metadata.save(record).unwrap();

        let replaced = service
            .replace_content(id, &b"fresh"[..], Some("b.txt"))
            .expect("cleanup failure must not fail replace");

        assert_eq!(replaced.filename.as_deref(), Some("b.txt"));
        assert!(temp_dir.path().join("storage").join("unassigned").is_dir());
        assert_eq!(read_download(service.retrieve(id).unwrap()), b"fresh");
    }

    #[test]
    fn test_replace_content_ignores_hostile_previous_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);
        let victim = temp_dir.path().join("victim.txt");
        fs::write(&victim, b"keep").unwrap();

        let record = metadata
            .save(FileRecord {
                stored_relative_path: Some("../victim.txt".into()),
                ..FileRecord::default()
            })
            .unwrap();
        let id = record.id.unwrap();

        service
            .replace_content(id, &b"new"[..], Some("new.txt"))
            .expect("replace should succeed");

        assert!(victim.exists());
        assert_eq!(read_download(service.retrieve(id).unwrap()), b"new");
    }

    #[test]
    fn test_replace_content_preconditions() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, _metadata) = test_service(&temp_dir);

        let missing = service
            .replace_content(RecordId::new(99), &b"x"[..], Some("x.txt"))
            .expect_err("unknown record should fail");
        assert!(matches!(missing, FileServiceError::RecordNotFound(_)));

        let id = service.store(&b"x"[..], None, None).unwrap().id.unwrap();
        let empty = service
            .replace_content(id, io::empty(), Some("x.txt"))
            .expect_err("empty upload should fail");
        assert_eq!(empty.kind(), ErrorKind::EmptyUpload);
    }

    #[test]
    fn test_replace_content_keeps_record_when_save_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);
        let id = service.store(&b"keep"[..], Some("a.txt"), None).unwrap().id.unwrap();
        let original_path = stored_path(&metadata, id);

        // A service over the same storage whose saves fail, but whose finds succeed.
        struct FindOnly(Arc<InMemoryMetadata>);
        impl FileRecordStore for FindOnly {
            fn find(&self, id: RecordId) -> MetadataResult<Option<FileRecord>> {
                self.0.find(id)
            }
            fn save(&self, _record: FileRecord) -> MetadataResult<FileRecord> {
                Err(MetadataError::Unavailable("down".into()))
            }
            fn delete(&self, id: RecordId) -> MetadataResult<bool> {
                self.0.delete(id)
            }
            fn list(&self) -> MetadataResult<Vec<FileRecord>> {
                self.0.list()
            }
        }
        let failing = FileService::new(
            test_cfg(&temp_dir.path().join("storage")),
            Arc::new(FindOnly(metadata.clone())),
            metadata.clone(),
        );

        failing
            .replace_content(id, &b"new"[..], Some("b.txt"))
            .expect_err("save failure should surface");

        assert_eq!(stored_path(&metadata, id), original_path);
        assert_eq!(read_download(service.retrieve(id).unwrap()), b"keep");
        let unassigned = temp_dir.path().join("storage").join("unassigned");
        assert_eq!(fs::read_dir(unassigned).unwrap().count(), 1);
    }

    #[test]
    fn test_update_ignores_download_route_as_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);
        let dto = service.store(&b"x"[..], Some("a.txt"), None).unwrap();
        let id = dto.id.unwrap();
        let original_path = stored_path(&metadata, id);

        let mut update = dto.clone();
        update.filename = Some("renamed.txt".into());
        let updated = service.update(id, &update).expect("update should succeed");

        assert_eq!(updated.filename.as_deref(), Some("renamed.txt"));
        assert_eq!(updated.path, dto.path);
        assert_eq!(stored_path(&metadata, id), original_path);

        // Absolute URL form of the route is ignored too
        update.path = Some(format!("https://hub.example.com/api/files/{}/download", id));
        service.update(id, &update).unwrap();
        assert_eq!(stored_path(&metadata, id), original_path);
    }

    #[test]
    fn test_update_accepts_contained_path_override() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);
        let id = service.store(&b"x"[..], Some("a.txt"), None).unwrap().id.unwrap();

        let update = FileRecordDto {
            filename: Some("a.txt".into()),
            path: Some("./unassigned//moved.txt".into()),
            ..FileRecordDto::default()
        };
        service.update(id, &update).unwrap();

        assert_eq!(stored_path(&metadata, id), "unassigned/moved.txt");
    }

    #[test]
    fn test_update_rejects_escaping_path_override() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);
        let id = service.store(&b"x"[..], Some("a.txt"), None).unwrap().id.unwrap();
        let original_path = stored_path(&metadata, id);

        let update = FileRecordDto {
            path: Some("../../etc/passwd".into()),
            ..FileRecordDto::default()
        };
        let err = service.update(id, &update).expect_err("escaping path should fail");

        assert_eq!(err.kind(), ErrorKind::ContainmentViolation);
        assert_eq!(stored_path(&metadata, id), original_path);
    }

    #[test]
    fn test_update_validates_project_and_sanitises_filename() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, _metadata) = test_service(&temp_dir);
        let id = service.store(&b"x"[..], None, None).unwrap().id.unwrap();

        let err = service
            .update(
                id,
                &FileRecordDto {
                    project_id: Some(ProjectId::new(5)),
                    ..FileRecordDto::default()
                },
            )
            .expect_err("unknown project should fail");
        assert!(matches!(err, FileServiceError::ProjectNotFound(_)));

        let updated = service
            .update(
                id,
                &FileRecordDto {
                    filename: Some("dir/sub/name.txt".into()),
                    project_id: Some(ProjectId::new(42)),
                    ..FileRecordDto::default()
                },
            )
            .unwrap();
        assert_eq!(updated.filename.as_deref(), Some("name.txt"));
        assert_eq!(updated.project_id, Some(ProjectId::new(42)));
    }

    #[test]
    fn test_create_metadata_only_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);

        let created = service
            .create(&FileRecordDto {
                filename: Some("placeholder.txt".into()),
                path: Some("/api/files/1/download".into()),
                ..FileRecordDto::default()
            })
            .unwrap();

        let id = created.id.unwrap();
        assert_eq!(created.path, Some(format!("/api/files/{}/download", id)));
        assert!(metadata.find(id).unwrap().unwrap().stored_relative_path.is_none());
    }

    #[test]
    fn test_retrieve_not_found_cases() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);

        let unknown = service.retrieve(RecordId::new(1234)).expect_err("no record");
        assert_eq!(unknown.kind(), ErrorKind::NotFound);

        let empty_path = service
            .create(&FileRecordDto {
                filename: Some("x.txt".into()),
                ..FileRecordDto::default()
            })
            .unwrap();
        let err = service.retrieve(empty_path.id.unwrap()).expect_err("no stored path");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let stored = service.store(&b"x"[..], Some("x.txt"), None).unwrap();
        let path = stored_path(&metadata, stored.id.unwrap());
        fs::remove_file(temp_dir.path().join("storage").join(path)).unwrap();
        let err = service.retrieve(stored.id.unwrap()).expect_err("blob removed");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let hostile = metadata
            .save(FileRecord {
                stored_relative_path: Some("../../etc/passwd".into()),
                ..FileRecord::default()
            })
            .unwrap();
        let err = service.retrieve(hostile.id.unwrap()).expect_err("hostile path");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_delete_leaves_blob_on_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, metadata) = test_service(&temp_dir);
        let id = service.store(&b"x"[..], Some("x.txt"), None).unwrap().id.unwrap();
        let path = stored_path(&metadata, id);

        service.delete(id).expect("delete should succeed");

        assert!(service.find(id).unwrap().is_none());
        assert!(temp_dir.path().join("storage").join(path).is_file());
        assert!(matches!(
            service.delete(id),
            Err(FileServiceError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_list_exposes_routes_only() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, _metadata) = test_service(&temp_dir);
        service.store(&b"1"[..], Some("one.txt"), None).unwrap();
        service
            .store(&b"2"[..], Some("two.txt"), Some(ProjectId::new(42)))
            .unwrap();

        let listed = service.list().unwrap();

        assert_eq!(listed.len(), 2);
        for dto in listed {
            let path = dto.path.unwrap();
            assert!(path.starts_with("/api/files/"));
            assert!(path.ends_with("/download"));
        }
    }
}
