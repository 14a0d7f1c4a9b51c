//! Metadata store collaborators.
//!
//! The core does not own record persistence. It talks to a [`FileRecordStore`] for records and
//! a [`ProjectDirectory`] to check that a project exists. [`InMemoryMetadata`] implements both
//! and backs the server binary and the tests.
//!
//! Neither trait promises per-record locking. Two concurrent replaces of the same record may
//! interleave; implementations that need stricter guarantees serialise writes per id.

use crate::record::FileRecord;
use hub_types::{ProjectId, RecordId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata store unavailable: {0}")]
    Unavailable(String),
}

pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

/// Lookup and update of file records keyed by id.
pub trait FileRecordStore: Send + Sync {
    fn find(&self, id: RecordId) -> MetadataResult<Option<FileRecord>>;

    /// Inserts or updates `record`, assigning an id when it has none. Returns the saved record.
    fn save(&self, record: FileRecord) -> MetadataResult<FileRecord>;

    /// Removes the record. Returns whether it existed.
    fn delete(&self, id: RecordId) -> MetadataResult<bool>;

    fn list(&self) -> MetadataResult<Vec<FileRecord>>;
}

/// Existence checks for projects.
pub trait ProjectDirectory: Send + Sync {
    fn project_exists(&self, id: ProjectId) -> MetadataResult<bool>;
}

#[derive(Debug, Default)]
struct Tables {
    records: BTreeMap<RecordId, FileRecord>,
    projects: BTreeSet<ProjectId>,
    last_id: i64,
}

/// Process-local metadata store. Ids are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct InMemoryMetadata {
    tables: Mutex<Tables>,
}

impl InMemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a project so records can be associated with it.
    pub fn add_project(&self, id: ProjectId) -> MetadataResult<()> {
        self.lock()?.projects.insert(id);
        Ok(())
    }

    fn lock(&self) -> MetadataResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| MetadataError::Unavailable("metadata lock poisoned".into()))
    }
}

impl FileRecordStore for InMemoryMetadata {
    fn find(&self, id: RecordId) -> MetadataResult<Option<FileRecord>> {
        Ok(self.lock()?.records.get(&id).cloned())
    }

    fn save(&self, mut record: FileRecord) -> MetadataResult<FileRecord> {
        let mut tables = self.lock()?;
        let id = match record.id {
            Some(id) => {
                tables.last_id = tables.last_id.max(id.get());
                id
            }
            None => {
                tables.last_id += 1;
                RecordId::new(tables.last_id)
            }
        };
        record.id = Some(id);
        tables.records.insert(id, record.clone());
        Ok(record)
    }

    fn delete(&self, id: RecordId) -> MetadataResult<bool> {
        Ok(self.lock()?.records.remove(&id).is_some())
    }

    fn list(&self) -> MetadataResult<Vec<FileRecord>> {
        Ok(self.lock()?.records.values().cloned().collect())
    }
}

impl ProjectDirectory for InMemoryMetadata {
    fn project_exists(&self, id: ProjectId) -> MetadataResult<bool> {
        Ok(self.lock()?.projects.contains(&id))
    }
}
