use async_trait::async_trait;
use rapor_core::model::{
    Kkm, Semester, SemesterError, SemesterId, Subject, SubjectCatalog, default_semesters,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::records::{decode_catalog, decode_semesters, encode_catalog, encode_semesters};

/// Key holding the JSON array of the five semesters.
pub const SEMESTERS_KEY: &str = "rapor_agit_data";
/// Key holding the JSON array of `{name, lastKKM}` catalog entries.
pub const CATALOG_KEY: &str = "rapor_agit_subjects_list";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<SemesterError> for StorageError {
    fn from(err: SemesterError) -> Self {
        match err {
            SemesterError::SubjectNotFound { .. } => StorageError::NotFound,
            other => StorageError::Conflict(other.to_string()),
        }
    }
}

//
// ─── KEY-VALUE SEAM ────────────────────────────────────────────────────────────
//

/// Durable string-to-string store, the equivalent of the browser's local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

//
// ─── GRADE REPOSITORY ──────────────────────────────────────────────────────────
//

/// Partial update for one semester slot. `None` fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemesterPatch {
    pub subjects: Option<Vec<Subject>>,
}

impl SemesterPatch {
    #[must_use]
    pub fn subjects(subjects: Vec<Subject>) -> Self {
        Self {
            subjects: Some(subjects),
        }
    }

    #[must_use]
    pub fn from_semester(semester: &Semester) -> Self {
        Self::subjects(semester.subjects().to_vec())
    }
}

/// Repository contract for the semester collection and the subject catalog.
#[async_trait]
pub trait GradeRepository: Send + Sync {
    /// Fetch all five semesters.
    ///
    /// Missing or unreadable data yields five empty semesters.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself fails.
    async fn read_semesters(&self) -> Result<Vec<Semester>, StorageError>;

    /// Merge `patch` into one semester slot and record the written subjects in
    /// the catalog. Returns the full updated collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the subjects repeat an id, or other
    /// storage errors.
    async fn write_semester(
        &self,
        id: SemesterId,
        patch: SemesterPatch,
    ) -> Result<Vec<Semester>, StorageError>;

    /// Reset both the semesters and the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_all(&self) -> Result<(), StorageError>;

    /// Fetch the subject catalog; missing or unreadable data yields an empty one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself fails.
    async fn read_catalog(&self) -> Result<SubjectCatalog, StorageError>;

    /// Record `kkm` as the latest threshold for `name`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or written.
    async fn upsert_catalog_entry(
        &self,
        name: &str,
        kkm: Kkm,
    ) -> Result<SubjectCatalog, StorageError>;
}

/// `GradeRepository` that keeps each collection as one JSON value in a
/// `KeyValueStore`.
///
/// Every write reads the whole value, changes it and writes it back; two
/// writers racing on the same key simply overwrite each other.
#[derive(Clone)]
pub struct KvGradeRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvGradeRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn save_catalog(&self, catalog: &SubjectCatalog) -> Result<(), StorageError> {
        self.store.set(CATALOG_KEY, &encode_catalog(catalog)?).await
    }
}

#[async_trait]
impl GradeRepository for KvGradeRepository {
    async fn read_semesters(&self) -> Result<Vec<Semester>, StorageError> {
        let Some(json) = self.store.get(SEMESTERS_KEY).await? else {
            return Ok(default_semesters());
        };
        match decode_semesters(&json) {
            Ok(semesters) => Ok(semesters),
            Err(err) => {
                tracing::warn!(key = SEMESTERS_KEY, error = %err, "stored semesters unreadable, using defaults");
                Ok(default_semesters())
            }
        }
    }

    async fn write_semester(
        &self,
        id: SemesterId,
        patch: SemesterPatch,
    ) -> Result<Vec<Semester>, StorageError> {
        let mut semesters = self.read_semesters().await?;

        let written = match patch.subjects {
            Some(subjects) => {
                let updated = Semester::with_subjects(id, subjects)?;
                let written = updated.subjects().to_vec();
                semesters[id.index()] = updated;
                written
            }
            None => Vec::new(),
        };

        self.store
            .set(SEMESTERS_KEY, &encode_semesters(&semesters)?)
            .await?;
        tracing::debug!(semester = %id, subjects = written.len(), "semester written");

        if !written.is_empty() {
            let mut catalog = self.read_catalog().await?;
            catalog.sync_from_subjects(&written);
            self.save_catalog(&catalog).await?;
        }

        Ok(semesters)
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        self.store.remove(SEMESTERS_KEY).await?;
        self.store.remove(CATALOG_KEY).await?;
        tracing::info!("all semesters and catalog cleared");
        Ok(())
    }

    async fn read_catalog(&self) -> Result<SubjectCatalog, StorageError> {
        let Some(json) = self.store.get(CATALOG_KEY).await? else {
            return Ok(SubjectCatalog::new());
        };
        match decode_catalog(&json) {
            Ok(catalog) => Ok(catalog),
            Err(err) => {
                tracing::warn!(key = CATALOG_KEY, error = %err, "stored catalog unreadable, starting empty");
                Ok(SubjectCatalog::new())
            }
        }
    }

    async fn upsert_catalog_entry(
        &self,
        name: &str,
        kkm: Kkm,
    ) -> Result<SubjectCatalog, StorageError> {
        let mut catalog = self.read_catalog().await?;
        catalog.upsert(name.trim(), kkm);
        self.save_catalog(&catalog).await?;
        Ok(catalog)
    }
}

/// Repository handle behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub grades: Arc<dyn GradeRepository>,
}

impl Storage {
    #[must_use]
    pub fn from_store(store: Arc<dyn KeyValueStore>) -> Self {
        let grades: Arc<dyn GradeRepository> = Arc::new(KvGradeRepository::new(store));
        Self { grades }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryKeyValueStore::new()))
    }
}
