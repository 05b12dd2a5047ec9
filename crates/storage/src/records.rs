//! JSON shapes persisted under the fixed storage keys.
//!
//! These mirror the domain types so the key-value layer can (de)serialize
//! without leaking JSON concerns into `rapor-core`.

use rapor_core::model::{
    Kkm, SEMESTER_COUNT, Semester, SemesterId, Subject, SubjectCatalog, SubjectId, SubjectInfo,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn default_kkm() -> i64 {
    i64::from(Kkm::DEFAULT.value())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub id: String,
    pub name: String,
    pub score: i64,
    /// Older data was written before thresholds existed.
    #[serde(default = "default_kkm")]
    pub kkm: i64,
}

impl SubjectRecord {
    #[must_use]
    pub fn from_subject(subject: &Subject) -> Self {
        Self {
            id: subject.id().to_string(),
            name: subject.name().to_string(),
            score: i64::from(subject.score().value()),
            kkm: i64::from(subject.kkm().value()),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if a field is out of range.
    pub fn into_subject(self) -> Result<Subject, StorageError> {
        Subject::from_persisted(SubjectId::new(self.id), self.name, self.score, self.kkm)
            .map_err(ser)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterRecord {
    pub id: i64,
    pub subjects: Vec<SubjectRecord>,
    pub total_score: i64,
    pub average: f64,
    pub subject_count: i64,
}

impl SemesterRecord {
    #[must_use]
    pub fn from_semester(semester: &Semester) -> Self {
        Self {
            id: i64::from(semester.id().value()),
            subjects: semester
                .subjects()
                .iter()
                .map(SubjectRecord::from_subject)
                .collect(),
            total_score: i64::from(semester.total_score()),
            average: semester.average(),
            subject_count: i64::from(semester.subject_count()),
        }
    }

    /// Convert the record back into a domain `Semester`.
    ///
    /// Stored aggregates are recomputed from the subjects; a disagreement is
    /// logged and the recomputed values win.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for an invalid id or subject, or
    /// repeated subject ids.
    pub fn into_semester(self) -> Result<Semester, StorageError> {
        let id = u8::try_from(self.id)
            .map_err(ser)
            .and_then(|id| SemesterId::new(id).map_err(ser))?;
        let subjects = self
            .subjects
            .into_iter()
            .map(SubjectRecord::into_subject)
            .collect::<Result<Vec<_>, _>>()?;
        let semester = Semester::with_subjects(id, subjects).map_err(ser)?;
        if let Some(reason) =
            semester.aggregate_mismatch(self.total_score, self.average, self.subject_count)
        {
            tracing::warn!(semester = %id, %reason, "recomputing stored semester aggregates");
        }
        Ok(semester)
    }
}

/// Catalog entry; bare strings are the legacy name-only format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogEntryRecord {
    Entry {
        name: String,
        #[serde(rename = "lastKKM", default = "default_kkm")]
        last_kkm: i64,
    },
    Legacy(String),
}

impl CatalogEntryRecord {
    fn into_info(self) -> Result<SubjectInfo, StorageError> {
        match self {
            CatalogEntryRecord::Entry { name, last_kkm } => Ok(SubjectInfo {
                name,
                last_kkm: Kkm::new(last_kkm).map_err(ser)?,
            }),
            CatalogEntryRecord::Legacy(name) => Ok(SubjectInfo {
                name,
                last_kkm: Kkm::DEFAULT,
            }),
        }
    }
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the JSON is malformed, does not
/// hold exactly five semesters in id order, or any subject is invalid.
pub fn decode_semesters(json: &str) -> Result<Vec<Semester>, StorageError> {
    let records: Vec<SemesterRecord> = serde_json::from_str(json).map_err(ser)?;
    if records.len() != SEMESTER_COUNT {
        return Err(StorageError::Serialization(format!(
            "expected {SEMESTER_COUNT} semesters, found {}",
            records.len()
        )));
    }
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let semester = record.into_semester()?;
            if semester.id().index() != index {
                return Err(StorageError::Serialization(format!(
                    "semester {} stored in slot {}",
                    semester.id(),
                    index + 1
                )));
            }
            Ok(semester)
        })
        .collect()
}

/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_semesters(semesters: &[Semester]) -> Result<String, StorageError> {
    let records: Vec<SemesterRecord> = semesters.iter().map(SemesterRecord::from_semester).collect();
    serde_json::to_string(&records).map_err(ser)
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the JSON is malformed or a
/// threshold is out of range.
pub fn decode_catalog(json: &str) -> Result<SubjectCatalog, StorageError> {
    let records: Vec<CatalogEntryRecord> = serde_json::from_str(json).map_err(ser)?;
    let entries = records
        .into_iter()
        .map(CatalogEntryRecord::into_info)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SubjectCatalog::from_entries(entries))
}

/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_catalog(catalog: &SubjectCatalog) -> Result<String, StorageError> {
    let records: Vec<CatalogEntryRecord> = catalog
        .entries()
        .iter()
        .map(|e| CatalogEntryRecord::Entry {
            name: e.name.clone(),
            last_kkm: i64::from(e.last_kkm.value()),
        })
        .collect();
    serde_json::to_string(&records).map_err(ser)
}
