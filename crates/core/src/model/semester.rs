use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{SemesterId, SubjectId};
use crate::model::subject::Subject;
use crate::stats;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SemesterError {
    #[error("semester id must be between 1 and 5, got {id}")]
    InvalidId { id: i64 },

    #[error("subject id {id} already exists in this semester")]
    DuplicateSubjectId { id: String },

    #[error("subject {id} not found in this semester")]
    SubjectNotFound { id: String },

    #[error("persisted semester is inconsistent: {reason}")]
    Inconsistent { reason: String },
}

//
// ─── SEMESTER ──────────────────────────────────────────────────────────────────
//

/// One grading period and its subjects.
///
/// `total_score`, `average` and `subject_count` are derived from `subjects`
/// and recomputed on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Semester {
    id: SemesterId,
    subjects: Vec<Subject>,
    total_score: u32,
    average: f64,
    subject_count: u32,
}

impl Semester {
    #[must_use]
    pub fn empty(id: SemesterId) -> Self {
        Self {
            id,
            subjects: Vec::new(),
            total_score: 0,
            average: 0.0,
            subject_count: 0,
        }
    }

    /// Build a semester from an ordered subject list.
    ///
    /// # Errors
    ///
    /// Returns `SemesterError::DuplicateSubjectId` if two subjects share an id.
    pub fn with_subjects(id: SemesterId, subjects: Vec<Subject>) -> Result<Self, SemesterError> {
        let mut semester = Self::empty(id);
        for subject in subjects {
            semester.push_subject(subject)?;
        }
        Ok(semester)
    }

    /// Describe how stored aggregates differ from the ones derived from
    /// `subjects`, or `None` when they agree.
    ///
    /// An average rounded half-down by another writer counts as a mismatch.
    #[must_use]
    pub fn aggregate_mismatch(
        &self,
        total_score: i64,
        average: f64,
        subject_count: i64,
    ) -> Option<String> {
        if i64::from(self.total_score) != total_score {
            return Some(format!(
                "total score {total_score} != sum of scores {}",
                self.total_score
            ));
        }
        if i64::from(self.subject_count) != subject_count {
            return Some(format!(
                "subject count {subject_count} != {} subjects",
                self.subject_count
            ));
        }
        if (self.average - average).abs() > 1e-9 {
            return Some(format!("average {average} != {}", self.average));
        }
        None
    }

    #[must_use]
    pub fn id(&self) -> SemesterId {
        self.id
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Mean score rounded to two decimals, `0` when there are no subjects.
    #[must_use]
    pub fn average(&self) -> f64 {
        self.average
    }

    #[must_use]
    pub fn subject_count(&self) -> u32 {
        self.subject_count
    }

    /// A semester counts towards statistics only once it has a subject.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.subjects.is_empty()
    }

    #[must_use]
    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id() == id)
    }

    /// Append a subject at the end of the list.
    ///
    /// # Errors
    ///
    /// Returns `SemesterError::DuplicateSubjectId` if the id is already used.
    pub fn push_subject(&mut self, subject: Subject) -> Result<(), SemesterError> {
        if self.subject(subject.id()).is_some() {
            return Err(SemesterError::DuplicateSubjectId {
                id: subject.id().to_string(),
            });
        }
        self.subjects.push(subject);
        self.recompute();
        Ok(())
    }

    /// Swap in a new version of the subject with the same id, keeping its position.
    ///
    /// Returns the previous version.
    ///
    /// # Errors
    ///
    /// Returns `SemesterError::SubjectNotFound` if no subject has that id.
    pub fn replace_subject(&mut self, subject: Subject) -> Result<Subject, SemesterError> {
        let slot = self
            .subjects
            .iter_mut()
            .find(|s| s.id() == subject.id())
            .ok_or_else(|| SemesterError::SubjectNotFound {
                id: subject.id().to_string(),
            })?;
        let previous = std::mem::replace(slot, subject);
        self.recompute();
        Ok(previous)
    }

    /// # Errors
    ///
    /// Returns `SemesterError::SubjectNotFound` if no subject has that id.
    pub fn remove_subject(&mut self, id: &SubjectId) -> Result<Subject, SemesterError> {
        let pos = self
            .subjects
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| SemesterError::SubjectNotFound { id: id.to_string() })?;
        let removed = self.subjects.remove(pos);
        self.recompute();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.subjects.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.total_score = stats::total_score(&self.subjects);
        self.average = stats::semester_average(&self.subjects);
        self.subject_count = u32::try_from(self.subjects.len()).unwrap_or(u32::MAX);
    }
}

/// Five empty semesters, ids 1 through 5.
#[must_use]
pub fn default_semesters() -> Vec<Semester> {
    SemesterId::all().map(Semester::empty).collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
