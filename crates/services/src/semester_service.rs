use std::sync::Arc;

use rapor_core::model::{
    Semester, SemesterError, SemesterId, Subject, SubjectDraft, SubjectId, SubjectWarning,
};
use storage::repository::{GradeRepository, SemesterPatch};

use crate::error::SemesterServiceError;

/// Result of adding or editing a subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSaved {
    pub subject: Subject,
    /// Set when the threshold input was not a number and the default was used.
    pub warning: Option<SubjectWarning>,
    /// The semester as stored after the write.
    pub semester: Semester,
}

/// Orchestrates subject entry for the five semesters.
#[derive(Clone)]
pub struct SemesterService {
    grades: Arc<dyn GradeRepository>,
}

impl SemesterService {
    #[must_use]
    pub fn new(grades: Arc<dyn GradeRepository>) -> Self {
        Self { grades }
    }

    /// All five semesters in id order.
    ///
    /// # Errors
    ///
    /// Returns `SemesterServiceError::Storage` if repository access fails.
    pub async fn list_semesters(&self) -> Result<Vec<Semester>, SemesterServiceError> {
        Ok(self.grades.read_semesters().await?)
    }

    /// # Errors
    ///
    /// Returns `SemesterServiceError::Storage` if repository access fails.
    pub async fn get_semester(&self, id: SemesterId) -> Result<Semester, SemesterServiceError> {
        take_slot(self.grades.read_semesters().await?, id)
    }

    /// Validate a draft and append it to the semester under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `SemesterServiceError::Subject` if the draft is invalid; nothing
    /// is written in that case.
    /// Returns `SemesterServiceError::Storage` if persistence fails.
    pub async fn add_subject(
        &self,
        id: SemesterId,
        draft: SubjectDraft,
    ) -> Result<SubjectSaved, SemesterServiceError> {
        let validated = draft.validate(SubjectId::generate())?;
        let mut semester = self.get_semester(id).await?;
        semester.push_subject(validated.subject.clone())?;

        let semester = self.store(id, &semester).await?;
        tracing::info!(
            semester = %id,
            subject = %validated.subject.name(),
            score = validated.subject.score().value(),
            "subject added"
        );
        Ok(SubjectSaved {
            subject: validated.subject,
            warning: validated.warning,
            semester,
        })
    }

    /// Replace an existing subject's name, score and threshold, keeping its id
    /// and position.
    ///
    /// # Errors
    ///
    /// Returns `SemesterServiceError::Subject` if the draft is invalid.
    /// Returns `SemesterServiceError::Semester` if no subject has that id.
    /// Returns `SemesterServiceError::Storage` if persistence fails.
    pub async fn update_subject(
        &self,
        id: SemesterId,
        subject_id: &SubjectId,
        draft: SubjectDraft,
    ) -> Result<SubjectSaved, SemesterServiceError> {
        let validated = draft.validate(subject_id.clone())?;
        let mut semester = self.get_semester(id).await?;
        semester.replace_subject(validated.subject.clone())?;

        let semester = self.store(id, &semester).await?;
        tracing::info!(semester = %id, subject = %subject_id, "subject updated");
        Ok(SubjectSaved {
            subject: validated.subject,
            warning: validated.warning,
            semester,
        })
    }

    /// # Errors
    ///
    /// Returns `SemesterServiceError::Semester` if no subject has that id.
    /// Returns `SemesterServiceError::Storage` if persistence fails.
    pub async fn remove_subject(
        &self,
        id: SemesterId,
        subject_id: &SubjectId,
    ) -> Result<Semester, SemesterServiceError> {
        let mut semester = self.get_semester(id).await?;
        semester.remove_subject(subject_id)?;
        let semester = self.store(id, &semester).await?;
        tracing::info!(semester = %id, subject = %subject_id, "subject removed");
        Ok(semester)
    }

    /// Drop every subject from one semester. The catalog is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `SemesterServiceError::Storage` if persistence fails.
    pub async fn clear_semester(&self, id: SemesterId) -> Result<Semester, SemesterServiceError> {
        let mut semester = self.get_semester(id).await?;
        semester.clear();
        let semester = self.store(id, &semester).await?;
        tracing::info!(semester = %id, "semester cleared");
        Ok(semester)
    }

    /// Wipe all semesters and the subject catalog.
    ///
    /// # Errors
    ///
    /// Returns `SemesterServiceError::Storage` if persistence fails.
    pub async fn reset_all(&self) -> Result<(), SemesterServiceError> {
        self.grades.clear_all().await?;
        Ok(())
    }

    async fn store(
        &self,
        id: SemesterId,
        semester: &Semester,
    ) -> Result<Semester, SemesterServiceError> {
        let semesters = self
            .grades
            .write_semester(id, SemesterPatch::from_semester(semester))
            .await?;
        take_slot(semesters, id)
    }
}

fn take_slot(mut semesters: Vec<Semester>, id: SemesterId) -> Result<Semester, SemesterServiceError> {
    if semesters.len() <= id.index() {
        return Err(SemesterError::Inconsistent {
            reason: format!("repository returned {} semesters", semesters.len()),
        }
        .into());
    }
    Ok(semesters.swap_remove(id.index()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rapor_core::model::{Kkm, SubjectCatalog, SubjectError, default_semesters};
    use storage::repository::{Storage, StorageError};

    /// Reads succeed with empty semesters; every write fails.
    struct ReadOnlyGrades;

    #[async_trait]
    impl GradeRepository for ReadOnlyGrades {
        async fn read_semesters(&self) -> Result<Vec<Semester>, StorageError> {
            Ok(default_semesters())
        }

        async fn write_semester(
            &self,
            _id: SemesterId,
            _patch: SemesterPatch,
        ) -> Result<Vec<Semester>, StorageError> {
            Err(StorageError::Connection("read-only".into()))
        }

        async fn clear_all(&self) -> Result<(), StorageError> {
            Err(StorageError::Connection("read-only".into()))
        }

        async fn read_catalog(&self) -> Result<SubjectCatalog, StorageError> {
            Ok(SubjectCatalog::new())
        }

        async fn upsert_catalog_entry(
            &self,
            _name: &str,
            _kkm: Kkm,
        ) -> Result<SubjectCatalog, StorageError> {
            Err(StorageError::Connection("read-only".into()))
        }
    }

    fn service() -> SemesterService {
        SemesterService::new(Storage::in_memory().grades)
    }

    fn sem(id: u8) -> SemesterId {
        SemesterId::new(id).unwrap()
    }

    #[tokio::test]
    async fn add_subject_recomputes_and_persists() {
        let service = service();
        service
            .add_subject(sem(1), SubjectDraft::new("Math", 80).with_kkm("75"))
            .await
            .unwrap();
        let saved = service
            .add_subject(sem(1), SubjectDraft::new("Science", 60).with_kkm("70"))
            .await
            .unwrap();

        assert_eq!(saved.warning, None);
        assert_eq!(saved.semester.total_score(), 140);
        assert_eq!(saved.semester.average(), 70.0);
        assert!(saved.subject.is_critical());

        let stored = service.get_semester(sem(1)).await.unwrap();
        assert_eq!(stored, saved.semester);
    }

    #[tokio::test]
    async fn invalid_draft_leaves_state_unchanged() {
        let service = service();
        let err = service
            .add_subject(sem(2), SubjectDraft::new("Math", 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SemesterServiceError::Subject(SubjectError::ScoreOutOfRange { provided: 0 })
        ));

        let err = service
            .add_subject(sem(2), SubjectDraft::new("   ", 80))
            .await
            .unwrap_err();
        assert!(matches!(err, SemesterServiceError::Subject(SubjectError::EmptyName)));

        assert_eq!(service.list_semesters().await.unwrap(), default_semesters());
    }

    #[tokio::test]
    async fn non_numeric_kkm_warns_and_uses_default() {
        let service = service();
        let saved = service
            .add_subject(sem(1), SubjectDraft::new("Art", 80).with_kkm("abc"))
            .await
            .unwrap();
        assert!(saved.warning.is_some());
        assert_eq!(saved.subject.kkm().value(), 75);
    }

    #[tokio::test]
    async fn update_keeps_id_and_position() {
        let service = service();
        let first = service
            .add_subject(sem(3), SubjectDraft::new("Math", 70))
            .await
            .unwrap();
        service
            .add_subject(sem(3), SubjectDraft::new("Art", 90))
            .await
            .unwrap();

        let saved = service
            .update_subject(sem(3), first.subject.id(), SubjectDraft::new("Mathematics", 88))
            .await
            .unwrap();
        assert_eq!(saved.subject.id(), first.subject.id());
        assert_eq!(saved.semester.subjects()[0].name().as_str(), "Mathematics");
        assert_eq!(saved.semester.total_score(), 178);
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let service = service();
        let missing = SubjectId::new("nope");
        let err = service
            .update_subject(sem(1), &missing, SubjectDraft::new("Math", 80))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SemesterServiceError::Semester(SemesterError::SubjectNotFound { .. })
        ));
        assert!(service.remove_subject(sem(1), &missing).await.is_err());
    }

    #[tokio::test]
    async fn remove_clear_and_reset() {
        let service = service();
        let saved = service
            .add_subject(sem(4), SubjectDraft::new("Math", 70))
            .await
            .unwrap();
        service
            .add_subject(sem(4), SubjectDraft::new("Art", 90))
            .await
            .unwrap();

        let semester = service
            .remove_subject(sem(4), saved.subject.id())
            .await
            .unwrap();
        assert_eq!(semester.total_score(), 90);

        let semester = service.clear_semester(sem(4)).await.unwrap();
        assert!(!semester.is_complete());

        service
            .add_subject(sem(5), SubjectDraft::new("Math", 70))
            .await
            .unwrap();
        service.reset_all().await.unwrap();
        assert_eq!(service.list_semesters().await.unwrap(), default_semesters());
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let service = SemesterService::new(Arc::new(ReadOnlyGrades));
        let err = service
            .add_subject(sem(1), SubjectDraft::new("Math", 80))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SemesterServiceError::Storage(StorageError::Connection(_))
        ));
        assert!(service.reset_all().await.is_err());
    }
}
