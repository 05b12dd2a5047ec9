use rapor_core::model::{SemesterId, SubjectDraft};
use services::{AppServices, SemesterServiceError};

/// (semester, name, score, kkm)
const SAMPLE: &[(u8, &str, i64, &str)] = &[
    (1, "Matematika", 78, "75"),
    (1, "Bahasa Indonesia", 85, "75"),
    (1, "Bahasa Inggris", 80, "75"),
    (1, "Fisika", 68, "70"),
    (2, "Matematika", 82, "75"),
    (2, "Bahasa Indonesia", 86, "75"),
    (2, "Bahasa Inggris", 79, "75"),
    (2, "Fisika", 72, "70"),
    (3, "Matematika", 88, "78"),
    (3, "Bahasa Indonesia", 87, "75"),
    (3, "Biologi", 74, "75"),
];

/// Fill an empty store with a few semesters of sample grades.
///
/// Returns the number of subjects added; `0` when grades already exist.
pub async fn sample_grades(services: &AppServices) -> Result<usize, SemesterServiceError> {
    let semesters = services.semesters();
    if semesters
        .list_semesters()
        .await?
        .iter()
        .any(|s| s.is_complete())
    {
        return Ok(0);
    }

    for (semester, name, score, kkm) in SAMPLE {
        let id = SemesterId::new(*semester)?;
        semesters
            .add_subject(id, SubjectDraft::new(*name, *score).with_kkm(*kkm))
            .await?;
    }
    tracing::info!(subjects = SAMPLE.len(), "sample grades seeded");
    Ok(SAMPLE.len())
}
