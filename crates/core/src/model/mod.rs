mod catalog;
mod ids;
mod semester;
mod subject;

pub use ids::{GradeLevel, ParseIdError, SEMESTER_COUNT, SemesterId, SubjectId};

pub use catalog::{SubjectCatalog, SubjectInfo};
pub use semester::{Semester, SemesterError, default_semesters};
pub use subject::{
    Kkm, Score, Subject, SubjectDraft, SubjectError, SubjectName, SubjectWarning,
    ValidatedSubject, parse_score_input,
};
