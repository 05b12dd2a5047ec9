use std::sync::Arc;

use rapor_core::model::Semester;
use rapor_core::stats::{
    ChartSeries, CriticalSubject, OverallStats, SubjectTrend, chart_series, critical_subjects,
    subject_trends,
};
use storage::repository::{GradeRepository, StorageError};

/// Everything the results view and the report need, computed in one pass
/// over a snapshot of the semesters.
#[derive(Debug, Clone, PartialEq)]
pub struct Analytics {
    pub semesters: Vec<Semester>,
    pub overall: OverallStats,
    pub chart: ChartSeries,
    /// Subjects scored in at least two semesters.
    pub trends: Vec<SubjectTrend>,
    pub critical: Vec<CriticalSubject>,
}

impl Analytics {
    #[must_use]
    pub fn from_semesters(semesters: Vec<Semester>) -> Self {
        let overall = OverallStats::compute(&semesters);
        let chart = chart_series(&semesters);
        let trends = subject_trends(&chart);
        let critical = critical_subjects(&semesters);
        Self {
            semesters,
            overall,
            chart,
            trends,
            critical,
        }
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.overall.has_data()
    }

    /// Completed semesters in id order.
    pub fn completed(&self) -> impl Iterator<Item = &Semester> {
        self.semesters.iter().filter(|s| s.is_complete())
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    grades: Arc<dyn GradeRepository>,
}

impl AnalyticsService {
    #[must_use]
    pub fn new(grades: Arc<dyn GradeRepository>) -> Self {
        Self { grades }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if repository access fails.
    pub async fn overview(&self) -> Result<Analytics, StorageError> {
        let semesters = self.grades.read_semesters().await?;
        Ok(Analytics::from_semesters(semesters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapor_core::model::{SemesterId, Subject, SubjectId};
    use storage::repository::{SemesterPatch, Storage};

    fn subject(id: &str, name: &str, score: i64, kkm: i64) -> Subject {
        Subject::from_persisted(SubjectId::new(id), name.to_string(), score, kkm).unwrap()
    }

    #[tokio::test]
    async fn empty_store_has_no_data() {
        let service = AnalyticsService::new(Storage::in_memory().grades);
        let analytics = service.overview().await.unwrap();
        assert!(!analytics.has_data());
        assert_eq!(analytics.overall.average, 0.0);
        assert_eq!(analytics.overall.best_semester, None);
        assert!(analytics.chart.is_empty());
        assert!(analytics.trends.is_empty());
        assert!(analytics.critical.is_empty());
    }

    #[tokio::test]
    async fn overview_reflects_stored_semesters() {
        let storage = Storage::in_memory();
        let first = SemesterId::new(1).unwrap();
        storage
            .grades
            .write_semester(
                first,
                SemesterPatch::subjects(vec![
                    subject("m", "Math", 80, 75),
                    subject("s", "Science", 60, 70),
                ]),
            )
            .await
            .unwrap();

        let analytics = AnalyticsService::new(storage.grades).overview().await.unwrap();
        assert_eq!(analytics.overall.total_score, 140);
        assert_eq!(analytics.overall.average, 70.0);
        assert_eq!(analytics.overall.best_semester, Some(first));
        assert_eq!(analytics.overall.worst_semester, Some(first));
        assert_eq!(analytics.critical.len(), 1);
        assert_eq!(analytics.critical[0].subject.name().as_str(), "Science");
        assert_eq!(analytics.critical[0].semester_id, first);
        assert_eq!(analytics.completed().count(), 1);
        assert_eq!(analytics.chart.get("Math").unwrap().scores, [80, 0, 0, 0, 0]);
        assert!(analytics.trends.is_empty());
    }

    #[tokio::test]
    async fn trends_cover_subjects_seen_twice() {
        let storage = Storage::in_memory();
        for (id, math, art) in [(1, 70, 88), (2, 76, 85)] {
            storage
                .grades
                .write_semester(
                    SemesterId::new(id).unwrap(),
                    SemesterPatch::subjects(vec![
                        subject(&format!("m{id}"), "Math", math, 75),
                        subject(&format!("a{id}"), "Art", art, 70),
                    ]),
                )
                .await
                .unwrap();
        }
        storage
            .grades
            .write_semester(
                SemesterId::new(3).unwrap(),
                SemesterPatch::subjects(vec![subject("b3", "Biology", 80, 75)]),
            )
            .await
            .unwrap();

        let analytics = AnalyticsService::new(storage.grades).overview().await.unwrap();
        let names: Vec<&str> = analytics.trends.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Math", "Art"]);
        assert_eq!(analytics.trends[0].delta, 6);
        assert_eq!(analytics.trends[1].delta, -3);
    }
}
