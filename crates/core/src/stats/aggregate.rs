use serde::Serialize;

use crate::model::{Semester, SemesterId, Subject};
use crate::stats::trend::{PerformanceTrend, performance_trend};

//
// ─── ROUNDING ──────────────────────────────────────────────────────────────────
//

/// Round half-up to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `total / count` rounded half-up to two decimals, or `0` for an empty count.
///
/// Works in integer hundredths so that values such as `x.xx5` round up
/// regardless of their binary representation.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_of(total: u64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let hundredths = (total * 200 + count) / (2 * count);
    hundredths as f64 / 100.0
}

//
// ─── PER SEMESTER ──────────────────────────────────────────────────────────────
//

/// Exact sum of scores.
#[must_use]
pub fn total_score(subjects: &[Subject]) -> u32 {
    subjects.iter().map(|s| s.score().value()).sum()
}

#[must_use]
pub fn semester_average(subjects: &[Subject]) -> f64 {
    average_of(u64::from(total_score(subjects)), subjects.len() as u64)
}

//
// ─── ACROSS SEMESTERS ──────────────────────────────────────────────────────────
//

fn complete(semesters: &[Semester]) -> impl Iterator<Item = &Semester> {
    semesters.iter().filter(|s| s.is_complete())
}

/// Subject-weighted mean: all scores over all subjects of non-empty semesters.
///
/// Not the mean of per-semester averages; the two differ whenever semesters
/// hold different numbers of subjects.
#[must_use]
pub fn overall_average(semesters: &[Semester]) -> f64 {
    let (total, count) = complete(semesters).fold((0_u64, 0_u64), |(total, count), s| {
        (
            total + u64::from(s.total_score()),
            count + u64::from(s.subject_count()),
        )
    });
    average_of(total, count)
}

#[must_use]
pub fn overall_total_score(semesters: &[Semester]) -> u32 {
    complete(semesters).map(Semester::total_score).sum()
}

#[must_use]
pub fn completed_semesters(semesters: &[Semester]) -> usize {
    complete(semesters).count()
}

#[must_use]
pub fn total_subjects(semesters: &[Semester]) -> usize {
    complete(semesters).map(|s| s.subjects().len()).sum()
}

/// Semesters with the highest and lowest average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BestWorst {
    pub best: Option<SemesterId>,
    pub worst: Option<SemesterId>,
}

/// Ties go to the semester that comes first in the scan (lowest id for a
/// collection in id order). Both are `None` when no semester has subjects.
#[must_use]
pub fn best_worst_semester(semesters: &[Semester]) -> BestWorst {
    let mut best: Option<&Semester> = None;
    let mut worst: Option<&Semester> = None;

    for semester in complete(semesters) {
        if best.is_none_or(|b| semester.average() > b.average()) {
            best = Some(semester);
        }
        if worst.is_none_or(|w| semester.average() < w.average()) {
            worst = Some(semester);
        }
    }

    BestWorst {
        best: best.map(Semester::id),
        worst: worst.map(Semester::id),
    }
}

/// A subject scoring below its threshold, with the semester it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalSubject {
    pub semester_id: SemesterId,
    pub subject: Subject,
}

/// Every critical subject, by semester then list order.
#[must_use]
pub fn critical_subjects(semesters: &[Semester]) -> Vec<CriticalSubject> {
    let mut ordered: Vec<&Semester> = semesters.iter().collect();
    ordered.sort_by_key(|s| s.id());

    ordered
        .into_iter()
        .flat_map(|semester| {
            semester
                .subjects()
                .iter()
                .filter(|s| s.is_critical())
                .map(move |subject| CriticalSubject {
                    semester_id: semester.id(),
                    subject: subject.clone(),
                })
        })
        .collect()
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Headline numbers for the results view and the exported report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_score: u32,
    pub average: f64,
    pub completed_semesters: usize,
    pub total_subjects: usize,
    pub critical_subjects: usize,
    pub best_semester: Option<SemesterId>,
    pub worst_semester: Option<SemesterId>,
    pub trend: PerformanceTrend,
}

impl OverallStats {
    #[must_use]
    pub fn compute(semesters: &[Semester]) -> Self {
        let BestWorst { best, worst } = best_worst_semester(semesters);
        Self {
            total_score: overall_total_score(semesters),
            average: overall_average(semesters),
            completed_semesters: completed_semesters(semesters),
            total_subjects: total_subjects(semesters),
            critical_subjects: critical_subjects(semesters).len(),
            best_semester: best,
            worst_semester: worst,
            trend: performance_trend(semesters),
        }
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.completed_semesters > 0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SubjectId, default_semesters};

    fn subject(id: &str, name: &str, score: i64, kkm: i64) -> Subject {
        Subject::from_persisted(SubjectId::new(id), name.to_string(), score, kkm).unwrap()
    }

    /// Five semesters where `scores[i]` fills semester `i + 1`.
    fn semesters(scores: &[&[i64]]) -> Vec<Semester> {
        let mut all = default_semesters();
        for (index, list) in scores.iter().enumerate() {
            let subjects = list
                .iter()
                .enumerate()
                .map(|(n, score)| subject(&format!("{index}-{n}"), &format!("S{n}"), *score, 75))
                .collect();
            all[index] = Semester::with_subjects(all[index].id(), subjects).unwrap();
        }
        all
    }

    #[test]
    fn semester_average_of_empty_is_zero() {
        assert_eq!(semester_average(&[]), 0.0);
        assert_eq!(total_score(&[]), 0);
    }

    #[test]
    fn semester_average_two_subjects() {
        let list = vec![subject("a", "A", 80, 75), subject("b", "B", 90, 75)];
        assert_eq!(semester_average(&list), 85.0);
        assert_eq!(total_score(&list), 170);
    }

    #[test]
    fn average_rounds_half_up() {
        assert_eq!(average_of(1, 8), 0.13);
        assert_eq!(average_of(2, 3), 0.67);
        assert_eq!(average_of(1, 3), 0.33);
        assert_eq!(average_of(251, 3), 83.67);
    }

    #[test]
    fn average_is_idempotent_over_stored_values() {
        let all = semesters(&[&[77, 81, 90], &[66, 67]]);
        for semester in &all {
            let again = average_of(
                u64::from(semester.total_score()),
                u64::from(semester.subject_count()),
            );
            assert_eq!(again, semester.average());
            assert_eq!(round2(again), again);
        }
    }

    #[test]
    fn overall_average_is_subject_weighted() {
        let all = semesters(&[&[100; 8], &[100; 8], &[100; 7]]);
        assert_eq!(overall_total_score(&all), 2300);
        assert_eq!(overall_average(&all), 100.0);

        // Unequal sizes: 2 subjects at 60 and 1 at 90 -> 210 / 3 = 70, not (60 + 90) / 2.
        let uneven = semesters(&[&[60, 60], &[90]]);
        assert_eq!(overall_average(&uneven), 70.0);
    }

    #[test]
    fn empty_semesters_are_ignored() {
        let all = semesters(&[&[], &[80], &[], &[90]]);
        assert_eq!(overall_average(&all), 85.0);
        assert_eq!(overall_total_score(&all), 170);
        assert_eq!(completed_semesters(&all), 2);
        assert_eq!(total_subjects(&all), 2);

        let best_worst = best_worst_semester(&all);
        assert_eq!(best_worst.best.unwrap().value(), 4);
        assert_eq!(best_worst.worst.unwrap().value(), 2);
    }

    #[test]
    fn no_data_yields_zeroes() {
        let all = default_semesters();
        assert_eq!(overall_average(&all), 0.0);
        assert_eq!(overall_total_score(&all), 0);
        assert_eq!(best_worst_semester(&all), BestWorst::default());
        assert!(critical_subjects(&all).is_empty());
        assert!(!OverallStats::compute(&all).has_data());
    }

    #[test]
    fn best_worst_ties_go_to_lowest_id() {
        let all = semesters(&[&[70], &[90], &[90], &[70]]);
        let best_worst = best_worst_semester(&all);
        assert_eq!(best_worst.best.unwrap().value(), 2);
        assert_eq!(best_worst.worst.unwrap().value(), 1);
    }

    #[test]
    fn critical_subjects_are_strictly_below_kkm() {
        let mut all = default_semesters();
        all[1] = Semester::with_subjects(
            all[1].id(),
            vec![
                subject("a", "Math", 75, 75),
                subject("b", "Physics", 74, 75),
                subject("c", "Art", 40, 30),
            ],
        )
        .unwrap();
        all[0] = Semester::with_subjects(all[0].id(), vec![subject("d", "Chem", 10, 75)])
            .unwrap();

        let critical = critical_subjects(&all);
        let found: Vec<(u8, &str)> = critical
            .iter()
            .map(|c| (c.semester_id.value(), c.subject.name().as_str()))
            .collect();
        assert_eq!(found, vec![(1, "Chem"), (2, "Physics")]);
    }

    #[test]
    fn scenario_math_and_science() {
        let mut all = default_semesters();
        all[0] = Semester::with_subjects(
            all[0].id(),
            vec![
                subject("m", "Math", 80, 75),
                subject("s", "Science", 60, 70),
            ],
        )
        .unwrap();

        assert_eq!(all[0].total_score(), 140);
        assert_eq!(all[0].average(), 70.0);
        let critical = critical_subjects(&all);
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].subject.name().as_str(), "Science");
        assert_eq!(critical[0].semester_id.value(), 1);

        let stats = OverallStats::compute(&all);
        assert_eq!(stats.total_score, 140);
        assert_eq!(stats.average, 70.0);
        assert_eq!(stats.completed_semesters, 1);
        assert_eq!(stats.total_subjects, 2);
        assert_eq!(stats.critical_subjects, 1);
    }
}
