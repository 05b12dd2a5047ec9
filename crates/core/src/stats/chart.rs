use serde::Serialize;

use crate::model::{Kkm, SEMESTER_COUNT, Semester};

/// Scores of one subject name across the five semesters.
///
/// A `0` entry means the subject was not recorded in that semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSeries {
    #[serde(rename = "subject")]
    pub name: String,
    pub scores: [u32; SEMESTER_COUNT],
    pub kkm: Kkm,
}

impl SubjectSeries {
    /// Score for a 1-based semester position, `None` if not recorded.
    #[must_use]
    pub fn score_in(&self, semester: usize) -> Option<u32> {
        semester
            .checked_sub(1)
            .and_then(|i| self.scores.get(i))
            .copied()
            .filter(|score| *score > 0)
    }

    /// Most recent recorded score.
    #[must_use]
    pub fn latest(&self) -> Option<u32> {
        self.scores.iter().rev().copied().find(|score| *score > 0)
    }

    /// Change from the first to the last recorded score.
    ///
    /// `None` unless the subject was scored in at least two semesters.
    #[must_use]
    pub fn trend(&self) -> Option<SubjectTrend> {
        let mut recorded = self.scores.iter().copied().filter(|score| *score > 0);
        let start = recorded.next()?;
        let end = recorded.last()?;
        let delta = i64::from(end) - i64::from(start);
        Some(SubjectTrend {
            name: self.name.clone(),
            start,
            end,
            delta,
            direction: ScoreDirection::of(delta),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreDirection {
    Up,
    Down,
    Stable,
}

impl ScoreDirection {
    fn of(delta: i64) -> Self {
        match delta {
            d if d > 0 => ScoreDirection::Up,
            d if d < 0 => ScoreDirection::Down,
            _ => ScoreDirection::Stable,
        }
    }

    #[must_use]
    pub fn arrow(&self) -> &'static str {
        match self {
            ScoreDirection::Up => "↑",
            ScoreDirection::Down => "↓",
            ScoreDirection::Stable => "→",
        }
    }
}

/// First and last recorded score of one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectTrend {
    #[serde(rename = "subject")]
    pub name: String,
    pub start: u32,
    pub end: u32,
    #[serde(rename = "trend")]
    pub delta: i64,
    pub direction: ScoreDirection,
}

/// Per-subject series in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChartSeries {
    series: Vec<SubjectSeries>,
}

impl ChartSeries {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SubjectSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubjectSeries> {
        self.series.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Group scores by subject name, one slot per semester id.
///
/// When a name carries different thresholds in different semesters, the one
/// from the highest semester id is kept.
#[must_use]
pub fn chart_series(semesters: &[Semester]) -> ChartSeries {
    let mut ordered: Vec<&Semester> = semesters.iter().filter(|s| s.is_complete()).collect();
    ordered.sort_by_key(|s| s.id());

    let mut series: Vec<SubjectSeries> = Vec::new();
    for semester in ordered {
        let slot = semester.id().index();
        for subject in semester.subjects() {
            let name = subject.name().as_str();
            let pos = match series.iter().position(|s| s.name == name) {
                Some(pos) => pos,
                None => {
                    series.push(SubjectSeries {
                        name: name.to_string(),
                        scores: [0; SEMESTER_COUNT],
                        kkm: subject.kkm(),
                    });
                    series.len() - 1
                }
            };
            let entry = &mut series[pos];
            entry.scores[slot] = subject.score().value();
            entry.kkm = subject.kkm();
        }
    }

    ChartSeries { series }
}

/// Trends for every subject scored in two or more semesters, in chart order.
#[must_use]
pub fn subject_trends(chart: &ChartSeries) -> Vec<SubjectTrend> {
    chart.iter().filter_map(SubjectSeries::trend).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Subject, SubjectId, default_semesters};

    fn subject(id: &str, name: &str, score: i64, kkm: i64) -> Subject {
        Subject::from_persisted(SubjectId::new(id), name.to_string(), score, kkm).unwrap()
    }

    fn fill(all: &mut [Semester], index: usize, subjects: Vec<Subject>) {
        all[index] = Semester::with_subjects(all[index].id(), subjects).unwrap();
    }

    #[test]
    fn groups_by_name_with_zero_gaps() {
        let mut all = default_semesters();
        fill(&mut all, 0, vec![subject("a", "Math", 80, 75), subject("b", "Art", 70, 70)]);
        fill(&mut all, 2, vec![subject("c", "Math", 85, 75)]);

        let chart = chart_series(&all);
        assert_eq!(chart.len(), 2);

        let math = chart.get("Math").unwrap();
        assert_eq!(math.scores, [80, 0, 85, 0, 0]);
        assert_eq!(math.score_in(2), None);
        assert_eq!(math.score_in(3), Some(85));
        assert_eq!(math.latest(), Some(85));

        let art = chart.get("Art").unwrap();
        assert_eq!(art.scores, [70, 0, 0, 0, 0]);
    }

    #[test]
    fn positions_follow_semester_id_not_completion_order() {
        let mut all = default_semesters();
        fill(&mut all, 3, vec![subject("a", "Math", 90, 75)]);

        let chart = chart_series(&all);
        assert_eq!(chart.get("Math").unwrap().scores, [0, 0, 0, 90, 0]);
    }

    #[test]
    fn kkm_is_last_write_wins_by_semester() {
        let mut all = default_semesters();
        fill(&mut all, 0, vec![subject("a", "Math", 80, 70)]);
        fill(&mut all, 4, vec![subject("b", "Math", 82, 80)]);
        fill(&mut all, 1, vec![subject("c", "Math", 81, 60)]);

        let chart = chart_series(&all);
        assert_eq!(chart.get("Math").unwrap().kkm.value(), 80);
    }

    #[test]
    fn first_seen_order_is_kept() {
        let mut all = default_semesters();
        fill(&mut all, 0, vec![subject("a", "Biology", 80, 70)]);
        fill(&mut all, 1, vec![subject("b", "Art", 80, 70), subject("c", "Biology", 80, 70)]);

        let chart = chart_series(&all);
        let names: Vec<&str> = chart.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Biology", "Art"]);
    }

    #[test]
    fn trends_need_two_recorded_semesters() {
        let mut all = default_semesters();
        fill(&mut all, 0, vec![subject("a", "Math", 70, 75), subject("b", "Art", 90, 70)]);
        fill(&mut all, 3, vec![subject("c", "Math", 82, 75), subject("d", "Music", 60, 70)]);

        let trends = subject_trends(&chart_series(&all));
        assert_eq!(trends.len(), 1);
        assert_eq!(
            trends[0],
            SubjectTrend {
                name: "Math".to_string(),
                start: 70,
                end: 82,
                delta: 12,
                direction: ScoreDirection::Up,
            }
        );
    }

    #[test]
    fn trend_uses_first_and_last_recorded_scores() {
        let mut all = default_semesters();
        fill(&mut all, 0, vec![subject("a", "Math", 85, 75), subject("b", "Art", 80, 70)]);
        fill(&mut all, 2, vec![subject("c", "Math", 95, 75)]);
        fill(&mut all, 4, vec![subject("d", "Math", 78, 75), subject("e", "Art", 80, 70)]);

        let chart = chart_series(&all);
        let math = chart.get("Math").unwrap().trend().unwrap();
        assert_eq!((math.start, math.end, math.delta), (85, 78, -7));
        assert_eq!(math.direction, ScoreDirection::Down);

        let art = chart.get("Art").unwrap().trend().unwrap();
        assert_eq!(art.delta, 0);
        assert_eq!(art.direction, ScoreDirection::Stable);
    }
}
