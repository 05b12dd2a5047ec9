use serde::Serialize;

use crate::model::Semester;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    SignificantIncrease,
    Increase,
    Stable,
    SlightDecrease,
    SignificantDecrease,
}

impl TrendDirection {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::SignificantIncrease => "significant increase",
            TrendDirection::Increase => "increase",
            TrendDirection::Stable => "stable",
            TrendDirection::SlightDecrease => "slight decrease",
            TrendDirection::SignificantDecrease => "significant decrease",
        }
    }

    #[must_use]
    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::SignificantIncrease => "↑↑",
            TrendDirection::Increase => "↑",
            TrendDirection::Stable => "→",
            TrendDirection::SlightDecrease => "↓",
            TrendDirection::SignificantDecrease => "↓↓",
        }
    }

    /// Classify a change in average, expressed in hundredths of a point.
    fn from_delta_hundredths(delta: i64) -> Self {
        match delta {
            d if d > 500 => TrendDirection::SignificantIncrease,
            d if d > 200 => TrendDirection::Increase,
            d if d < -500 => TrendDirection::SignificantDecrease,
            d if d < -200 => TrendDirection::SlightDecrease,
            _ => TrendDirection::Stable,
        }
    }
}

/// Direction of the averages from the first to the last completed semester.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceTrend {
    pub direction: TrendDirection,
    /// `last - first` average; `None` with fewer than two completed semesters.
    pub delta: Option<f64>,
}

impl PerformanceTrend {
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.direction.label()
    }

    #[must_use]
    pub fn has_enough_data(&self) -> bool {
        self.delta.is_some()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn hundredths(average: f64) -> i64 {
    (average * 100.0).round() as i64
}

/// Compares only the first and last completed semesters; anything in between
/// is ignored.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn performance_trend(semesters: &[Semester]) -> PerformanceTrend {
    let mut completed: Vec<&Semester> = semesters.iter().filter(|s| s.is_complete()).collect();
    completed.sort_by_key(|s| s.id());

    let (first, last) = match completed.as_slice() {
        [first, .., last] => (first, last),
        _ => {
            return PerformanceTrend {
                direction: TrendDirection::Stable,
                delta: None,
            };
        }
    };

    let delta = hundredths(last.average()) - hundredths(first.average());
    PerformanceTrend {
        direction: TrendDirection::from_delta_hundredths(delta),
        delta: Some(delta as f64 / 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Subject, SubjectId, default_semesters};

    fn with_averages(averages: &[Option<i64>]) -> Vec<Semester> {
        let mut all = default_semesters();
        for (index, avg) in averages.iter().enumerate() {
            if let Some(score) = avg {
                let subject =
                    Subject::from_persisted(SubjectId::new(format!("{index}")), "Math".into(), *score, 75)
                        .unwrap();
                all[index] = Semester::with_subjects(all[index].id(), vec![subject]).unwrap();
            }
        }
        all
    }

    fn direction(averages: &[Option<i64>]) -> TrendDirection {
        performance_trend(&with_averages(averages)).direction
    }

    #[test]
    fn fewer_than_two_semesters_is_stable_without_delta() {
        let trend = performance_trend(&with_averages(&[None, Some(90)]));
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert!(!trend.has_enough_data());

        let none = performance_trend(&default_semesters());
        assert_eq!(none.direction, TrendDirection::Stable);
        assert_eq!(none.delta, None);
    }

    #[test]
    fn thresholds_are_classified_at_boundaries() {
        assert_eq!(direction(&[Some(70), Some(76)]), TrendDirection::SignificantIncrease);
        assert_eq!(direction(&[Some(70), Some(75)]), TrendDirection::Increase);
        assert_eq!(direction(&[Some(70), Some(73)]), TrendDirection::Increase);
        assert_eq!(direction(&[Some(70), Some(72)]), TrendDirection::Stable);
        assert_eq!(direction(&[Some(70), Some(68)]), TrendDirection::Stable);
        assert_eq!(direction(&[Some(70), Some(67)]), TrendDirection::SlightDecrease);
        assert_eq!(direction(&[Some(70), Some(65)]), TrendDirection::SlightDecrease);
        assert_eq!(direction(&[Some(70), Some(64)]), TrendDirection::SignificantDecrease);
    }

    #[test]
    fn only_first_and_last_completed_semesters_count() {
        let trend = performance_trend(&with_averages(&[
            None,
            Some(70),
            Some(20),
            None,
            Some(71),
        ]));
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.delta, Some(1.0));
    }
}
