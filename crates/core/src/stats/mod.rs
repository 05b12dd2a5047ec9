//! Aggregate statistics over semester records.
//!
//! Every function here is pure and total: empty input yields `0` or an empty
//! result, never an error. Semesters without subjects are ignored by all
//! cross-semester statistics.

mod aggregate;
mod band;
mod chart;
mod trend;

pub use aggregate::{
    BestWorst, CriticalSubject, OverallStats, average_of, best_worst_semester,
    completed_semesters, critical_subjects, overall_average, overall_total_score, round2,
    semester_average, total_score, total_subjects,
};
pub use band::{ScoreBand, Standing, format_decimal, format_integer, target_average};
pub use chart::{
    ChartSeries, ScoreDirection, SubjectSeries, SubjectTrend, chart_series, subject_trends,
};
pub use trend::{PerformanceTrend, TrendDirection, performance_trend};
