//! Printable progress report and its JSON export.
//!
//! A `Report` is a frozen snapshot: the analytics it was built from, the cover
//! details and the time it was generated. Rendering never touches storage.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use rapor_core::Clock;
use rapor_core::model::{SEMESTER_COUNT, Semester};
use rapor_core::stats::{
    ChartSeries, CriticalSubject, OverallStats, ScoreBand, Standing, SubjectTrend,
    format_decimal, format_integer, target_average,
};

use crate::analytics_service::Analytics;
use crate::error::ReportError;

const DEFAULT_STUDENT: &str = "Student";
const DEFAULT_SCHOOL: &str = "School";
const PRIORITY_LIMIT: usize = 3;
const PRIORITY_NAME_WIDTH: usize = 20;

const STUDY_TIPS: [&str; 5] = [
    "Focus on understanding the core concepts of difficult material",
    "Practise more exercises in the weaker areas",
    "Make use of additional and digital learning resources",
    "Discuss difficulties with teachers regularly",
    "Keep a balanced and consistent study schedule",
];

/// Cover details printed on the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub student_name: Option<String>,
    pub school_name: Option<String>,
}

impl ReportOptions {
    #[must_use]
    pub fn student_name(&self) -> &str {
        non_blank(self.student_name.as_deref()).unwrap_or(DEFAULT_STUDENT)
    }

    #[must_use]
    pub fn school_name(&self) -> &str {
        non_blank(self.school_name.as_deref()).unwrap_or(DEFAULT_SCHOOL)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    generated_at: DateTime<Utc>,
    options: ReportOptions,
    analytics: Analytics,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    student_name: &'a str,
    school_name: &'a str,
    semesters: &'a [Semester],
    overall_stats: &'a OverallStats,
    chart_series: &'a ChartSeries,
    subject_trends: &'a [SubjectTrend],
    critical_subjects: &'a [CriticalSubject],
    standing: Standing,
    target_average: f64,
}

impl Report {
    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    #[must_use]
    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    #[must_use]
    pub fn standing(&self) -> Standing {
        Standing::of(self.analytics.overall.average)
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    /// Serialize `{ semesters, overallStats, chartSeries, subjectTrends }` plus
    /// the cover details as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        let document = ReportDocument {
            generated_at: self.generated_at,
            student_name: self.options.student_name(),
            school_name: self.options.school_name(),
            semesters: &self.analytics.semesters,
            overall_stats: &self.analytics.overall,
            chart_series: &self.analytics.chart,
            subject_trends: &self.analytics.trends,
            critical_subjects: &self.analytics.critical,
            standing: self.standing(),
            target_average: target_average(self.analytics.overall.average),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    fn write_cover(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ACADEMIC REPORT")?;
        writeln!(f, "Student grade progress report")?;
        writeln!(f)?;
        writeln!(f, "Student: {}", self.options.student_name())?;
        writeln!(f, "School:  {}", self.options.school_name())?;
        writeln!(f, "Date:    {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"))
    }

    fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overall = &self.analytics.overall;
        writeln!(f, "EXECUTIVE SUMMARY")?;
        writeln!(
            f,
            "  Overall average:  {} ({})",
            format_decimal(overall.average),
            ScoreBand::of(overall.average).label()
        )?;
        writeln!(f, "  Total score:      {}", format_integer(overall.total_score))?;
        writeln!(
            f,
            "  Completed:        {}/{SEMESTER_COUNT} semesters",
            overall.completed_semesters
        )?;
        writeln!(
            f,
            "  Below KKM:        {} of {} subjects",
            overall.critical_subjects, overall.total_subjects
        )?;
        if let (Some(best), Some(worst)) = (overall.best_semester, overall.worst_semester) {
            writeln!(f, "  Best semester:    Semester {best}")?;
            writeln!(f, "  Weakest semester: Semester {worst}")?;
        }
        writeln!(f, "  {}", self.standing().title())
    }

    fn write_matrix(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PERFORMANCE MATRIX")?;
        for semester in self.analytics.completed() {
            writeln!(
                f,
                "Semester {} - {}   average {}   total {}",
                semester.id(),
                semester.id().grade_level().label(),
                format_decimal(semester.average()),
                format_integer(semester.total_score())
            )?;
            for subject in semester.subjects() {
                let marker = if subject.is_critical() { "  ⚠" } else { "" };
                writeln!(
                    f,
                    "  {:<24} {:>3}   KKM {:>3}{marker}",
                    subject.name().as_str(),
                    subject.score().value(),
                    subject.kkm().value()
                )?;
            }
        }
        Ok(())
    }

    fn write_trend(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trend = self.analytics.overall.trend;
        writeln!(f, "PERFORMANCE TREND")?;
        match trend.delta {
            Some(delta) => {
                let sign = if delta < 0.0 { '-' } else { '+' };
                writeln!(
                    f,
                    "  {} {} ({sign}{} points)",
                    trend.direction.arrow(),
                    trend.label(),
                    format_decimal(delta.abs())
                )?;
            }
            None => writeln!(f, "  Not enough data for a trend yet")?,
        }
        let path: Vec<String> = self
            .analytics
            .completed()
            .map(|s| format!("S{}: {}", s.id(), format_decimal(s.average())))
            .collect();
        writeln!(f, "  {}", path.join(" → "))?;
        for trend in &self.analytics.trends {
            writeln!(
                f,
                "  {:<24} {:>3} → {:>3}  {} {:+}",
                trend.name,
                trend.start,
                trend.end,
                trend.direction.arrow(),
                trend.delta
            )?;
        }
        Ok(())
    }

    fn write_improvement(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overall = &self.analytics.overall;
        if overall.critical_subjects == 0 {
            return Ok(());
        }
        writeln!(f, "IMPROVEMENT AREAS")?;
        writeln!(
            f,
            "  {} of {} subjects need particular attention",
            overall.critical_subjects, overall.total_subjects
        )?;
        let priority: Vec<String> = self
            .analytics
            .critical
            .iter()
            .take(PRIORITY_LIMIT)
            .map(|c| c.subject.name().as_str().chars().take(PRIORITY_NAME_WIDTH).collect())
            .collect();
        let more = if overall.critical_subjects > PRIORITY_LIMIT {
            "..."
        } else {
            ""
        };
        writeln!(f, "  Priority: {}{more}", priority.join(", "))?;
        writeln!(f)
    }

    fn write_recommendations(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RECOMMENDATIONS")?;
        writeln!(f, "  {}", self.standing().recommendation())?;
        for tip in STUDY_TIPS {
            writeln!(f, "  • {tip}")?;
        }
        Ok(())
    }

    fn write_projection(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overall = &self.analytics.overall;
        let target = target_average(overall.average);
        writeln!(f, "PROJECTION & TARGET")?;
        writeln!(
            f,
            "  Target average:   {} (+{} points)",
            format_decimal(target),
            format_decimal(target - overall.average)
        )?;
        writeln!(
            f,
            "  Critical target:  {} of {}",
            overall.critical_subjects / 2,
            overall.critical_subjects
        )?;
        writeln!(f, "  Timeline:         next 3 months")
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_cover(f)?;
        writeln!(f)?;
        self.write_summary(f)?;
        writeln!(f)?;
        self.write_matrix(f)?;
        writeln!(f)?;
        self.write_trend(f)?;
        writeln!(f)?;
        self.write_improvement(f)?;
        self.write_recommendations(f)?;
        writeln!(f)?;
        self.write_projection(f)
    }
}

/// Builds reports stamped with the injected clock.
#[derive(Clone)]
pub struct ReportService {
    clock: Clock,
}

impl ReportService {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    /// # Errors
    ///
    /// Returns `ReportError::NoData` when no semester has any subjects.
    pub fn build(&self, analytics: Analytics, options: ReportOptions) -> Result<Report, ReportError> {
        if !analytics.has_data() {
            return Err(ReportError::NoData);
        }
        Ok(Report {
            generated_at: self.clock.now(),
            options,
            analytics,
        })
    }
}
