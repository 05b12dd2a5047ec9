//! Plain-text views printed by the CLI.

use rapor_core::model::{Semester, Subject, SubjectInfo};
use rapor_core::stats::{ScoreBand, format_decimal, format_integer};
use services::Analytics;

pub const NO_DATA_HINT: &str =
    "No grades entered yet. Add one with: rapor add <semester> --name <name> --score <score>";

pub fn subject_line(subject: &Subject) -> String {
    let marker = if subject.is_critical() {
        "  below KKM"
    } else {
        ""
    };
    format!(
        "{:<24} {:>3}  KKM {:>3}  [{}]{marker}",
        subject.name().as_str(),
        subject.score().value(),
        subject.kkm().value(),
        subject.id()
    )
}

pub fn semester_totals(semester: &Semester) -> String {
    format!(
        "semester {}: {} subjects, total {}, average {}\n",
        semester.id(),
        semester.subject_count(),
        format_integer(semester.total_score()),
        format_decimal(semester.average())
    )
}

pub fn semester(semester: &Semester) -> String {
    let mut out = format!(
        "Semester {} ({})\n",
        semester.id(),
        semester.id().grade_level().label()
    );
    if !semester.is_complete() {
        out.push_str("  no subjects yet\n");
        return out;
    }
    for subject in semester.subjects() {
        out.push_str(&format!("  {}\n", subject_line(subject)));
    }
    out.push_str(&semester_totals(semester));
    out
}

pub fn summary(analytics: &Analytics) -> String {
    if !analytics.has_data() {
        return format!("{NO_DATA_HINT}\n");
    }

    let mut out = String::new();
    for semester in &analytics.semesters {
        if semester.is_complete() {
            out.push_str(&format!(
                "Semester {} ({}): {} subjects, total {}, average {} ({})\n",
                semester.id(),
                semester.id().grade_level().label(),
                semester.subject_count(),
                format_integer(semester.total_score()),
                format_decimal(semester.average()),
                ScoreBand::of(semester.average()).label()
            ));
        } else {
            out.push_str(&format!(
                "Semester {} ({}): empty\n",
                semester.id(),
                semester.id().grade_level().label()
            ));
        }
    }

    let overall = &analytics.overall;
    out.push('\n');
    out.push_str(&format!(
        "Overall average: {} ({})\n",
        format_decimal(overall.average),
        ScoreBand::of(overall.average).label()
    ));
    out.push_str(&format!("Total score:     {}\n", format_integer(overall.total_score)));
    out.push_str(&format!("Subjects:        {}\n", overall.total_subjects));
    if let (Some(best), Some(worst)) = (overall.best_semester, overall.worst_semester) {
        out.push_str(&format!("Best / worst:    semester {best} / semester {worst}\n"));
    }
    match overall.trend.delta {
        Some(delta) => {
            out.push_str(&format!(
                "Trend:           {} {} ({})\n",
                overall.trend.direction.arrow(),
                overall.trend.label(),
                format_decimal(delta)
            ));
        }
        None => out.push_str("Trend:           not enough semesters yet\n"),
    }

    if !analytics.trends.is_empty() {
        out.push_str("\nSubject trends:\n");
        for trend in &analytics.trends {
            out.push_str(&format!(
                "  {:<24} {:>3} → {:>3}  {} {:+}\n",
                trend.name,
                trend.start,
                trend.end,
                trend.direction.arrow(),
                trend.delta
            ));
        }
    }

    if !analytics.critical.is_empty() {
        out.push_str(&format!("\nBelow KKM ({}):\n", analytics.critical.len()));
        for critical in &analytics.critical {
            out.push_str(&format!(
                "  S{} {:<24} {:>3} < {}\n",
                critical.semester_id,
                critical.subject.name().as_str(),
                critical.subject.score().value(),
                critical.subject.kkm().value()
            ));
        }
    }
    out
}

pub fn catalog(entries: &[SubjectInfo]) -> String {
    if entries.is_empty() {
        return "no matching subjects\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("{:<24} KKM {}\n", entry.name, entry.last_kkm.value()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapor_core::model::{Kkm, SemesterId, SubjectId, default_semesters};

    fn subject(id: &str, name: &str, score: i64, kkm: i64) -> Subject {
        Subject::from_persisted(SubjectId::new(id), name.to_string(), score, kkm).unwrap()
    }

    #[test]
    fn empty_summary_prints_hint() {
        let analytics = Analytics::from_semesters(default_semesters());
        assert_eq!(summary(&analytics), format!("{NO_DATA_HINT}\n"));
    }

    #[test]
    fn summary_lists_critical_subjects() {
        let mut semesters = default_semesters();
        semesters[0] = Semester::with_subjects(
            SemesterId::new(1).unwrap(),
            vec![subject("m", "Math", 80, 75), subject("s", "Science", 60, 70)],
        )
        .unwrap();
        let text = summary(&Analytics::from_semesters(semesters));

        assert!(text.contains("Semester 1 (Grade 10): 2 subjects, total 140, average 70,00 (fair)"));
        assert!(text.contains("Semester 5 (Grade 12): empty"));
        assert!(text.contains("Below KKM (1):"));
        assert!(text.contains("S1 Science"));
        assert!(text.contains("not enough semesters yet"));
        assert!(!text.contains("Subject trends:"));
    }

    #[test]
    fn summary_lists_subject_trends() {
        let mut semesters = default_semesters();
        semesters[0] = Semester::with_subjects(
            SemesterId::new(1).unwrap(),
            vec![subject("m1", "Math", 80, 75)],
        )
        .unwrap();
        semesters[1] = Semester::with_subjects(
            SemesterId::new(2).unwrap(),
            vec![subject("m2", "Math", 74, 75)],
        )
        .unwrap();
        let text = summary(&Analytics::from_semesters(semesters));

        assert!(text.contains("Subject trends:"));
        assert!(text.contains("Math                      80 →  74  ↓ -6"));
    }

    #[test]
    fn catalog_lines() {
        let entries = vec![SubjectInfo {
            name: "Math".to_string(),
            last_kkm: Kkm::new(78).unwrap(),
        }];
        assert!(catalog(&entries).contains("KKM 78"));
        assert_eq!(catalog(&[]), "no matching subjects\n");
    }
}
