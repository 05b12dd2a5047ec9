use serde::Serialize;

use crate::stats::aggregate::round2;

/// Coarse rating of a single score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreBand {
    #[must_use]
    pub fn of(score: f64) -> Self {
        if score >= 85.0 {
            ScoreBand::Excellent
        } else if score >= 75.0 {
            ScoreBand::Good
        } else if score >= 65.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
        }
    }
}

/// Overall standing derived from the overall average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    VeryGood,
    Good,
    NeedsImprovement,
}

impl Standing {
    #[must_use]
    pub fn of(overall_average: f64) -> Self {
        if overall_average >= 85.0 {
            Standing::VeryGood
        } else if overall_average >= 75.0 {
            Standing::Good
        } else {
            Standing::NeedsImprovement
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Standing::VeryGood => "Very good achievement",
            Standing::Good => "Good achievement",
            Standing::NeedsImprovement => "Needs improvement",
        }
    }

    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        match self {
            Standing::VeryGood => {
                "Averages are consistently high. Keep the study routine and focus on areas of interest."
            }
            Standing::Good => {
                "Results are good. Work on the subjects still below average to reach a better overall result."
            }
            Standing::NeedsImprovement => {
                "Focus on the lowest-scoring subjects, identify what makes them hard and try a different study approach."
            }
        }
    }
}

/// Next target: five points above the current average, capped at 100.
#[must_use]
pub fn target_average(overall_average: f64) -> f64 {
    round2((overall_average + 5.0).min(100.0))
}

/// Two decimals with a comma separator, e.g. `85,00`.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    format!("{value:.2}").replace('.', ",")
}

/// Integer with `.` as thousands separator, e.g. `1.234`.
#[must_use]
pub fn format_integer(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bands() {
        assert_eq!(ScoreBand::of(85.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::of(84.99), ScoreBand::Good);
        assert_eq!(ScoreBand::of(75.0), ScoreBand::Good);
        assert_eq!(ScoreBand::of(65.0), ScoreBand::Fair);
        assert_eq!(ScoreBand::of(64.0), ScoreBand::Poor);
    }

    #[test]
    fn standings() {
        assert_eq!(Standing::of(90.0), Standing::VeryGood);
        assert_eq!(Standing::of(75.0), Standing::Good);
        assert_eq!(Standing::of(74.99), Standing::NeedsImprovement);
    }

    #[test]
    fn target_is_capped() {
        assert_eq!(target_average(80.0), 85.0);
        assert_eq!(target_average(97.5), 100.0);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_decimal(85.0), "85,00");
        assert_eq!(format_decimal(70.333), "70,33");
        assert_eq!(format_integer(0), "0");
        assert_eq!(format_integer(999), "999");
        assert_eq!(format_integer(1234), "1.234");
        assert_eq!(format_integer(1_234_567), "1.234.567");
    }
}
