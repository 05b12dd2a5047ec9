use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::model::ids::SubjectId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject name cannot be empty")]
    EmptyName,

    #[error("score must be between 1 and 100, got {provided}")]
    ScoreOutOfRange { provided: i64 },

    #[error("KKM must be between 0 and 100, got {provided}")]
    KkmOutOfRange { provided: i64 },
}

/// Recoverable input problems. The subject is still saved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectWarning {
    /// The threshold text was not a number; the default was used instead.
    KkmNotNumeric { raw: String },
}

impl fmt::Display for SubjectWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectWarning::KkmNotNumeric { raw } => write!(
                f,
                "KKM \"{raw}\" is not a number, using {}",
                Kkm::DEFAULT
            ),
        }
    }
}

//
// ─── VALUE TYPES ───────────────────────────────────────────────────────────────
//

/// A recorded score in `1..=100`.
///
/// Zero is reserved as the "no data" marker in chart series, so it can never
/// be a valid score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    /// # Errors
    ///
    /// Returns `SubjectError::ScoreOutOfRange` outside `1..=100`.
    pub fn new(value: i64) -> Result<Self, SubjectError> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(SubjectError::ScoreOutOfRange { provided: value });
        }
        // Range checked above.
        Ok(Self(value as u8))
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        u32::from(self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum passing threshold ("Kriteria Ketuntasan Minimal") in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Kkm(u8);

impl Kkm {
    pub const DEFAULT: Kkm = Kkm(75);
    pub const MAX: u8 = 100;

    /// # Errors
    ///
    /// Returns `SubjectError::KkmOutOfRange` outside `0..=100`.
    pub fn new(value: i64) -> Result<Self, SubjectError> {
        if !(0..=i64::from(Self::MAX)).contains(&value) {
            return Err(SubjectError::KkmOutOfRange { provided: value });
        }
        Ok(Self(value as u8))
    }

    /// Interprets raw form input for the threshold.
    ///
    /// Missing or blank input silently falls back to [`Kkm::DEFAULT`]; text that
    /// is not a number also falls back, but reports a warning. Decimal input
    /// (`"72.5"` or `"72,5"`) is truncated.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::KkmOutOfRange` for numbers outside `0..=100`.
    pub fn parse_input(raw: Option<&str>) -> Result<(Self, Option<SubjectWarning>), SubjectError> {
        let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok((Self::DEFAULT, None));
        };
        match parse_number(text) {
            Some(value) => Self::new(value).map(|kkm| (kkm, None)),
            None => Ok((
                Self::DEFAULT,
                Some(SubjectWarning::KkmNotNumeric {
                    raw: text.to_string(),
                }),
            )),
        }
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        u32::from(self.0)
    }
}

impl Default for Kkm {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Kkm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated subject name (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubjectName(String);

impl SubjectName {
    /// # Errors
    ///
    /// Returns `SubjectError::EmptyName` if the name is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, SubjectError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SubjectError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coerces score text the way the entry form does: anything unparsable
/// becomes `0`, which validation then rejects.
#[must_use]
pub fn parse_score_input(raw: &str) -> i64 {
    parse_number(raw.trim()).unwrap_or(0)
}

fn parse_number(text: &str) -> Option<i64> {
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    let value = text.replace(',', ".").parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(value.trunc() as i64)
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// A graded subject inside one semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    id: SubjectId,
    name: SubjectName,
    score: Score,
    kkm: Kkm,
}

impl Subject {
    #[must_use]
    pub fn new(id: SubjectId, name: SubjectName, score: Score, kkm: Kkm) -> Self {
        Self {
            id,
            name,
            score,
            kkm,
        }
    }

    /// Rehydrate a subject from persisted primitives.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` if any field violates its range.
    pub fn from_persisted(
        id: SubjectId,
        name: String,
        score: i64,
        kkm: i64,
    ) -> Result<Self, SubjectError> {
        Ok(Self {
            id,
            name: SubjectName::new(name)?,
            score: Score::new(score)?,
            kkm: Kkm::new(kkm)?,
        })
    }

    #[must_use]
    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &SubjectName {
        &self.name
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn kkm(&self) -> Kkm {
        self.kkm
    }

    /// Strictly below the threshold; meeting it exactly passes.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.score.value() < self.kkm.value()
    }
}

/// Raw subject input as typed into the entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectDraft {
    pub name: String,
    pub score: i64,
    pub kkm: Option<String>,
}

/// Outcome of a successful validation, with any recovered input issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubject {
    pub subject: Subject,
    pub warning: Option<SubjectWarning>,
}

impl SubjectDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
            kkm: None,
        }
    }

    #[must_use]
    pub fn with_kkm(mut self, raw: impl Into<String>) -> Self {
        self.kkm = Some(raw.into());
        self
    }

    /// Validate the draft and assign it the given id.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` for an empty name, a score outside `1..=100`, or
    /// a numeric threshold outside `0..=100`.
    pub fn validate(self, id: SubjectId) -> Result<ValidatedSubject, SubjectError> {
        let name = SubjectName::new(self.name)?;
        let score = Score::new(self.score)?;
        let (kkm, warning) = Kkm::parse_input(self.kkm.as_deref())?;
        Ok(ValidatedSubject {
            subject: Subject::new(id, name, score, kkm),
            warning,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
