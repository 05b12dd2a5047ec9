use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::model::semester::SemesterError;

/// Number of grading periods tracked per student.
pub const SEMESTER_COUNT: usize = 5;

/// Identifier of one of the five semesters (1-based).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SemesterId(u8);

impl SemesterId {
    /// Creates a `SemesterId`.
    ///
    /// # Errors
    ///
    /// Returns `SemesterError::InvalidId` unless `id` is within `1..=5`.
    pub fn new(id: u8) -> Result<Self, SemesterError> {
        if id == 0 || usize::from(id) > SEMESTER_COUNT {
            return Err(SemesterError::InvalidId { id: i64::from(id) });
        }
        Ok(Self(id))
    }

    /// Semester id for a zero-based slot in the semester collection.
    ///
    /// # Errors
    ///
    /// Returns `SemesterError::InvalidId` if the slot is past the last semester.
    pub fn from_index(index: usize) -> Result<Self, SemesterError> {
        let id = u8::try_from(index + 1).map_err(|_| SemesterError::InvalidId {
            id: i64::try_from(index + 1).unwrap_or(i64::MAX),
        })?;
        Self::new(id)
    }

    /// All semester ids in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=SEMESTER_COUNT as u8).map(Self)
    }

    /// Returns the underlying 1-based value
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Zero-based slot of this semester.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::from(self.0) - 1
    }

    #[must_use]
    pub fn grade_level(&self) -> GradeLevel {
        match self.0 {
            1 | 2 => GradeLevel::Tenth,
            3 | 4 => GradeLevel::Eleventh,
            _ => GradeLevel::Twelfth,
        }
    }
}

impl TryFrom<u8> for SemesterId {
    type Error = SemesterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SemesterId> for u8 {
    fn from(id: SemesterId) -> Self {
        id.0
    }
}

/// School year a semester belongs to (two semesters per year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GradeLevel {
    Tenth,
    Eleventh,
    Twelfth,
}

impl GradeLevel {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            GradeLevel::Tenth => "Grade 10",
            GradeLevel::Eleventh => "Grade 11",
            GradeLevel::Twelfth => "Grade 12",
        }
    }
}

/// Unique identifier for a subject entry within a semester
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Wraps an existing identifier (for example one read back from storage).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ─── Debug / Display ───────────────────────────────────────────────────────────

impl fmt::Debug for SemesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SemesterId({})", self.0)
    }
}

impl fmt::Debug for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubjectId({})", self.0)
    }
}

impl fmt::Display for SemesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr ───────────────────────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for SemesterId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(|id| SemesterId::new(id).ok())
            .ok_or_else(|| ParseIdError {
                kind: "SemesterId".to_string(),
            })
    }
}

impl FromStr for SubjectId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                kind: "SubjectId".to_string(),
            });
        }
        Ok(SubjectId::new(trimmed))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
