use thiserror::Error;

use crate::model::{SemesterError, SubjectError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Semester(#[from] SemesterError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Score, SemesterId};

    fn check(score: i64, semester: u8) -> Result<(), Error> {
        Score::new(score)?;
        SemesterId::new(semester)?;
        Ok(())
    }

    #[test]
    fn domain_errors_convert() {
        assert!(matches!(check(0, 1), Err(Error::Subject(_))));
        assert!(matches!(check(50, 9), Err(Error::Semester(_))));
        assert!(check(50, 1).is_ok());
    }
}
