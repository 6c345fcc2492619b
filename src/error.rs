// ⚠️ Ledger Errors - typed, terminal outcomes
// Every rejected request maps to exactly one variant; nothing is retried here.

use thiserror::Error;

/// Why a ledger operation was rejected.
///
/// Domain variants signal a violated precondition and are raised before any
/// row is touched. `Storage` and `Serialization` wrap failures of the
/// underlying SQLite store; the surrounding transaction is rolled back in
/// every case.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("caller is not an administrator")]
    NotAuthorized,

    #[error("student {0} already exists")]
    StudentExists(u32),

    #[error("course {0} already exists")]
    CourseExists(u32),

    #[error("student {0} not found")]
    StudentNotFound(u32),

    #[error("course {0} not found")]
    CourseNotFound(u32),

    #[error("grade {0} is outside 0..=100")]
    InvalidGrade(u32),

    #[error("semester {0} is outside 1..=3")]
    InvalidSemester(u32),

    #[error("year {0} is outside 2000..=2100")]
    InvalidYear(u32),

    #[error("credits {0} are outside 1..=6")]
    InvalidCredits(u32),

    #[error("{field} has invalid length {len}")]
    InvalidNameLength { field: &'static str, len: usize },

    #[error("student {student_id} has not met the prerequisites of course {course_id}")]
    PrerequisiteNotMet { student_id: u32, course_id: u32 },

    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    /// Stable machine-readable code for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::NotAuthorized => "not_authorized",
            LedgerError::StudentExists(_) => "student_exists",
            LedgerError::CourseExists(_) => "course_exists",
            LedgerError::StudentNotFound(_) => "student_not_found",
            LedgerError::CourseNotFound(_) => "course_not_found",
            LedgerError::InvalidGrade(_) => "invalid_grade",
            LedgerError::InvalidSemester(_) => "invalid_semester",
            LedgerError::InvalidYear(_) => "invalid_year",
            LedgerError::InvalidCredits(_) => "invalid_credits",
            LedgerError::InvalidNameLength { .. } => "invalid_name_length",
            LedgerError::PrerequisiteNotMet { .. } => "prerequisite_not_met",
            LedgerError::InvalidPrincipal(_) => "invalid_principal",
            LedgerError::InvalidInput(_) => "invalid_input",
            LedgerError::Storage(_) => "storage",
            LedgerError::Serialization(_) => "serialization",
        }
    }

    /// True for precondition failures, false for store failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LedgerError::Storage(_) | LedgerError::Serialization(_))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(LedgerError::NotAuthorized.kind(), "not_authorized");
        assert_eq!(
            LedgerError::PrerequisiteNotMet { student_id: 1, course_id: 2 }.kind(),
            "prerequisite_not_met"
        );
        assert_eq!(
            LedgerError::InvalidNameLength { field: "name", len: 1 }.kind(),
            "invalid_name_length"
        );
    }

    #[test]
    fn test_rejection_vs_storage() {
        assert!(LedgerError::StudentExists(1).is_rejection());
        assert!(!LedgerError::Storage(rusqlite::Error::QueryReturnedNoRows).is_rejection());
    }

    #[test]
    fn test_display_mentions_ids() {
        let err = LedgerError::CourseNotFound(202);
        assert_eq!(err.to_string(), "course 202 not found");
    }
}
