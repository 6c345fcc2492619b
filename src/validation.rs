// 📐 Validation Layer - bounds checks on every mutating input
// Pure predicates: no state, first failure wins.

use crate::error::{LedgerError, LedgerResult};

// ============================================================================
// BOUNDS
// ============================================================================

pub const MIN_STUDENT_ID: u32 = 1;
pub const MAX_STUDENT_ID: u32 = 100_000;
pub const MIN_COURSE_ID: u32 = 1;
pub const MAX_COURSE_ID: u32 = 10_000;

pub const MIN_YEAR: u32 = 2000;
pub const MAX_YEAR: u32 = 2100;

pub const MIN_SEMESTER: u32 = 1;
pub const MAX_SEMESTER: u32 = 3;

pub const MIN_CREDITS: u32 = 1;
pub const MAX_CREDITS: u32 = 6;

pub const MAX_GRADE: u32 = 100;

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 999;

pub const MAX_PREREQUISITES: usize = 10;
pub const MAX_HONORS: usize = 5;

/// Inclusive character-count bounds for a free-text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBounds {
    pub field: &'static str,
    pub min: usize,
    pub max: usize,
}

pub const STUDENT_NAME: TextBounds = TextBounds { field: "student name", min: 2, max: 100 };
pub const COURSE_NAME: TextBounds = TextBounds { field: "course name", min: 2, max: 100 };
pub const MAJOR: TextBounds = TextBounds { field: "major", min: 1, max: 50 };
pub const DEPARTMENT: TextBounds = TextBounds { field: "department", min: 1, max: 50 };
pub const INSTRUCTOR: TextBounds = TextBounds { field: "instructor", min: 1, max: 100 };
pub const STANDING: TextBounds = TextBounds { field: "standing", min: 1, max: 30 };
pub const HONOR: TextBounds = TextBounds { field: "honor", min: 1, max: 50 };

// ============================================================================
// SCALAR CHECKS
// ============================================================================

pub fn validate_student_id(student_id: u32) -> LedgerResult<()> {
    if (MIN_STUDENT_ID..=MAX_STUDENT_ID).contains(&student_id) {
        Ok(())
    } else {
        Err(LedgerError::InvalidInput(format!(
            "student id {} is outside {}..={}",
            student_id, MIN_STUDENT_ID, MAX_STUDENT_ID
        )))
    }
}

pub fn validate_course_id(course_id: u32) -> LedgerResult<()> {
    if (MIN_COURSE_ID..=MAX_COURSE_ID).contains(&course_id) {
        Ok(())
    } else {
        Err(LedgerError::InvalidInput(format!(
            "course id {} is outside {}..={}",
            course_id, MIN_COURSE_ID, MAX_COURSE_ID
        )))
    }
}

pub fn validate_year(year: u32) -> LedgerResult<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(LedgerError::InvalidYear(year))
    }
}

pub fn validate_semester(semester: u32) -> LedgerResult<()> {
    if (MIN_SEMESTER..=MAX_SEMESTER).contains(&semester) {
        Ok(())
    } else {
        Err(LedgerError::InvalidSemester(semester))
    }
}

pub fn validate_credits(credits: u32) -> LedgerResult<()> {
    if (MIN_CREDITS..=MAX_CREDITS).contains(&credits) {
        Ok(())
    } else {
        Err(LedgerError::InvalidCredits(credits))
    }
}

pub fn validate_grade(grade: u32) -> LedgerResult<()> {
    if grade <= MAX_GRADE {
        Ok(())
    } else {
        Err(LedgerError::InvalidGrade(grade))
    }
}

pub fn validate_level(level: u32) -> LedgerResult<()> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(LedgerError::InvalidInput(format!(
            "course level {} is outside {}..={}",
            level, MIN_LEVEL, MAX_LEVEL
        )))
    }
}

/// Length is measured in characters, not bytes.
pub fn validate_text(value: &str, bounds: TextBounds) -> LedgerResult<()> {
    let len = value.chars().count();
    if len >= bounds.min && len <= bounds.max {
        Ok(())
    } else {
        Err(LedgerError::InvalidNameLength { field: bounds.field, len })
    }
}

// ============================================================================
// COMPOSITE CHECKS
// ============================================================================

/// A prerequisite list holds at most ten distinct, valid course ids and never
/// names the course it belongs to.
pub fn validate_prerequisites(course_id: u32, prerequisites: &[u32]) -> LedgerResult<()> {
    if prerequisites.len() > MAX_PREREQUISITES {
        return Err(LedgerError::InvalidInput(format!(
            "course {} declares {} prerequisites (max {})",
            course_id,
            prerequisites.len(),
            MAX_PREREQUISITES
        )));
    }

    for (i, &prereq) in prerequisites.iter().enumerate() {
        validate_course_id(prereq)?;

        if prereq == course_id {
            return Err(LedgerError::InvalidInput(format!(
                "course {} cannot be its own prerequisite",
                course_id
            )));
        }

        if prerequisites[..i].contains(&prereq) {
            return Err(LedgerError::InvalidInput(format!(
                "course {} lists prerequisite {} twice",
                course_id, prereq
            )));
        }
    }

    Ok(())
}

/// At most `MAX_HONORS` entries, each within `HONOR` bounds
pub fn validate_honors(honors: &[String]) -> LedgerResult<()> {
    if honors.len() > MAX_HONORS {
        return Err(LedgerError::InvalidNameLength {
            field: "honors",
            len: honors.len(),
        });
    }
    honors.iter().try_for_each(|h| validate_text(h, HONOR))
}

/// Host timestamps are stored as SQLite integers
pub fn validate_timestamp(timestamp: u64) -> LedgerResult<()> {
    if i64::try_from(timestamp).is_ok() {
        Ok(())
    } else {
        Err(LedgerError::InvalidInput(format!("timestamp {} out of range", timestamp)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_bounds() {
        assert!(validate_student_id(1).is_ok());
        assert!(validate_student_id(100_000).is_ok());
        assert!(matches!(validate_student_id(0), Err(LedgerError::InvalidInput(_))));
        assert!(matches!(validate_student_id(100_001), Err(LedgerError::InvalidInput(_))));

        assert!(validate_course_id(10_000).is_ok());
        assert!(matches!(validate_course_id(10_001), Err(LedgerError::InvalidInput(_))));
    }

    #[test]
    fn test_scalar_bounds() {
        assert!(validate_year(2000).is_ok());
        assert!(validate_year(2100).is_ok());
        assert!(matches!(validate_year(1999), Err(LedgerError::InvalidYear(1999))));

        assert!(validate_semester(3).is_ok());
        assert!(matches!(validate_semester(0), Err(LedgerError::InvalidSemester(0))));
        assert!(matches!(validate_semester(4), Err(LedgerError::InvalidSemester(4))));

        assert!(validate_credits(1).is_ok());
        assert!(validate_credits(6).is_ok());
        assert!(matches!(validate_credits(7), Err(LedgerError::InvalidCredits(7))));

        assert!(validate_grade(0).is_ok());
        assert!(validate_grade(100).is_ok());
        assert!(matches!(validate_grade(101), Err(LedgerError::InvalidGrade(101))));
    }

    #[test]
    fn test_text_bounds_count_chars() {
        assert!(validate_text("Ada", STUDENT_NAME).is_ok());
        assert!(matches!(
            validate_text("A", STUDENT_NAME),
            Err(LedgerError::InvalidNameLength { field: "student name", len: 1 })
        ));
        assert!(validate_text("X", MAJOR).is_ok());
        assert!(validate_text("", MAJOR).is_err());

        // Two characters, four bytes
        assert!(validate_text("Éé", STUDENT_NAME).is_ok());

        let long = "x".repeat(101);
        assert!(validate_text(&long, STUDENT_NAME).is_err());
    }

    #[test]
    fn test_prerequisite_list_rules() {
        assert!(validate_prerequisites(300, &[]).is_ok());
        assert!(validate_prerequisites(300, &[101, 201]).is_ok());

        let too_many: Vec<u32> = (1..=11).collect();
        assert!(validate_prerequisites(300, &too_many).is_err());

        assert!(validate_prerequisites(300, &[300]).is_err());
        assert!(validate_prerequisites(300, &[101, 101]).is_err());
        assert!(validate_prerequisites(300, &[0]).is_err());
    }

    #[test]
    fn test_honors_limit() {
        let five: Vec<String> = (0..5).map(|i| format!("Dean's List {}", i)).collect();
        assert!(validate_honors(&five).is_ok());

        let mut six = five.clone();
        six.push("Summa".to_string());
        assert!(matches!(
            validate_honors(&six),
            Err(LedgerError::InvalidNameLength { field: "honors", len: 6 })
        ));

        assert!(matches!(
            validate_honors(&[String::new()]),
            Err(LedgerError::InvalidNameLength { field: "honor", len: 0 })
        ));
    }

    #[test]
    fn test_timestamp_fits_storage() {
        assert!(validate_timestamp(0).is_ok());
        assert!(validate_timestamp(i64::MAX as u64).is_ok());
        assert!(matches!(validate_timestamp(u64::MAX), Err(LedgerError::InvalidInput(_))));
    }
}
