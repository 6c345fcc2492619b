// 📚 Course Entity - reference data populated by administrators
//
// Grade records point at a course by id; they never own it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: u32,

    pub name: String,

    /// Credit weight (1..=6)
    pub credits: u32,

    pub department: String,

    pub active: bool,

    /// Ordered, at most ten entries
    pub prerequisites: Vec<u32>,

    /// Grade a student needs in *this* course for it to count as a prerequisite
    pub min_grade_required: u32,

    /// Catalog level, e.g. 100 for introductory courses
    pub level: u32,
}

impl Course {
    /// Whether a grade in this course clears its prerequisite threshold
    pub fn is_satisfied_by(&self, grade: u32) -> bool {
        grade >= self.min_grade_required
    }
}

/// Input for `Ledger::add_course`; also the shape of one catalog CSV row
/// once its prerequisite column has been split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub course_id: u32,
    pub name: String,
    pub credits: u32,
    pub department: String,
    #[serde(default)]
    pub prerequisites: Vec<u32>,
    pub min_grade_required: u32,
    pub level: u32,
}

impl NewCourse {
    /// Materialize an active course from this input
    pub fn into_course(self) -> Course {
        Course {
            course_id: self.course_id,
            name: self.name,
            credits: self.credits,
            department: self.department,
            active: true,
            prerequisites: self.prerequisites,
            min_grade_required: self.min_grade_required,
            level: self.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn algorithms() -> NewCourse {
        NewCourse {
            course_id: 301,
            name: "Algorithms".to_string(),
            credits: 4,
            department: "CS".to_string(),
            prerequisites: vec![201, 202],
            min_grade_required: 70,
            level: 300,
        }
    }

    #[test]
    fn test_into_course_is_active() {
        let course = algorithms().into_course();
        assert!(course.active);
        assert_eq!(course.credits, 4);
        assert_eq!(course.prerequisites, vec![201, 202]);
    }

    #[test]
    fn test_prerequisite_threshold() {
        let course = algorithms().into_course();
        assert!(course.is_satisfied_by(70));
        assert!(!course.is_satisfied_by(69));
    }
}
