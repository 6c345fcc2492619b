// 🎓 Student Entity - keyed by student id, never deleted
//
// A student is created once by an administrator. Afterwards only its status
// (active flag, graduation year, standing) and its earned-credit mirror move.

use serde::{Deserialize, Serialize};

/// Standing assigned to every newly enrolled student.
pub const DEFAULT_STANDING: &str = "Good Standing";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: u32,

    /// Display name
    pub name: String,

    pub enrollment_year: u32,

    pub major: String,

    /// Inactive students keep their history but are no longer enrolled
    pub active: bool,

    pub graduation_year: Option<u32>,

    /// Mirrors `AcademicRecord::total_earned_credits`
    pub total_credits: u32,

    pub standing: String,
}

impl Student {
    /// Create a freshly enrolled student (active, no credits, default standing)
    pub fn new(student_id: u32, name: String, enrollment_year: u32, major: String) -> Self {
        Student {
            student_id,
            name,
            enrollment_year,
            major,
            active: true,
            graduation_year: None,
            total_credits: 0,
            standing: DEFAULT_STANDING.to_string(),
        }
    }

    pub fn is_graduated(&self) -> bool {
        self.graduation_year.is_some()
    }
}

/// Administrative status change for an existing student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentStatusUpdate {
    pub student_id: u32,
    pub active: bool,
    pub graduation_year: Option<u32>,
    pub standing: String,
}

impl StudentStatusUpdate {
    /// An update that leaves `student` as it is; callers override only the
    /// fields they mean to change.
    pub fn unchanged(student: &Student) -> Self {
        StudentStatusUpdate {
            student_id: student.student_id,
            active: student.active,
            graduation_year: student.graduation_year,
            standing: student.standing.clone(),
        }
    }
}
