// 📝 Grade Record - one live record per (student, course)
//
// The first submission creates the record; every later submission for the
// same pair overwrites it in place and bumps `attempts`.

use serde::{Deserialize, Serialize};

use crate::academics::grade_to_points;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub student_id: u32,
    pub course_id: u32,

    /// Numeric grade (0..=100)
    pub grade: u32,

    pub semester: u32,
    pub year: u32,

    /// Always true once a grade is recorded
    pub completed: bool,

    pub instructor: String,

    /// Derived from `grade`, never set independently
    pub grade_points: u32,

    pub attempts: u32,
}

impl GradeRecord {
    pub fn first_attempt(submission: &GradeSubmission) -> Self {
        GradeRecord {
            student_id: submission.student_id,
            course_id: submission.course_id,
            grade: submission.grade,
            semester: submission.semester,
            year: submission.year,
            completed: true,
            instructor: submission.instructor.clone(),
            grade_points: grade_to_points(submission.grade),
            attempts: 1,
        }
    }

    /// Overwrite this record with a repeat submission for the same pair
    pub fn resubmit(&mut self, submission: &GradeSubmission) {
        self.grade = submission.grade;
        self.semester = submission.semester;
        self.year = submission.year;
        self.completed = true;
        self.instructor = submission.instructor.clone();
        self.grade_points = grade_to_points(submission.grade);
        self.attempts += 1;
    }

    /// Upsert: resubmit onto `existing` or start a new record
    pub fn apply(existing: Option<GradeRecord>, submission: &GradeSubmission) -> Self {
        match existing {
            Some(mut record) => {
                record.resubmit(submission);
                record
            }
            None => GradeRecord::first_attempt(submission),
        }
    }
}

/// Input for `Ledger::record_grade`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeSubmission {
    pub student_id: u32,
    pub course_id: u32,
    pub grade: u32,
    pub semester: u32,
    pub year: u32,
    pub instructor: String,
}
