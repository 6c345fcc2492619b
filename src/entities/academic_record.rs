// 📊 Academic Record - derived totals, one per student
//
// Created lazily on the student's first grade submission. Before that a
// lookup yields `None`, never a zeroed placeholder row.

use serde::{Deserialize, Serialize};

use crate::academics::GPA_SCALE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicRecord {
    pub student_id: u32,

    /// Grade points x100 (3.50 is stored as 350)
    pub cumulative_gpa: u32,

    /// Grows by the course credits on every submission, repeats included
    pub total_attempted_credits: u32,

    /// Grows only on passing submissions; never exceeds attempted
    pub total_earned_credits: u32,

    pub honors: Vec<String>,

    /// One per failing submission
    pub academic_warnings: u32,
}

impl AcademicRecord {
    /// The record a student starts from before any grade exists
    pub fn empty(student_id: u32) -> Self {
        AcademicRecord {
            student_id,
            cumulative_gpa: 0,
            total_attempted_credits: 0,
            total_earned_credits: 0,
            honors: Vec::new(),
            academic_warnings: 0,
        }
    }

    /// GPA as a float, for display only
    pub fn gpa(&self) -> f64 {
        f64::from(self.cumulative_gpa) / f64::from(GPA_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record() {
        let record = AcademicRecord::empty(1001);
        assert_eq!(record.total_attempted_credits, 0);
        assert_eq!(record.total_earned_credits, 0);
        assert_eq!(record.academic_warnings, 0);
        assert!(record.honors.is_empty());
        assert_eq!(record.gpa(), 0.0);
    }

    #[test]
    fn test_gpa_display() {
        let mut record = AcademicRecord::empty(1001);
        record.cumulative_gpa = 350;
        assert_eq!(record.gpa(), 3.5);
    }

    #[test]
    fn test_gpa_rounds_down_in_storage() {
        let mut record = AcademicRecord::empty(1001);
        record.cumulative_gpa = 171;
        assert_eq!(format!("{:.2}", record.gpa()), "1.71");
    }
}
