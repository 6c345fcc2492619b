// 🔗 Prerequisite Graph Checker - single-level prerequisite gate
//
// A course's prerequisites are satisfied when, for every declared
// prerequisite, the student holds a completed grade at or above that
// prerequisite's own `min_grade_required`. Prerequisites of prerequisites
// are not re-walked.

use rusqlite::Connection;
use tracing::debug;

use crate::db;
use crate::entities::Course;
use crate::error::LedgerResult;

/// Why one declared prerequisite does not count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmetReason {
    /// Prerequisite course is not in the catalog
    UnknownCourse,
    /// No completed grade for it
    NotCompleted,
    /// Completed below the required grade
    BelowMinimum { grade: u32, required: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmetPrerequisite {
    pub course_id: u32,
    pub reason: UnmetReason,
}

/// Every prerequisite of `course` the student has not satisfied, in
/// declaration order. Empty means the gate is open.
pub fn unmet_prerequisites(
    conn: &Connection,
    student_id: u32,
    course: &Course,
) -> LedgerResult<Vec<UnmetPrerequisite>> {
    let mut unmet = Vec::new();

    for &prereq_id in &course.prerequisites {
        let reason = match db::get_course(conn, prereq_id)? {
            None => Some(UnmetReason::UnknownCourse),
            Some(prereq) => match db::get_grade(conn, student_id, prereq_id)? {
                Some(record) if record.completed => {
                    if prereq.is_satisfied_by(record.grade) {
                        None
                    } else {
                        Some(UnmetReason::BelowMinimum {
                            grade: record.grade,
                            required: prereq.min_grade_required,
                        })
                    }
                }
                _ => Some(UnmetReason::NotCompleted),
            },
        };

        if let Some(reason) = reason {
            debug!(student_id, course_id = course.course_id, prereq_id, ?reason, "prerequisite unmet");
            unmet.push(UnmetPrerequisite { course_id: prereq_id, reason });
        }
    }

    Ok(unmet)
}

/// Gate check by id. An unknown course is reported as unsatisfied rather
/// than as an error.
pub fn prerequisites_satisfied(conn: &Connection, student_id: u32, course_id: u32) -> LedgerResult<bool> {
    match db::get_course(conn, course_id)? {
        Some(course) => Ok(unmet_prerequisites(conn, student_id, &course)?.is_empty()),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_course, insert_student, setup_database, upsert_grade};
    use crate::entities::{GradeRecord, GradeSubmission, NewCourse, Student};

    fn course(course_id: u32, prerequisites: Vec<u32>, min_grade_required: u32) -> Course {
        NewCourse {
            course_id,
            name: format!("Course {}", course_id),
            credits: 3,
            department: "CS".to_string(),
            prerequisites,
            min_grade_required,
            level: 100,
        }
        .into_course()
    }

    fn grade(conn: &Connection, course_id: u32, grade: u32) {
        let submission = GradeSubmission {
            student_id: 1001,
            course_id,
            grade,
            semester: 1,
            year: 2023,
            instructor: "Hopper".to_string(),
        };
        upsert_grade(conn, &GradeRecord::first_attempt(&submission)).unwrap();
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        insert_student(&conn, &Student::new(1001, "Ada".to_string(), 2022, "CS".to_string())).unwrap();
        conn
    }

    #[test]
    fn test_no_prerequisites_is_trivially_satisfied() {
        let conn = setup();
        insert_course(&conn, &course(101, vec![], 60)).unwrap();
        assert!(prerequisites_satisfied(&conn, 1001, 101).unwrap());
    }

    #[test]
    fn test_unknown_course_is_unsatisfied() {
        let conn = setup();
        assert!(!prerequisites_satisfied(&conn, 1001, 999).unwrap());
    }

    #[test]
    fn test_missing_and_low_prerequisites() {
        let conn = setup();
        insert_course(&conn, &course(101, vec![], 70)).unwrap();
        insert_course(&conn, &course(102, vec![], 60)).unwrap();
        let advanced = course(301, vec![101, 102, 103], 60);
        insert_course(&conn, &advanced).unwrap();

        grade(&conn, 101, 65);

        let unmet = unmet_prerequisites(&conn, 1001, &advanced).unwrap();
        assert_eq!(
            unmet,
            vec![
                UnmetPrerequisite {
                    course_id: 101,
                    reason: UnmetReason::BelowMinimum { grade: 65, required: 70 },
                },
                UnmetPrerequisite { course_id: 102, reason: UnmetReason::NotCompleted },
                UnmetPrerequisite { course_id: 103, reason: UnmetReason::UnknownCourse },
            ]
        );
        assert!(!prerequisites_satisfied(&conn, 1001, 301).unwrap());
    }

    #[test]
    fn test_threshold_is_the_prerequisites_own() {
        let conn = setup();
        insert_course(&conn, &course(101, vec![], 70)).unwrap();
        // The dependent course's own minimum plays no part
        insert_course(&conn, &course(201, vec![101], 95)).unwrap();

        grade(&conn, 101, 70);
        assert!(prerequisites_satisfied(&conn, 1001, 201).unwrap());
    }

    #[test]
    fn test_single_level_only() {
        let conn = setup();
        insert_course(&conn, &course(101, vec![], 60)).unwrap();
        insert_course(&conn, &course(201, vec![101], 60)).unwrap();
        insert_course(&conn, &course(301, vec![201], 60)).unwrap();

        // 201 graded directly without 101 on record
        grade(&conn, 201, 80);
        assert!(prerequisites_satisfied(&conn, 1001, 301).unwrap());
    }
}
