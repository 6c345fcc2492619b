// 🏛️ Ledger - the record-mutation state machine
//
// Every mutation runs as one unit under the connection lock and inside one
// SQLite transaction:
//
//   gate (administrator?) → validate → existence → business rule
//     → write rows → append audit entry → commit
//
// The first failure drops the transaction, so a rejected request leaves no
// rows and no audit entry behind. Reads take the same lock and never observe
// a half-applied mutation.

use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

use crate::academics::recompute_academic_record;
use crate::access::{self, CallContext, Principal};
use crate::audit::{self, AuditAction, AuditEntry, ChainVerification};
use crate::db;
use crate::entities::{
    AcademicRecord, Course, GradeRecord, GradeSubmission, NewCourse, Student, StudentStatusUpdate,
};
use crate::error::{LedgerError, LedgerResult};
use crate::prerequisites;
use crate::validation::{self, COURSE_NAME, DEPARTMENT, INSTRUCTOR, MAJOR, STANDING, STUDENT_NAME};

// ============================================================================
// QUERY RESULTS
// ============================================================================

/// Everything on record for one student. All parts are empty for an
/// unknown student id; `academic_record` stays `None` until the first grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub student: Option<Student>,
    pub academic_record: Option<AcademicRecord>,
    pub grades: Vec<GradeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseStatistics {
    pub course: Course,
    pub active: bool,
    pub prerequisites: Vec<u32>,
    pub graded_students: u32,
    pub passing_students: u32,
    pub average_grade: Option<f64>,
}

// ============================================================================
// LEDGER
// ============================================================================

pub struct Ledger {
    conn: Mutex<Connection>,
}

impl Ledger {
    /// Open (or create) an on-disk ledger
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> LedgerResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> LedgerResult<Self> {
        db::setup_database(&conn)?;
        Ok(Ledger {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-mutation never committed, so the store is still consistent
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `op` as one administrator-gated, audited, all-or-nothing unit.
    /// `op` returns its value plus the audit detail text.
    fn mutate<T, F>(&self, ctx: &CallContext, action: AuditAction, op: F) -> LedgerResult<T>
    where
        F: FnOnce(&Connection) -> LedgerResult<(T, String)>,
    {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let outcome = access::require_administrator(&tx, &ctx.caller)
            .and_then(|_| validation::validate_timestamp(ctx.timestamp))
            .and_then(|_| op(&*tx));

        let (value, detail) = match outcome {
            Ok(done) => done,
            Err(err) => {
                warn!(
                    action = action.as_str(),
                    caller = %ctx.caller,
                    kind = err.kind(),
                    error = %err,
                    "mutation rejected"
                );
                return Err(err);
            }
        };

        let entry = audit::append_entry(&tx, ctx, action, &detail)?;
        tx.commit()?;

        info!(
            transaction_id = entry.transaction_id,
            action = action.as_str(),
            caller = %ctx.caller,
            "{}",
            detail
        );

        Ok(value)
    }

    // ========================================================================
    // ACCESS CONTROL
    // ========================================================================

    /// Seed an administrator at deployment. Host-only: no gate, no audit
    /// entry, no transaction id consumed.
    pub fn bootstrap_administrator(&self, principal: &Principal) -> LedgerResult<()> {
        let conn = self.lock();
        access::grant_administrator(&conn, principal)?;
        info!(principal = %principal, "administrator bootstrapped");
        Ok(())
    }

    /// Grant administrator rights to `new_admin`. Re-adding an existing
    /// administrator succeeds; naming oneself fails with `InvalidPrincipal`.
    pub fn add_administrator(&self, ctx: &CallContext, new_admin: &Principal) -> LedgerResult<()> {
        self.mutate(ctx, AuditAction::AddAdministrator, |conn| {
            access::validate_new_administrator(&ctx.caller, new_admin)?;
            access::grant_administrator(conn, new_admin)?;
            Ok(((), format!("administrator {} added", new_admin)))
        })
    }

    pub fn is_administrator(&self, principal: &Principal) -> LedgerResult<bool> {
        access::is_administrator(&self.lock(), principal)
    }

    pub fn administrators(&self) -> LedgerResult<Vec<Principal>> {
        access::list_administrators(&self.lock())
    }

    // ========================================================================
    // STUDENTS
    // ========================================================================

    pub fn add_student(
        &self,
        ctx: &CallContext,
        student_id: u32,
        name: &str,
        enrollment_year: u32,
        major: &str,
    ) -> LedgerResult<()> {
        self.mutate(ctx, AuditAction::AddStudent, |conn| {
            validation::validate_student_id(student_id)?;
            validation::validate_text(name, STUDENT_NAME)?;
            validation::validate_year(enrollment_year)?;
            validation::validate_text(major, MAJOR)?;

            if db::student_exists(conn, student_id)? {
                return Err(LedgerError::StudentExists(student_id));
            }

            let student = Student::new(student_id, name.to_string(), enrollment_year, major.to_string());
            db::insert_student(conn, &student)?;

            Ok(((), format!("student {} ({}) enrolled {} in {}", student_id, name, enrollment_year, major)))
        })
    }

    /// Deactivate, graduate or change the standing of a student. Students are never removed.
    pub fn update_student_status(&self, ctx: &CallContext, update: &StudentStatusUpdate) -> LedgerResult<()> {
        self.mutate(ctx, AuditAction::UpdateStudentStatus, |conn| {
            validation::validate_student_id(update.student_id)?;
            if let Some(year) = update.graduation_year {
                validation::validate_year(year)?;
            }
            validation::validate_text(&update.standing, STANDING)?;

            let student = db::get_student(conn, update.student_id)?
                .ok_or(LedgerError::StudentNotFound(update.student_id))?;

            if let Some(year) = update.graduation_year {
                if year < student.enrollment_year {
                    return Err(LedgerError::InvalidInput(format!(
                        "graduation year {} precedes enrollment year {}",
                        year, student.enrollment_year
                    )));
                }
            }

            db::update_student_status(conn, update)?;

            let graduation = update
                .graduation_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "none".to_string());
            Ok((
                (),
                format!(
                    "student {} status: active={} graduation={} standing={}",
                    update.student_id, update.active, graduation, update.standing
                ),
            ))
        })
    }

    // ========================================================================
    // COURSES
    // ========================================================================

    pub fn add_course(&self, ctx: &CallContext, course: &NewCourse) -> LedgerResult<()> {
        self.mutate(ctx, AuditAction::AddCourse, |conn| {
            validation::validate_course_id(course.course_id)?;
            validation::validate_text(&course.name, COURSE_NAME)?;
            validation::validate_credits(course.credits)?;
            validation::validate_text(&course.department, DEPARTMENT)?;
            validation::validate_grade(course.min_grade_required)?;
            validation::validate_level(course.level)?;
            validation::validate_prerequisites(course.course_id, &course.prerequisites)?;

            if db::get_course(conn, course.course_id)?.is_some() {
                return Err(LedgerError::CourseExists(course.course_id));
            }

            db::insert_course(conn, &course.clone().into_course())?;

            Ok((
                (),
                format!(
                    "course {} ({}) added: {} credits, prerequisites {:?}",
                    course.course_id, course.name, course.credits, course.prerequisites
                ),
            ))
        })
    }

    pub fn set_course_active(&self, ctx: &CallContext, course_id: u32, active: bool) -> LedgerResult<()> {
        self.mutate(ctx, AuditAction::SetCourseActive, |conn| {
            validation::validate_course_id(course_id)?;

            if db::get_course(conn, course_id)?.is_none() {
                return Err(LedgerError::CourseNotFound(course_id));
            }

            db::set_course_active(conn, course_id, active)?;
            Ok(((), format!("course {} active={}", course_id, active)))
        })
    }

    // ========================================================================
    // GRADES
    // ========================================================================

    /// Record (or re-record) a grade and recompute the student's academic
    /// record. Grade row, academic record, credit mirror and audit entry are
    /// committed together or not at all.
    pub fn record_grade(&self, ctx: &CallContext, submission: &GradeSubmission) -> LedgerResult<()> {
        self.mutate(ctx, AuditAction::RecordGrade, |conn| {
            let GradeSubmission {
                student_id,
                course_id,
                grade,
                semester,
                year,
                ref instructor,
            } = *submission;

            validation::validate_student_id(student_id)?;
            validation::validate_course_id(course_id)?;
            validation::validate_grade(grade)?;
            validation::validate_semester(semester)?;
            validation::validate_year(year)?;
            validation::validate_text(instructor, INSTRUCTOR)?;

            if !db::student_exists(conn, student_id)? {
                return Err(LedgerError::StudentNotFound(student_id));
            }
            let course = db::get_course(conn, course_id)?.ok_or(LedgerError::CourseNotFound(course_id))?;

            if !prerequisites::unmet_prerequisites(conn, student_id, &course)?.is_empty() {
                return Err(LedgerError::PrerequisiteNotMet { student_id, course_id });
            }

            let existing = db::get_grade(conn, student_id, course_id)?;
            let record = GradeRecord::apply(existing, submission);
            db::upsert_grade(conn, &record)?;

            let prior = db::get_academic_record(conn, student_id)?;
            let completed = db::completed_weighted_points(conn, student_id)?;
            let academic = recompute_academic_record(
                student_id,
                prior.as_ref(),
                course.credits,
                grade,
                &completed,
            );
            validation::validate_honors(&academic.honors)?;
            db::upsert_academic_record(conn, &academic)?;
            db::set_student_credits(conn, student_id, academic.total_earned_credits)?;

            Ok((
                (),
                format!(
                    "grade {} recorded for student {} in course {} ({}/{}, attempt {})",
                    grade, student_id, course_id, semester, year, record.attempts
                ),
            ))
        })
    }

    // ========================================================================
    // READ QUERIES (no gate)
    // ========================================================================

    pub fn student_count(&self) -> LedgerResult<u64> {
        db::student_count(&self.lock())
    }

    pub fn course_count(&self) -> LedgerResult<u64> {
        db::course_count(&self.lock())
    }

    pub fn get_student(&self, student_id: u32) -> LedgerResult<Option<Student>> {
        db::get_student(&self.lock(), student_id)
    }

    pub fn get_course(&self, course_id: u32) -> LedgerResult<Option<Course>> {
        db::get_course(&self.lock(), course_id)
    }

    pub fn get_grade(&self, student_id: u32, course_id: u32) -> LedgerResult<Option<GradeRecord>> {
        db::get_grade(&self.lock(), student_id, course_id)
    }

    pub fn get_student_grades(&self, student_id: u32) -> LedgerResult<Vec<GradeRecord>> {
        db::get_student_grades(&self.lock(), student_id)
    }

    pub fn get_academic_record(&self, student_id: u32) -> LedgerResult<Option<AcademicRecord>> {
        db::get_academic_record(&self.lock(), student_id)
    }

    pub fn prerequisites_satisfied(&self, student_id: u32, course_id: u32) -> LedgerResult<bool> {
        prerequisites::prerequisites_satisfied(&self.lock(), student_id, course_id)
    }

    pub fn get_student_transcript(&self, student_id: u32) -> LedgerResult<Transcript> {
        let conn = self.lock();

        let student = db::get_student(&conn, student_id)?;
        if student.is_none() {
            return Ok(Transcript {
                student: None,
                academic_record: None,
                grades: Vec::new(),
            });
        }

        Ok(Transcript {
            student,
            academic_record: db::get_academic_record(&conn, student_id)?,
            grades: db::get_student_grades(&conn, student_id)?,
        })
    }

    /// `None` for an unknown course.
    pub fn get_course_statistics(&self, course_id: u32) -> LedgerResult<Option<CourseStatistics>> {
        let conn = self.lock();

        let Some(course) = db::get_course(&conn, course_id)? else {
            return Ok(None);
        };
        let stats = db::course_grade_stats(&conn, course_id)?;

        Ok(Some(CourseStatistics {
            active: course.active,
            prerequisites: course.prerequisites.clone(),
            course,
            graded_students: stats.graded_students,
            passing_students: stats.passing_students,
            average_grade: stats.average_grade,
        }))
    }

    pub fn get_audit_entry(&self, transaction_id: u64) -> LedgerResult<Option<AuditEntry>> {
        audit::get_entry(&self.lock(), transaction_id)
    }

    pub fn audit_len(&self) -> LedgerResult<u64> {
        audit::entry_count(&self.lock())
    }

    pub fn audit_entries_for_actor(&self, actor: &Principal) -> LedgerResult<Vec<AuditEntry>> {
        audit::entries_for_actor(&self.lock(), actor)
    }

    pub fn latest_audit_timestamp(&self) -> LedgerResult<Option<u64>> {
        audit::latest_timestamp(&self.lock())
    }

    pub fn verify_audit_chain(&self) -> LedgerResult<ChainVerification> {
        audit::verify_chain(&self.lock())
    }
}
