// 🗄️ Record Store - SQLite schema and row mapping
//
// Four keyed collections (students, courses, grades, academic_records) plus
// the administrator set and the audit log. Every function takes a plain
// `&Connection` so it can run on a connection or inside a transaction.

use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

use crate::academics::{WeightedPoints, PASSING_GRADE};
use crate::audit;
use crate::entities::{AcademicRecord, Course, GradeRecord, Student, StudentStatusUpdate};
use crate::error::LedgerResult;

pub fn setup_database(conn: &Connection) -> LedgerResult<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Students / Courses (reference data)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            student_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            enrollment_year INTEGER NOT NULL,
            major TEXT NOT NULL,
            active INTEGER NOT NULL,
            graduation_year INTEGER,
            total_credits INTEGER NOT NULL DEFAULT 0,
            standing TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses (
            course_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            credits INTEGER NOT NULL,
            department TEXT NOT NULL,
            active INTEGER NOT NULL,
            prerequisites TEXT NOT NULL,
            min_grade_required INTEGER NOT NULL,
            level INTEGER NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Grades / Academic Records (derived on every submission)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades (
            student_id INTEGER NOT NULL REFERENCES students(student_id),
            course_id INTEGER NOT NULL REFERENCES courses(course_id),
            grade INTEGER NOT NULL,
            semester INTEGER NOT NULL,
            year INTEGER NOT NULL,
            completed INTEGER NOT NULL,
            instructor TEXT NOT NULL,
            grade_points INTEGER NOT NULL,
            attempts INTEGER NOT NULL,
            PRIMARY KEY (student_id, course_id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS academic_records (
            student_id INTEGER PRIMARY KEY REFERENCES students(student_id),
            cumulative_gpa INTEGER NOT NULL,
            total_attempted_credits INTEGER NOT NULL,
            total_earned_credits INTEGER NOT NULL,
            honors TEXT NOT NULL,
            academic_warnings INTEGER NOT NULL,
            CHECK (total_earned_credits <= total_attempted_credits)
        )",
        [],
    )?;

    // ==========================================================================
    // Administrators / Ledger State / Audit Log
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS administrators (
            principal TEXT PRIMARY KEY,
            is_admin INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ledger_state (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS audit_log (
            transaction_id INTEGER PRIMARY KEY,
            timestamp INTEGER NOT NULL,
            action TEXT NOT NULL,
            actor TEXT NOT NULL,
            detail TEXT NOT NULL,
            previous_hash TEXT NOT NULL,
            entry_hash TEXT UNIQUE NOT NULL
        )",
        [],
    )?;

    // Audit entries are never edited or removed
    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS audit_log_no_update
         BEFORE UPDATE ON audit_log
         BEGIN SELECT RAISE(ABORT, 'audit log is append-only'); END",
        [],
    )?;

    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS audit_log_no_delete
         BEFORE DELETE ON audit_log
         BEGIN SELECT RAISE(ABORT, 'audit log is append-only'); END",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_course ON grades(course_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_audit_actor ON audit_log(actor)",
        [],
    )?;

    audit::init_counter(conn)?;

    Ok(())
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ============================================================================
// STUDENTS
// ============================================================================

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        student_id: row.get(0)?,
        name: row.get(1)?,
        enrollment_year: row.get(2)?,
        major: row.get(3)?,
        active: row.get(4)?,
        graduation_year: row.get(5)?,
        total_credits: row.get(6)?,
        standing: row.get(7)?,
    })
}

pub fn insert_student(conn: &Connection, student: &Student) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO students (
            student_id, name, enrollment_year, major, active,
            graduation_year, total_credits, standing
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            student.student_id,
            student.name,
            student.enrollment_year,
            student.major,
            student.active,
            student.graduation_year,
            student.total_credits,
            student.standing,
        ],
    )?;
    Ok(())
}

pub fn get_student(conn: &Connection, student_id: u32) -> LedgerResult<Option<Student>> {
    let student = conn
        .query_row(
            "SELECT student_id, name, enrollment_year, major, active,
                    graduation_year, total_credits, standing
             FROM students WHERE student_id = ?1",
            params![student_id],
            student_from_row,
        )
        .optional()?;
    Ok(student)
}

pub fn student_exists(conn: &Connection, student_id: u32) -> LedgerResult<bool> {
    let found: Option<u32> = conn
        .query_row(
            "SELECT student_id FROM students WHERE student_id = ?1",
            params![student_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn update_student_status(conn: &Connection, update: &StudentStatusUpdate) -> LedgerResult<()> {
    conn.execute(
        "UPDATE students SET active = ?1, graduation_year = ?2, standing = ?3
         WHERE student_id = ?4",
        params![
            update.active,
            update.graduation_year,
            update.standing,
            update.student_id,
        ],
    )?;
    Ok(())
}

pub fn set_student_credits(conn: &Connection, student_id: u32, total_credits: u32) -> LedgerResult<()> {
    conn.execute(
        "UPDATE students SET total_credits = ?1 WHERE student_id = ?2",
        params![total_credits, student_id],
    )?;
    Ok(())
}

pub fn student_count(conn: &Connection) -> LedgerResult<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
    Ok(count as u64)
}

// ============================================================================
// COURSES
// ============================================================================

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        course_id: row.get(0)?,
        name: row.get(1)?,
        credits: row.get(2)?,
        department: row.get(3)?,
        active: row.get(4)?,
        prerequisites: json_column(row, 5)?,
        min_grade_required: row.get(6)?,
        level: row.get(7)?,
    })
}

pub fn insert_course(conn: &Connection, course: &Course) -> LedgerResult<()> {
    let prerequisites_json = serde_json::to_string(&course.prerequisites)?;

    conn.execute(
        "INSERT INTO courses (
            course_id, name, credits, department, active,
            prerequisites, min_grade_required, level
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            course.course_id,
            course.name,
            course.credits,
            course.department,
            course.active,
            prerequisites_json,
            course.min_grade_required,
            course.level,
        ],
    )?;
    Ok(())
}

pub fn get_course(conn: &Connection, course_id: u32) -> LedgerResult<Option<Course>> {
    let course = conn
        .query_row(
            "SELECT course_id, name, credits, department, active,
                    prerequisites, min_grade_required, level
             FROM courses WHERE course_id = ?1",
            params![course_id],
            course_from_row,
        )
        .optional()?;
    Ok(course)
}

pub fn set_course_active(conn: &Connection, course_id: u32, active: bool) -> LedgerResult<()> {
    conn.execute(
        "UPDATE courses SET active = ?1 WHERE course_id = ?2",
        params![active, course_id],
    )?;
    Ok(())
}

pub fn course_count(conn: &Connection) -> LedgerResult<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
    Ok(count as u64)
}

// ============================================================================
// GRADES
// ============================================================================

const GRADE_COLUMNS: &str = "student_id, course_id, grade, semester, year, completed,
                             instructor, grade_points, attempts";

fn grade_from_row(row: &Row<'_>) -> rusqlite::Result<GradeRecord> {
    Ok(GradeRecord {
        student_id: row.get(0)?,
        course_id: row.get(1)?,
        grade: row.get(2)?,
        semester: row.get(3)?,
        year: row.get(4)?,
        completed: row.get(5)?,
        instructor: row.get(6)?,
        grade_points: row.get(7)?,
        attempts: row.get(8)?,
    })
}

pub fn get_grade(conn: &Connection, student_id: u32, course_id: u32) -> LedgerResult<Option<GradeRecord>> {
    let sql = format!(
        "SELECT {} FROM grades WHERE student_id = ?1 AND course_id = ?2",
        GRADE_COLUMNS
    );
    let grade = conn
        .query_row(&sql, params![student_id, course_id], grade_from_row)
        .optional()?;
    Ok(grade)
}

/// Insert or overwrite the single live record for the pair.
pub fn upsert_grade(conn: &Connection, record: &GradeRecord) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO grades (
            student_id, course_id, grade, semester, year, completed,
            instructor, grade_points, attempts
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(student_id, course_id) DO UPDATE SET
            grade = excluded.grade,
            semester = excluded.semester,
            year = excluded.year,
            completed = excluded.completed,
            instructor = excluded.instructor,
            grade_points = excluded.grade_points,
            attempts = excluded.attempts",
        params![
            record.student_id,
            record.course_id,
            record.grade,
            record.semester,
            record.year,
            record.completed,
            record.instructor,
            record.grade_points,
            record.attempts,
        ],
    )?;
    Ok(())
}

pub fn get_student_grades(conn: &Connection, student_id: u32) -> LedgerResult<Vec<GradeRecord>> {
    let sql = format!(
        "SELECT {} FROM grades WHERE student_id = ?1 ORDER BY course_id",
        GRADE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let grades = stmt
        .query_map(params![student_id], grade_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(grades)
}

/// Grade points and credit weight of every completed course of a student.
pub fn completed_weighted_points(conn: &Connection, student_id: u32) -> LedgerResult<Vec<WeightedPoints>> {
    let mut stmt = conn.prepare(
        "SELECT g.grade_points, c.credits
         FROM grades g
         JOIN courses c ON c.course_id = g.course_id
         WHERE g.student_id = ?1 AND g.completed = 1
         ORDER BY g.course_id",
    )?;

    let points = stmt
        .query_map(params![student_id], |row| {
            Ok(WeightedPoints {
                grade_points: row.get(0)?,
                credits: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(points)
}

/// Aggregate over the live grade records of one course
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseGradeStats {
    pub graded_students: u32,
    pub passing_students: u32,
    pub average_grade: Option<f64>,
}

pub fn course_grade_stats(conn: &Connection, course_id: u32) -> LedgerResult<CourseGradeStats> {
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN grade >= ?2 THEN 1 ELSE 0 END), 0),
                AVG(grade)
         FROM grades WHERE course_id = ?1",
        params![course_id, PASSING_GRADE],
        |row| {
            Ok(CourseGradeStats {
                graded_students: row.get(0)?,
                passing_students: row.get(1)?,
                average_grade: row.get(2)?,
            })
        },
    )?;
    Ok(stats)
}

// ============================================================================
// ACADEMIC RECORDS
// ============================================================================

pub fn get_academic_record(conn: &Connection, student_id: u32) -> LedgerResult<Option<AcademicRecord>> {
    let record = conn
        .query_row(
            "SELECT student_id, cumulative_gpa, total_attempted_credits,
                    total_earned_credits, honors, academic_warnings
             FROM academic_records WHERE student_id = ?1",
            params![student_id],
            |row| {
                Ok(AcademicRecord {
                    student_id: row.get(0)?,
                    cumulative_gpa: row.get(1)?,
                    total_attempted_credits: row.get(2)?,
                    total_earned_credits: row.get(3)?,
                    honors: json_column(row, 4)?,
                    academic_warnings: row.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

pub fn upsert_academic_record(conn: &Connection, record: &AcademicRecord) -> LedgerResult<()> {
    let honors_json = serde_json::to_string(&record.honors)?;

    conn.execute(
        "INSERT INTO academic_records (
            student_id, cumulative_gpa, total_attempted_credits,
            total_earned_credits, honors, academic_warnings
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(student_id) DO UPDATE SET
            cumulative_gpa = excluded.cumulative_gpa,
            total_attempted_credits = excluded.total_attempted_credits,
            total_earned_credits = excluded.total_earned_credits,
            honors = excluded.honors,
            academic_warnings = excluded.academic_warnings",
        params![
            record.student_id,
            record.cumulative_gpa,
            record.total_attempted_credits,
            record.total_earned_credits,
            honors_json,
            record.academic_warnings,
        ],
    )?;
    Ok(())
}
