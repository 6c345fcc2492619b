// Academic Ledger - Core Library
// Authoritative record of students, courses, grades and the audit history
// of every administrative change. Exposes all modules for the CLI and tests.

pub mod error;
pub mod validation;
pub mod access;
pub mod academics;
pub mod entities;
pub mod prerequisites;
pub mod db;
pub mod audit;
pub mod ledger;
pub mod catalog;
pub mod config;

// Re-export commonly used types
pub use error::{LedgerError, LedgerResult};
pub use access::{CallContext, Principal};
pub use academics::{
    cumulative_gpa, grade_to_points, recompute_academic_record, WeightedPoints,
    GPA_SCALE, PASSING_GRADE,
};
pub use entities::{
    AcademicRecord, Course, GradeRecord, GradeSubmission, NewCourse, Student,
    StudentStatusUpdate, DEFAULT_STANDING,
};
pub use prerequisites::{UnmetPrerequisite, UnmetReason};
pub use audit::{AuditAction, AuditEntry, ChainVerification};
pub use ledger::{CourseStatistics, Ledger, Transcript};
pub use catalog::{import_courses, load_course_catalog, ImportReport};
pub use config::LedgerConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
