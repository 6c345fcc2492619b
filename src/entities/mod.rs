// Entity Models
//
// Each entity is keyed by integer ids handed in by administrators:
// - Student and Course are created once and only updated afterwards
// - GradeRecord is keyed by (student, course) and overwritten on retakes
// - AcademicRecord is derived state, recomputed on every grade submission

pub mod student;
pub mod course;
pub mod grade;
pub mod academic_record;

pub use student::{Student, StudentStatusUpdate, DEFAULT_STANDING};
pub use course::{Course, NewCourse};
pub use grade::{GradeRecord, GradeSubmission};
pub use academic_record::AcademicRecord;
