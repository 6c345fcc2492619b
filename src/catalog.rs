// 📥 Course Catalog Import - CSV → add_course
//
// Seeds course reference data in bulk. Each row goes through the normal
// administrator-gated `add_course`, so validation and auditing are the same
// as for a single course. Rejected rows are reported, not fatal.
//
// CSV header:
//   course_id,name,credits,department,prerequisites,min_grade_required,level
// `prerequisites` is a ';'-separated id list and may be empty.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::access::CallContext;
use crate::entities::NewCourse;
use crate::error::LedgerError;
use crate::ledger::Ledger;

#[derive(Debug, Deserialize)]
struct CatalogRow {
    course_id: u32,
    name: String,
    credits: u32,
    department: String,
    #[serde(default)]
    prerequisites: String,
    min_grade_required: u32,
    level: u32,
}

/// "101; 102" → [101, 102]
pub fn parse_prerequisites(field: &str) -> Result<Vec<u32>> {
    field
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("Invalid prerequisite id '{}'", s))
        })
        .collect()
}

pub fn read_course_catalog<R: Read>(reader: R) -> Result<Vec<NewCourse>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut courses = Vec::new();

    for (i, result) in rdr.deserialize().enumerate() {
        // Header is line 1
        let line = i + 2;
        let row: CatalogRow =
            result.with_context(|| format!("Failed to deserialize catalog line {}", line))?;

        let prerequisites = parse_prerequisites(&row.prerequisites)
            .with_context(|| format!("Catalog line {}", line))?;

        courses.push(NewCourse {
            course_id: row.course_id,
            name: row.name,
            credits: row.credits,
            department: row.department,
            prerequisites,
            min_grade_required: row.min_grade_required,
            level: row.level,
        });
    }

    Ok(courses)
}

pub fn load_course_catalog(csv_path: &Path) -> Result<Vec<NewCourse>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open catalog {}", csv_path.display()))?;
    read_course_catalog(file)
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub rejected: Vec<(u32, LedgerError)>,
}

/// Add every course; precondition failures are collected, storage failures
/// abort the import.
pub fn import_courses(ledger: &Ledger, ctx: &CallContext, courses: &[NewCourse]) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for course in courses {
        match ledger.add_course(ctx, course) {
            Ok(()) => report.imported += 1,
            Err(err) if err.is_rejection() => {
                warn!(course_id = course.course_id, error = %err, "catalog row rejected");
                report.rejected.push((course.course_id, err));
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Importing course {}", course.course_id))
            }
        }
    }

    Ok(report)
}
