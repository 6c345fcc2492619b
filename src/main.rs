// Academic Ledger - CLI host
//
// Plays the role of the execution host: it supplies the caller identity and
// the logical clock for every mutating call, then prints query results as JSON.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use academic_ledger::{
    import_courses, load_course_catalog, CallContext, GradeSubmission, Ledger, LedgerConfig,
    NewCourse, Principal, StudentStatusUpdate, VERSION,
};

#[derive(Parser)]
#[command(name = "academic-ledger")]
#[command(version, about = "Authoritative ledger of academic records")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "academic-ledger.toml")]
    config: PathBuf,

    /// SQLite database (overrides config file)
    #[arg(short, long, env = "ACADEMIC_LEDGER_DB")]
    database: Option<PathBuf>,

    /// Principal performing mutating commands
    #[arg(long, env = "ACADEMIC_LEDGER_CALLER")]
    caller: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database and seed configured administrators
    Init,

    /// Grant administrator rights to another principal
    AddAdmin { principal: String },

    AddStudent {
        student_id: u32,
        name: String,
        #[arg(long)]
        year: u32,
        #[arg(long)]
        major: String,
    },

    AddCourse {
        course_id: u32,
        name: String,
        #[arg(long)]
        credits: u32,
        #[arg(long)]
        department: String,
        /// Comma-separated prerequisite course ids
        #[arg(long, value_delimiter = ',')]
        prerequisites: Vec<u32>,
        /// Grade needed in this course to satisfy it as a prerequisite
        #[arg(long, default_value_t = 60)]
        min_grade: u32,
        #[arg(long, default_value_t = 100)]
        level: u32,
    },

    /// Seed courses from a CSV catalog
    ImportCourses { csv: PathBuf },

    RecordGrade {
        student_id: u32,
        course_id: u32,
        grade: u32,
        #[arg(long)]
        semester: u32,
        #[arg(long)]
        year: u32,
        #[arg(long)]
        instructor: String,
    },

    /// Change status fields; anything not given keeps its current value
    UpdateStudent {
        student_id: u32,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        graduation_year: Option<u32>,
        #[arg(long)]
        standing: Option<String>,
    },

    SetCourseActive {
        course_id: u32,
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },

    /// Student, academic record and grades
    Transcript { student_id: u32 },

    /// Course details and grade statistics
    Course { course_id: u32 },

    /// Look up one audit entry
    Audit { transaction_id: u64 },

    /// Recompute the audit hash chain
    VerifyAudit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = LedgerConfig::load(&cli.config)?;
    init_tracing(&config.logging.filter)?;

    let db_path = cli
        .database
        .clone()
        .unwrap_or_else(|| config.storage.database_path.clone());

    let ledger = Ledger::open(&db_path)
        .with_context(|| format!("Failed to open ledger at {}", db_path.display()))?;

    for admin in &config.bootstrap.administrators {
        ledger.bootstrap_administrator(&Principal::new(admin.as_str())?)?;
    }

    info!(version = VERSION, database = %db_path.display(), "ledger opened");

    run(&cli, &ledger, &db_path)
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Caller from the CLI; clock from wall time, never behind the last entry.
fn host_context(cli: &Cli, ledger: &Ledger) -> Result<CallContext> {
    let caller = cli
        .caller
        .as_deref()
        .context("--caller (or ACADEMIC_LEDGER_CALLER) is required for mutating commands")?;

    let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
    let timestamp = ledger
        .latest_audit_timestamp()?
        .map_or(now, |last| now.max(last));

    Ok(CallContext::new(Principal::new(caller)?, timestamp))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: &Cli, ledger: &Ledger, db_path: &std::path::Path) -> Result<()> {
    match &cli.command {
        Command::Init => {
            println!("✓ Ledger ready at {}", db_path.display());
            println!("✓ Administrators: {}", ledger.administrators()?.len());
            println!("✓ Students: {}", ledger.student_count()?);
            println!("✓ Courses: {}", ledger.course_count()?);
            println!("✓ Audit entries: {}", ledger.audit_len()?);
        }

        Command::AddAdmin { principal } => {
            let ctx = host_context(cli, ledger)?;
            ledger.add_administrator(&ctx, &Principal::new(principal.as_str())?)?;
            println!("✓ {} is now an administrator", principal);
        }

        Command::AddStudent { student_id, name, year, major } => {
            let ctx = host_context(cli, ledger)?;
            ledger.add_student(&ctx, *student_id, name, *year, major)?;
            println!("✓ Student {} added", student_id);
        }

        Command::AddCourse {
            course_id,
            name,
            credits,
            department,
            prerequisites,
            min_grade,
            level,
        } => {
            let ctx = host_context(cli, ledger)?;
            let course = NewCourse {
                course_id: *course_id,
                name: name.clone(),
                credits: *credits,
                department: department.clone(),
                prerequisites: prerequisites.clone(),
                min_grade_required: *min_grade,
                level: *level,
            };
            ledger.add_course(&ctx, &course)?;
            println!("✓ Course {} added", course_id);
        }

        Command::ImportCourses { csv } => {
            let ctx = host_context(cli, ledger)?;
            let courses = load_course_catalog(csv)?;
            println!("📂 Loaded {} courses from {}", courses.len(), csv.display());

            let report = import_courses(ledger, &ctx, &courses)?;
            println!("✓ Imported: {}", report.imported);
            println!("✓ Rejected: {}", report.rejected.len());
            for (course_id, err) in &report.rejected {
                println!("   - course {} [{}]: {}", course_id, err.kind(), err);
            }
        }

        Command::RecordGrade {
            student_id,
            course_id,
            grade,
            semester,
            year,
            instructor,
        } => {
            let ctx = host_context(cli, ledger)?;
            let submission = GradeSubmission {
                student_id: *student_id,
                course_id: *course_id,
                grade: *grade,
                semester: *semester,
                year: *year,
                instructor: instructor.clone(),
            };
            ledger.record_grade(&ctx, &submission)?;
            println!("✓ Grade {} recorded for student {} in course {}", grade, student_id, course_id);
        }

        Command::UpdateStudent {
            student_id,
            active,
            graduation_year,
            standing,
        } => {
            let ctx = host_context(cli, ledger)?;
            let current = ledger
                .get_student(*student_id)?
                .with_context(|| format!("student {} not found", student_id))?;

            let mut update = StudentStatusUpdate::unchanged(&current);
            if let Some(active) = active {
                update.active = *active;
            }
            if let Some(year) = graduation_year {
                update.graduation_year = Some(*year);
            }
            if let Some(standing) = standing {
                update.standing = standing.clone();
            }
            ledger.update_student_status(&ctx, &update)?;
            println!("✓ Student {} updated", student_id);
        }

        Command::SetCourseActive { course_id, active } => {
            let ctx = host_context(cli, ledger)?;
            ledger.set_course_active(&ctx, *course_id, *active)?;
            println!("✓ Course {} active={}", course_id, active);
        }

        Command::Transcript { student_id } => {
            let transcript = ledger.get_student_transcript(*student_id)?;
            print_json(&transcript)?;
            if let Some(record) = &transcript.academic_record {
                println!("cumulative GPA {:.2}", record.gpa());
            }
        }

        Command::Course { course_id } => match ledger.get_course_statistics(*course_id)? {
            Some(stats) => print_json(&stats)?,
            None => bail!("course {} not found", course_id),
        },

        Command::Audit { transaction_id } => match ledger.get_audit_entry(*transaction_id)? {
            Some(entry) => {
                print_json(&entry)?;
                if let Some(at) = entry.timestamp_utc() {
                    println!("recorded at {}", at.to_rfc3339());
                }
            }
            None => println!("audit entry {} not found", transaction_id),
        },

        Command::VerifyAudit => {
            let report = ledger.verify_audit_chain()?;
            match report.first_broken {
                None => println!("✅ Audit chain intact ({} entries)", report.entries),
                Some(id) => bail!("audit chain broken at transaction {} ({} entries)", id, report.entries),
            }
        }
    }

    Ok(())
}
