// 📜 Audit Log - append-only history of administrative actions
//
// One entry per successful mutation. The transaction counter lives in
// `ledger_state` and is only read or advanced from this module. Each entry is
// chained to its predecessor by a SHA-256 digest so history rewrites are
// detectable.

use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::access::{CallContext, Principal};
use crate::error::{LedgerError, LedgerResult};

const COUNTER_KEY: &str = "next_transaction_id";

/// `previous_hash` of the very first entry.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// ============================================================================
// ACTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    AddAdministrator,
    AddStudent,
    AddCourse,
    RecordGrade,
    UpdateStudentStatus,
    SetCourseActive,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::AddAdministrator => "add_administrator",
            AuditAction::AddStudent => "add_student",
            AuditAction::AddCourse => "add_course",
            AuditAction::RecordGrade => "record_grade",
            AuditAction::UpdateStudentStatus => "update_student_status",
            AuditAction::SetCourseActive => "set_course_active",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "add_administrator" => Some(AuditAction::AddAdministrator),
            "add_student" => Some(AuditAction::AddStudent),
            "add_course" => Some(AuditAction::AddCourse),
            "record_grade" => Some(AuditAction::RecordGrade),
            "update_student_status" => Some(AuditAction::UpdateStudentStatus),
            "set_course_active" => Some(AuditAction::SetCourseActive),
            _ => None,
        }
    }
}

// ============================================================================
// ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub transaction_id: u64,

    /// Host logical clock at the time of the mutation
    pub timestamp: u64,

    pub action: AuditAction,
    pub actor: Principal,
    pub detail: String,

    pub previous_hash: String,
    pub entry_hash: String,
}

impl AuditEntry {
    /// Digest binding this entry's content to its predecessor
    pub fn compute_hash(
        previous_hash: &str,
        transaction_id: u64,
        timestamp: u64,
        action: AuditAction,
        actor: &Principal,
        detail: &str,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}|{}|{}|{}",
            previous_hash,
            transaction_id,
            timestamp,
            action.as_str(),
            actor,
            detail
        ));
        format!("{:x}", hasher.finalize())
    }

    pub fn is_intact(&self) -> bool {
        self.entry_hash
            == Self::compute_hash(
                &self.previous_hash,
                self.transaction_id,
                self.timestamp,
                self.action,
                &self.actor,
                &self.detail,
            )
    }

    /// Logical timestamp read as Unix seconds, for display
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

/// Outcome of walking the whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainVerification {
    pub entries: u64,
    /// First transaction id whose link or digest does not check out
    pub first_broken: Option<u64>,
}

impl ChainVerification {
    pub fn is_valid(&self) -> bool {
        self.first_broken.is_none()
    }
}

// ============================================================================
// COUNTER
// ============================================================================

/// Create the counter at 0 if this is a fresh store.
pub fn init_counter(conn: &Connection) -> LedgerResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO ledger_state (key, value) VALUES (?1, 0)",
        params![COUNTER_KEY],
    )?;
    Ok(())
}

/// Id the next successful mutation will receive.
pub fn next_transaction_id(conn: &Connection) -> LedgerResult<u64> {
    let value: i64 = conn.query_row(
        "SELECT value FROM ledger_state WHERE key = ?1",
        params![COUNTER_KEY],
        |row| row.get(0),
    )?;
    Ok(value as u64)
}

// ============================================================================
// APPEND / READ
// ============================================================================

/// Write the next entry and advance the counter by one.
///
/// Must run inside the same SQLite transaction as the mutation it records.
pub fn append_entry(
    conn: &Connection,
    ctx: &CallContext,
    action: AuditAction,
    detail: &str,
) -> LedgerResult<AuditEntry> {
    let transaction_id = next_transaction_id(conn)?;
    let timestamp = i64::try_from(ctx.timestamp).map_err(|_| {
        LedgerError::InvalidInput(format!("timestamp {} out of range", ctx.timestamp))
    })?;

    let previous_hash: String = conn
        .query_row(
            "SELECT entry_hash FROM audit_log ORDER BY transaction_id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or_else(|| GENESIS_HASH.to_string());

    let entry_hash = AuditEntry::compute_hash(
        &previous_hash,
        transaction_id,
        ctx.timestamp,
        action,
        &ctx.caller,
        detail,
    );

    conn.execute(
        "INSERT INTO audit_log (
            transaction_id, timestamp, action, actor, detail, previous_hash, entry_hash
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            transaction_id as i64,
            timestamp,
            action.as_str(),
            ctx.caller.as_str(),
            detail,
            previous_hash,
            entry_hash,
        ],
    )?;

    conn.execute(
        "UPDATE ledger_state SET value = value + 1 WHERE key = ?1",
        params![COUNTER_KEY],
    )?;

    Ok(AuditEntry {
        transaction_id,
        timestamp: ctx.timestamp,
        action,
        actor: ctx.caller.clone(),
        detail: detail.to_string(),
        previous_hash,
        entry_hash,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<AuditEntry> {
    let transaction_id: i64 = row.get(0)?;
    let timestamp: i64 = row.get(1)?;
    let action_code: String = row.get(2)?;
    let actor: String = row.get(3)?;

    let action = AuditAction::from_code(&action_code)
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(2, "action".to_string(), Type::Text))?;
    let actor = Principal::new(actor)
        .map_err(|_| rusqlite::Error::InvalidColumnType(3, "actor".to_string(), Type::Text))?;

    Ok(AuditEntry {
        transaction_id: transaction_id as u64,
        timestamp: timestamp as u64,
        action,
        actor,
        detail: row.get(4)?,
        previous_hash: row.get(5)?,
        entry_hash: row.get(6)?,
    })
}

const ENTRY_COLUMNS: &str =
    "transaction_id, timestamp, action, actor, detail, previous_hash, entry_hash";

/// Absent ids are `Ok(None)`, not an error.
pub fn get_entry(conn: &Connection, transaction_id: u64) -> LedgerResult<Option<AuditEntry>> {
    let sql = format!(
        "SELECT {} FROM audit_log WHERE transaction_id = ?1",
        ENTRY_COLUMNS
    );
    let entry = conn
        .query_row(&sql, params![transaction_id as i64], entry_from_row)
        .optional()?;
    Ok(entry)
}

pub fn entry_count(conn: &Connection) -> LedgerResult<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))?;
    Ok(count as u64)
}

pub fn latest_timestamp(conn: &Connection) -> LedgerResult<Option<u64>> {
    let ts: Option<i64> =
        conn.query_row("SELECT MAX(timestamp) FROM audit_log", [], |row| row.get(0))?;
    Ok(ts.map(|t| t as u64))
}

pub fn entries_for_actor(conn: &Connection, actor: &Principal) -> LedgerResult<Vec<AuditEntry>> {
    let sql = format!(
        "SELECT {} FROM audit_log WHERE actor = ?1 ORDER BY transaction_id",
        ENTRY_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(params![actor.as_str()], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

pub fn all_entries(conn: &Connection) -> LedgerResult<Vec<AuditEntry>> {
    let sql = format!("SELECT {} FROM audit_log ORDER BY transaction_id", ENTRY_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map([], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Walk the log from id 0: ids must be gap-free, each entry must link to its
/// predecessor's digest and its own digest must match its content.
pub fn verify_chain(conn: &Connection) -> LedgerResult<ChainVerification> {
    let entries = all_entries(conn)?;
    let mut expected_id = 0u64;
    let mut previous_hash = GENESIS_HASH.to_string();

    for entry in &entries {
        if entry.transaction_id != expected_id
            || entry.previous_hash != previous_hash
            || !entry.is_intact()
        {
            return Ok(ChainVerification {
                entries: entries.len() as u64,
                first_broken: Some(entry.transaction_id),
            });
        }
        expected_id += 1;
        previous_hash = entry.entry_hash.clone();
    }

    // Counter must sit right after the last entry
    let first_broken = if next_transaction_id(conn)? != expected_id {
        Some(expected_id)
    } else {
        None
    };

    Ok(ChainVerification {
        entries: entries.len() as u64,
        first_broken,
    })
}
