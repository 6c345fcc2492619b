// 🔐 Access Control - administrator set
// Two tiers only: administrators may mutate, everyone else may read.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, LedgerResult};

// ============================================================================
// PRINCIPAL
// ============================================================================

/// Identity of a caller as supplied by the host (wallet address, account
/// name, ...). Opaque to the ledger apart from equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> LedgerResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(LedgerError::InvalidInput("principal must not be empty".to_string()));
        }
        Ok(Principal(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// CALL CONTEXT
// ============================================================================

/// What the host hands to every mutating call: who is calling and the
/// logical clock value to stamp the audit entry with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Principal,
    pub timestamp: u64,
}

impl CallContext {
    pub fn new(caller: Principal, timestamp: u64) -> Self {
        CallContext { caller, timestamp }
    }
}

// ============================================================================
// ADMINISTRATOR SET
// ============================================================================

/// True iff `principal` is present with a true membership flag.
/// Unknown principals are simply not administrators.
pub fn is_administrator(conn: &Connection, principal: &Principal) -> LedgerResult<bool> {
    let flag: Option<bool> = conn
        .query_row(
            "SELECT is_admin FROM administrators WHERE principal = ?1",
            params![principal.as_str()],
            |row| row.get(0),
        )
        .optional()?;

    Ok(flag.unwrap_or(false))
}

/// Gate used by every mutating operation.
pub fn require_administrator(conn: &Connection, caller: &Principal) -> LedgerResult<()> {
    if is_administrator(conn, caller)? {
        Ok(())
    } else {
        Err(LedgerError::NotAuthorized)
    }
}

/// Rejects only an exact self-reference; any other identity is accepted.
pub fn validate_new_administrator(caller: &Principal, new_admin: &Principal) -> LedgerResult<()> {
    if caller == new_admin {
        return Err(LedgerError::InvalidPrincipal(format!(
            "{} cannot add itself as administrator",
            new_admin
        )));
    }
    Ok(())
}

/// Set the membership flag. Re-adding an existing administrator is a no-op.
pub fn grant_administrator(conn: &Connection, principal: &Principal) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO administrators (principal, is_admin) VALUES (?1, 1)
         ON CONFLICT(principal) DO UPDATE SET is_admin = 1",
        params![principal.as_str()],
    )?;
    Ok(())
}

pub fn list_administrators(conn: &Connection) -> LedgerResult<Vec<Principal>> {
    let mut stmt = conn.prepare(
        "SELECT principal FROM administrators WHERE is_admin = 1 ORDER BY principal",
    )?;

    let admins = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(admins.into_iter().map(Principal).collect())
}
