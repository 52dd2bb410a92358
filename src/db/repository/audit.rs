use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::StaffRole;

/// Append one audit entry for a staff transition.
/// Enlisted in the transition's transaction so failed transitions leave no trace.
pub fn insert_audit_entry(
    conn: &Connection,
    actor_role: StaffRole,
    action: &str,
    entity: &str,
    detail: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_log (actor_role, action, entity, detail) VALUES (?1, ?2, ?3, ?4)",
        params![actor_role.as_str(), action, entity, detail],
    )?;
    Ok(())
}

/// Most recent audit entries as (timestamp, actor_role, action, entity) tuples.
pub fn query_recent_audit(
    conn: &Connection,
    limit: i64,
) -> Result<Vec<(String, String, String, String)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT timestamp, actor_role, action, entity FROM audit_log
         ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Prune audit entries older than the given number of days.
pub fn prune_audit_log(conn: &Connection, retention_days: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM audit_log WHERE timestamp < datetime('now', ?1)",
        params![format!("-{retention_days} days")],
    )?;
    Ok(deleted)
}
