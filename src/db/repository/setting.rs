use rusqlite::Connection;

use crate::db::DatabaseError;

/// Get a clinic setting by key. Returns None if not set.
///
/// The engine only reads settings (clinic_name, clinic_email); managing them
/// belongs to the out-of-scope admin surface.
pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT setting_value FROM system_settings WHERE setting_key = ?1",
    )?;
    match stmt.query_row([key], |row| row.get::<_, String>(0)) {
        Ok(val) => Ok(Some(val)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::from(e)),
    }
}
