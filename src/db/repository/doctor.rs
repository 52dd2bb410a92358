use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::Doctor;

pub fn insert_doctor(conn: &Connection, full_name: &str, is_active: bool) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (full_name, is_active) VALUES (?1, ?2)",
        params![full_name, is_active as i32],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_doctor(conn: &Connection, id: i64) -> Result<Option<Doctor>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, full_name, is_active FROM doctors WHERE id = ?1",
        params![id],
        |row| {
            Ok(Doctor {
                id: row.get(0)?,
                full_name: row.get(1)?,
                is_active: row.get::<_, i32>(2)? != 0,
            })
        },
    );

    match result {
        Ok(doc) => Ok(Some(doc)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Display name lookup. None when the doctor does not exist.
pub fn get_doctor_name(conn: &Connection, id: i64) -> Result<Option<String>, DatabaseError> {
    Ok(get_doctor(conn, id)?.map(|d| d.full_name))
}

/// Active doctors for assignment and intake dropdowns, alphabetical.
pub fn list_active_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, is_active FROM doctors WHERE is_active = 1 ORDER BY full_name",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(Doctor {
            id: row.get(0)?,
            full_name: row.get(1)?,
            is_active: row.get::<_, i32>(2)? != 0,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_active_doctors(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM doctors WHERE is_active = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
