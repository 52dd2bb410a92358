use std::str::FromStr;

use chrono::Local;
use rusqlite::{params, Connection};

use super::{parse_date, parse_datetime, parse_time};
use crate::db::DatabaseError;
use crate::models::*;

/// Insert a new request as `pending` and return its id.
pub fn insert_request(conn: &Connection, req: &NewRequest) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO appointment_requests
         (full_name, phone, email, requested_date, requested_time,
          preferred_doctor_id, notes, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'pending', ?8)",
        params![
            req.full_name,
            req.phone,
            req.email,
            req.requested_date.to_string(),
            req.requested_time.format("%H:%M").to_string(),
            req.preferred_doctor_id,
            req.notes,
            Local::now().naive_local().format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_request(conn: &Connection, id: i64) -> Result<Option<AppointmentRequest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, phone, email, requested_date, requested_time,
                preferred_doctor_id, notes, status, created_at
         FROM appointment_requests WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id], |row| {
        Ok(RequestRow {
            id: row.get(0)?,
            full_name: row.get(1)?,
            phone: row.get(2)?,
            email: row.get(3)?,
            requested_date: row.get::<_, String>(4)?,
            requested_time: row.get::<_, String>(5)?,
            preferred_doctor_id: row.get(6)?,
            notes: row.get(7)?,
            status: row.get::<_, String>(8)?,
            created_at: row.get::<_, String>(9)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(request_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Compare-and-set status write: succeeds only while the request is still
/// `pending`. Returns false when a concurrent transition already won.
/// Must run inside the caller's transaction to close the read-then-write race.
pub fn update_request_status_if_pending(
    conn: &Connection,
    id: i64,
    new_status: RequestStatus,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointment_requests SET status = ?1 WHERE id = ?2 AND status = 'pending'",
        params![new_status.as_str(), id],
    )?;
    Ok(changed == 1)
}

pub fn count_requests(conn: &Connection, filter: &RequestFilter) -> Result<i64, DatabaseError> {
    let count = match filter.status {
        StatusFilter::All => conn.query_row(
            "SELECT COUNT(*) FROM appointment_requests",
            [],
            |row| row.get(0),
        )?,
        status => conn.query_row(
            "SELECT COUNT(*) FROM appointment_requests WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?,
    };
    Ok(count)
}

const LIST_COLUMNS: &str =
    "SELECT r.id, r.full_name, r.phone, r.email, r.requested_date, r.requested_time,
            COALESCE(d.full_name, 'Any available'), r.notes, r.status, r.created_at
     FROM appointment_requests r
     LEFT JOIN doctors d ON r.preferred_doctor_id = d.id AND d.is_active = 1";

/// One page of the review listing, newest first. Ties on created_at fall back
/// to id descending so pagination stays stable when timestamps collide.
pub fn list_requests_page(
    conn: &Connection,
    filter: &RequestFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<RequestListItem>, DatabaseError> {
    let order = "ORDER BY r.created_at DESC, r.id DESC";
    let rows: Vec<ListItemRow> = match filter.status {
        StatusFilter::All => {
            let sql = format!("{LIST_COLUMNS} {order} LIMIT ?1 OFFSET ?2");
            let mut stmt = conn.prepare(&sql)?;
            let mapped = stmt.query_map(params![limit, offset], map_list_item)?;
            mapped.collect::<Result<Vec<_>, _>>()?
        }
        status => {
            let sql = format!("{LIST_COLUMNS} WHERE r.status = ?1 {order} LIMIT ?2 OFFSET ?3");
            let mut stmt = conn.prepare(&sql)?;
            let mapped = stmt.query_map(params![status.as_str(), limit, offset], map_list_item)?;
            mapped.collect::<Result<Vec<_>, _>>()?
        }
    };

    rows.into_iter().map(list_item_from_row).collect()
}

fn map_list_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<ListItemRow> {
    Ok(ListItemRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        requested_date: row.get::<_, String>(4)?,
        requested_time: row.get::<_, String>(5)?,
        preferred_doctor_name: row.get(6)?,
        notes: row.get(7)?,
        status: row.get::<_, String>(8)?,
        created_at: row.get::<_, String>(9)?,
    })
}

// Raw row structs: string columns are converted (and validated) separately so
// query_map closures only do rusqlite-level reads.

struct RequestRow {
    id: i64,
    full_name: String,
    phone: String,
    email: Option<String>,
    requested_date: String,
    requested_time: String,
    preferred_doctor_id: Option<i64>,
    notes: Option<String>,
    status: String,
    created_at: String,
}

struct ListItemRow {
    id: i64,
    full_name: String,
    phone: String,
    email: Option<String>,
    requested_date: String,
    requested_time: String,
    preferred_doctor_name: String,
    notes: Option<String>,
    status: String,
    created_at: String,
}

fn request_from_row(row: RequestRow) -> Result<AppointmentRequest, DatabaseError> {
    Ok(AppointmentRequest {
        id: row.id,
        full_name: row.full_name,
        phone: row.phone,
        email: row.email,
        requested_date: parse_date(&row.requested_date)?,
        requested_time: parse_time(&row.requested_time)?,
        preferred_doctor_id: row.preferred_doctor_id,
        notes: row.notes,
        status: RequestStatus::from_str(&row.status)?,
        created_at: parse_datetime(&row.created_at)?,
    })
}

fn list_item_from_row(row: ListItemRow) -> Result<RequestListItem, DatabaseError> {
    Ok(RequestListItem {
        id: row.id,
        full_name: row.full_name,
        phone: row.phone,
        email: row.email,
        requested_date: parse_date(&row.requested_date)?,
        requested_time: parse_time(&row.requested_time)?,
        preferred_doctor_name: row.preferred_doctor_name,
        notes: row.notes,
        status: RequestStatus::from_str(&row.status)?,
        created_at: parse_datetime(&row.created_at)?,
    })
}

