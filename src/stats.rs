//! Staff dashboard reads: headline counters and a merged recent-activity feed.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::repository::{
    count_active_doctors, count_requests, count_scheduled_on, parse_datetime,
};
use crate::db::DatabaseError;
use crate::models::{RequestFilter, StatusFilter};

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub pending_requests: i64,
    pub today_appointments: i64,
    pub active_doctors: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityKind {
    Request,
    Appointment,
}

/// One line of the dashboard activity feed.
#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub name: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

pub fn dashboard_stats(conn: &Connection, today: NaiveDate) -> Result<DashboardStats, DatabaseError> {
    Ok(DashboardStats {
        pending_requests: count_requests(conn, &RequestFilter { status: StatusFilter::Pending })?,
        today_appointments: count_scheduled_on(conn, today)?,
        active_doctors: count_active_doctors(conn)?,
    })
}

/// Latest requests and appointments merged into one feed, newest first.
pub fn recent_activity(conn: &Connection, limit: usize) -> Result<Vec<ActivityEntry>, DatabaseError> {
    let mut entries = Vec::new();

    let mut stmt = conn.prepare(
        "SELECT full_name, status, created_at FROM appointment_requests
         ORDER BY created_at DESC, id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;
    for row in rows {
        let (name, status, created_at) = row?;
        entries.push(ActivityEntry {
            kind: ActivityKind::Request,
            name,
            status,
            created_at: parse_datetime(&created_at)?,
        });
    }

    let mut stmt = conn.prepare(
        "SELECT patient_name, status, created_at FROM appointments
         ORDER BY created_at DESC, id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;
    for row in rows {
        let (name, status, created_at) = row?;
        entries.push(ActivityEntry {
            kind: ActivityKind::Appointment,
            name,
            status,
            created_at: parse_datetime(&created_at)?,
        });
    }

    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries.truncate(limit);
    Ok(entries)
}
