use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection};

use super::{parse_date, parse_datetime, parse_time};
use crate::db::DatabaseError;
use crate::models::*;

/// Insert a new appointment as `scheduled` and return its id.
pub fn insert_appointment(conn: &Connection, appt: &NewAppointment) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO appointments
         (request_id, patient_name, patient_phone, patient_email, doctor_id,
          appointment_date, appointment_time, notes, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'scheduled', ?9)",
        params![
            appt.request_id,
            appt.patient_name,
            appt.patient_phone,
            appt.patient_email,
            appt.doctor_id,
            appt.appointment_date.to_string(),
            appt.appointment_time.format("%H:%M").to_string(),
            appt.notes,
            Local::now().naive_local().format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    query_appointment(conn, "WHERE id = ?1", id)
}

/// Look up the appointment created from a given request, if any.
pub fn get_appointment_by_request(
    conn: &Connection,
    request_id: i64,
) -> Result<Option<Appointment>, DatabaseError> {
    query_appointment(conn, "WHERE request_id = ?1", request_id)
}

pub fn count_appointments_by_request(
    conn: &Connection,
    request_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE request_id = ?1",
        params![request_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Scheduled appointments on a given day (dashboard counter).
pub fn count_scheduled_on(conn: &Connection, date: NaiveDate) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointments
         WHERE appointment_date = ?1 AND status = 'scheduled'",
        params![date.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn query_appointment(
    conn: &Connection,
    where_clause: &str,
    key: i64,
) -> Result<Option<Appointment>, DatabaseError> {
    let sql = format!(
        "SELECT id, request_id, patient_name, patient_phone, patient_email, doctor_id,
                appointment_date, appointment_time, notes, status, created_at
         FROM appointments {where_clause}",
    );
    let mut stmt = conn.prepare(&sql)?;

    let result = stmt.query_row(params![key], |row| {
        Ok(AppointmentRow {
            id: row.get(0)?,
            request_id: row.get(1)?,
            patient_name: row.get(2)?,
            patient_phone: row.get(3)?,
            patient_email: row.get(4)?,
            doctor_id: row.get(5)?,
            appointment_date: row.get::<_, String>(6)?,
            appointment_time: row.get::<_, String>(7)?,
            notes: row.get(8)?,
            status: row.get::<_, String>(9)?,
            created_at: row.get::<_, String>(10)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(appointment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct AppointmentRow {
    id: i64,
    request_id: Option<i64>,
    patient_name: String,
    patient_phone: String,
    patient_email: Option<String>,
    doctor_id: i64,
    appointment_date: String,
    appointment_time: String,
    notes: Option<String>,
    status: String,
    created_at: String,
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: row.id,
        request_id: row.request_id,
        patient_name: row.patient_name,
        patient_phone: row.patient_phone,
        patient_email: row.patient_email,
        doctor_id: row.doctor_id,
        appointment_date: parse_date(&row.appointment_date)?,
        appointment_time: parse_time(&row.appointment_time)?,
        notes: row.notes,
        status: AppointmentStatus::from_str(&row.status)?,
        created_at: parse_datetime(&row.created_at)?,
    })
}
