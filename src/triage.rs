//! Transition engine — moves an appointment request from `pending` to its
//! terminal status and, on confirm, creates the scheduled appointment in the
//! same atomic unit.
//!
//! Concurrency contract: the pending-status check, the appointment insert and
//! the status write all happen inside one IMMEDIATE transaction. Two staff
//! sessions racing on the same request id resolve at the store — whichever
//! transaction commits first wins, the loser observes `InvalidState`.
//! Notification dispatch runs strictly after commit and can neither delay nor
//! roll back the transition.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use thiserror::Error;

use crate::db::repository::*;
use crate::db::DatabaseError;
use crate::models::*;
use crate::notify::{
    confirmation_message, dispatch, rejection_message, NotificationOutcome, NotificationSender,
};

/// Explicit caller identity passed into every entry point. Authorization
/// already happened at the boundary; the role here feeds logging and the
/// audit trail, never an access decision.
#[derive(Debug, Clone)]
pub struct StaffContext {
    pub role: StaffRole,
    pub staff_name: String,
}

impl StaffContext {
    pub fn new(role: StaffRole, staff_name: impl Into<String>) -> Self {
        Self { role, staff_name: staff_name.into() }
    }
}

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("appointment request {0} not found")]
    NotFound(i64),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The request already left `pending` — typically a concurrent double
    /// action. The caller should refresh its view, not retry.
    #[error("request {id} has already been {}", .status.as_str())]
    InvalidState { id: i64, status: RequestStatus },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] DatabaseError),
}

#[derive(Debug)]
pub struct ConfirmOutcome {
    pub appointment_id: i64,
    pub notification: NotificationOutcome,
}

#[derive(Debug)]
pub struct RejectOutcome {
    pub notification: NotificationOutcome,
}

/// Confirm a pending request: create the appointment (patient snapshot,
/// assigned doctor, staff-chosen slot) and mark the request `confirmed`,
/// all-or-nothing. Then best-effort notify the patient.
///
/// The date/time arrive as the staff UI submitted them and may be re-timed
/// relative to the originally requested slot.
pub fn confirm(
    ctx: &StaffContext,
    conn: &Connection,
    sender: &dyn NotificationSender,
    request_id: i64,
    doctor_id: i64,
    appointment_date: &str,
    appointment_time: &str,
) -> Result<ConfirmOutcome, TriageError> {
    let date = parse_input_date(appointment_date)?;
    let time = parse_input_time(appointment_time)?;
    if doctor_id <= 0 {
        return Err(TriageError::InvalidInput("a doctor must be assigned".into()));
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let request = get_request(&tx, request_id)?.ok_or(TriageError::NotFound(request_id))?;
    if request.status.is_terminal() {
        return Err(TriageError::InvalidState { id: request_id, status: request.status });
    }
    if get_doctor(&tx, doctor_id)?.is_none() {
        return Err(TriageError::InvalidInput(format!("unknown doctor id {doctor_id}")));
    }

    let appointment_id = insert_appointment(&tx, &NewAppointment {
        request_id: Some(request_id),
        patient_name: request.full_name.clone(),
        patient_phone: request.phone.clone(),
        patient_email: request.email.clone(),
        doctor_id,
        appointment_date: date,
        appointment_time: time,
        notes: request.notes.clone(),
    })?;

    // Guarded write: zero rows changed means another transaction moved the
    // request out of `pending` first. Dropping the tx rolls the insert back.
    if !update_request_status_if_pending(&tx, request_id, RequestStatus::Confirmed)? {
        let status = get_request(&tx, request_id)?
            .map(|r| r.status)
            .unwrap_or(request.status);
        return Err(TriageError::InvalidState { id: request_id, status });
    }

    let detail = serde_json::json!({
        "appointment_id": appointment_id,
        "doctor_id": doctor_id,
        "date": appointment_date,
        "time": appointment_time,
    });
    insert_audit_entry(
        &tx,
        ctx.role,
        "confirm",
        &format!("request:{request_id}"),
        Some(&detail.to_string()),
    )?;

    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        staff = %ctx.staff_name,
        role = ctx.role.as_str(),
        request_id,
        appointment_id,
        "appointment request confirmed"
    );

    let notification = match request.email.as_deref() {
        Some(email) => {
            let doctor_name = doctor_display_name(conn, doctor_id);
            let (subject, body) =
                confirmation_message(&request.full_name, date, time, &doctor_name);
            dispatch(sender, Some(email), &subject, &body)
        }
        None => NotificationOutcome::NoRecipient,
    };

    Ok(ConfirmOutcome { appointment_id, notification })
}

/// Reject a pending request. No appointment is created; the rejection notice
/// references the slot the patient originally asked for.
pub fn reject(
    ctx: &StaffContext,
    conn: &Connection,
    sender: &dyn NotificationSender,
    request_id: i64,
    reason: Option<&str>,
) -> Result<RejectOutcome, TriageError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(DatabaseError::from)?;

    let request = get_request(&tx, request_id)?.ok_or(TriageError::NotFound(request_id))?;
    if request.status.is_terminal() {
        return Err(TriageError::InvalidState { id: request_id, status: request.status });
    }

    if !update_request_status_if_pending(&tx, request_id, RequestStatus::Rejected)? {
        let status = get_request(&tx, request_id)?
            .map(|r| r.status)
            .unwrap_or(request.status);
        return Err(TriageError::InvalidState { id: request_id, status });
    }

    let detail = serde_json::json!({ "reason": reason });
    insert_audit_entry(
        &tx,
        ctx.role,
        "reject",
        &format!("request:{request_id}"),
        Some(&detail.to_string()),
    )?;

    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(
        staff = %ctx.staff_name,
        role = ctx.role.as_str(),
        request_id,
        "appointment request rejected"
    );

    let notification = match request.email.as_deref() {
        Some(email) => {
            let (subject, body) = rejection_message(
                &request.full_name,
                request.requested_date,
                request.requested_time,
                reason,
            );
            dispatch(sender, Some(email), &subject, &body)
        }
        None => NotificationOutcome::NoRecipient,
    };

    Ok(RejectOutcome { notification })
}

/// Post-commit display lookup for the confirmation notice. Any failure
/// degrades to a placeholder; the transition has already committed.
fn doctor_display_name(conn: &Connection, doctor_id: i64) -> String {
    match get_doctor_name(conn, doctor_id) {
        Ok(Some(name)) => name,
        Ok(None) => "TBD".into(),
        Err(e) => {
            tracing::warn!(doctor_id, error = %e, "doctor lookup failed, using placeholder");
            "TBD".into()
        }
    }
}

fn parse_input_date(s: &str) -> Result<NaiveDate, TriageError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| TriageError::InvalidInput(format!("invalid appointment date: {s:?}")))
}

fn parse_input_time(s: &str) -> Result<NaiveTime, TriageError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| TriageError::InvalidInput(format!("invalid appointment time: {s:?}")))
}
