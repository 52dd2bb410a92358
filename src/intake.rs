//! Patient intake — the public submission path for new appointment requests.
//!
//! Validation here is form-level only (required fields, not-in-the-past
//! date); business judgement happens later, at transition time. After the
//! insert the clinic's own inbox gets a best-effort heads-up, using the
//! address from `system_settings` when one is configured.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use thiserror::Error;

use crate::db::repository::{get_doctor_name, get_setting, insert_request};
use crate::db::DatabaseError;
use crate::models::NewRequest;
use crate::notify::{dispatch, new_request_message, NotificationOutcome, NotificationSender};

/// Raw form fields as the booking page submits them. Empty strings mean the
/// field was left blank.
#[derive(Debug, Clone, Default)]
pub struct RequestForm {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub requested_date: String,
    pub requested_time: String,
    pub preferred_doctor_id: Option<i64>,
    pub notes: String,
}

#[derive(Error, Debug)]
pub enum IntakeError {
    /// All form problems collected at once, the way the booking page reports them.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("store unavailable: {0}")]
    Store(#[from] DatabaseError),
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub request_id: i64,
    /// Heads-up to the clinic inbox; best-effort like every notification.
    pub clinic_notification: NotificationOutcome,
}

/// Validate and store a new request as `pending`, then notify the clinic.
pub fn submit_request(
    conn: &Connection,
    sender: &dyn NotificationSender,
    form: &RequestForm,
    today: NaiveDate,
) -> Result<SubmitOutcome, IntakeError> {
    let request = validate(form, today)?;
    let request_id = insert_request(conn, &request)?;

    tracing::info!(request_id, patient = %request.full_name, "appointment request submitted");

    let clinic_notification = notify_clinic(conn, sender, &request);

    Ok(SubmitOutcome { request_id, clinic_notification })
}

fn validate(form: &RequestForm, today: NaiveDate) -> Result<NewRequest, IntakeError> {
    let mut errors = Vec::new();

    let full_name = form.full_name.trim();
    let phone = form.phone.trim();
    let email = form.email.trim();
    let notes = form.notes.trim();

    if full_name.is_empty() {
        errors.push("Full name is required".to_string());
    }
    if phone.is_empty() {
        errors.push("Phone number is required".to_string());
    }

    let requested_date = if form.requested_date.is_empty() {
        errors.push("Appointment date is required".to_string());
        None
    } else {
        match NaiveDate::parse_from_str(&form.requested_date, "%Y-%m-%d") {
            Ok(date) if date < today => {
                errors.push("Appointment date cannot be in the past".to_string());
                None
            }
            Ok(date) => Some(date),
            Err(_) => {
                errors.push("Appointment date is invalid".to_string());
                None
            }
        }
    };

    let requested_time = if form.requested_time.is_empty() {
        errors.push("Appointment time is required".to_string());
        None
    } else {
        match NaiveTime::parse_from_str(&form.requested_time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&form.requested_time, "%H:%M:%S"))
        {
            Ok(time) => Some(time),
            Err(_) => {
                errors.push("Appointment time is invalid".to_string());
                None
            }
        }
    };

    match (requested_date, requested_time) {
        (Some(requested_date), Some(requested_time)) if errors.is_empty() => Ok(NewRequest {
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            requested_date,
            requested_time,
            preferred_doctor_id: form.preferred_doctor_id,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        }),
        _ => Err(IntakeError::Validation(errors)),
    }
}

fn notify_clinic(
    conn: &Connection,
    sender: &dyn NotificationSender,
    request: &NewRequest,
) -> NotificationOutcome {
    let clinic_email = match get_setting(conn, "clinic_email") {
        Ok(Some(addr)) => addr,
        Ok(None) => return NotificationOutcome::NoRecipient,
        Err(e) => {
            tracing::warn!(error = %e, "clinic_email setting unavailable, skipping notice");
            return NotificationOutcome::Failed;
        }
    };

    let doctor_label = match request.preferred_doctor_id {
        Some(id) => match get_doctor_name(conn, id) {
            Ok(Some(name)) => name,
            _ => "Unknown".to_string(),
        },
        None => "Any available".to_string(),
    };

    let (subject, body) = new_request_message(
        &request.full_name,
        &request.phone,
        request.email.as_deref(),
        request.requested_date,
        request.requested_time,
        &doctor_label,
        request.notes.as_deref(),
    );
    dispatch(sender, Some(&clinic_email), &subject, &body)
}
