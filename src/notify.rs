//! Notification dispatcher — formats outbound patient/clinic messages and
//! hands them to a transport behind the `NotificationSender` trait.
//!
//! Delivery is a best-effort side channel: a failed send is logged and
//! reported in the outcome, never escalated into a transition failure. The
//! persisted state change stays the source of truth.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Boundary to the actual mail/SMS transport. Implementations own protocol,
/// retries and templating of the envelope; the engine only supplies content.
pub trait NotificationSender: Send + Sync {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), DispatchError>;
}

/// Default wiring for deployments without a mail relay: writes the message to
/// the log and always succeeds.
pub struct LogSender;

impl NotificationSender for LogSender {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), DispatchError> {
        tracing::info!(recipient, subject, body_len = body.len(), "notification (log transport)");
        Ok(())
    }
}

/// What happened to the best-effort notification after a committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    /// The request carries no email address; nothing to deliver.
    NoRecipient,
    Failed,
}

/// Send if there is a recipient, mapping transport failure to a warning.
pub fn dispatch(
    sender: &dyn NotificationSender,
    recipient: Option<&str>,
    subject: &str,
    body: &str,
) -> NotificationOutcome {
    let Some(recipient) = recipient else {
        return NotificationOutcome::NoRecipient;
    };

    match sender.send(recipient, subject, body) {
        Ok(()) => NotificationOutcome::Sent,
        Err(e) => {
            tracing::warn!(recipient, subject, error = %e, "notification dispatch failed");
            NotificationOutcome::Failed
        }
    }
}

// ─── Message builders ─────────────────────────────────────────────────────────

fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn clock_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Confirmation sent to the patient. `doctor_name` is the display name, or
/// "TBD" when the lookup failed.
pub fn confirmation_message(
    patient_name: &str,
    date: NaiveDate,
    time: NaiveTime,
    doctor_name: &str,
) -> (String, String) {
    let subject = "Appointment Confirmed".to_string();
    let body = format!(
        "Dear {patient_name},\n\
         \n\
         Your appointment has been confirmed!\n\
         \n\
         Details:\n\
         - Date: {}\n\
         - Time: {}\n\
         - Doctor: {doctor_name}\n\
         \n\
         Please arrive 15 minutes before your scheduled time.\n\
         \n\
         Thank you for choosing our clinic.\n\
         \n\
         Best regards,\n\
         Clinic Team\n",
        long_date(date),
        clock_time(time),
    );
    (subject, body)
}

/// Rejection sent to the patient, referencing the originally requested slot.
/// An absent reason omits the line entirely rather than inserting an empty one.
pub fn rejection_message(
    patient_name: &str,
    requested_date: NaiveDate,
    requested_time: NaiveTime,
    reason: Option<&str>,
) -> (String, String) {
    let subject = "Appointment Request Update".to_string();
    let reason_line = match reason {
        Some(r) => format!("Reason: {r}\n\n"),
        None => String::new(),
    };
    let body = format!(
        "Dear {patient_name},\n\
         \n\
         We regret to inform you that we cannot accommodate your appointment request \
         for {} at {}.\n\
         \n\
         {reason_line}\
         Please feel free to submit a new request with alternative dates, or contact us \
         directly to discuss other available options.\n\
         \n\
         Thank you for your understanding.\n\
         \n\
         Best regards,\n\
         Clinic Team\n",
        long_date(requested_date),
        clock_time(requested_time),
    );
    (subject, body)
}

/// Heads-up to the clinic's own inbox when a new request lands.
pub fn new_request_message(
    patient_name: &str,
    phone: &str,
    email: Option<&str>,
    requested_date: NaiveDate,
    requested_time: NaiveTime,
    preferred_doctor: &str,
    notes: Option<&str>,
) -> (String, String) {
    let subject = "New Appointment Request".to_string();
    let body = format!(
        "New appointment request received:\n\
         \n\
         Patient: {patient_name}\n\
         Phone: {phone}\n\
         Email: {}\n\
         Requested Date: {requested_date}\n\
         Requested Time: {}\n\
         Preferred Doctor: {preferred_doctor}\n\
         Notes: {}\n\
         \n\
         Please log in to the admin system to confirm this appointment.\n",
        email.unwrap_or(""),
        requested_time.format("%H:%M"),
        notes.unwrap_or(""),
    );
    (subject, body)
}
