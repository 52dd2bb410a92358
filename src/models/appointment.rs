use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// A staff-confirmed, doctor-assigned visit. Carries its own patient snapshot
/// so later edits to the originating request never retroactively change it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub request_id: Option<i64>,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
}

/// Insert payload; id, status ('scheduled') and created_at are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub request_id: Option<i64>,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub notes: Option<String>,
}
