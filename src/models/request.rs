use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::enums::RequestStatus;

/// A patient-submitted appointment request. Patient identity is captured at
/// submission time; there is no patient master record to re-derive it from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub requested_date: NaiveDate,
    pub requested_time: NaiveTime,
    pub preferred_doctor_id: Option<i64>,
    pub notes: Option<String>,
    pub status: RequestStatus,
    pub created_at: NaiveDateTime,
}

/// Insert payload for a new request; id and created_at are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub requested_date: NaiveDate,
    pub requested_time: NaiveTime,
    pub preferred_doctor_id: Option<i64>,
    pub notes: Option<String>,
}

/// One row of the staff review listing, enriched with the preferred doctor's
/// display name ("Any available" when absent or inactive).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestListItem {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub requested_date: NaiveDate,
    pub requested_time: NaiveTime,
    pub preferred_doctor_name: String,
    pub notes: Option<String>,
    pub status: RequestStatus,
    pub created_at: NaiveDateTime,
}
