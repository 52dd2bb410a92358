//! Repository layer — entity-scoped database operations.
//!
//! Pure data access: every function takes a `&Connection` (or a transaction
//! deref'd to one) and performs no business validation. Policy lives in the
//! triage, query, and intake modules.

mod appointment;
mod audit;
mod doctor;
mod request;
mod setting;

pub use appointment::*;
pub use audit::*;
pub use doctor::*;
pub use request::*;
pub use setting::*;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::DatabaseError;

// Column text is written by this crate in fixed formats; anything else in the
// file is treated as corruption and surfaced, not silently dropped.

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| DatabaseError::InvalidColumn {
        column: "date".into(),
        value: s.into(),
    })
}

pub(crate) fn parse_time(s: &str) -> Result<NaiveTime, DatabaseError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| DatabaseError::InvalidColumn {
            column: "time".into(),
            value: s.into(),
        })
}

pub(crate) fn parse_datetime(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| DatabaseError::InvalidColumn {
            column: "datetime".into(),
            value: s.into(),
        })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use rusqlite::{params, Connection};

    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_request(conn: &Connection) -> i64 {
        insert_request(conn, &NewRequest {
            full_name: "Alice Moreau".into(),
            phone: "555-0101".into(),
            email: Some("alice@example.com".into()),
            requested_date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            requested_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            preferred_doctor_id: None,
            notes: Some("First visit".into()),
        }).unwrap()
    }

    /// Seed a request with a controlled status and created_at via raw SQL.
    fn seed_request(conn: &Connection, name: &str, status: &str, created_at: &str) -> i64 {
        conn.execute(
            "INSERT INTO appointment_requests
             (full_name, phone, email, requested_date, requested_time, status, created_at)
             VALUES (?1, '555', NULL, '2026-09-10', '09:00', ?2, ?3)",
            params![name, status, created_at],
        ).unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn request_insert_and_retrieve() {
        let conn = test_db();
        let id = make_request(&conn);

        let req = get_request(&conn, id).unwrap().unwrap();
        assert_eq!(req.full_name, "Alice Moreau");
        assert_eq!(req.status, RequestStatus::Pending);
        assert_eq!(req.requested_date, NaiveDate::from_ymd_opt(2026, 9, 10).unwrap());
        assert_eq!(req.requested_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(req.notes.as_deref(), Some("First visit"));
    }

    #[test]
    fn request_get_missing_is_none() {
        let conn = test_db();
        assert!(get_request(&conn, 99).unwrap().is_none());
    }

    #[test]
    fn status_cas_succeeds_only_while_pending() {
        let conn = test_db();
        let id = make_request(&conn);

        assert!(update_request_status_if_pending(&conn, id, RequestStatus::Confirmed).unwrap());
        // Second transition loses the compare-and-set.
        assert!(!update_request_status_if_pending(&conn, id, RequestStatus::Rejected).unwrap());

        let req = get_request(&conn, id).unwrap().unwrap();
        assert_eq!(req.status, RequestStatus::Confirmed);
    }

    #[test]
    fn status_cas_missing_row_changes_nothing() {
        let conn = test_db();
        assert!(!update_request_status_if_pending(&conn, 42, RequestStatus::Rejected).unwrap());
    }

    #[test]
    fn count_requests_honors_filter() {
        let conn = test_db();
        seed_request(&conn, "A", "pending", "2026-08-01 10:00:00");
        seed_request(&conn, "B", "confirmed", "2026-08-01 11:00:00");
        seed_request(&conn, "C", "pending", "2026-08-01 12:00:00");

        let pending = RequestFilter { status: StatusFilter::Pending };
        let all = RequestFilter { status: StatusFilter::All };
        assert_eq!(count_requests(&conn, &pending).unwrap(), 2);
        assert_eq!(count_requests(&conn, &all).unwrap(), 3);
    }

    #[test]
    fn list_orders_newest_first() {
        let conn = test_db();
        seed_request(&conn, "Oldest", "pending", "2026-08-01 08:00:00");
        seed_request(&conn, "Middle", "pending", "2026-08-01 09:00:00");
        seed_request(&conn, "Newest", "pending", "2026-08-01 10:00:00");

        let filter = RequestFilter::default();
        let items = list_requests_page(&conn, &filter, 10, 0).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.full_name.as_str()).collect();
        assert_eq!(names, vec!["Newest", "Middle", "Oldest"]);
    }

    #[test]
    fn list_breaks_created_at_ties_by_id() {
        let conn = test_db();
        // Same timestamp: insertion order must still be stable, newest id first.
        let first = seed_request(&conn, "First", "pending", "2026-08-01 09:00:00");
        let second = seed_request(&conn, "Second", "pending", "2026-08-01 09:00:00");

        let items = list_requests_page(&conn, &RequestFilter::default(), 10, 0).unwrap();
        assert_eq!(items[0].id, second);
        assert_eq!(items[1].id, first);
    }

    #[test]
    fn list_enriches_doctor_name() {
        let conn = test_db();
        let active = insert_doctor(&conn, "Dr. Chen", true).unwrap();
        let inactive = insert_doctor(&conn, "Dr. Gone", false).unwrap();

        conn.execute(
            "INSERT INTO appointment_requests
             (full_name, phone, requested_date, requested_time, preferred_doctor_id, status, created_at)
             VALUES ('P1', '555', '2026-09-10', '09:00', ?1, 'pending', '2026-08-01 10:00:00'),
                    ('P2', '555', '2026-09-10', '09:30', ?2, 'pending', '2026-08-01 11:00:00'),
                    ('P3', '555', '2026-09-10', '10:00', NULL, 'pending', '2026-08-01 12:00:00')",
            params![active, inactive],
        ).unwrap();

        let items = list_requests_page(&conn, &RequestFilter::default(), 10, 0).unwrap();
        // Newest first: P3 (no preference), P2 (inactive doctor), P1 (active).
        assert_eq!(items[0].preferred_doctor_name, "Any available");
        assert_eq!(items[1].preferred_doctor_name, "Any available");
        assert_eq!(items[2].preferred_doctor_name, "Dr. Chen");
    }

    #[test]
    fn list_pagination_offsets() {
        let conn = test_db();
        for i in 0..15 {
            seed_request(&conn, &format!("P{i}"), "pending", &format!("2026-08-01 10:{i:02}:00"));
        }

        let filter = RequestFilter::default();
        let page1 = list_requests_page(&conn, &filter, 10, 0).unwrap();
        let page2 = list_requests_page(&conn, &filter, 10, 10).unwrap();
        assert_eq!(page1.len(), 10);
        assert_eq!(page2.len(), 5);
        assert_eq!(page1[0].full_name, "P14");
        assert_eq!(page2[4].full_name, "P0");
    }

    #[test]
    fn appointment_insert_and_lookup_by_request() {
        let conn = test_db();
        let doctor = insert_doctor(&conn, "Dr. Chen", true).unwrap();
        let request = make_request(&conn);

        let appt_id = insert_appointment(&conn, &NewAppointment {
            request_id: Some(request),
            patient_name: "Alice Moreau".into(),
            patient_phone: "555-0101".into(),
            patient_email: Some("alice@example.com".into()),
            doctor_id: doctor,
            appointment_date: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            notes: Some("First visit".into()),
        }).unwrap();

        let appt = get_appointment(&conn, appt_id).unwrap().unwrap();
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.doctor_id, doctor);

        let by_request = get_appointment_by_request(&conn, request).unwrap().unwrap();
        assert_eq!(by_request.id, appt_id);
        assert_eq!(count_appointments_by_request(&conn, request).unwrap(), 1);
    }

    #[test]
    fn appointment_requires_existing_doctor() {
        let conn = test_db();
        let result = insert_appointment(&conn, &NewAppointment {
            request_id: None,
            patient_name: "Ghost".into(),
            patient_phone: "555".into(),
            patient_email: None,
            doctor_id: 999,
            appointment_date: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            notes: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn scheduled_count_filters_by_day() {
        let conn = test_db();
        let doctor = insert_doctor(&conn, "Dr. Chen", true).unwrap();
        conn.execute(
            "INSERT INTO appointments
             (patient_name, patient_phone, doctor_id, appointment_date, appointment_time, status, created_at)
             VALUES ('A', '555', ?1, '2026-08-06', '09:00', 'scheduled', '2026-08-01 10:00:00'),
                    ('B', '555', ?1, '2026-08-06', '10:00', 'cancelled', '2026-08-01 10:00:00'),
                    ('C', '555', ?1, '2026-08-07', '09:00', 'scheduled', '2026-08-01 10:00:00')",
            params![doctor],
        ).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(count_scheduled_on(&conn, day).unwrap(), 1);
    }

    #[test]
    fn doctor_lookup_and_active_listing() {
        let conn = test_db();
        let zoe = insert_doctor(&conn, "Dr. Zoe", true).unwrap();
        insert_doctor(&conn, "Dr. Adams", true).unwrap();
        insert_doctor(&conn, "Dr. Inactive", false).unwrap();

        assert_eq!(get_doctor_name(&conn, zoe).unwrap().as_deref(), Some("Dr. Zoe"));
        assert!(get_doctor_name(&conn, 999).unwrap().is_none());

        let active = list_active_doctors(&conn).unwrap();
        let names: Vec<&str> = active.iter().map(|d| d.full_name.as_str()).collect();
        assert_eq!(names, vec!["Dr. Adams", "Dr. Zoe"]);
        assert_eq!(count_active_doctors(&conn).unwrap(), 2);
    }

    #[test]
    fn setting_lookup() {
        let conn = test_db();
        assert_eq!(get_setting(&conn, "clinic_name").unwrap().as_deref(), Some("Medical Clinic"));
        assert!(get_setting(&conn, "clinic_email").unwrap().is_none());
    }

    #[test]
    fn audit_insert_and_query() {
        let conn = test_db();
        insert_audit_entry(&conn, StaffRole::Receptionist, "confirm", "request:7", Some("{}")).unwrap();
        insert_audit_entry(&conn, StaffRole::Administrator, "reject", "request:8", None).unwrap();

        let entries = query_recent_audit(&conn, 10).unwrap();
        assert_eq!(entries.len(), 2);
        // Newest first
        assert_eq!(entries[0].2, "reject");
        assert_eq!(entries[1].1, "receptionist");
    }

    #[test]
    fn audit_prune_removes_old_entries() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO audit_log (timestamp, actor_role, action, entity)
             VALUES (datetime('now', '-100 days'), 'administrator', 'confirm', 'request:1')",
            [],
        ).unwrap();
        insert_audit_entry(&conn, StaffRole::Administrator, "reject", "request:2", None).unwrap();

        let deleted = prune_audit_log(&conn, 90).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(query_recent_audit(&conn, 10).unwrap().len(), 1);
    }
}
