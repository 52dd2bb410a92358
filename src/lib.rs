//! Frontdesk — the appointment backend for a small clinic.
//!
//! Patients submit appointment requests through the intake path; staff triage
//! them into confirmed or rejected visits. The core is the transition engine
//! in [`triage`]: it owns the request lifecycle (pending → confirmed /
//! rejected), performs the atomic appointment write, and hands patient
//! notifications to a transport behind [`notify::NotificationSender`].
//! [`query`] serves the paginated staff review listing and [`stats`] the
//! dashboard counters.

pub mod config;
pub mod db;
pub mod intake;
pub mod models;
pub mod notify;
pub mod query;
pub mod stats;
pub mod triage;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for embedding binaries. Call once at startup.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Frontdesk starting v{}", config::APP_VERSION);
}
