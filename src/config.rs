use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Frontdesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> &'static str {
    "frontdesk=info"
}

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    let data = dirs::data_dir().expect("Cannot determine data directory");
    data.join("frontdesk")
}

/// Get the default database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("frontdesk.db")
}
