mod hash;

pub use hash::compute_hash;

/// Default name of the configuration file
pub const CONFIG_FILE: &str = "tidemark.json";

/// Default location of the applied-versions record
pub const DEFAULT_STORAGE_PATH: &str = ".tidemark/versions.json";

/// Schema version written into the applied-versions record
pub const STORAGE_SCHEMA_VERSION: u32 = 1;

/// Get current timestamp in ISO 8601 format
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
