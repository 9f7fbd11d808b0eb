//! Application constants
//!
//! Centralized location for domain-level constants shared by the export
//! pipeline, its configuration and its file format.

// Export file format
pub const DEFAULT_DELIMITER: char = '|';
pub const QUOTE_CHAR: char = '"';
pub const LINE_TERMINATOR: &str = "\n";
pub const TEMP_FILE_EXTENSION: &str = "tmp";

/// Column names of the export file, in output order.
pub const EXPORT_COLUMNS: [&str; 11] = [
    "action",
    "sender_entity",
    "recipient_id",
    "sender_id",
    "sender_name",
    "receiver_nickname",
    "recipient_entity",
    "customer_number",
    "expire_date",
    "sender_customer_number",
    "activity_time",
];

// Scheduling defaults
pub const DEFAULT_CRON_EXPRESSION: &str = "0 0 2 * * *"; // daily at 02:00
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 600;

// Database defaults
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Environment variables
pub const ENV_OUTPUT_PATH: &str = "ACTIVITY_EXPORT_OUTPUT_PATH";
pub const ENV_DB_PATH: &str = "ACTIVITY_EXPORT_DB_PATH";
pub const ENV_DB_POOL_SIZE: &str = "ACTIVITY_EXPORT_DB_POOL_SIZE";
pub const ENV_DB_LOOKBACK_HOURS: &str = "ACTIVITY_EXPORT_DB_LOOKBACK_HOURS";
pub const ENV_CRON: &str = "ACTIVITY_EXPORT_CRON";
pub const ENV_JOB_TIMEOUT_SECS: &str = "ACTIVITY_EXPORT_JOB_TIMEOUT_SECS";
pub const ENV_FAILURE_POLICY: &str = "ACTIVITY_EXPORT_FAILURE_POLICY";
pub const ENV_DELIMITER: &str = "ACTIVITY_EXPORT_DELIMITER";
pub const ENV_INCLUDE_HEADER: &str = "ACTIVITY_EXPORT_INCLUDE_HEADER";
pub const ENV_LOG_LEVEL: &str = "ACTIVITY_EXPORT_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "ACTIVITY_EXPORT_LOG_JSON";
