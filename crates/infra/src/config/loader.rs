//! Configuration loader
//!
//! Loads the export configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If a required variable is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ACTIVITY_EXPORT_OUTPUT_PATH`: Export file path (required)
//! - `ACTIVITY_EXPORT_DB_PATH`: Database file path (required)
//! - `ACTIVITY_EXPORT_DB_POOL_SIZE`: Connection pool size
//! - `ACTIVITY_EXPORT_DB_LOOKBACK_HOURS`: Only export activity this recent
//! - `ACTIVITY_EXPORT_CRON`: Six-field cron expression
//! - `ACTIVITY_EXPORT_JOB_TIMEOUT_SECS`: Timeout for one export run
//! - `ACTIVITY_EXPORT_FAILURE_POLICY`: `abort_run` or `skip_record`
//! - `ACTIVITY_EXPORT_DELIMITER`: Single-character field delimiter
//! - `ACTIVITY_EXPORT_INCLUDE_HEADER`: Write a header line (true/false)
//! - `ACTIVITY_EXPORT_LOG_LEVEL`: Default log level
//! - `ACTIVITY_EXPORT_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./activity-export.toml` or `./activity-export.json`
//! 2. `./config.toml` or `./config.json`
//! 3. The same names in the parent and grandparent directories
//! 4. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use activity_export_domain::constants::{
    ENV_CRON, ENV_DB_LOOKBACK_HOURS, ENV_DB_PATH, ENV_DB_POOL_SIZE, ENV_DELIMITER,
    ENV_FAILURE_POLICY, ENV_INCLUDE_HEADER, ENV_JOB_TIMEOUT_SECS, ENV_LOG_JSON, ENV_LOG_LEVEL,
    ENV_OUTPUT_PATH,
};
use activity_export_domain::{
    DatabaseConfig, ExportConfig, ExportError, FailurePolicy, LoggingConfig, Result,
    ScheduleConfig, WriterConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["activity-export.toml", "activity-export.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ExportError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load() -> Result<ExportConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `ACTIVITY_EXPORT_OUTPUT_PATH` and `ACTIVITY_EXPORT_DB_PATH` are required;
/// everything else falls back to its default.
///
/// # Errors
/// Returns `ExportError::Config` if required variables are missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<ExportConfig> {
    let output_path = env_var(ENV_OUTPUT_PATH)?;
    let db_path = env_var(ENV_DB_PATH)?;

    let defaults_schedule = ScheduleConfig::default();
    let defaults_writer = WriterConfig::default();
    let defaults_logging = LoggingConfig::default();

    let config = ExportConfig {
        output_path,
        failure_policy: env_parse(ENV_FAILURE_POLICY)?.unwrap_or_default(),
        database: DatabaseConfig {
            path: db_path,
            pool_size: env_parse(ENV_DB_POOL_SIZE)?
                .unwrap_or(activity_export_domain::constants::DEFAULT_DB_POOL_SIZE),
            lookback_hours: env_parse(ENV_DB_LOOKBACK_HOURS)?,
        },
        schedule: ScheduleConfig {
            cron_expression: std::env::var(ENV_CRON)
                .unwrap_or(defaults_schedule.cron_expression),
            job_timeout_secs: env_parse(ENV_JOB_TIMEOUT_SECS)?
                .unwrap_or(defaults_schedule.job_timeout_secs),
        },
        writer: WriterConfig {
            delimiter: env_delimiter()?.unwrap_or(defaults_writer.delimiter),
            include_header: env_bool(ENV_INCLUDE_HEADER, defaults_writer.include_header),
        },
        logging: LoggingConfig {
            level: std::env::var(ENV_LOG_LEVEL).unwrap_or(defaults_logging.level),
            json: env_bool(ENV_LOG_JSON, defaults_logging.json),
        },
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ExportError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ExportConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ExportError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ExportError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ExportError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<ExportConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ExportError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ExportError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ExportError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
        dirs.push(cwd.join("../.."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ExportError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional environment variable with `FromStr`.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ExportError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn env_delimiter() -> Result<Option<char>> {
    let Ok(raw) = std::env::var(ENV_DELIMITER) else {
        return Ok(None);
    };
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(delimiter), None) => Ok(Some(delimiter)),
        _ => Err(ExportError::Config(format!(
            "{ENV_DELIMITER} must be exactly one character, got {raw:?}"
        ))),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Returns `default` when the variable is not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
