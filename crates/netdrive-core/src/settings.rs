use crate::config::AppConfig;
use crate::pattern::parse_bool;
use crate::storage::{Database, Setting};
use chrono::{DateTime, Utc};
use rusqlite::Result;
use std::path::PathBuf;

pub const LOG_PATH: &str = "logPath";
pub const DATA_DIR: &str = "dataDir";
pub const LOGGING: &str = "logging";
pub const DEDUPE: &str = "dedupe";
pub const CREATED: &str = "created";

/// Write first-run settings. Values already stored are never replaced.
pub fn seed_defaults(db: &Database, config: &AppConfig, now: DateTime<Utc>) -> Result<usize> {
    db.seed_settings(&[
        Setting::new(LOG_PATH, &config.log_path().to_string_lossy()),
        Setting::new(DATA_DIR, &config.data_dir.to_string_lossy()),
        Setting::new(LOGGING, "false"),
        Setting::new(DEDUPE, "false"),
        Setting::new(CREATED, &now.to_rfc3339()),
    ])
}

/// Boolean setting; missing or unparseable values read as `false`.
pub fn flag(db: &Database, key: &str) -> Result<bool> {
    Ok(db.get_setting(key)?.map(|v| parse_bool(&v)).unwrap_or(false))
}

/// Stored log path, falling back to the configured one.
pub fn log_path(db: &Database, config: &AppConfig) -> Result<PathBuf> {
    Ok(db
        .get_setting(LOG_PATH)?
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| config.log_path()))
}
