use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_FILE: &str = "network-drive-utility.db";
pub const DEFAULT_LOG_FILE: &str = "network-drive-utility.log";
pub const DEFAULT_DNS_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub database_file: String,
    pub log_file: String,
    pub dns_timeout_ms: u64,
    pub blacklist: Vec<BlacklistEntry>,
}

/// One administratively blocked server/share. Every field accepts `*` and `?` wildcards;
/// an empty field matches anything.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BlacklistEntry {
    pub server: String,
    pub share: String,
    pub domain: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
            dns_timeout_ms: DEFAULT_DNS_TIMEOUT_MS,
            blacklist: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn log_path(&self) -> PathBuf {
        let log = Path::new(&self.log_file);
        if log.is_absolute() {
            log.to_path_buf()
        } else {
            self.data_dir.join(log)
        }
    }
}

/// Per-user application data folder, falling back to the working directory.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("network-drive-utility"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load `Config.toml` (optional) and `NETDRIVE_*` environment overrides.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("NETDRIVE"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
