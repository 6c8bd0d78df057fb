use crate::error::PlatformError;
use serde::{Deserialize, Serialize};

/// One live network drive mapping as reported by the operating system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveRecord {
    /// Local device name, e.g. `Z:`.
    pub local_name: String,
    /// Remote UNC path, e.g. `\\FS01\Public`.
    pub remote_name: String,
    /// Account the connection was made with (may be empty).
    pub owning_user: String,
    pub domain: String,
    /// Whether the mapping is restored at logon.
    pub persistent: bool,
}

impl DriveRecord {
    pub fn new(local_name: &str, remote_name: &str, domain: &str) -> Self {
        Self {
            local_name: local_name.to_string(),
            remote_name: remote_name.to_string(),
            owning_user: String::new(),
            domain: domain.to_string(),
            persistent: false,
        }
    }

    /// Same remote target: remote names equal ignoring case, and domains equal
    /// ignoring case when both records carry one.
    pub fn same_target(&self, other: &DriveRecord) -> bool {
        if !self.remote_name.eq_ignore_ascii_case(&other.remote_name) {
            return false;
        }
        self.domain.is_empty()
            || other.domain.is_empty()
            || self.domain.eq_ignore_ascii_case(&other.domain)
    }
}

impl std::fmt::Display for DriveRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} (domain: {}, persistent: {})",
            self.local_name,
            self.remote_name,
            if self.domain.is_empty() { "-" } else { &self.domain },
            if self.persistent { "yes" } else { "no" }
        )
    }
}

/// The operating system's view of mapped drives.
pub trait DriveSource {
    fn list_mapped_drives(&self) -> Result<Vec<DriveRecord>, PlatformError>;
    fn unmap(&self, drive: &DriveRecord) -> Result<(), PlatformError>;
}
