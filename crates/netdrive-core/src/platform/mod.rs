#[cfg(target_os = "windows")]
pub mod windows;

use crate::drives::{DriveRecord, DriveSource};
use crate::error::PlatformError;

/// Mapped drives of the logged-on session, via the Windows networking API.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDrives;

#[cfg(target_os = "windows")]
impl DriveSource for SystemDrives {
    fn list_mapped_drives(&self) -> Result<Vec<DriveRecord>, PlatformError> {
        windows::list_mapped_drives()
    }

    fn unmap(&self, drive: &DriveRecord) -> Result<(), PlatformError> {
        windows::unmap(&drive.local_name, drive.persistent)
    }
}

#[cfg(not(target_os = "windows"))]
impl DriveSource for SystemDrives {
    fn list_mapped_drives(&self) -> Result<Vec<DriveRecord>, PlatformError> {
        tracing::debug!("No drive-letter mappings outside Windows");
        Ok(Vec::new())
    }

    fn unmap(&self, _drive: &DriveRecord) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }
}

/// Split `DOMAIN\user` into its parts. A bare user name has an empty domain.
pub fn split_account(account: &str) -> (String, String) {
    match account.split_once('\\') {
        Some((domain, user)) => (domain.to_string(), user.to_string()),
        None => (String::new(), account.to_string()),
    }
}

/// Drive letters look like `Z:`; UNC-only connections have no local name.
pub fn is_drive_letter(local_name: &str) -> bool {
    let mut chars = local_name.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(letter), Some(':'), None) if letter.is_ascii_alphabetic()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_account() {
        assert_eq!(
            split_account(r"CORP\alice"),
            ("CORP".to_string(), "alice".to_string())
        );
        assert_eq!(split_account("alice"), (String::new(), "alice".to_string()));
    }

    #[test]
    fn test_is_drive_letter() {
        assert!(is_drive_letter("Z:"));
        assert!(is_drive_letter("h:"));
        assert!(!is_drive_letter(""));
        assert!(!is_drive_letter(r"\\FS01\IPC$"));
        assert!(!is_drive_letter("ZZ:"));
    }
}
