#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use netdrive_core::dns::NameResolver;
use netdrive_core::{DnsError, DriveRecord, DriveSource, Identity, PlatformError};
use std::cell::RefCell;

pub fn drive(letter: &str, remote: &str, domain: &str) -> DriveRecord {
    DriveRecord {
        local_name: letter.to_string(),
        remote_name: remote.to_string(),
        owning_user: "alice".to_string(),
        domain: domain.to_string(),
        persistent: true,
    }
}

pub fn identity() -> Identity {
    Identity::new("alice", "WS-0042")
}

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, 0, 0).unwrap()
}

/// Drive source serving a fixed list and recording unmap calls.
#[derive(Default)]
pub struct FakeDrives {
    pub drives: Vec<DriveRecord>,
    pub fail_list: bool,
    pub fail_unmap: bool,
    pub unmapped: RefCell<Vec<String>>,
}

impl FakeDrives {
    pub fn with(drives: Vec<DriveRecord>) -> Self {
        Self {
            drives,
            ..Self::default()
        }
    }

    pub fn unmap_calls(&self) -> Vec<String> {
        self.unmapped.borrow().clone()
    }
}

impl DriveSource for FakeDrives {
    fn list_mapped_drives(&self) -> Result<Vec<DriveRecord>, PlatformError> {
        if self.fail_list {
            return Err(PlatformError::Enumerate("query failed".to_string()));
        }
        Ok(self.drives.clone())
    }

    fn unmap(&self, drive: &DriveRecord) -> Result<(), PlatformError> {
        self.unmapped.borrow_mut().push(drive.local_name.clone());
        if self.fail_unmap {
            return Err(PlatformError::Unmap {
                local_name: drive.local_name.clone(),
                code: 5,
            });
        }
        Ok(())
    }
}

/// Resolves every host into `corp.example.com` except the listed ones.
#[derive(Default)]
pub struct FakeResolver {
    pub unresolvable: Vec<String>,
    pub lookups: RefCell<Vec<String>>,
}

impl FakeResolver {
    pub fn failing(hosts: &[&str]) -> Self {
        Self {
            unresolvable: hosts.iter().map(|h| h.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.borrow().len()
    }
}

impl NameResolver for FakeResolver {
    fn resolve_fqdn(&self, host: &str) -> Result<String, DnsError> {
        self.lookups.borrow_mut().push(host.to_string());
        if self
            .unresolvable
            .iter()
            .any(|h| h.eq_ignore_ascii_case(host))
        {
            return Err(DnsError::NotFound(host.to_string()));
        }
        Ok(format!("{}.corp.example.com", host.to_lowercase()))
    }
}
