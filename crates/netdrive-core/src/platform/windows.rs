use super::{is_drive_letter, split_account};
use crate::drives::DriveRecord;
use crate::error::PlatformError;
use std::collections::HashSet;
use std::ffi::OsString;
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::ptr;
use tracing::{debug, trace};
use winapi::shared::minwindef::{DWORD, FALSE, LPVOID};
use winapi::shared::winerror::{ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, NO_ERROR};
use winapi::um::winnetwk::{
    WNetCancelConnection2W, WNetCloseEnum, WNetEnumResourceW, WNetGetUserW, WNetOpenEnumW,
    CONNECT_UPDATE_PROFILE, NETRESOURCEW, RESOURCETYPE_DISK, RESOURCE_CONNECTED,
    RESOURCE_REMEMBERED,
};
use winapi::um::winnt::{HANDLE, LPCWSTR, LPWSTR};

const ENUM_BUFFER_BYTES: usize = 16 * 1024;

fn to_wide(s: &str) -> Vec<u16> {
    std::ffi::OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Read a NUL-terminated UTF-16 string. Null pointers read as empty.
unsafe fn from_wide(ptr: LPCWSTR) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    OsString::from_wide(std::slice::from_raw_parts(ptr, len))
        .to_string_lossy()
        .into_owned()
}

/// (local name, remote name) for every disk resource in `scope`.
fn enumerate(scope: DWORD) -> Result<Vec<(String, String)>, PlatformError> {
    let mut handle: HANDLE = ptr::null_mut();
    let status = unsafe {
        WNetOpenEnumW(scope, RESOURCETYPE_DISK, 0, ptr::null_mut(), &mut handle)
    };
    if status != NO_ERROR {
        return Err(PlatformError::Enumerate(format!(
            "WNetOpenEnum failed with code {}",
            status
        )));
    }

    // u64 backing keeps NETRESOURCEW entries aligned.
    let mut buffer = vec![0u64; ENUM_BUFFER_BYTES / 8];
    let mut resources = Vec::new();
    let result = loop {
        let mut count: DWORD = DWORD::MAX;
        let mut size = (buffer.len() * 8) as DWORD;
        let status = unsafe {
            WNetEnumResourceW(
                handle,
                &mut count,
                buffer.as_mut_ptr() as LPVOID,
                &mut size,
            )
        };
        match status {
            NO_ERROR => {
                let entries = unsafe {
                    std::slice::from_raw_parts(buffer.as_ptr() as *const NETRESOURCEW, count as usize)
                };
                for entry in entries {
                    let local = unsafe { from_wide(entry.lpLocalName) };
                    let remote = unsafe { from_wide(entry.lpRemoteName) };
                    trace!("Enumerated {} -> {}", local, remote);
                    resources.push((local, remote));
                }
            }
            ERROR_NO_MORE_ITEMS => break Ok(resources),
            ERROR_MORE_DATA => {
                buffer.resize((size as usize / 8) + 1, 0);
            }
            code => {
                break Err(PlatformError::Enumerate(format!(
                    "WNetEnumResource failed with code {}",
                    code
                )))
            }
        }
    };

    unsafe {
        WNetCloseEnum(handle);
    }
    result
}

/// `DOMAIN\user` the connection on `local_name` was made with.
fn connection_user(local_name: &str) -> Option<String> {
    let name = to_wide(local_name);
    let mut buffer = vec![0u16; 256];
    let mut len = buffer.len() as DWORD;
    let status = unsafe { WNetGetUserW(name.as_ptr(), buffer.as_mut_ptr() as LPWSTR, &mut len) };
    if status != NO_ERROR {
        return None;
    }
    Some(unsafe { from_wide(buffer.as_ptr()) })
}

pub fn list_mapped_drives() -> Result<Vec<DriveRecord>, PlatformError> {
    let remembered: HashSet<String> = enumerate(RESOURCE_REMEMBERED)?
        .into_iter()
        .map(|(local, _)| local.to_ascii_uppercase())
        .collect();

    let drives: Vec<DriveRecord> = enumerate(RESOURCE_CONNECTED)?
        .into_iter()
        .filter(|(local, _)| is_drive_letter(local))
        .map(|(local, remote)| {
            let (domain, user) = connection_user(&local)
                .map(|account| split_account(&account))
                .unwrap_or_default();
            DriveRecord {
                persistent: remembered.contains(&local.to_ascii_uppercase()),
                local_name: local,
                remote_name: remote,
                owning_user: user,
                domain,
            }
        })
        .collect();

    debug!("Found {} mapped drives", drives.len());
    Ok(drives)
}

pub fn unmap(local_name: &str, persistent: bool) -> Result<(), PlatformError> {
    let name = to_wide(local_name);
    let flags = if persistent { CONNECT_UPDATE_PROFILE } else { 0 };
    let status = unsafe { WNetCancelConnection2W(name.as_ptr(), flags, FALSE) };
    if status != NO_ERROR {
        return Err(PlatformError::Unmap {
            local_name: local_name.to_string(),
            code: status,
        });
    }
    debug!("Unmapped {}", local_name);
    Ok(())
}
