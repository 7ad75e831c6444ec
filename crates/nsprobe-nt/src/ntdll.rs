//! Safe wrappers over the native object directory, symbolic link and
//! file APIs.

use std::ffi::c_void;
use std::mem;
use std::ptr;

use windows::Wdk::Foundation::{NtClose, NtQueryObject, ObjectNameInformation, OBJECT_ATTRIBUTES};
use windows::Wdk::Storage::FileSystem::{
    NtCreateFile, NtOpenDirectoryObject, NtOpenSymbolicLinkObject, NtQueryDirectoryObject,
    NtQuerySymbolicLinkObject, FILE_DIRECTORY_FILE, FILE_OPEN, FILE_SYNCHRONOUS_IO_NONALERT,
    NTCREATEFILE_CREATE_OPTIONS,
};
use windows::Win32::Foundation::{
    BOOLEAN, GENERIC_READ, GENERIC_WRITE, HANDLE, NTSTATUS, UNICODE_STRING,
};
use windows::Win32::Storage::FileSystem::{
    FILE_ACCESS_RIGHTS, FILE_FLAGS_AND_ATTRIBUTES, FILE_SHARE_DELETE, FILE_SHARE_READ,
    FILE_SHARE_WRITE, SYNCHRONIZE,
};
use windows::Win32::System::IO::IO_STATUS_BLOCK;
use windows::Win32::System::Kernel::OBJ_CASE_INSENSITIVE;
use windows::core::PWSTR;

use nsprobe_core::{AccessIntent, OpenMode};

use crate::name;
use crate::status::{
    STATUS_BUFFER_OVERFLOW, STATUS_BUFFER_TOO_SMALL, STATUS_INFO_LENGTH_MISMATCH,
    STATUS_NO_MORE_ENTRIES, is_success,
};

// Object-type specific rights
const DIRECTORY_QUERY: u32 = 0x0001;
const DIRECTORY_TRAVERSE: u32 = 0x0002;
const SYMBOLIC_LINK_QUERY: u32 = 0x0001;

/// Layout of one record returned by `NtQueryDirectoryObject`.
#[repr(C)]
struct DirectoryRecord {
    name: UNICODE_STRING,
    type_name: UNICODE_STRING,
}

fn raw_status(status: NTSTATUS) -> u32 {
    status.0 as u32
}

fn into_result(status: NTSTATUS) -> Result<(), u32> {
    let status = raw_status(status);
    if is_success(status) { Ok(()) } else { Err(status) }
}

/// Copy a counted string out.
///
/// # Safety
///
/// `value.Buffer` must be null or point to at least `value.Length` bytes.
unsafe fn to_string_lossy(value: &UNICODE_STRING) -> String {
    if value.Buffer.is_null() || value.Length == 0 {
        return String::new();
    }
    let units = unsafe { std::slice::from_raw_parts(value.Buffer.0, usize::from(value.Length) / 2) };
    String::from_utf16_lossy(units)
}

/// Access mask for a device open.
pub fn access_mask(access: AccessIntent) -> FILE_ACCESS_RIGHTS {
    let mut mask = GENERIC_READ.0 | SYNCHRONIZE.0;
    if access.wants_write() {
        mask |= GENERIC_WRITE.0;
    }
    FILE_ACCESS_RIGHTS(mask)
}

/// Create options for a device open.
pub fn open_options(mode: OpenMode) -> NTCREATEFILE_CREATE_OPTIONS {
    match mode {
        OpenMode::File => FILE_SYNCHRONOUS_IO_NONALERT,
        OpenMode::Directory => FILE_SYNCHRONOUS_IO_NONALERT | FILE_DIRECTORY_FILE,
    }
}

/// An owned kernel handle, closed on drop.
pub struct OwnedHandle(HANDLE);

impl OwnedHandle {
    fn raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = NtClose(self.0);
        }
    }
}

/// A UTF-16 object name with its `UNICODE_STRING` header.
struct ObjectName {
    // Keeps the buffer `raw` points into alive
    _buffer: Vec<u16>,
    raw: UNICODE_STRING,
}

impl ObjectName {
    fn new(path: &str) -> Result<Self, u32> {
        let mut buffer = name::encode(path)?;
        let bytes = (buffer.len() * 2) as u16;
        let raw = UNICODE_STRING {
            Length: bytes,
            MaximumLength: bytes,
            Buffer: PWSTR(buffer.as_mut_ptr()),
        };
        Ok(Self { _buffer: buffer, raw })
    }

    fn attributes(&self) -> OBJECT_ATTRIBUTES {
        OBJECT_ATTRIBUTES {
            Length: mem::size_of::<OBJECT_ATTRIBUTES>() as u32,
            ObjectName: &self.raw,
            Attributes: OBJ_CASE_INSENSITIVE as u32,
            ..Default::default()
        }
    }
}

/// Pointer-aligned scratch buffer for variable-length query results.
fn scratch(bytes: usize) -> Vec<u64> {
    vec![0u64; bytes.div_ceil(mem::size_of::<u64>())]
}

fn byte_len(buffer: &[u64]) -> u32 {
    (buffer.len() * mem::size_of::<u64>()) as u32
}

/// Open an object directory for listing.
pub fn open_directory(path: &str) -> Result<OwnedHandle, u32> {
    let name = ObjectName::new(path)?;
    let attributes = name.attributes();
    let mut handle = HANDLE::default();
    into_result(unsafe { NtOpenDirectoryObject(&mut handle, DIRECTORY_QUERY | DIRECTORY_TRAVERSE, &attributes) })?;
    Ok(OwnedHandle(handle))
}

/// List `(name, type name)` pairs of an open directory.
pub fn query_directory(directory: &OwnedHandle) -> Result<Vec<(String, String)>, u32> {
    let mut buffer = scratch(4096);
    let mut entries = Vec::new();
    let mut context: u32 = 0;
    let mut restart = true;

    loop {
        let mut return_length: u32 = 0;
        let status = raw_status(unsafe {
            NtQueryDirectoryObject(
                directory.raw(),
                Some(buffer.as_mut_ptr().cast::<c_void>()),
                byte_len(&buffer),
                BOOLEAN::from(true),
                BOOLEAN::from(restart),
                &mut context,
                Some(&mut return_length),
            )
        });

        match status {
            STATUS_NO_MORE_ENTRIES => break,
            STATUS_BUFFER_TOO_SMALL | STATUS_BUFFER_OVERFLOW if return_length > byte_len(&buffer) => {
                buffer = scratch(return_length as usize);
                continue;
            }
            status if !is_success(status) => return Err(status),
            _ => {}
        }
        restart = false;

        let record = unsafe { &*buffer.as_ptr().cast::<DirectoryRecord>() };
        let (name, type_name) = unsafe { (to_string_lossy(&record.name), to_string_lossy(&record.type_name)) };
        entries.push((name, type_name));
    }

    Ok(entries)
}

/// Canonical namespace path of an open object.
pub fn query_name(object: &OwnedHandle) -> Result<String, u32> {
    let mut buffer = scratch(1024);

    for _ in 0..2 {
        let mut return_length: u32 = 0;
        let status = raw_status(unsafe {
            NtQueryObject(
                object.raw(),
                ObjectNameInformation,
                Some(buffer.as_mut_ptr().cast::<c_void>()),
                byte_len(&buffer),
                Some(&mut return_length),
            )
        });

        match status {
            STATUS_INFO_LENGTH_MISMATCH | STATUS_BUFFER_OVERFLOW | STATUS_BUFFER_TOO_SMALL => {
                buffer = scratch(return_length as usize);
            }
            status if !is_success(status) => return Err(status),
            _ => {
                // OBJECT_NAME_INFORMATION starts with the name
                let name = unsafe { &*buffer.as_ptr().cast::<UNICODE_STRING>() };
                return Ok(unsafe { to_string_lossy(name) });
            }
        }
    }

    Err(STATUS_BUFFER_TOO_SMALL)
}

/// Read the target of a symbolic link object.
pub fn query_symlink(path: &str) -> Result<String, u32> {
    let name = ObjectName::new(path)?;
    let attributes = name.attributes();
    let mut raw = HANDLE::default();
    into_result(unsafe { NtOpenSymbolicLinkObject(&mut raw, SYMBOLIC_LINK_QUERY, &attributes) })?;
    let link = OwnedHandle(raw);

    let mut target_buffer = vec![0u16; name::MAX_NAME_UNITS];
    let mut target = UNICODE_STRING {
        Length: 0,
        MaximumLength: (target_buffer.len() * 2) as u16,
        Buffer: PWSTR(target_buffer.as_mut_ptr()),
    };
    let mut return_length: u32 = 0;
    into_result(unsafe { NtQuerySymbolicLinkObject(link.raw(), &mut target, Some(&mut return_length)) })?;

    Ok(unsafe { to_string_lossy(&target) })
}

/// Open a file-like object and close it again.
pub fn open_file(path: &str, access: FILE_ACCESS_RIGHTS, options: NTCREATEFILE_CREATE_OPTIONS) -> Result<(), u32> {
    let name = ObjectName::new(path)?;
    let attributes = name.attributes();
    let mut raw = HANDLE::default();
    let mut io_status = IO_STATUS_BLOCK::default();

    into_result(unsafe {
        NtCreateFile(
            &mut raw,
            access,
            &attributes,
            &mut io_status,
            None,
            FILE_FLAGS_AND_ATTRIBUTES(0),
            FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
            FILE_OPEN,
            options,
            None,
            0,
        )
    })?;

    drop(OwnedHandle(raw));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::STATUS_OBJECT_NAME_INVALID;

    #[test]
    fn test_list_root_directory() {
        let root = open_directory("\\").unwrap();
        let entries = query_directory(&root).unwrap();
        assert!(
            entries
                .iter()
                .any(|(name, kind)| name == "Device" && kind == "Directory")
        );
        assert_eq!(query_name(&root).unwrap(), "\\");
    }

    #[test]
    fn test_query_symlink_target() {
        let target = query_symlink("\\GLOBAL??\\NUL").unwrap();
        assert!(target.eq_ignore_ascii_case("\\Device\\Null"));
    }

    #[test]
    fn test_open_null_device() {
        let access = access_mask(AccessIntent::Read);
        assert!(open_file("\\Device\\Null", access, open_options(OpenMode::File)).is_ok());
    }

    #[test]
    fn test_overlong_name_rejected() {
        let path = format!("\\Device\\{}", "a".repeat(name::MAX_NAME_UNITS));
        assert_eq!(open_directory(&path).err(), Some(STATUS_OBJECT_NAME_INVALID));
    }

    #[test]
    fn test_access_mask() {
        let read = access_mask(AccessIntent::Read).0;
        assert_eq!(read & GENERIC_WRITE.0, 0);
        assert_ne!(access_mask(AccessIntent::ReadWrite).0 & GENERIC_WRITE.0, 0);
        assert_ne!(read & SYNCHRONIZE.0, 0);
    }
}
