//! NTSTATUS values and their classification.

use nsprobe_core::ObjectError;

pub const STATUS_SUCCESS: u32 = 0x0000_0000;
pub const STATUS_BUFFER_OVERFLOW: u32 = 0x8000_0005;
pub const STATUS_NO_MORE_ENTRIES: u32 = 0x8000_001A;
pub const STATUS_NOT_IMPLEMENTED: u32 = 0xC000_0002;
pub const STATUS_INFO_LENGTH_MISMATCH: u32 = 0xC000_0004;
pub const STATUS_INVALID_PARAMETER: u32 = 0xC000_000D;
pub const STATUS_NO_SUCH_DEVICE: u32 = 0xC000_000E;
pub const STATUS_INVALID_DEVICE_REQUEST: u32 = 0xC000_0010;
pub const STATUS_ACCESS_DENIED: u32 = 0xC000_0022;
pub const STATUS_BUFFER_TOO_SMALL: u32 = 0xC000_0023;
pub const STATUS_OBJECT_TYPE_MISMATCH: u32 = 0xC000_0024;
pub const STATUS_OBJECT_NAME_INVALID: u32 = 0xC000_0033;
pub const STATUS_OBJECT_NAME_NOT_FOUND: u32 = 0xC000_0034;
pub const STATUS_OBJECT_PATH_NOT_FOUND: u32 = 0xC000_003A;
pub const STATUS_SHARING_VIOLATION: u32 = 0xC000_0043;
pub const STATUS_PRIVILEGE_NOT_HELD: u32 = 0xC000_0061;
pub const STATUS_DEVICE_NOT_READY: u32 = 0xC000_00A3;
pub const STATUS_BAD_IMPERSONATION_LEVEL: u32 = 0xC000_00A5;
pub const STATUS_ILLEGAL_FUNCTION: u32 = 0xC000_00AF;
pub const STATUS_FILE_IS_A_DIRECTORY: u32 = 0xC000_00BA;
pub const STATUS_NOT_SUPPORTED: u32 = 0xC000_00BB;
pub const STATUS_NOT_A_DIRECTORY: u32 = 0xC000_0103;

/// Check if a status code denotes success (including informational codes).
pub fn is_success(status: u32) -> bool {
    (status as i32) >= 0
}

/// Symbolic name of a status code, if known.
pub fn status_name(status: u32) -> Option<&'static str> {
    let name = match status {
        STATUS_SUCCESS => "STATUS_SUCCESS",
        STATUS_BUFFER_OVERFLOW => "STATUS_BUFFER_OVERFLOW",
        STATUS_NO_MORE_ENTRIES => "STATUS_NO_MORE_ENTRIES",
        STATUS_NOT_IMPLEMENTED => "STATUS_NOT_IMPLEMENTED",
        STATUS_INFO_LENGTH_MISMATCH => "STATUS_INFO_LENGTH_MISMATCH",
        STATUS_INVALID_PARAMETER => "STATUS_INVALID_PARAMETER",
        STATUS_NO_SUCH_DEVICE => "STATUS_NO_SUCH_DEVICE",
        STATUS_INVALID_DEVICE_REQUEST => "STATUS_INVALID_DEVICE_REQUEST",
        STATUS_ACCESS_DENIED => "STATUS_ACCESS_DENIED",
        STATUS_BUFFER_TOO_SMALL => "STATUS_BUFFER_TOO_SMALL",
        STATUS_OBJECT_TYPE_MISMATCH => "STATUS_OBJECT_TYPE_MISMATCH",
        STATUS_OBJECT_NAME_INVALID => "STATUS_OBJECT_NAME_INVALID",
        STATUS_OBJECT_NAME_NOT_FOUND => "STATUS_OBJECT_NAME_NOT_FOUND",
        STATUS_OBJECT_PATH_NOT_FOUND => "STATUS_OBJECT_PATH_NOT_FOUND",
        STATUS_SHARING_VIOLATION => "STATUS_SHARING_VIOLATION",
        STATUS_PRIVILEGE_NOT_HELD => "STATUS_PRIVILEGE_NOT_HELD",
        STATUS_DEVICE_NOT_READY => "STATUS_DEVICE_NOT_READY",
        STATUS_BAD_IMPERSONATION_LEVEL => "STATUS_BAD_IMPERSONATION_LEVEL",
        STATUS_ILLEGAL_FUNCTION => "STATUS_ILLEGAL_FUNCTION",
        STATUS_FILE_IS_A_DIRECTORY => "STATUS_FILE_IS_A_DIRECTORY",
        STATUS_NOT_SUPPORTED => "STATUS_NOT_SUPPORTED",
        STATUS_NOT_A_DIRECTORY => "STATUS_NOT_A_DIRECTORY",
        _ => return None,
    };
    Some(name)
}

/// Human-readable description of a status code.
pub fn describe(status: u32) -> String {
    match status_name(status) {
        Some(name) => format!("{name} (0x{status:08X})"),
        None => format!("NTSTATUS 0x{status:08X}"),
    }
}

/// Map a failing status code to a classified error for `path`.
///
/// A path that is missing, or that names an object of another type, is
/// reported as not found: the directory open uses this to fall back to
/// treating the name as a device.
pub fn classify(status: u32, path: &str) -> ObjectError {
    let path = path.to_string();
    match status {
        STATUS_OBJECT_NAME_NOT_FOUND | STATUS_OBJECT_PATH_NOT_FOUND | STATUS_OBJECT_TYPE_MISMATCH => {
            ObjectError::NotFound { path }
        }
        STATUS_ACCESS_DENIED => ObjectError::AccessDenied { path },
        STATUS_INVALID_DEVICE_REQUEST | STATUS_NOT_IMPLEMENTED | STATUS_ILLEGAL_FUNCTION => {
            ObjectError::NoCreateHandler { path }
        }
        _ => ObjectError::Failed {
            path,
            status: Some(status),
            message: describe(status),
        },
    }
}

/// Convert a raw status into a result.
pub fn check(status: u32, path: &str) -> Result<(), ObjectError> {
    if is_success(status) {
        Ok(())
    } else {
        Err(classify(status, path))
    }
}
