//! UTF-16 encoding of object names.

use crate::status::STATUS_OBJECT_NAME_INVALID;

/// Longest name, in UTF-16 units, a counted unicode string can hold.
pub const MAX_NAME_UNITS: usize = (u16::MAX as usize) / 2;

/// Encode `name` for a counted unicode string.
///
/// Names that do not fit fail with `STATUS_OBJECT_NAME_INVALID` rather
/// than being shortened, which would address a different object.
pub fn encode(name: &str) -> Result<Vec<u16>, u32> {
    let units: Vec<u16> = name.encode_utf16().collect();
    if units.len() > MAX_NAME_UNITS {
        return Err(STATUS_OBJECT_NAME_INVALID);
    }
    Ok(units)
}
