//! Helpers for object namespace paths.
//!
//! Namespace paths use `\` as the separator and are compared
//! case-insensitively, the way the object manager compares names when a
//! lookup is made with case-insensitive attributes.

use std::cmp::Ordering;

/// Path separator of the object namespace.
pub const SEPARATOR: char = '\\';

/// The namespace root directory.
pub const ROOT: &str = "\\";

/// Join a directory path and an entry name.
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with(SEPARATOR) {
        format!("{dir}{name}")
    } else {
        format!("{dir}{SEPARATOR}{name}")
    }
}

/// Append an extra trailing component to a path.
///
/// Drivers receive the appended component as the remaining name of the
/// open request, which is the path form probed for namespace access.
pub fn with_suffix(path: &str, suffix: &str) -> String {
    join(path, suffix)
}

/// Normalize a path for case-insensitive set membership.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() && path.starts_with(SEPARATOR) {
        return ROOT.to_string();
    }
    trimmed.to_uppercase()
}

/// Case-insensitive path equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Total order over entry names: case-insensitive, with the raw name as
/// tie-break so that names differing only in case still sort stably.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_uppercase()
        .cmp(&b.to_uppercase())
        .then_with(|| a.cmp(b))
}

/// Parent directory of a path, or `None` for the root or a relative name.
pub fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches(SEPARATOR);
    let idx = trimmed.rfind(SEPARATOR)?;
    if idx == 0 {
        Some(ROOT)
    } else {
        Some(&trimmed[..idx])
    }
}

/// Final component of a path.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    trimmed
        .rsplit(SEPARATOR)
        .next()
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join(ROOT, "Device"), "\\Device");
        assert_eq!(join("\\Device", "Null"), "\\Device\\Null");
        assert_eq!(with_suffix("\\Device\\Null", "xyzzy"), "\\Device\\Null\\xyzzy");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("\\Device\\"), "\\DEVICE");
        assert_eq!(normalize("\\"), "\\");
        assert!(eq_ignore_case("\\device\\null", "\\DEVICE\\Null"));
        assert!(!eq_ignore_case("\\Device\\Null", "\\Device\\Nul"));
    }

    #[test]
    fn test_compare_names() {
        assert_eq!(compare_names("alpha", "Beta"), Ordering::Less);
        assert_eq!(compare_names("BETA", "alpha"), Ordering::Greater);
        // Case-only differences still order deterministically
        assert_ne!(compare_names("Null", "NULL"), Ordering::Equal);
        assert_eq!(compare_names("Null", "Null"), Ordering::Equal);
    }

    #[test]
    fn test_parent_and_file_name() {
        assert_eq!(parent("\\Device\\Null"), Some("\\Device"));
        assert_eq!(parent("\\Device"), Some(ROOT));
        assert_eq!(parent(ROOT), None);
        assert_eq!(parent("Null"), None);
        assert_eq!(file_name("\\Device\\Null"), "Null");
        assert_eq!(file_name("Null"), "Null");
    }
}
