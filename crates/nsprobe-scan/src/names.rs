//! Seed name lists.

use std::path::Path;

use nsprobe_core::ScanError;

/// Read seed names from a file, one per line.
///
/// Surrounding whitespace is trimmed; blank lines and lines starting
/// with `#` are skipped.
pub fn load_name_list(path: &Path) -> Result<Vec<String>, ScanError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ScanError::NameList {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_name_list(&contents))
}

/// Parse name list contents.
pub fn parse_name_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Merge positional names with the lines of an optional name list file.
/// File names follow the positional ones.
pub fn merge_seed_names(positional: Vec<String>, name_list: Option<&Path>) -> Result<Vec<String>, ScanError> {
    let mut names = positional;
    if let Some(path) = name_list {
        names.extend(load_name_list(path)?);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_name_list() {
        let names = parse_name_list("\\Device\n\n  \\GLOBAL??  \r\n# comment\n\\Device\\Null\n");
        assert_eq!(names, vec!["\\Device", "\\GLOBAL??", "\\Device\\Null"]);
    }

    #[test]
    fn test_merge_appends_file_names() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\\Device\\Afd").unwrap();
        writeln!(file, "\\Device\\Beep").unwrap();

        let names = merge_seed_names(vec!["\\Device\\Null".to_string()], Some(file.path())).unwrap();
        assert_eq!(names, vec!["\\Device\\Null", "\\Device\\Afd", "\\Device\\Beep"]);
    }

    #[test]
    fn test_missing_name_list_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("names.txt");

        let err = merge_seed_names(Vec::new(), Some(&missing)).unwrap_err();
        assert!(matches!(err, ScanError::NameList { .. }));
    }

    #[test]
    fn test_no_name_list() {
        let names = merge_seed_names(vec!["\\Device".to_string()], None).unwrap();
        assert_eq!(names, vec!["\\Device"]);
    }
}
