//! Scan report types and text formatting.

use std::fmt;

use serde::Serialize;

use nsprobe_core::ScanWarning;

use crate::symlinks::SymlinkMap;

/// Header of the section listing devices reachable only through the namespace.
pub const NAMESPACE_ONLY_TITLE: &str = "Namespace Only";

/// A titled, counted list of device paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    /// Section header.
    pub title: String,
    /// One display line per device.
    pub entries: Vec<String>,
}

impl ReportSection {
    /// Build a section, substituting symlink display forms when a map is given.
    pub fn new(title: impl Into<String>, devices: &[String], symlinks: Option<&SymlinkMap>) -> Self {
        let entries = devices
            .iter()
            .map(|device| match symlinks {
                Some(map) => map.display(device),
                None => device.clone(),
            })
            .collect();

        Self {
            title: title.into(),
            entries,
        }
    }

    /// Number of entries listed.
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for ReportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        write!(f, "Total Count: {}", self.count())
    }
}

/// Result of a complete scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Number of candidate devices probed.
    pub devices_scanned: usize,
    /// Report sections in display order.
    pub sections: Vec<ReportSection>,
    /// Diagnostics collected during the scan.
    pub warnings: Vec<ScanWarning>,
}

impl ScanReport {
    /// Check if no devices were found to probe.
    pub fn is_empty(&self) -> bool {
        self.devices_scanned == 0
    }

    /// Find a section by title.
    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No device names found");
        }

        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_display() {
        let devices = vec!["\\Device\\A".to_string(), "\\Device\\B".to_string()];
        let section = ReportSection::new("Write Access", &devices, None);

        assert_eq!(section.count(), 2);
        assert_eq!(
            section.to_string(),
            "Write Access\n\\Device\\A\n\\Device\\B\nTotal Count: 2"
        );
    }

    #[test]
    fn test_section_with_symlinks() {
        let mut map = SymlinkMap::new();
        map.insert("\\Device\\A", "\\GLOBAL??\\A");
        let devices = vec!["\\Device\\A".to_string(), "\\Device\\B".to_string()];

        let section = ReportSection::new("Read Access", &devices, Some(&map));
        assert_eq!(section.entries, vec!["\\GLOBAL??\\A -> \\Device\\A", "\\Device\\B"]);
    }

    #[test]
    fn test_report_blocks_separated_by_blank_line() {
        let report = ScanReport {
            devices_scanned: 1,
            sections: vec![
                ReportSection::new("Write Access", &[], None),
                ReportSection::new("Write Access with Namespace", &["\\Device\\A".to_string()], None),
            ],
            warnings: Vec::new(),
        };

        assert_eq!(
            report.to_string(),
            "Write Access\nTotal Count: 0\n\nWrite Access with Namespace\n\\Device\\A\nTotal Count: 1"
        );
    }

    #[test]
    fn test_empty_report() {
        let report = ScanReport::default();
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "No device names found");
    }
}
