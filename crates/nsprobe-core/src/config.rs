//! Scan configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::path::SEPARATOR;

/// Default trailing component appended for namespace probes.
pub const DEFAULT_SUFFIX: &str = "xyzzy";

/// Access requested when probing a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum AccessIntent {
    /// Generic read access only.
    Read,
    /// Generic read and write access.
    #[default]
    ReadWrite,
}

impl AccessIntent {
    /// Label used in report headers.
    pub fn label(&self) -> &'static str {
        match self {
            AccessIntent::Read => "Read",
            AccessIntent::ReadWrite => "Write",
        }
    }

    /// Check if write access is requested.
    pub fn wants_write(&self) -> bool {
        matches!(self, AccessIntent::ReadWrite)
    }
}

/// How a candidate path is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum OpenMode {
    /// Open as a file-like object.
    #[default]
    File,
    /// Open with directory semantics.
    Directory,
}

/// Impersonation level of the token used for probing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum ImpersonationLevel {
    /// The token can only be used to identify the caller.
    Identification,
    /// Full impersonation.
    #[default]
    Impersonation,
}

/// Configuration for a scan run.
///
/// Built once before the scan starts and passed by reference into every
/// component; nothing in the engine mutates it.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Recurse into sub-directories of the seed directories.
    #[builder(default = "false")]
    #[serde(default)]
    pub recursive: bool,

    /// Impersonation level of the probing token.
    #[builder(default)]
    #[serde(default)]
    pub impersonation_level: ImpersonationLevel,

    /// Access requested from each device.
    #[builder(default)]
    #[serde(default)]
    pub access: AccessIntent,

    /// File or directory open semantics.
    #[builder(default)]
    #[serde(default)]
    pub open_mode: OpenMode,

    /// Trailing component appended for the namespace probe.
    #[builder(default = "DEFAULT_SUFFIX.to_string()")]
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Report unexpected failures.
    #[builder(default = "false")]
    #[serde(default)]
    pub show_errors: bool,

    /// Only report devices reachable through the namespace but not directly.
    #[builder(default = "false")]
    #[serde(default)]
    pub filter_namespace_only: bool,

    /// Show the symlink that points at a device next to its path.
    #[builder(default = "false")]
    #[serde(default)]
    pub map_symlinks: bool,

    /// Process whose token is impersonated (None = current process).
    #[builder(default)]
    #[serde(default)]
    pub pid: Option<u32>,
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref suffix) = self.suffix {
            if suffix.is_empty() {
                return Err("Suffix cannot be empty".to_string());
            }
            if suffix.contains(SEPARATOR) {
                return Err(format!("Suffix cannot contain '{SEPARATOR}'"));
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Header for the direct access section.
    pub fn direct_label(&self) -> String {
        format!("{} Access", self.access.label())
    }

    /// Header for the namespace access section.
    pub fn namespace_label(&self) -> String {
        format!("{} Access with Namespace", self.access.label())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            impersonation_level: ImpersonationLevel::default(),
            access: AccessIntent::default(),
            open_mode: OpenMode::default(),
            suffix: default_suffix(),
            show_errors: false,
            filter_namespace_only: false,
            map_symlinks: false,
            pid: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .recursive(true)
            .access(AccessIntent::Read)
            .pid(Some(1234u32))
            .build()
            .unwrap();

        assert!(config.recursive);
        assert_eq!(config.access, AccessIntent::Read);
        assert_eq!(config.pid, Some(1234));
        assert_eq!(config.suffix, DEFAULT_SUFFIX);
        assert_eq!(config.impersonation_level, ImpersonationLevel::Impersonation);
    }

    #[test]
    fn test_config_default() {
        let config = ScanConfig::default();
        assert!(!config.recursive);
        assert!(!config.show_errors);
        assert_eq!(config.access, AccessIntent::ReadWrite);
        assert_eq!(config.open_mode, OpenMode::File);
    }

    #[test]
    fn test_suffix_validation() {
        assert!(ScanConfig::builder().suffix("").build().is_err());
        assert!(ScanConfig::builder().suffix("a\\b").build().is_err());
        assert!(ScanConfig::builder().suffix("abc").build().is_ok());
    }

    #[test]
    fn test_labels() {
        let config = ScanConfig::default();
        assert_eq!(config.direct_label(), "Write Access");
        assert_eq!(config.namespace_label(), "Write Access with Namespace");

        let config = ScanConfig::builder().access(AccessIntent::Read).build().unwrap();
        assert_eq!(config.direct_label(), "Read Access");
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("readwrite".parse::<AccessIntent>().unwrap(), AccessIntent::ReadWrite);
        assert_eq!("directory".parse::<OpenMode>().unwrap(), OpenMode::Directory);
        assert_eq!(
            "identification".parse::<ImpersonationLevel>().unwrap(),
            ImpersonationLevel::Identification
        );
    }
}
