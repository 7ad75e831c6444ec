//! Error types for namespace and probe operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified failure returned by the object namespace primitives.
///
/// Callers branch on the variant rather than on raw status codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// The path does not exist, or exists but is not of the requested type.
    #[error("Object not found: {path}")]
    NotFound { path: String },

    /// The security check on the object failed.
    #[error("Access denied: {path}")]
    AccessDenied { path: String },

    /// The object has no create/open handler.
    #[error("Invalid function: {path}")]
    NoCreateHandler { path: String },

    /// Any other failure.
    #[error("{message}")]
    Failed {
        path: String,
        status: Option<u32>,
        message: String,
    },
}

impl ObjectError {
    /// Create an unclassified failure.
    pub fn failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            path: path.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Path the failure relates to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::AccessDenied { path }
            | Self::NoCreateHandler { path }
            | Self::Failed { path, .. } => path,
        }
    }

    /// Check if this is a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this failure is an expected outcome of an access probe.
    pub fn is_expected_denial(&self) -> bool {
        matches!(self, Self::AccessDenied { .. } | Self::NoCreateHandler { .. })
    }
}

/// Fatal errors that abort a scan before it starts.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The name list file could not be read.
    #[error("Cannot read name list {path}: {source}")]
    NameList {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The security context could not be prepared.
    #[error("Cannot prepare security context: {message}")]
    SecurityContext { message: String },

    /// The object namespace is not available on this platform.
    #[error("{message}")]
    Unsupported { message: String },
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A queued directory could not be opened.
    DirectoryOpen,
    /// A probe failed for an unexpected reason.
    Probe,
}

/// Non-fatal diagnostic encountered during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the failure occurred.
    pub path: String,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<String>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a directory open warning.
    pub fn directory_open(path: impl Into<String>, error: &ObjectError) -> Self {
        Self::new(path, error.to_string(), WarningKind::DirectoryOpen)
    }

    /// Create a probe failure warning.
    pub fn probe(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(path, message, WarningKind::Probe)
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error opening {}: {}", self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_denial() {
        assert!(ObjectError::AccessDenied { path: "\\Device\\A".into() }.is_expected_denial());
        assert!(ObjectError::NoCreateHandler { path: "\\Device\\A".into() }.is_expected_denial());
        assert!(!ObjectError::NotFound { path: "\\Device\\A".into() }.is_expected_denial());
        assert!(!ObjectError::failed("\\Device\\A", "boom").is_expected_denial());
    }

    #[test]
    fn test_error_path() {
        let err = ObjectError::failed("\\Device\\A", "sharing violation");
        assert_eq!(err.path(), "\\Device\\A");
        assert_eq!(err.to_string(), "sharing violation");
    }

    #[test]
    fn test_warning_display() {
        let warning = ScanWarning::probe("\\Device\\A", "sharing violation");
        assert_eq!(warning.kind, WarningKind::Probe);
        assert_eq!(warning.to_string(), "Error opening \\Device\\A: sharing violation");
    }
}
