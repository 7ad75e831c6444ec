//! Core types and traits for nsprobe.
//!
//! This crate provides the fundamental data structures shared by the
//! nsprobe crates: namespace entries and directories, the run-wide scan
//! configuration, classified error types, and the traits through which
//! the scan engine talks to an object namespace and a security context.

mod config;
mod entry;
mod error;
mod namespace;
pub mod path;

pub use config::{DEFAULT_SUFFIX, AccessIntent, ImpersonationLevel, OpenMode, ScanConfig, ScanConfigBuilder};
pub use entry::{EntryKind, NamespaceDirectory, NamespaceEntry};
pub use error::{ObjectError, ScanError, ScanWarning, WarningKind};
pub use namespace::{CurrentIdentity, ObjectNamespace, SecurityContext};
