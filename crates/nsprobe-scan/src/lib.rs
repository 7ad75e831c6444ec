//! Namespace traversal and device access probing engine for nsprobe.
//!
//! # Overview
//!
//! `nsprobe-scan` finds device objects in an object namespace and checks
//! whether they can be opened under a given security context. Each
//! device is opened twice: once through its direct path and once with an
//! extra trailing component, which reaches the driver's open handler
//! with a non-empty remaining name. Devices whose access differs between
//! the two forms are the interesting ones.
//!
//! - **Discovery** via [`NamespaceWalker`], breadth-first and cycle safe
//! - **Probing** via [`AccessProbe`] with scoped impersonation
//! - **Symlink display** via [`SymlinkIndex`]
//! - **Reporting** via [`ScanOrchestrator`] and [`ScanReport`]
//!
//! # Example
//!
//! ```rust
//! use nsprobe_scan::{MemoryAccess, MemoryContext, MemoryNamespace, ScanConfig, ScanOrchestrator};
//!
//! let namespace = MemoryNamespace::new()
//!     .device_with("\\Device\\A", MemoryAccess::Denied, MemoryAccess::Granted)
//!     .device("\\Device\\B");
//! let context = MemoryContext::new();
//! let config = ScanConfig::builder().filter_namespace_only(true).build().unwrap();
//!
//! let report = ScanOrchestrator::new(&namespace, &context, &config).run(&["\\Device"]);
//! assert_eq!(report.to_string(), "Namespace Only\n\\Device\\A\nTotal Count: 1");
//! ```

pub mod memory;
mod names;
mod orchestrator;
mod probe;
mod report;
mod symlinks;
mod walker;

pub use memory::{MemoryAccess, MemoryContext, MemoryNamespace};
pub use names::{load_name_list, merge_seed_names, parse_name_list};
pub use orchestrator::{AccessSets, ScanOrchestrator};
pub use probe::{AccessProbe, ProbeOutcome};
pub use report::{ReportSection, ScanReport, NAMESPACE_ONLY_TITLE};
pub use symlinks::{SymlinkIndex, SymlinkMap};
pub use walker::{Discovery, NamespaceWalker};

// Re-export core types for convenience
pub use nsprobe_core::{
    AccessIntent, DEFAULT_SUFFIX, EntryKind, ImpersonationLevel, NamespaceDirectory, NamespaceEntry, ObjectError,
    CurrentIdentity, ObjectNamespace, OpenMode, ScanConfig, ScanError, ScanWarning, SecurityContext,
    WarningKind,
};
