//! [`ObjectNamespace`] backed by the NT object manager.

use tracing::trace;

use nsprobe_core::{
    AccessIntent, EntryKind, NamespaceDirectory, NamespaceEntry, ObjectError, ObjectNamespace,
    OpenMode,
};

use crate::ntdll;
use crate::status::classify;

/// The live object manager namespace of the running system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NtNamespace;

impl NtNamespace {
    /// Create a handle to the system namespace.
    pub fn new() -> Self {
        Self
    }
}

impl ObjectNamespace for NtNamespace {
    fn open_directory(&self, path: &str) -> Result<NamespaceDirectory, ObjectError> {
        let handle = ntdll::open_directory(path).map_err(|status| classify(status, path))?;

        // The object name is the canonical path, with symbolic links resolved
        let full_path = ntdll::query_name(&handle).unwrap_or_else(|status| {
            trace!(path, status, "cannot query directory name");
            path.to_string()
        });

        let entries = ntdll::query_directory(&handle)
            .map_err(|status| classify(status, path))?
            .into_iter()
            .map(|(name, type_name)| {
                NamespaceEntry::new(&full_path, name, EntryKind::from_type_name(&type_name))
            })
            .collect();

        Ok(NamespaceDirectory { full_path, entries })
    }

    fn read_symlink(&self, path: &str) -> Result<String, ObjectError> {
        ntdll::query_symlink(path).map_err(|status| classify(status, path))
    }

    fn open_object(&self, path: &str, access: AccessIntent, mode: OpenMode) -> Result<(), ObjectError> {
        ntdll::open_file(path, ntdll::access_mask(access), ntdll::open_options(mode))
            .map_err(|status| classify(status, path))
    }
}
