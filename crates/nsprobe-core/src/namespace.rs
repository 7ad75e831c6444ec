//! Traits implemented by object namespace backends.

use crate::config::{AccessIntent, OpenMode};
use crate::entry::NamespaceDirectory;
use crate::error::ObjectError;

/// Primitive operations on a hierarchical object namespace.
pub trait ObjectNamespace {
    /// Open a namespace directory and list its entries.
    ///
    /// The returned `full_path` is the canonical path of the directory,
    /// so two different names for the same directory (for example via a
    /// symbolic link) yield the same `full_path`. A path that does not
    /// exist, or that exists but is not a directory, fails with
    /// [`ObjectError::NotFound`].
    fn open_directory(&self, path: &str) -> Result<NamespaceDirectory, ObjectError>;

    /// Read the target of a symbolic link.
    fn read_symlink(&self, path: &str) -> Result<String, ObjectError>;

    /// Open an object as a file and close it again.
    fn open_object(&self, path: &str, access: AccessIntent, mode: OpenMode) -> Result<(), ObjectError>;
}

/// A security identity that can be assumed for the duration of a scope.
pub trait SecurityContext {
    /// Guard that restores the previous identity when dropped.
    type Guard<'a>
    where
        Self: 'a;

    /// Start impersonating this identity on the current thread.
    fn impersonate(&self) -> Result<Self::Guard<'_>, ObjectError>;
}

/// The identity of the running process; impersonation is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentIdentity;

impl SecurityContext for CurrentIdentity {
    type Guard<'a> = ();

    fn impersonate(&self) -> Result<Self::Guard<'_>, ObjectError> {
        Ok(())
    }
}
