//! Namespace entry and directory types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::path;

/// Kind of object found in a namespace directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum EntryKind {
    /// Device object.
    Device,
    /// Object directory.
    Directory,
    /// Symbolic link object.
    #[strum(to_string = "SymbolicLink", serialize = "Symlink")]
    Symlink,
    /// Any other object type (events, sections, ALPC ports, ...).
    Other,
}

impl EntryKind {
    /// Classify an object type name as reported by the namespace.
    pub fn from_type_name(type_name: &str) -> Self {
        type_name.parse().unwrap_or(EntryKind::Other)
    }

    /// Check if this is a device object.
    pub fn is_device(&self) -> bool {
        matches!(self, EntryKind::Device)
    }

    /// Check if this is an object directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    /// Check if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        matches!(self, EntryKind::Symlink)
    }
}

/// A single entry read from a namespace directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    /// Entry name within its directory.
    pub name: CompactString,
    /// Full namespace path of the entry.
    pub full_path: String,
    /// Object kind.
    pub kind: EntryKind,
}

impl NamespaceEntry {
    /// Create an entry inside `dir`.
    pub fn new(dir: &str, name: impl Into<CompactString>, kind: EntryKind) -> Self {
        let name = name.into();
        Self {
            full_path: path::join(dir, &name),
            name,
            kind,
        }
    }
}

/// An opened namespace directory and its entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceDirectory {
    /// Canonical path of the directory, with any symlinks resolved.
    pub full_path: String,
    /// Entries in the directory.
    pub entries: Vec<NamespaceEntry>,
}

impl NamespaceDirectory {
    /// Create a directory listing, sorting the entries by name.
    pub fn new(full_path: impl Into<String>, mut entries: Vec<NamespaceEntry>) -> Self {
        entries.sort_by(|a, b| path::compare_names(&a.name, &b.name));
        Self {
            full_path: full_path.into(),
            entries,
        }
    }

    /// Iterate over sub-directory entries.
    pub fn directories(&self) -> impl Iterator<Item = &NamespaceEntry> {
        self.entries.iter().filter(|e| e.kind.is_directory())
    }

    /// Iterate over device entries.
    pub fn devices(&self) -> impl Iterator<Item = &NamespaceEntry> {
        self.entries.iter().filter(|e| e.kind.is_device())
    }

    /// Iterate over symbolic link entries.
    pub fn symlinks(&self) -> impl Iterator<Item = &NamespaceEntry> {
        self.entries.iter().filter(|e| e.kind.is_symlink())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_type_name() {
        assert_eq!(EntryKind::from_type_name("Device"), EntryKind::Device);
        assert_eq!(EntryKind::from_type_name("device"), EntryKind::Device);
        assert_eq!(EntryKind::from_type_name("Directory"), EntryKind::Directory);
        assert_eq!(EntryKind::from_type_name("SymbolicLink"), EntryKind::Symlink);
        assert_eq!(EntryKind::from_type_name("ALPC Port"), EntryKind::Other);
        assert_eq!(EntryKind::from_type_name("Event"), EntryKind::Other);
    }

    #[test]
    fn test_directory_sorts_entries() {
        let dir = NamespaceDirectory::new(
            "\\Device",
            vec![
                NamespaceEntry::new("\\Device", "null", EntryKind::Device),
                NamespaceEntry::new("\\Device", "Beep", EntryKind::Device),
                NamespaceEntry::new("\\Device", "Afd", EntryKind::Device),
            ],
        );

        let names: Vec<&str> = dir.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Afd", "Beep", "null"]);
        assert_eq!(dir.entries[2].full_path, "\\Device\\null");
    }

    #[test]
    fn test_directory_filters() {
        let dir = NamespaceDirectory::new(
            "\\",
            vec![
                NamespaceEntry::new("\\", "Device", EntryKind::Directory),
                NamespaceEntry::new("\\", "DosDevices", EntryKind::Symlink),
                NamespaceEntry::new("\\", "Null", EntryKind::Device),
            ],
        );

        assert_eq!(dir.directories().count(), 1);
        assert_eq!(dir.symlinks().count(), 1);
        assert_eq!(dir.devices().next().map(|e| e.full_path.as_str()), Some("\\Null"));
    }
}
