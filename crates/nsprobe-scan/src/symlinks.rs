//! Reverse lookup from symbolic link targets to the links themselves.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use nsprobe_core::path::{self, ROOT};
use nsprobe_core::ObjectNamespace;

use crate::walker::{traverse, Visit, VisitedSet};

/// Map from a resolved link target to the link that points at it.
///
/// Lookups are case-insensitive. When several links resolve to the same
/// target, the last one inserted wins.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymlinkMap {
    /// Normalized target -> (target, link path).
    links: IndexMap<String, (String, String)>,
}

impl SymlinkMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `link` resolves to `target`.
    pub fn insert(&mut self, target: impl Into<String>, link: impl Into<String>) {
        let target = target.into();
        self.links
            .insert(path::normalize(&target), (target, link.into()));
    }

    /// Link pointing at `target`, if any.
    pub fn link_for(&self, target: &str) -> Option<&str> {
        self.links
            .get(&path::normalize(target))
            .map(|(_, link)| link.as_str())
    }

    /// Display form of a device path: `"<link> -> <path>"` when a link
    /// points at it, otherwise the path unchanged.
    pub fn display(&self, device: &str) -> String {
        match self.link_for(device) {
            Some(link) => format!("{link} -> {device}"),
            None => device.to_string(),
        }
    }

    /// Number of distinct targets.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Builds a [`SymlinkMap`] over the whole namespace.
pub struct SymlinkIndex<'a, N: ?Sized> {
    namespace: &'a N,
}

impl<'a, N: ObjectNamespace + ?Sized> SymlinkIndex<'a, N> {
    /// Create an index builder over `namespace`.
    pub fn new(namespace: &'a N) -> Self {
        Self { namespace }
    }

    /// Walk every directory from the root and resolve every symbolic link.
    ///
    /// This is best effort: directory failures are ignored and an
    /// unreadable link maps from the empty target.
    pub fn build(&self) -> SymlinkMap {
        let mut map = SymlinkMap::new();
        let mut visited = VisitedSet::new();

        traverse(
            self.namespace,
            [ROOT.to_string()],
            true,
            &mut visited,
            |visit| {
                if let Visit::Directory(dir) = visit {
                    for link in dir.symlinks() {
                        let target = self
                            .namespace
                            .read_symlink(&link.full_path)
                            .unwrap_or_default();
                        map.insert(target, link.full_path.clone());
                    }
                }
            },
        );

        debug!(links = map.len(), directories = visited.len(), "built symlink index");
        map
    }
}
