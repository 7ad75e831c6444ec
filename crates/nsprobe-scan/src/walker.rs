//! Breadth-first traversal of the object namespace.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace};

use nsprobe_core::path;
use nsprobe_core::{NamespaceDirectory, ObjectError, ObjectNamespace, ScanConfig, ScanWarning};

/// Tracks directories already expanded during one traversal.
///
/// Paths are compared in normalized (case-insensitive) form, so a
/// directory reached through several names is expanded once. This is
/// what stops traversal on symbolic link cycles.
#[derive(Debug, Default)]
pub(crate) struct VisitedSet {
    seen: HashSet<String>,
}

impl VisitedSet {
    /// Create an empty set.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Mark a directory as visited. Returns `true` if this is the first visit.
    pub(crate) fn insert(&mut self, dir: &str) -> bool {
        self.seen.insert(path::normalize(dir))
    }

    /// Number of directories visited.
    pub(crate) fn len(&self) -> usize {
        self.seen.len()
    }
}

/// Event produced for each queued path during a traversal.
pub(crate) enum Visit<'a> {
    /// A directory was opened for the first time. Entries are sorted.
    Directory(&'a NamespaceDirectory),
    /// A queued path could not be opened as a directory.
    Failed { path: &'a str, error: ObjectError },
}

/// Drain a work queue of directory paths, expanding each directory once.
pub(crate) fn traverse<N, F>(
    namespace: &N,
    seeds: impl IntoIterator<Item = String>,
    recursive: bool,
    visited: &mut VisitedSet,
    mut visit: F,
) where
    N: ObjectNamespace + ?Sized,
    F: FnMut(Visit<'_>),
{
    let mut queue: VecDeque<String> = seeds.into_iter().collect();

    while let Some(queued) = queue.pop_front() {
        let listing = match namespace.open_directory(&queued) {
            Ok(listing) => listing,
            Err(error) => {
                visit(Visit::Failed { path: &queued, error });
                continue;
            }
        };

        if !visited.insert(&listing.full_path) {
            trace!(path = %queued, canonical = %listing.full_path, "directory already expanded");
            continue;
        }

        let dir = NamespaceDirectory::new(listing.full_path, listing.entries);
        debug!(path = %dir.full_path, entries = dir.entries.len(), "expanding directory");

        if recursive {
            queue.extend(dir.directories().map(|e| e.full_path.clone()));
        }
        visit(Visit::Directory(&dir));
    }
}

/// Devices discovered by a [`NamespaceWalker`] run.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Device paths in discovery order.
    pub devices: Vec<String>,
    /// Directory open failures (only when errors are shown).
    pub warnings: Vec<ScanWarning>,
    /// Number of distinct directories expanded.
    pub directories_expanded: usize,
}

/// Discovers device objects below a set of seed paths.
pub struct NamespaceWalker<'a, N: ?Sized> {
    namespace: &'a N,
    config: &'a ScanConfig,
}

impl<'a, N: ObjectNamespace + ?Sized> NamespaceWalker<'a, N> {
    /// Create a walker over `namespace`.
    pub fn new(namespace: &'a N, config: &'a ScanConfig) -> Self {
        Self { namespace, config }
    }

    /// Collect the full paths of device entries reachable from `seeds`.
    ///
    /// A seed that does not open as a directory is taken as a literal
    /// device path. Other failures never stop the traversal.
    pub fn discover_devices<S: AsRef<str>>(&self, seeds: &[S]) -> Discovery {
        let mut visited = VisitedSet::new();
        let mut discovery = Discovery::default();
        let show_errors = self.config.show_errors;

        traverse(
            self.namespace,
            seeds.iter().map(|s| s.as_ref().to_string()),
            self.config.recursive,
            &mut visited,
            |visit| match visit {
                Visit::Directory(dir) => {
                    discovery
                        .devices
                        .extend(dir.devices().map(|e| e.full_path.clone()));
                }
                Visit::Failed { path, error } if error.is_not_found() => {
                    debug!(path, "not a directory, treating as device");
                    discovery.devices.push(path.to_string());
                }
                Visit::Failed { path, error } => {
                    debug!(path, %error, "cannot open directory");
                    if show_errors {
                        discovery.warnings.push(ScanWarning::directory_open(path, &error));
                    }
                }
            },
        );

        discovery.directories_expanded = visited.len();
        discovery
    }
}
