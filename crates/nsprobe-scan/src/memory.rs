//! In-memory object namespace.
//!
//! [`MemoryNamespace`] models directories, devices and symbolic links
//! with configurable access results, so the scan engine can be driven
//! without touching the real object manager. [`MemoryContext`] counts
//! impersonation scopes.

use std::cell::{Cell, RefCell};

use indexmap::IndexMap;

use nsprobe_core::path::{self, ROOT, SEPARATOR};
use nsprobe_core::{
    AccessIntent, EntryKind, NamespaceDirectory, NamespaceEntry, ObjectError, ObjectNamespace,
    OpenMode, SecurityContext,
};

const MAX_LINK_HOPS: usize = 32;

/// Result of opening a device in the in-memory namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryAccess {
    /// The open succeeds.
    Granted,
    /// The open fails the access check.
    Denied,
    /// The device has no create handler.
    NoHandler,
    /// The open fails with the given message.
    Fail(String),
}

impl MemoryAccess {
    fn to_result(&self, path: &str) -> Result<(), ObjectError> {
        match self {
            MemoryAccess::Granted => Ok(()),
            MemoryAccess::Denied => Err(ObjectError::AccessDenied { path: path.to_string() }),
            MemoryAccess::NoHandler => Err(ObjectError::NoCreateHandler { path: path.to_string() }),
            MemoryAccess::Fail(message) => Err(ObjectError::failed(path, message.clone())),
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Directory { failure: Option<String> },
    Device { direct: MemoryAccess, namespace: MemoryAccess },
    Symlink { target: Option<String> },
    Other { type_name: String },
}

impl Node {
    fn type_name(&self) -> &str {
        match self {
            Node::Directory { .. } => "Directory",
            Node::Device { .. } => "Device",
            Node::Symlink { .. } => "SymbolicLink",
            Node::Other { type_name } => type_name,
        }
    }
}

/// A resolved lookup: the object reached and any components left over
/// after reaching a device.
struct Resolved {
    key: String,
    remaining: usize,
}

/// An object namespace held in memory.
#[derive(Debug)]
pub struct MemoryNamespace {
    /// Normalized path -> (display path, node).
    nodes: IndexMap<String, (String, Node)>,
    listings: RefCell<Vec<String>>,
    opens: RefCell<Vec<String>>,
}

impl MemoryNamespace {
    /// Create a namespace containing only the root directory.
    pub fn new() -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(
            path::normalize(ROOT),
            (ROOT.to_string(), Node::Directory { failure: None }),
        );
        Self {
            nodes,
            listings: RefCell::new(Vec::new()),
            opens: RefCell::new(Vec::new()),
        }
    }

    /// Add a directory.
    pub fn directory(self, path: &str) -> Self {
        self.insert(path, Node::Directory { failure: None })
    }

    /// Add a directory whose open fails with `message`.
    pub fn failing_directory(self, path: &str, message: &str) -> Self {
        self.insert(
            path,
            Node::Directory {
                failure: Some(message.to_string()),
            },
        )
    }

    /// Add a device that grants every open.
    pub fn device(self, path: &str) -> Self {
        self.device_with(path, MemoryAccess::Granted, MemoryAccess::Granted)
    }

    /// Add a device with separate results for the direct path and for
    /// paths with trailing components.
    pub fn device_with(self, path: &str, direct: MemoryAccess, namespace: MemoryAccess) -> Self {
        self.insert(path, Node::Device { direct, namespace })
    }

    /// Add a symbolic link.
    pub fn symlink(self, path: &str, target: &str) -> Self {
        self.insert(
            path,
            Node::Symlink {
                target: Some(target.to_string()),
            },
        )
    }

    /// Add a symbolic link whose target cannot be read.
    pub fn unreadable_symlink(self, path: &str) -> Self {
        self.insert(path, Node::Symlink { target: None })
    }

    /// Add an object of some other type.
    pub fn other(self, path: &str, type_name: &str) -> Self {
        self.insert(
            path,
            Node::Other {
                type_name: type_name.to_string(),
            },
        )
    }

    /// Canonical paths of every directory listed so far, in order.
    pub fn listings(&self) -> Vec<String> {
        self.listings.borrow().clone()
    }

    /// Every path passed to `open_object` so far, in order.
    pub fn opens(&self) -> Vec<String> {
        self.opens.borrow().clone()
    }

    fn insert(mut self, full_path: &str, node: Node) -> Self {
        if let Some(parent) = path::parent(full_path) {
            if !self.nodes.contains_key(&path::normalize(parent)) {
                self = self.directory(parent);
            }
        }
        self.nodes
            .insert(path::normalize(full_path), (full_path.to_string(), node));
        self
    }

    fn node(&self, key: &str) -> Option<&(String, Node)> {
        self.nodes.get(key)
    }

    /// Walk `full_path` component by component, following symbolic links
    /// and stopping early when a device is reached.
    fn resolve(&self, full_path: &str) -> Result<Resolved, ObjectError> {
        if !full_path.starts_with(SEPARATOR) {
            return Err(ObjectError::NotFound {
                path: full_path.to_string(),
            });
        }

        let mut current: String = full_path.to_string();
        for _ in 0..MAX_LINK_HOPS {
            let components: Vec<&str> = current.split(SEPARATOR).filter(|c| !c.is_empty()).collect();
            let mut dir = ROOT.to_string();
            let mut redirected = None;

            for (idx, component) in components.iter().enumerate() {
                let candidate = path::join(&dir, component);
                let key = path::normalize(&candidate);
                let Some((display, node)) = self.node(&key) else {
                    return Err(ObjectError::NotFound {
                        path: full_path.to_string(),
                    });
                };

                match node {
                    Node::Symlink { target: Some(target) } => {
                        let rest = &components[idx + 1..];
                        redirected = Some(rest.iter().fold(target.clone(), |acc, c| path::join(&acc, c)));
                        break;
                    }
                    Node::Directory { .. } => dir = display.clone(),
                    _ => {
                        return Ok(Resolved {
                            key,
                            remaining: components.len() - idx - 1,
                        });
                    }
                }
            }

            match redirected {
                Some(next) => current = next,
                None => {
                    return Ok(Resolved {
                        key: path::normalize(&dir),
                        remaining: 0,
                    });
                }
            }
        }

        Err(ObjectError::failed(full_path, "Too many symbolic links"))
    }

    fn children(&self, dir: &str) -> Vec<NamespaceEntry> {
        let dir_key = path::normalize(dir);
        self.nodes
            .values()
            .filter(|(display, _)| {
                display != ROOT
                    && path::parent(display).is_some_and(|p| path::normalize(p) == dir_key)
            })
            .map(|(display, node)| {
                NamespaceEntry::new(dir, path::file_name(display), EntryKind::from_type_name(node.type_name()))
            })
            .collect()
    }
}

impl Default for MemoryNamespace {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectNamespace for MemoryNamespace {
    fn open_directory(&self, full_path: &str) -> Result<NamespaceDirectory, ObjectError> {
        let resolved = self.resolve(full_path)?;
        let not_found = || ObjectError::NotFound {
            path: full_path.to_string(),
        };

        if resolved.remaining > 0 {
            return Err(not_found());
        }
        let Some((display, node)) = self.node(&resolved.key) else {
            return Err(not_found());
        };

        match node {
            Node::Directory { failure: Some(message) } => Err(ObjectError::failed(full_path, message.clone())),
            Node::Directory { failure: None } => {
                self.listings.borrow_mut().push(display.clone());
                // Listing order is insertion order; callers sort.
                Ok(NamespaceDirectory {
                    full_path: display.clone(),
                    entries: self.children(display),
                })
            }
            _ => Err(not_found()),
        }
    }

    fn read_symlink(&self, full_path: &str) -> Result<String, ObjectError> {
        match self.node(&path::normalize(full_path)) {
            Some((_, Node::Symlink { target: Some(target) })) => Ok(target.clone()),
            Some((_, Node::Symlink { target: None })) => Err(ObjectError::AccessDenied {
                path: full_path.to_string(),
            }),
            _ => Err(ObjectError::NotFound {
                path: full_path.to_string(),
            }),
        }
    }

    fn open_object(&self, full_path: &str, _access: AccessIntent, _mode: OpenMode) -> Result<(), ObjectError> {
        self.opens.borrow_mut().push(full_path.to_string());

        let resolved = self.resolve(full_path)?;
        match self.node(&resolved.key) {
            Some((_, Node::Device { direct, namespace })) => {
                if resolved.remaining == 0 {
                    direct.to_result(full_path)
                } else {
                    namespace.to_result(full_path)
                }
            }
            _ => Err(ObjectError::NotFound {
                path: full_path.to_string(),
            }),
        }
    }
}

/// A security context that counts impersonation scopes.
#[derive(Debug, Default)]
pub struct MemoryContext {
    active: Cell<usize>,
    acquired: Cell<usize>,
    fail: bool,
}

impl MemoryContext {
    /// Create a context whose impersonation always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context whose impersonation always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of impersonation scopes currently open.
    pub fn active(&self) -> usize {
        self.active.get()
    }

    /// Number of impersonation scopes opened in total.
    pub fn acquired(&self) -> usize {
        self.acquired.get()
    }
}

/// Guard returned by [`MemoryContext::impersonate`].
#[derive(Debug)]
pub struct MemoryGuard<'a> {
    context: &'a MemoryContext,
}

impl Drop for MemoryGuard<'_> {
    fn drop(&mut self) {
        self.context.active.set(self.context.active.get() - 1);
    }
}

impl SecurityContext for MemoryContext {
    type Guard<'a> = MemoryGuard<'a>;

    fn impersonate(&self) -> Result<Self::Guard<'_>, ObjectError> {
        if self.fail {
            return Err(ObjectError::failed("", "Cannot impersonate token"));
        }
        self.active.set(self.active.get() + 1);
        self.acquired.set(self.acquired.get() + 1);
        Ok(MemoryGuard { context: self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryNamespace {
        MemoryNamespace::new()
            .device("\\Device\\Null")
            .device_with("\\Device\\Beep", MemoryAccess::Denied, MemoryAccess::Granted)
            .symlink("\\GLOBAL??\\NUL", "\\Device\\Null")
            .symlink("\\GLOBAL??\\GLOBALROOT", "")
    }

    #[test]
    fn test_parents_created() {
        let ns = sample();
        let root = ns.open_directory("\\").unwrap();
        let mut names: Vec<String> = root.entries.iter().map(|e| e.name.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["Device", "GLOBAL??"]);
    }

    #[test]
    fn test_open_directory_through_symlink() {
        let ns = sample();
        let dir = ns.open_directory("\\GLOBAL??\\GLOBALROOT\\Device").unwrap();
        assert_eq!(dir.full_path, "\\Device");
        assert_eq!(dir.entries.len(), 2);
    }

    #[test]
    fn test_open_directory_not_found() {
        let ns = sample();
        assert!(ns.open_directory("\\Nope").unwrap_err().is_not_found());
        // Devices are not directories
        assert!(ns.open_directory("\\Device\\Null").unwrap_err().is_not_found());
    }

    #[test]
    fn test_open_object_direct_and_namespace() {
        let ns = sample();
        let read = AccessIntent::Read;
        let file = OpenMode::File;

        assert!(ns.open_object("\\Device\\Null", read, file).is_ok());
        assert!(matches!(
            ns.open_object("\\Device\\Beep", read, file),
            Err(ObjectError::AccessDenied { .. })
        ));
        assert!(ns.open_object("\\Device\\Beep\\xyzzy", read, file).is_ok());
        assert!(ns.open_object("\\GLOBAL??\\NUL", read, file).is_ok());
        assert_eq!(ns.opens().len(), 4);
    }

    #[test]
    fn test_context_guard_counts() {
        let context = MemoryContext::new();
        {
            let _guard = context.impersonate().unwrap();
            assert_eq!(context.active(), 1);
        }
        assert_eq!(context.active(), 0);
        assert_eq!(context.acquired(), 1);
        assert!(MemoryContext::failing().impersonate().is_err());
    }
}
