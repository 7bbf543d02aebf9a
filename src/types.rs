//! Core types and constants shared by names and the node tree.

use std::fmt;

/// Character used to mask literal delimiters and escapes in a data string.
///
/// Fixed; it can never be chosen as a delimiter.
pub const ESCAPE_CHARACTER: char = '\\';

/// Delimiter used when a [`Name`](crate::Name) is built without one.
pub const DEFAULT_DELIMITER: char = '.';

/// Delimiter of the names produced by [`Tree::full_name`](crate::Tree::full_name).
pub const PATH_DELIMITER: char = '/';

/// Kind of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// The root sentinel. Exactly one per tree; has no parent.
    Root,
    /// A node that may hold children.
    Directory,
    /// A leaf node.
    File,
}

impl NodeKind {
    /// Returns `true` if nodes of this kind can hold children.
    #[inline]
    pub const fn is_container(&self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Directory)
    }

    /// Returns `true` for [`NodeKind::File`].
    #[inline]
    pub const fn is_file(&self) -> bool {
        matches!(self, NodeKind::File)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Root => write!(f, "root"),
            NodeKind::Directory => write!(f, "directory"),
            NodeKind::File => write!(f, "file"),
        }
    }
}

/// Opaque handle to a node of a [`Tree`](crate::Tree).
///
/// Handles are stable for the lifetime of the node and are never reused by
/// the tree that issued them. Identity, not base name, decides equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The handle of every tree's root.
    pub const ROOT: NodeId = NodeId(0);

    /// Raw slot index inside the arena.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a node that can hold children (a directory or the root).
///
/// Only the tree hands these out, which keeps files out of parent and move
/// target positions at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectoryId(pub(crate) NodeId);

impl DirectoryId {
    /// The root directory handle.
    pub const ROOT: DirectoryId = DirectoryId(NodeId::ROOT);

    /// The untyped node handle.
    #[inline]
    pub const fn node(&self) -> NodeId {
        self.0
    }
}

impl From<DirectoryId> for NodeId {
    fn from(dir: DirectoryId) -> Self {
        dir.0
    }
}

impl PartialEq<NodeId> for DirectoryId {
    fn eq(&self, other: &NodeId) -> bool {
        self.0 == *other
    }
}

impl PartialEq<DirectoryId> for NodeId {
    fn eq(&self, other: &DirectoryId) -> bool {
        *self == other.0
    }
}

impl fmt::Display for DirectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
