//! Arena slot contents for a single node.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{DirectoryId, NodeId, NodeKind};

/// One live node of the arena.
///
/// The forward link (`children`) is owned by the directory; the back link
/// (`parent`) is just a handle. `children` is always empty for files.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) base_name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<DirectoryId>,
    pub(crate) children: BTreeSet<NodeId>,
    /// Simulates a broken storage layer under this node's base name.
    pub(crate) faulty: bool,
    /// Set once a faulty lookup has clobbered the stored base name.
    corrupted: AtomicBool,
}

impl Clone for NodeData {
    fn clone(&self) -> Self {
        NodeData {
            base_name: self.base_name.clone(),
            kind: self.kind,
            parent: self.parent,
            children: self.children.clone(),
            faulty: self.faulty,
            corrupted: AtomicBool::new(self.is_corrupted()),
        }
    }
}

impl NodeData {
    pub(crate) fn root() -> Self {
        NodeData {
            base_name: String::new(),
            kind: NodeKind::Root,
            parent: None,
            children: BTreeSet::new(),
            faulty: false,
            corrupted: AtomicBool::new(false),
        }
    }

    pub(crate) fn new(base_name: String, kind: NodeKind, parent: DirectoryId) -> Self {
        NodeData {
            base_name,
            kind,
            parent: Some(parent),
            children: BTreeSet::new(),
            faulty: false,
            corrupted: AtomicBool::new(false),
        }
    }

    /// Base name as delivered by the (possibly faulty) storage layer.
    ///
    /// A faulty node hands back an empty name and leaves its stored name
    /// corrupted, so later invariant checks see the damage too.
    pub(crate) fn lookup_base_name(&self) -> &str {
        if self.faulty {
            self.corrupted.store(true, Ordering::Relaxed);
            ""
        } else {
            &self.base_name
        }
    }

    /// Base name as currently held in storage, without going through a lookup.
    pub(crate) fn stored_base_name(&self) -> &str {
        if self.is_corrupted() { "" } else { &self.base_name }
    }

    pub(crate) fn is_corrupted(&self) -> bool {
        self.corrupted.load(Ordering::Relaxed)
    }

    /// Overwrite the stored name, clearing any earlier corruption.
    ///
    /// Returns the previous name and corruption flag for rollback.
    pub(crate) fn store_base_name(&mut self, base_name: String) -> (String, bool) {
        let corrupted = self.corrupted.swap(false, Ordering::Relaxed);
        (std::mem::replace(&mut self.base_name, base_name), corrupted)
    }

    pub(crate) fn restore_base_name(&mut self, (base_name, corrupted): (String, bool)) {
        self.base_name = base_name;
        self.corrupted.store(corrupted, Ordering::Relaxed);
    }
}
