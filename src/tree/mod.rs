//! # Tree
//!
//! In-memory node tree: a root sentinel, directories and files, addressed by
//! stable handles.
//!
//! ## Responsibility
//! - Atomic node registration (the node and its parent's child set are
//!   updated in one `&mut` call)
//! - `full_name`, `move_node`, `find_nodes`, `rename`, `remove_node`
//! - Rollback of a move that cannot complete
//! - Fault injection on base-name lookup (see [`Tree::create_buggy_file`])
//!
//! ## Dependencies
//! - [`Name`] for full names
//! - [`contract`](crate::contract) for pre/postconditions and invariants
//!
//! ## Ownership
//!
//! Nodes live in an arena owned by [`Tree`]. A directory holds the set of its
//! children's [`NodeId`]s; a node holds its parent's [`DirectoryId`]. Neither
//! owns the other, so moving a node is a handle reassignment.
//!
//! ## Thread Safety
//!
//! Every mutation takes `&mut self`. Share a tree between threads behind a
//! single lock (`Arc<Mutex<Tree>>`); reads through `&Tree` need no locking.
//!
//! ## Usage
//!
//! ```rust
//! use nametree::Tree;
//!
//! let mut tree = Tree::new();
//! let usr = tree.create_directory("usr", tree.root())?;
//! let bin = tree.create_directory("bin", usr)?;
//! let ls = tree.create_file("ls", bin)?;
//!
//! assert_eq!(tree.full_name(ls)?.as_string(), "usr/bin/ls");
//!
//! tree.move_node(ls, usr)?;
//! assert_eq!(tree.parent(ls)?, Some(usr));
//! assert_eq!(tree.full_name(ls)?.as_string(), "usr/ls");
//! # Ok::<(), nametree::ContractError>(())
//! ```

mod node;

use std::collections::BTreeSet;

use crate::contract::{self, Invariant};
use crate::{ContractError, DirectoryId, Name, NodeId, NodeKind, PATH_DELIMITER};

use node::NodeData;

/// Arena-backed tree of directories and files.
///
/// Cloning produces an independent deep copy; handles issued by the original
/// address the same nodes in the clone.
///
/// Slots of removed nodes are never reclaimed, so a handle is never reissued
/// and a stale handle stays an error for the life of the tree. Memory grows
/// with the number of nodes ever created.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Option<NodeData>>,
    live: usize,
    delimiter: char,
}

impl Tree {
    /// A tree holding only the root. Full names use [`PATH_DELIMITER`].
    pub fn new() -> Self {
        Tree {
            nodes: vec![Some(NodeData::root())],
            live: 1,
            delimiter: PATH_DELIMITER,
        }
    }

    /// A tree whose full names use `delimiter`.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] if `delimiter` is the escape character
    pub fn with_delimiter(delimiter: char) -> Result<Self, ContractError> {
        // Validates the delimiter exactly like a Name would.
        Name::empty(delimiter)?;
        Ok(Tree {
            delimiter,
            ..Tree::new()
        })
    }

    /// Delimiter of the names returned by [`Tree::full_name`].
    #[inline]
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Handle of the root directory.
    #[inline]
    pub fn root(&self) -> DirectoryId {
        DirectoryId::ROOT
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Returns `true` if `id` names a live node of this tree.
    pub fn contains(&self, id: impl Into<NodeId>) -> bool {
        self.slot(id.into()).is_some()
    }

    /// Kind of the node.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an unknown or removed handle
    pub fn kind(&self, id: impl Into<NodeId>) -> Result<NodeKind, ContractError> {
        Ok(self.node(id.into())?.kind)
    }

    /// Checked conversion of a node handle into a directory handle.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] if the node is unknown or is a file
    pub fn as_directory(&self, id: NodeId) -> Result<DirectoryId, ContractError> {
        let kind = self.node(id)?.kind;
        contract::require(kind.is_container(), || format!("node {id} is a {kind}"))?;
        Ok(DirectoryId(id))
    }

    /// Create an empty directory named `base_name` inside `parent`.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an empty base name or an
    ///   unknown parent
    /// - [`ContractError::MethodFailed`] if the parent did not register the
    ///   new node (nothing is left behind)
    pub fn create_directory(
        &mut self,
        base_name: impl Into<String>,
        parent: DirectoryId,
    ) -> Result<DirectoryId, ContractError> {
        self.attach(base_name.into(), NodeKind::Directory, parent, false)
            .map(DirectoryId)
    }

    /// Create a file named `base_name` inside `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`Tree::create_directory`].
    pub fn create_file(
        &mut self,
        base_name: impl Into<String>,
        parent: DirectoryId,
    ) -> Result<NodeId, ContractError> {
        self.attach(base_name.into(), NodeKind::File, parent, false)
    }

    /// Create a file whose base-name lookup always fails.
    ///
    /// The lookup reads a corrupted (empty) base name, the invariant check
    /// turns that into [`ContractError::InvalidState`], and callers see a
    /// [`ContractError::ServiceFailure`] carrying it as trigger.
    ///
    /// ```rust
    /// use nametree::{ErrorKind, Tree};
    ///
    /// let mut tree = Tree::new();
    /// let buggy = tree.create_buggy_file("data.bin", tree.root())?;
    ///
    /// let err = tree.base_name(buggy).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::ServiceFailure);
    /// assert_eq!(err.root_cause().kind(), ErrorKind::InvalidState);
    /// # Ok::<(), nametree::ContractError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`Tree::create_directory`].
    pub fn create_buggy_file(
        &mut self,
        base_name: impl Into<String>,
        parent: DirectoryId,
    ) -> Result<NodeId, ContractError> {
        self.attach(base_name.into(), NodeKind::File, parent, true)
    }

    /// Base name of the node. The root's base name is empty.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an unknown handle
    /// - [`ContractError::ServiceFailure`] if the lookup produced an invalid
    ///   base name; the trigger is the [`ContractError::InvalidState`]
    pub fn base_name(&self, id: impl Into<NodeId>) -> Result<&str, ContractError> {
        let id = id.into();
        let node = self.node(id)?;
        let base_name = node.lookup_base_name();
        if let Err(cause) = check_base_name(id, node.kind, base_name) {
            log::warn!("base name lookup of node {id} failed: {cause}");
            return Err(ContractError::service_failure(
                format!("could not read base name of node {id}"),
                cause,
            ));
        }
        Ok(base_name)
    }

    /// Change the node's base name in place.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an unknown handle, an empty
    ///   name, or an attempt to rename the root
    /// - [`ContractError::InvalidState`] if the renamed node breaks an
    ///   invariant; the old name has been restored
    pub fn rename(
        &mut self,
        id: impl Into<NodeId>,
        base_name: impl Into<String>,
    ) -> Result<(), ContractError> {
        let id = id.into();
        let base_name = base_name.into();
        contract::require(id != NodeId::ROOT, || "the root cannot be renamed".into())?;
        require_base_name(&base_name)?;

        let node = self.node_mut(id)?;
        log::debug!("rename node {id} from '{}' to '{base_name}'", node.base_name);
        let previous = node.store_base_name(base_name);
        if let Err(err) = self.check_local_invariants(&[id]) {
            log::warn!("rename of node {id} failed, rolling back: {err}");
            if let Ok(node) = self.node_mut(id) {
                node.restore_base_name(previous);
            }
            return Err(err);
        }
        Ok(())
    }

    /// Parent directory of the node; `None` for the root.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an unknown handle
    pub fn parent(&self, id: impl Into<NodeId>) -> Result<Option<DirectoryId>, ContractError> {
        Ok(self.node(id.into())?.parent)
    }

    /// Children of the directory, by handle.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an unknown handle
    pub fn children(&self, dir: DirectoryId) -> Result<&BTreeSet<NodeId>, ContractError> {
        Ok(&self.node(dir.node())?.children)
    }

    /// Name made of the base names from the root down to the node.
    ///
    /// A node `k` levels below the root yields `k` components; the root
    /// yields the empty name. The name uses [`Tree::delimiter`].
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an unknown handle
    /// - [`ContractError::ServiceFailure`] if a base name on the path cannot
    ///   be read
    /// - [`ContractError::InvalidState`] if the parent chain does not reach
    ///   the root
    pub fn full_name(&self, id: impl Into<NodeId>) -> Result<Name, ContractError> {
        let mut current = id.into();
        let mut components = Vec::new();

        while let Some(parent) = self.node(current)?.parent {
            components.push(self.base_name(current)?.to_owned());
            current = parent.node();
            contract::invariant(components.len() < self.nodes.len(), || {
                format!("parent chain of node {current} does not reach the root")
            })?;
        }
        contract::invariant(current == NodeId::ROOT, || {
            format!("node {current} has no parent but is not the root")
        })?;

        components.reverse();
        Name::new(components, self.delimiter)
    }

    /// Move the node into `target`.
    ///
    /// Either the node ends up in `target` or, on failure, exactly where it
    /// was: it is never orphaned or listed twice. Moving a node into its
    /// current parent is a no-op.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for unknown handles, moving the
    ///   root, or moving a directory into itself or one of its descendants
    /// - [`ContractError::MethodFailed`] if the relinked tree does not show
    ///   the node under `target`; the move has been rolled back
    /// - [`ContractError::InvalidState`] if a touched node breaks an
    ///   invariant after the move; the move has been rolled back
    pub fn move_node(
        &mut self,
        id: impl Into<NodeId>,
        target: DirectoryId,
    ) -> Result<(), ContractError> {
        let id = id.into();
        contract::require(id != NodeId::ROOT, || "the root cannot be moved".into())?;
        let from = self.node(id)?.parent.ok_or_else(|| ContractError::InvalidState {
            message: format!("node {id} has no parent"),
        })?;
        self.node(target.node())?;
        contract::require(!self.is_ancestor_or_self(id, target.node()), || {
            format!("cannot move node {id} into its own subtree at {target}")
        })?;

        if from == target {
            return Ok(());
        }

        let outcome = self
            .relink(id, from, target)
            .and_then(|()| self.ensure_linked(id, from, target))
            .and_then(|()| self.check_local_invariants(&[id, from.node(), target.node()]));
        if let Err(err) = outcome {
            log::warn!("move of node {id} from {from} to {target} failed, rolling back: {err}");
            self.restore_link(id, from, target);
            return Err(err);
        }

        log::debug!("moved node {id} from {from} to {target}");
        Ok(())
    }

    /// Every node in the subtree rooted at `from` (inclusive) whose base name
    /// equals `base_name`, by identity.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an unknown handle or an empty
    ///   search name
    /// - [`ContractError::ServiceFailure`] if a visited node's base name
    ///   cannot be read or a visited node breaks an invariant; the trigger
    ///   is the original error
    pub fn find_nodes(
        &self,
        from: impl Into<NodeId>,
        base_name: &str,
    ) -> Result<BTreeSet<NodeId>, ContractError> {
        let from = from.into();
        require_base_name(base_name)?;
        self.node(from)?;

        let mut found = BTreeSet::new();
        let mut pending = vec![from];
        while let Some(id) = pending.pop() {
            let visited = self
                .base_name(id)
                .and_then(|name| self.check_local_invariants(&[id]).map(|()| name));
            let name = visited.map_err(|cause| {
                ContractError::service_failure(format!("find_nodes('{base_name}') failed"), cause)
            })?;

            if name == base_name {
                found.insert(id);
            }
            // The node passed its invariant check, so its slot is live.
            if let Ok(node) = self.node(id) {
                pending.extend(node.children.iter().copied());
            }
        }
        Ok(found)
    }

    /// Detach the node from its parent and destroy its whole subtree.
    ///
    /// Handles into the removed subtree become stale and are never reissued.
    /// The slots stay allocated as tombstones.
    ///
    /// # Errors
    ///
    /// - [`ContractError::IllegalArgument`] for an unknown handle or the root
    /// - [`ContractError::MethodFailed`] if the parent still lists the node
    /// - [`ContractError::InvalidState`] if the parent breaks an invariant
    ///   once the node is detached
    ///
    /// On error nothing has been removed.
    pub fn remove_node(&mut self, id: impl Into<NodeId>) -> Result<(), ContractError> {
        let id = id.into();
        contract::require(id != NodeId::ROOT, || "the root cannot be removed".into())?;
        let parent = self.node(id)?.parent.ok_or_else(|| ContractError::InvalidState {
            message: format!("node {id} has no parent"),
        })?;

        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            if let Some(node) = self.slot(doomed[cursor]) {
                doomed.extend(node.children.iter().copied());
            }
            cursor += 1;
        }

        self.node_mut(parent.node())?.children.remove(&id);
        let detached = self
            .node(parent.node())
            .and_then(|dir| {
                contract::ensure(!dir.children.contains(&id), || {
                    format!("directory {parent} still lists removed node {id}")
                })
            })
            .and_then(|()| self.check_local_invariants(&[parent.node()]));
        if let Err(err) = detached {
            log::warn!("removal of node {id} failed, rolling back: {err}");
            if let Ok(dir) = self.node_mut(parent.node()) {
                dir.children.insert(id);
            }
            return Err(err);
        }

        for gone in &doomed {
            self.nodes[gone.index()] = None;
        }
        self.live -= doomed.len();
        log::debug!("removed node {id} and {} descendant(s)", doomed.len() - 1);
        Ok(())
    }

    fn attach(
        &mut self,
        base_name: String,
        kind: NodeKind,
        parent: DirectoryId,
        faulty: bool,
    ) -> Result<NodeId, ContractError> {
        require_base_name(&base_name)?;
        self.node(parent.node())?;

        let id = NodeId(self.nodes.len());
        let mut data = NodeData::new(base_name, kind, parent);
        data.faulty = faulty;
        self.nodes.push(Some(data));

        let registered = self
            .node_mut(parent.node())
            .map(|dir| {
                dir.children.insert(id);
            })
            .and_then(|()| {
                contract::ensure(self.node(parent.node())?.children.contains(&id), || {
                    format!("directory {parent} did not register node {id}")
                })
            })
            .and_then(|()| self.check_local_invariants(&[id, parent.node()]));
        if let Err(err) = registered {
            if let Ok(dir) = self.node_mut(parent.node()) {
                dir.children.remove(&id);
            }
            self.nodes.pop();
            return Err(err);
        }
        self.live += 1;

        if faulty {
            log::warn!("created node {id} with a faulty base-name lookup");
        }
        log::debug!("created {kind} node {id} in {parent}");
        Ok(id)
    }

    fn relink(
        &mut self,
        id: NodeId,
        from: DirectoryId,
        to: DirectoryId,
    ) -> Result<(), ContractError> {
        self.node_mut(from.node())?.children.remove(&id);
        self.node_mut(to.node())?.children.insert(id);
        self.node_mut(id)?.parent = Some(to);
        Ok(())
    }

    fn ensure_linked(
        &self,
        id: NodeId,
        from: DirectoryId,
        to: DirectoryId,
    ) -> Result<(), ContractError> {
        let linked = self.node(id)?.parent == Some(to)
            && self.node(to.node())?.children.contains(&id)
            && !self.node(from.node())?.children.contains(&id);
        contract::ensure(linked, || format!("node {id} is not linked under {to}"))
    }

    /// Best-effort undo of [`Tree::relink`]; every step tolerates a missing slot.
    fn restore_link(&mut self, id: NodeId, from: DirectoryId, to: DirectoryId) {
        if let Ok(dir) = self.node_mut(to.node()) {
            dir.children.remove(&id);
        }
        if let Ok(dir) = self.node_mut(from.node()) {
            dir.children.insert(id);
        }
        if let Ok(node) = self.node_mut(id) {
            node.parent = Some(from);
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        for _ in 0..self.nodes.len() {
            if id == ancestor {
                return true;
            }
            match self.slot(id).and_then(|node| node.parent) {
                Some(parent) => id = parent.node(),
                None => return false,
            }
        }
        false
    }

    fn check_local_invariants(&self, ids: &[NodeId]) -> Result<(), ContractError> {
        for &id in ids {
            self.check_node(id)?;
        }
        Ok(())
    }

    fn check_node(&self, id: NodeId) -> Result<(), ContractError> {
        let node = self.slot(id).ok_or_else(|| ContractError::InvalidState {
            message: format!("node {id} is not live"),
        })?;
        check_base_name(id, node.kind, node.stored_base_name())?;

        match node.parent {
            None => contract::invariant(node.kind == NodeKind::Root && id == NodeId::ROOT, || {
                format!("node {id} has no parent")
            })?,
            Some(parent) => {
                let listed = self
                    .slot(parent.node())
                    .is_some_and(|p| p.kind.is_container() && p.children.contains(&id));
                contract::invariant(listed, || {
                    format!("directory {parent} does not list its child {id}")
                })?;
            }
        }

        contract::invariant(node.kind.is_container() || node.children.is_empty(), || {
            format!("file {id} has children")
        })?;
        for &child in &node.children {
            let back = self.slot(child).and_then(|c| c.parent);
            contract::invariant(back == Some(DirectoryId(id)), || {
                format!("child {child} of {id} points back to {back:?}")
            })?;
        }
        Ok(())
    }

    fn slot(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node(&self, id: NodeId) -> Result<&NodeData, ContractError> {
        self.slot(id).ok_or_else(|| unknown_node(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, ContractError> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| unknown_node(id))
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Invariant for Tree {
    fn check_invariants(&self) -> Result<(), ContractError> {
        let root = self.slot(NodeId::ROOT).ok_or_else(|| ContractError::InvalidState {
            message: "the root is missing".into(),
        })?;
        contract::invariant(root.kind == NodeKind::Root, || {
            format!("slot {} holds a {} instead of the root", NodeId::ROOT, root.kind)
        })?;

        for (index, slot) in self.nodes.iter().enumerate() {
            if slot.is_some() {
                self.check_node(NodeId(index))?;
            }
        }
        Ok(())
    }
}

fn unknown_node(id: NodeId) -> ContractError {
    ContractError::IllegalArgument {
        message: format!("unknown node {id}"),
    }
}

fn require_base_name(base_name: &str) -> Result<(), ContractError> {
    contract::require(!base_name.is_empty(), || "base name must not be empty".into())
}

fn check_base_name(id: NodeId, kind: NodeKind, base_name: &str) -> Result<(), ContractError> {
    let valid = match kind {
        NodeKind::Root => base_name.is_empty(),
        NodeKind::Directory | NodeKind::File => !base_name.is_empty(),
    };
    contract::invariant(valid, || format!("invalid base name '{base_name}' on node {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, DirectoryId, DirectoryId, NodeId) {
        let mut tree = Tree::new();
        let home = tree.create_directory("home", tree.root()).unwrap();
        let user = tree.create_directory("user", home).unwrap();
        let notes = tree.create_file("notes.txt", user).unwrap();
        (tree, home, user, notes)
    }

    #[test]
    fn new_tree_has_only_root() {
        let tree = Tree::new();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.kind(tree.root()).unwrap(), NodeKind::Root);
        assert_eq!(tree.parent(tree.root()).unwrap(), None);
        assert_eq!(tree.base_name(tree.root()).unwrap(), "");
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn construction_registers_in_parent() {
        let (tree, home, user, notes) = sample();
        assert!(tree.children(home).unwrap().contains(&user.node()));
        assert!(tree.children(user).unwrap().contains(&notes));
        assert_eq!(tree.parent(notes).unwrap(), Some(user));
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn construction_rejects_empty_base_name() {
        let mut tree = Tree::new();
        let root = tree.root();
        assert!(tree.create_file("", root).unwrap_err().is_illegal_argument());
        assert!(tree.create_directory("", root).unwrap_err().is_illegal_argument());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn construction_rejects_stale_parent() {
        let (mut tree, home, _, _) = sample();
        tree.remove_node(home).unwrap();
        let err = tree.create_file("x", home).unwrap_err();
        assert!(err.is_illegal_argument());
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn full_name_walks_to_root() {
        let (tree, home, _, notes) = sample();
        let name = tree.full_name(notes).unwrap();
        assert_eq!(name.components(), ["home", "user", "notes.txt"]);
        assert_eq!(name.delimiter(), PATH_DELIMITER);
        assert_eq!(tree.full_name(home).unwrap().no_components(), 1);
        assert!(tree.full_name(tree.root()).unwrap().is_empty());
    }

    #[test]
    fn full_name_uses_configured_delimiter() {
        let mut tree = Tree::with_delimiter(':').unwrap();
        let a = tree.create_directory("a", tree.root()).unwrap();
        let b = tree.create_file("b", a).unwrap();
        assert_eq!(tree.full_name(b).unwrap().as_string(), "a:b");
    }

    #[test]
    fn with_delimiter_rejects_escape_character() {
        assert!(Tree::with_delimiter('\\').unwrap_err().is_illegal_argument());
    }

    #[test]
    fn rename_changes_full_name() {
        let (mut tree, home, _, notes) = sample();
        tree.rename(home, "srv").unwrap();
        assert_eq!(tree.full_name(notes).unwrap().as_string(), "srv/user/notes.txt");
    }

    #[test]
    fn rename_preconditions() {
        let (mut tree, _, _, notes) = sample();
        let root = tree.root();
        assert!(tree.rename(notes, "").unwrap_err().is_illegal_argument());
        assert!(tree.rename(root, "x").unwrap_err().is_illegal_argument());
        assert_eq!(tree.base_name(notes).unwrap(), "notes.txt");
    }

    #[test]
    fn failed_rename_keeps_old_name() {
        let (mut tree, home, _, notes) = sample();
        // A dangling child makes every check of `home` fail.
        tree.node_mut(home.node()).unwrap().children.insert(NodeId(999));

        let err = tree.rename(home, "srv").unwrap_err();
        assert!(err.is_invalid_state());
        assert_eq!(tree.base_name(home).unwrap(), "home");
        assert_eq!(tree.full_name(notes).unwrap().as_string(), "home/user/notes.txt");
    }

    #[test]
    fn move_relinks_both_directories() {
        let (mut tree, home, user, notes) = sample();
        tree.move_node(notes, home).unwrap();

        assert_eq!(tree.parent(notes).unwrap(), Some(home));
        assert!(!tree.children(user).unwrap().contains(&notes));
        assert!(tree.children(home).unwrap().contains(&notes));
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn move_into_current_parent_is_noop() {
        let (mut tree, _, user, notes) = sample();
        tree.move_node(notes, user).unwrap();
        assert_eq!(tree.parent(notes).unwrap(), Some(user));
        assert_eq!(tree.children(user).unwrap().len(), 1);
    }

    #[test]
    fn move_into_own_subtree_is_rejected() {
        let (mut tree, home, user, _) = sample();
        assert!(tree.move_node(home, user).unwrap_err().is_illegal_argument());
        assert!(tree.move_node(home, home).unwrap_err().is_illegal_argument());
        assert_eq!(tree.parent(home).unwrap(), Some(tree.root()));
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn move_root_is_rejected() {
        let (mut tree, home, _, _) = sample();
        let root = tree.root();
        assert!(tree.move_node(root, home).unwrap_err().is_illegal_argument());
    }

    #[test]
    fn failed_relink_is_rolled_back() {
        let (mut tree, home, user, notes) = sample();
        // A target slot that vanished mid-move: relink fails after detaching.
        let ghost = DirectoryId(NodeId(tree.nodes.len()));
        let err = tree.relink(notes, user, ghost).unwrap_err();
        assert!(err.is_illegal_argument());
        tree.restore_link(notes, user, ghost);

        assert_eq!(tree.parent(notes).unwrap(), Some(user));
        assert!(tree.children(user).unwrap().contains(&notes));
        assert!(!tree.children(home).unwrap().contains(&notes));
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn ensure_linked_detects_half_moves() {
        let (mut tree, home, user, notes) = sample();
        tree.node_mut(home.node()).unwrap().children.insert(notes);
        let err = tree.ensure_linked(notes, user, home).unwrap_err();
        assert!(err.is_method_failed());
    }

    #[test]
    fn move_breaking_target_invariant_is_rolled_back() {
        let (mut tree, home, user, notes) = sample();
        tree.node_mut(home.node()).unwrap().children.insert(NodeId(999));

        let err = tree.move_node(notes, home).unwrap_err();
        assert!(err.is_invalid_state());
        assert_eq!(tree.parent(notes).unwrap(), Some(user));
        assert!(tree.children(user).unwrap().contains(&notes));
        assert!(!tree.children(home).unwrap().contains(&notes));
    }

    #[test]
    fn find_nodes_collects_by_identity() {
        let (mut tree, home, user, notes) = sample();
        let other = tree.create_file("notes.txt", home).unwrap();
        let _ = tree.create_file("todo.txt", user).unwrap();

        let found = tree.find_nodes(tree.root(), "notes.txt").unwrap();
        assert_eq!(found, BTreeSet::from([notes, other]));

        let below_user = tree.find_nodes(user, "notes.txt").unwrap();
        assert_eq!(below_user, BTreeSet::from([notes]));
    }

    #[test]
    fn find_nodes_includes_start_node() {
        let (tree, home, _, notes) = sample();
        assert_eq!(tree.find_nodes(home, "home").unwrap(), BTreeSet::from([home.node()]));
        assert_eq!(tree.find_nodes(notes, "notes.txt").unwrap(), BTreeSet::from([notes]));
        assert!(tree.find_nodes(notes, "home").unwrap().is_empty());
    }

    #[test]
    fn find_nodes_rejects_empty_search_name() {
        let (tree, _, _, _) = sample();
        assert!(tree.find_nodes(tree.root(), "").unwrap_err().is_illegal_argument());
    }

    #[test]
    fn buggy_file_surfaces_service_failure() {
        let (mut tree, _, user, _) = sample();
        let buggy = tree.create_buggy_file("buggy.txt", user).unwrap();

        let err = tree.base_name(buggy).unwrap_err();
        assert!(err.is_service_failure());
        assert!(err.trigger().is_some_and(ContractError::is_invalid_state));

        let err = tree.find_nodes(tree.root(), "notes.txt").unwrap_err();
        assert!(err.is_service_failure());
        assert!(err.message().starts_with("find_nodes"));
        assert!(err.trigger().is_some_and(ContractError::is_invalid_state));

        assert!(tree.full_name(buggy).unwrap_err().is_service_failure());
    }

    #[test]
    fn buggy_lookup_leaves_tree_invalid_until_renamed() {
        let (mut tree, _, user, _) = sample();
        let buggy = tree.create_buggy_file("buggy.txt", user).unwrap();
        assert!(tree.check_invariants().is_ok());

        assert!(tree.base_name(buggy).is_err());
        let err = tree.check_invariants().unwrap_err();
        assert!(err.is_invalid_state());
        assert!(err.message().contains(&buggy.to_string()));

        // Writing a fresh name repairs the stored value.
        tree.rename(buggy, "fixed.txt").unwrap();
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn find_nodes_wraps_broken_invariants() {
        let (mut tree, home, user, _) = sample();
        // Corrupt the forward link only.
        tree.node_mut(home.node()).unwrap().children.remove(&user.node());
        let err = tree.find_nodes(user, "user").unwrap_err();
        assert!(err.is_service_failure());
        assert!(err.root_cause().is_invalid_state());
    }

    #[test]
    fn remove_node_drops_subtree() {
        let (mut tree, home, user, notes) = sample();
        tree.remove_node(user).unwrap();

        assert!(!tree.contains(user));
        assert!(!tree.contains(notes));
        assert!(tree.children(home).unwrap().is_empty());
        assert_eq!(tree.node_count(), 2);
        assert!(tree.base_name(notes).unwrap_err().is_illegal_argument());
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn failed_remove_keeps_subtree() {
        let (mut tree, _, user, notes) = sample();
        tree.node_mut(user.node()).unwrap().children.insert(NodeId(999));

        let err = tree.remove_node(notes).unwrap_err();
        assert!(err.is_invalid_state());
        assert!(tree.contains(notes));
        assert!(tree.children(user).unwrap().contains(&notes));
        assert_eq!(tree.parent(notes).unwrap(), Some(user));
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn removed_handles_are_never_reissued() {
        let (mut tree, home, user, notes) = sample();
        tree.remove_node(user).unwrap();
        let fresh = tree.create_file("fresh.txt", home).unwrap();

        assert_ne!(fresh, user.node());
        assert_ne!(fresh, notes);
        assert!(!tree.contains(notes));
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.node_count(), tree.nodes.iter().flatten().count());
    }

    #[test]
    fn remove_root_is_rejected() {
        let mut tree = Tree::new();
        let root = tree.root();
        assert!(tree.remove_node(root).unwrap_err().is_illegal_argument());
    }

    #[test]
    fn as_directory_checks_kind() {
        let (tree, home, _, notes) = sample();
        assert_eq!(tree.as_directory(home.node()).unwrap(), home);
        assert!(tree.as_directory(notes).unwrap_err().is_illegal_argument());
    }

    #[test]
    fn invariants_detect_dangling_back_reference() {
        let (mut tree, home, _, notes) = sample();
        tree.node_mut(notes).unwrap().parent = Some(home);
        assert!(tree.check_invariants().unwrap_err().is_invalid_state());
    }

    #[test]
    fn clone_is_independent() {
        let (tree, home, _, notes) = sample();
        let mut copy = tree.clone();
        copy.move_node(notes, home).unwrap();
        assert_ne!(tree.parent(notes).unwrap(), copy.parent(notes).unwrap());
    }

    #[test]
    fn tree_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tree>();
    }
}
