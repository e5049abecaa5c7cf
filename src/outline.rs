//! The shared document tree the chapters are views over.
//!
//! Node identity and tree position are deliberately separate types. A [`NodeId`] names one
//! document item for its whole life, while a [`Position`] is a path of child indices that may
//! reach that item. Clones make one node reachable at several positions, and edits can leave a
//! remembered position pointing at a different node or at nothing at all. A position therefore
//! remembers which node it was created for, and is only considered to exist while its path still
//! resolves to that node.
//!
//! The chapter logic talks to the tree through [`OutlineStore`]. [`Outline`] is the arena-backed
//! store used by the binary and the tests.

use crate::event::ChapterEvent;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
/// Identity of a document node, stable across moves and clones.
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
/// Path reference to a node at one place in the tree.
pub struct Position {
    /// Child indices from the top level down to the node.
    path: Vec<usize>,
    /// Node this position pointed at when it was created.
    node: NodeId,
}

impl Position {
    #[must_use]
    /// Identity of the node this position refers to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    /// Child indices from the top level down to the node.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    #[must_use]
    /// Nesting depth, 0 for top-level nodes.
    pub fn level(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    #[must_use]
    /// True when `other` lies in the subtree rooted here (including `self`).
    pub fn contains_path_of(&self, other: &Position) -> bool {
        other.path.starts_with(&self.path)
    }

    fn child(&self, index: usize, node: NodeId) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self { path, node }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One level of display scoping on the hoist stack.
pub struct HoistEntry {
    /// Root of the hoisted subtree.
    pub root: Position,
    /// Whether the root was expanded when hoisted.
    pub expanded: bool,
}

/// Everything the chapter subsystem needs from the document.
///
/// Implementors own the nodes, the current position and the hoist stack. Setting the current
/// position must never touch the hoist stack. [`OutlineStore::notify`] receives `&mut self` so
/// that listener hooks may call back into the chapter registry while a selection is in flight.
pub trait OutlineStore {
    /// True when `p` still resolves to its node, and lies within `scope` if one is given.
    fn position_exists(&self, p: &Position, scope: Option<&Position>) -> bool;

    /// Every position in preorder, visiting cloned subtrees once per occurrence.
    fn all_positions(&self) -> Vec<Position>;

    /// Preorder positions, skipping repeat visits of a node and its subtree.
    fn all_unique_positions(&self) -> Vec<Position>;

    /// `root` followed by every position beneath it, in preorder.
    fn self_and_subtree(&self, root: &Position) -> Vec<Position>;

    /// All positions sharing the parent of `p`, including `p`. Entering `main` offers the others
    /// up for collapsing.
    fn siblings(&self, p: &Position) -> Vec<Position>;

    /// Display text of the node at `p`.
    fn headline(&self, p: &Position) -> Option<&str>;

    /// First child of the node at `p`.
    fn first_child(&self, p: &Position) -> Option<Position>;

    /// True when the node at `p` has at least one child.
    fn has_children(&self, p: &Position) -> bool {
        self.first_child(p).is_some()
    }

    /// Appends a new child with `headline` under `p`.
    fn insert_as_last_child(&mut self, p: &Position, headline: &str) -> Option<Position>;

    /// The position the user is looking at.
    fn current_position(&self) -> Option<Position>;

    /// Moves the cursor without touching the hoist stack.
    fn set_current_position(&mut self, p: &Position);

    /// The live hoist stack, bottom first.
    fn hoist_stack(&self) -> &[HoistEntry];

    /// Pushes a hoist scope.
    fn push_hoist(&mut self, entry: HoistEntry);

    /// Pops the innermost hoist scope.
    fn pop_hoist(&mut self) -> Option<HoistEntry>;

    /// Delivers a notification to whoever listens on this document.
    fn notify(&mut self, event: ChapterEvent);
}

#[derive(Debug, Clone)]
struct NodeData {
    headline: String,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
/// Arena-backed outline with clone support.
///
/// Removed nodes stay in the arena so their identities are never reused.
pub struct Outline {
    nodes: Vec<NodeData>,
    top: Vec<NodeId>,
    current: Option<Position>,
    hoist: Vec<HoistEntry>,
    events: Vec<ChapterEvent>,
}

impl Outline {
    #[must_use]
    /// Creates an empty outline.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, headline: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            headline: headline.to_string(),
            children: Vec::new(),
        });
        id
    }

    fn resolve(&self, path: &[usize]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        let mut id = *self.top.get(*first)?;
        for index in rest {
            id = *self.nodes[id.0].children.get(*index)?;
        }
        Some(id)
    }

    fn is_live(&self, p: &Position) -> bool {
        self.resolve(&p.path) == Some(p.node)
    }

    fn collect(
        &self,
        parent: &[usize],
        children: &[NodeId],
        out: &mut Vec<Position>,
        seen: &mut Option<HashSet<NodeId>>,
    ) {
        for (index, &id) in children.iter().enumerate() {
            if let Some(seen) = seen.as_mut() {
                if !seen.insert(id) {
                    continue;
                }
            }
            let mut path = parent.to_vec();
            path.push(index);
            out.push(Position {
                path: path.clone(),
                node: id,
            });
            self.collect(&path, &self.nodes[id.0].children, out, seen);
        }
    }

    /// Appends a top-level node.
    pub fn add_top_level(&mut self, headline: &str) -> Position {
        let id = self.alloc(headline);
        self.top.push(id);
        Position {
            path: vec![self.top.len() - 1],
            node: id,
        }
    }

    /// Appends a child under `parent`, or `None` if `parent` no longer exists.
    pub fn add_child(&mut self, parent: &Position, headline: &str) -> Option<Position> {
        self.insert_as_last_child(parent, headline)
    }

    /// Makes the node at `source` reachable a second time, as the last child of `parent`.
    ///
    /// Refuses (returns `None`) when either position is stale or when the clone would make a
    /// node its own descendant.
    pub fn clone_as_child(&mut self, parent: &Position, source: &Position) -> Option<Position> {
        if !self.is_live(parent) || !self.is_live(source) {
            return None;
        }
        if self.subtree_contains(source.node, parent.node) {
            return None;
        }
        let children = &mut self.nodes[parent.node.0].children;
        children.push(source.node);
        Some(parent.child(children.len() - 1, source.node))
    }

    fn subtree_contains(&self, root: NodeId, target: NodeId) -> bool {
        let mut stack = vec![root];
        let mut visited = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if visited.insert(id) {
                stack.extend(self.nodes[id.0].children.iter().copied());
            }
        }
        false
    }

    /// Unlinks the node at `p` from its parent. Positions after it among its siblings go stale.
    pub fn remove(&mut self, p: &Position) -> bool {
        if !self.is_live(p) {
            return false;
        }
        let Some((&index, parent_path)) = p.path.split_last() else {
            return false;
        };
        if parent_path.is_empty() {
            self.top.remove(index);
        } else if let Some(parent) = self.resolve(parent_path) {
            self.nodes[parent.0].children.remove(index);
        }
        true
    }

    /// Moves the node at `p` (with its subtree) to the end of the top level.
    pub fn move_to_top_level(&mut self, p: &Position) -> Option<Position> {
        if !self.remove(p) {
            return None;
        }
        self.top.push(p.node);
        Some(Position {
            path: vec![self.top.len() - 1],
            node: p.node,
        })
    }

    /// Changes the display text of the node at `p`.
    pub fn set_headline(&mut self, p: &Position, headline: &str) -> bool {
        if !self.is_live(p) {
            return false;
        }
        headline.clone_into(&mut self.nodes[p.node.0].headline);
        true
    }

    #[must_use]
    /// First position, in preorder, whose headline is exactly `headline`.
    pub fn find_by_headline(&self, headline: &str) -> Option<Position> {
        self.all_positions()
            .into_iter()
            .find(|p| self.nodes[p.node.0].headline == headline)
    }

    #[must_use]
    /// Notifications received so far.
    pub fn events(&self) -> &[ChapterEvent] {
        &self.events
    }

    /// Drains the received notifications.
    pub fn take_events(&mut self) -> Vec<ChapterEvent> {
        std::mem::take(&mut self.events)
    }
}

impl OutlineStore for Outline {
    fn position_exists(&self, p: &Position, scope: Option<&Position>) -> bool {
        if !self.is_live(p) {
            return false;
        }
        scope.is_none_or(|root| self.is_live(root) && root.contains_path_of(p))
    }

    fn all_positions(&self) -> Vec<Position> {
        let mut out = Vec::new();
        self.collect(&[], &self.top, &mut out, &mut None);
        out
    }

    fn all_unique_positions(&self) -> Vec<Position> {
        let mut out = Vec::new();
        self.collect(&[], &self.top, &mut out, &mut Some(HashSet::new()));
        out
    }

    fn self_and_subtree(&self, root: &Position) -> Vec<Position> {
        if !self.is_live(root) {
            return Vec::new();
        }
        let mut out = vec![root.clone()];
        self.collect(&root.path, &self.nodes[root.node.0].children, &mut out, &mut None);
        out
    }

    fn siblings(&self, p: &Position) -> Vec<Position> {
        if !self.is_live(p) {
            return Vec::new();
        }
        let parent_path = &p.path[..p.path.len() - 1];
        let children = if parent_path.is_empty() {
            &self.top
        } else {
            match self.resolve(parent_path) {
                Some(parent) => &self.nodes[parent.0].children,
                None => return Vec::new(),
            }
        };
        children
            .iter()
            .enumerate()
            .map(|(index, &node)| {
                let mut path = parent_path.to_vec();
                path.push(index);
                Position { path, node }
            })
            .collect()
    }

    fn headline(&self, p: &Position) -> Option<&str> {
        self.is_live(p)
            .then(|| self.nodes[p.node.0].headline.as_str())
    }

    fn first_child(&self, p: &Position) -> Option<Position> {
        if !self.is_live(p) {
            return None;
        }
        let first = *self.nodes[p.node.0].children.first()?;
        Some(p.child(0, first))
    }

    fn insert_as_last_child(&mut self, p: &Position, headline: &str) -> Option<Position> {
        if !self.is_live(p) {
            return None;
        }
        let id = self.alloc(headline);
        let children = &mut self.nodes[p.node.0].children;
        children.push(id);
        Some(p.child(children.len() - 1, id))
    }

    fn current_position(&self) -> Option<Position> {
        self.current.clone()
    }

    fn set_current_position(&mut self, p: &Position) {
        trace!(position = %p, "set current position");
        self.current = Some(p.clone());
    }

    fn hoist_stack(&self) -> &[HoistEntry] {
        &self.hoist
    }

    fn push_hoist(&mut self, entry: HoistEntry) {
        trace!(root = %entry.root, depth = self.hoist.len() + 1, "push hoist");
        self.hoist.push(entry);
    }

    fn pop_hoist(&mut self) -> Option<HoistEntry> {
        let entry = self.hoist.pop();
        trace!(depth = self.hoist.len(), popped = entry.is_some(), "pop hoist");
        entry
    }

    fn notify(&mut self, event: ChapterEvent) {
        trace!(?event, "outline notification");
        self.events.push(event);
    }
}

#[cfg(test)]
#[path = "tests/outline.rs"]
mod tests;
