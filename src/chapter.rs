//! A single chapter: a named view over the outline that remembers where the user was.
//!
//! A chapter other than `main` is rooted at its `@chapter` node. Selecting it pushes a hoist
//! entry for that root and restores the remembered position. Unselecting records the current
//! position and pops the hoist entry again. The state machine is:
//!
//! ```text
//! Unselected -> (select) -> Selecting (locked) -> Selected -> (unselect) -> Unselected
//! ```
//!
//! Positions go stale whenever the outline is edited, so every selection revalidates the
//! remembered position against the live tree, and falls back to searching for the same node by
//! identity before giving up and using the chapter root.

use crate::error::ChapterError;
use crate::event::ChapterEvent;
use crate::lockout::Lockout;
use crate::name::{is_chapter_marker, parse_headline, ChapterName};
use crate::outline::{HoistEntry, OutlineStore, Position};
use crate::registry::ChapterRegistry;
use std::cell::RefCell;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
/// An editor widget, identified by the position it last displayed.
pub struct EditorRef {
    /// Last position shown in this editor.
    pub position: Position,
}

#[derive(Debug)]
/// Per-name navigation state over the shared outline.
pub struct Chapter {
    name: ChapterName,
    /// Where the user was when this chapter was last left.
    position: RefCell<Option<Position>>,
    /// The `@chapter` node as of the last selection; used to find our hoist entry again.
    root: RefCell<Option<Position>>,
    select_lockout: Lockout,
}

#[must_use]
/// First position anywhere in the outline whose headline names chapter `name`.
///
/// Marker nodes may be moved anywhere, so this always searches the whole tree.
pub fn find_chapter_node(outline: &dyn OutlineStore, name: &str) -> Option<Position> {
    outline.all_positions().into_iter().find(|p| {
        outline
            .headline(p)
            .and_then(parse_headline)
            .is_some_and(|(found, _)| found == name)
    })
}

impl Chapter {
    #[must_use]
    /// Creates a chapter remembering the outline's current position.
    pub fn new(name: ChapterName, outline: &dyn OutlineStore) -> Self {
        let chapter = Self {
            name,
            position: RefCell::new(outline.current_position()),
            root: RefCell::new(None),
            select_lockout: Lockout::new(),
        };
        *chapter.root.borrow_mut() = chapter.find_root_node(outline);
        chapter
    }

    #[must_use]
    /// The chapter's immutable name.
    pub fn name(&self) -> &ChapterName {
        &self.name
    }

    #[must_use]
    /// The remembered position, which may be stale.
    pub fn position(&self) -> Option<Position> {
        self.position.borrow().clone()
    }

    #[must_use]
    /// The root found during the last selection.
    pub fn root(&self) -> Option<Position> {
        self.root.borrow().clone()
    }

    #[must_use]
    /// True while this chapter's own select or unselect is running.
    pub fn is_selecting(&self) -> bool {
        self.select_lockout.is_held()
    }

    /// Overwrites the remembered position.
    pub fn remember(&self, p: Option<Position>) {
        *self.position.borrow_mut() = p;
    }

    #[must_use]
    /// Locates this chapter's `@chapter` node. Always `None` for `main`.
    pub fn find_root_node(&self, outline: &dyn OutlineStore) -> Option<Position> {
        if self.name.is_main() {
            return None;
        }
        find_chapter_node(outline, self.name.as_str())
    }

    /// Makes this chapter the active view.
    ///
    /// Does nothing if this chapter is already mid-selection. For chapters other than `main`
    /// the root is looked up again (it may have moved), the position to show is resolved from
    /// `editor` if given or else from the remembered position, and a hoist entry for the root is
    /// pushed.
    ///
    /// # Errors
    ///
    /// Returns [`ChapterError::NoRoot`] when the `@chapter` node is gone. Nothing is changed in
    /// that case.
    pub fn select(
        &self,
        registry: &ChapterRegistry,
        outline: &mut dyn OutlineStore,
        editor: Option<&EditorRef>,
        select_editor: bool,
    ) -> Result<(), ChapterError> {
        let Some(_guard) = self.select_lockout.try_acquire() else {
            debug!(chapter = %self.name, "chapter select re-entered; ignoring");
            return Ok(());
        };

        if self.name.is_main() {
            registry.mark_selected(&self.name);
            // main has no root, but its remembered position may still have gone stale
            if let Some(p) = self.position() {
                if !outline.position_exists(&p, None) {
                    self.remember(self.find_position_in_chapter(&*outline, &p, false));
                }
            }
            return Ok(());
        }

        let root = self.find_root_node(&*outline);
        self.root.borrow_mut().clone_from(&root);
        let Some(root) = root else {
            return Err(ChapterError::NoRoot(self.name.clone()));
        };
        registry.mark_selected(&self.name);

        let remembered = self
            .position()
            .filter(|p| outline.position_exists(p, None))
            .unwrap_or_else(|| root.clone());

        let mut p = if let Some(editor) = editor {
            self.find_position_in_chapter(&*outline, &editor.position, false)
                .unwrap_or_else(|| root.clone())
        } else {
            let p = self
                .find_position_in_chapter(&*outline, &remembered, false)
                .unwrap_or_else(|| root.clone());
            if select_editor {
                outline.notify(ChapterEvent::EditorSwitched {
                    chapter: self.name.clone(),
                    position: p.clone(),
                });
            }
            p
        };

        // Never root the view on a marker node itself.
        if outline.headline(&p).is_some_and(is_chapter_marker) {
            if outline.has_children(&p) {
                if let Some(child) = outline.first_child(&p) {
                    p = child;
                }
            } else if let Some(child) =
                outline.insert_as_last_child(&p, registry.placeholder_headline())
            {
                if !registry.is_initializing() {
                    outline.notify(ChapterEvent::PlaceholderInserted {
                        position: child.clone(),
                    });
                }
                p = child;
            }
        }
        self.remember(Some(p.clone()));

        outline.push_hoist(HoistEntry {
            root: root.clone(),
            expanded: true,
        });
        outline.set_current_position(&p);
        debug!(chapter = %self.name, root = %root, position = %p, "chapter selected");
        outline.notify(ChapterEvent::HoistChanged { root });
        Ok(())
    }

    /// Records where the user is and removes this chapter's hoist scope.
    ///
    /// Hoist entries are popped until the one for this chapter's root is found. If it is gone
    /// (for example after a manual de-hoist) the stack is simply left empty and the cursor falls
    /// back to the chapter root.
    pub fn unselect(&self, outline: &mut dyn OutlineStore) {
        let Some(_guard) = self.select_lockout.try_acquire() else {
            debug!(chapter = %self.name, "chapter unselect re-entered; ignoring");
            return;
        };

        let current = outline.current_position();
        if current.is_some() {
            self.remember(current.clone());
        }
        if self.name.is_main() {
            return;
        }

        let expected = self.root();
        let mut popped = None;
        let mut found = false;
        while let Some(entry) = outline.pop_hoist() {
            found = expected.as_ref() == Some(&entry.root);
            popped = Some(entry.root);
            if found {
                break;
            }
        }
        if !found {
            warn!(chapter = %self.name, "hoist entry for chapter not found; recovering");
        }

        let restore = match outline.hoist_stack().last() {
            Some(top) => Some(top.root.clone()),
            None => popped.or(expected).or(current),
        };
        if let Some(p) = restore {
            outline.set_current_position(&p);
        }
    }

    #[must_use]
    /// Finds a valid position for `candidate` within this chapter.
    ///
    /// A candidate already inside the chapter is returned as is. Otherwise, unless `strict`, the
    /// chapter is scanned for another position of the same node and the first one wins.
    pub fn find_position_in_chapter(
        &self,
        outline: &dyn OutlineStore,
        candidate: &Position,
        strict: bool,
    ) -> Option<Position> {
        if self.name.is_main() {
            if outline.position_exists(candidate, None) {
                return Some(candidate.clone());
            }
            if strict {
                return None;
            }
            return outline
                .all_unique_positions()
                .into_iter()
                .find(|p| p.node() == candidate.node());
        }

        let root = self.find_root_node(outline)?;
        if outline.position_exists(candidate, Some(&root)) {
            return Some(candidate.clone());
        }
        if strict {
            return None;
        }
        outline
            .self_and_subtree(&root)
            .into_iter()
            .find(|p| p.node() == candidate.node())
    }

    #[must_use]
    /// True when `p` itself lies inside this chapter.
    pub fn position_is_in_chapter(&self, outline: &dyn OutlineStore, p: &Position) -> bool {
        self.find_position_in_chapter(outline, p, true).is_some()
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position() {
            Some(p) => write!(f, "<chapter: {}, p: {p}>", self.name),
            None => write!(f, "<chapter: {}, p: none>", self.name),
        }
    }
}

#[cfg(test)]
#[path = "tests/chapter.rs"]
mod tests;
