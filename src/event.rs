//! Notifications leaving the chapter subsystem.
//!
//! The core never renders or registers key bindings itself. It reports what happened through
//! [`crate::outline::OutlineStore::notify`] and a presentation layer reacts.

use crate::name::ChapterName;
use crate::outline::Position;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
/// Something a presentation layer may want to react to.
pub enum ChapterEvent {
    /// The tree should be redrawn. Emitted once per successful selection.
    Redraw,
    /// A chapter pushed a hoist entry scoping the display to `root`.
    HoistChanged {
        /// Root of the new hoist scope.
        root: Position,
    },
    /// Entering `main`: sibling subtrees around `position` may be collapsed for a tidier view.
    CollapseRequested {
        /// Position being shown after entering `main`.
        position: Position,
        /// Siblings of `position` whose subtrees may be collapsed.
        siblings: Vec<Position>,
    },
    /// The editor widget showing `position` should become active.
    EditorSwitched {
        /// Chapter the editor belongs to.
        chapter: ChapterName,
        /// Position the editor should display.
        position: Position,
    },
    /// A placeholder child was inserted under an empty chapter marker (undoable).
    PlaceholderInserted {
        /// The inserted child.
        position: Position,
    },
    /// A `chapter-select-NAME` command was registered.
    CommandRegistered {
        /// Full command name.
        command: String,
        /// Key binding parsed from the marker headline, if any.
        binding: Option<String>,
    },
}
