//! A serialisable snapshot of the chapter state, for printing or handing to other tooling.

use crate::event::ChapterEvent;
use crate::name::command_name;
use crate::outline::{OutlineStore, Position};
use crate::registry::ChapterRegistry;
use serde::Serialize;

#[derive(Serialize, Clone, Debug)]
/// Chapter state after a sequence of commands.
pub struct ChapterReport {
    /// Every chapter, in name order.
    pub chapters: Vec<ChapterSummary>,
    /// The selected chapter, `main` if none is.
    pub selected: String,
    /// Headline of the current position.
    pub current: Option<String>,
    /// Number of live hoist scopes.
    pub hoist_depth: usize,
    /// Notifications emitted along the way.
    pub events: Vec<ChapterEvent>,
}

#[derive(Serialize, Clone, Debug)]
/// One chapter's remembered state.
pub struct ChapterSummary {
    /// The chapter name.
    pub name: String,
    /// Key binding of the chapter's select command.
    pub binding: Option<String>,
    /// Headline of the `@chapter` node, absent for `main`.
    pub root: Option<String>,
    /// Headline at the remembered position, absent if stale.
    pub position: Option<String>,
}

impl ChapterReport {
    #[must_use]
    /// Captures the registry and outline state together with the given events.
    pub fn capture(
        registry: &ChapterRegistry,
        outline: &dyn OutlineStore,
        events: Vec<ChapterEvent>,
    ) -> Self {
        let headline = |p: Option<Position>| p.and_then(|p| outline.headline(&p).map(str::to_string));
        let commands = registry.commands();

        let chapters = registry
            .chapters()
            .iter()
            .map(|chapter| {
                let command = command_name(chapter.name());
                ChapterSummary {
                    name: chapter.name().to_string(),
                    binding: commands
                        .iter()
                        .find(|(name, _)| *name == command)
                        .and_then(|(_, binding)| binding.clone()),
                    root: headline(chapter.find_root_node(outline)),
                    position: headline(chapter.position()),
                }
            })
            .collect();

        Self {
            chapters,
            selected: registry
                .selected()
                .map_or_else(|| "main".to_string(), |name| name.to_string()),
            current: headline(outline.current_position()),
            hoist_depth: outline.hoist_stack().len(),
            events,
        }
    }
}

#[cfg(test)]
#[path = "tests/report.rs"]
mod tests;
