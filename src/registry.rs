//! The chapter registry: one per open document, owning every chapter and the selection.
//!
//! UI commands (pick a chapter, cycle to the next or previous one, follow the cursor) all land
//! here. A registry-wide [`Lockout`] keeps at most one selection in flight. Listener hooks fired
//! while a selection runs (cursor moves, hoist changes) may call straight back into the registry,
//! and those nested calls are ignored rather than corrupting the hoist stack.
//!
//! The registry only borrows the outline for the duration of a call. Everything it owns is kept
//! behind `Cell`/`RefCell` so that such reentrant calls can reach it through a shared reference,
//! and no borrow is held while control is handed to the outline.

use crate::chapter::{find_chapter_node, Chapter};
use crate::config::Config;
use crate::error::ChapterError;
use crate::event::ChapterEvent;
use crate::lockout::Lockout;
use crate::name::{command_name, parse_headline, ChapterName};
use crate::outline::{OutlineStore, Position};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use tracing::{debug, warn};

/// Command that selects the next chapter.
pub const NEXT_COMMAND: &str = "chapter-next";
/// Command that selects the previous chapter.
pub const BACK_COMMAND: &str = "chapter-back";

/// Owns the name to chapter map and the current selection for one document.
pub struct ChapterRegistry {
    config: Config,
    /// Keyed by name, so iteration is lexicographic.
    chapters: RefCell<BTreeMap<ChapterName, Rc<Chapter>>>,
    /// Names in the order they were discovered, `main` first.
    order: RefCell<Vec<ChapterName>>,
    /// Registered `chapter-select-NAME` commands and their key bindings.
    commands: RefCell<BTreeMap<String, Option<String>>>,
    /// `None` means `main`.
    selected: RefCell<Option<ChapterName>>,
    lockout: Lockout,
    /// True until [`ChapterRegistry::finish_create`] has run.
    initializing: Cell<bool>,
}

impl Default for ChapterRegistry {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ChapterRegistry {
    #[must_use]
    /// Creates an empty registry. Call [`ChapterRegistry::finish_create`] once the outline is
    /// loaded.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            chapters: RefCell::new(BTreeMap::new()),
            order: RefCell::new(Vec::new()),
            commands: RefCell::new(BTreeMap::new()),
            selected: RefCell::new(None),
            lockout: Lockout::new(),
            initializing: Cell::new(true),
        }
    }

    /// Discovers every chapter, ends initialisation and selects `main`.
    ///
    /// # Errors
    ///
    /// Propagates a failure to select `main`, which does not happen in practice.
    pub fn finish_create(&self, outline: &mut dyn OutlineStore) -> Result<(), ChapterError> {
        self.discover_all(outline);
        self.initializing.set(false);
        // Opening straight into a small chapter of a large outline is disorienting.
        self.select(outline, ChapterName::MAIN)?;
        outline.notify(ChapterEvent::Redraw);
        Ok(())
    }

    /// Scans the outline for `@chapter` nodes, creating a chapter for each new name.
    ///
    /// Returns the names in outline order with `main` first. Nodes reached more than once
    /// through clones are only considered once, and calling this again never duplicates
    /// chapters that already exist.
    pub fn discover_all(&self, outline: &mut dyn OutlineStore) -> Vec<ChapterName> {
        self.ensure_main(outline);
        let mut result = vec![ChapterName::main()];
        let mut seen = HashSet::new();
        for p in outline.all_unique_positions() {
            let Some((name, binding)) = outline.headline(&p).and_then(parse_headline) else {
                continue;
            };
            if !seen.insert(p.node()) {
                continue;
            }
            if name.is_main() {
                debug!(position = %p, "ignoring @chapter node named main");
                continue;
            }
            if result.contains(&name) {
                continue;
            }
            result.push(name.clone());
            self.register(outline, name, binding);
        }
        result
    }

    fn ensure_main(&self, outline: &mut dyn OutlineStore) {
        if !self.chapters.borrow().contains_key(ChapterName::MAIN) {
            self.register(outline, ChapterName::main(), None);
        }
    }

    fn register(&self, outline: &mut dyn OutlineStore, name: ChapterName, binding: Option<String>) {
        if self.chapters.borrow().contains_key(&name) {
            return;
        }
        let chapter = Rc::new(Chapter::new(name, &*outline));
        debug!(chapter = %chapter.name(), "chapter created");
        self.order.borrow_mut().push(chapter.name().clone());
        self.chapters
            .borrow_mut()
            .insert(chapter.name().clone(), Rc::clone(&chapter));
        self.make_command(outline, chapter.name(), binding);
    }

    fn make_command(&self, outline: &mut dyn OutlineStore, name: &ChapterName, binding: Option<String>) {
        let command = command_name(name);
        if self.commands.borrow().contains_key(&command) {
            return;
        }
        self.commands
            .borrow_mut()
            .insert(command.clone(), binding.clone());
        outline.notify(ChapterEvent::CommandRegistered { command, binding });
    }

    /// Selects the chapter called `name`, using the configured collapse policy.
    ///
    /// Does nothing while another selection is in flight.
    ///
    /// # Errors
    ///
    /// [`ChapterError::NotFound`] for an unknown name and [`ChapterError::NoRoot`] when the
    /// chapter's `@chapter` node is gone. State is unchanged in both cases.
    pub fn select(&self, outline: &mut dyn OutlineStore, name: &str) -> Result<(), ChapterError> {
        self.select_with(outline, name, self.config.collapse_on_enter_main)
    }

    /// Selects the chapter called `name`.
    ///
    /// With `collapse_on_enter_main`, entering `main` emits [`ChapterEvent::CollapseRequested`]
    /// so the presentation layer can tidy up sibling subtrees.
    ///
    /// # Errors
    ///
    /// As for [`ChapterRegistry::select`].
    pub fn select_with(
        &self,
        outline: &mut dyn OutlineStore,
        name: &str,
        collapse_on_enter_main: bool,
    ) -> Result<(), ChapterError> {
        let Some(_guard) = self.lockout.try_acquire() else {
            debug!(chapter = name, "selection already in flight; ignoring");
            return Ok(());
        };
        let chapter = self
            .chapter(name)
            .ok_or_else(|| ChapterError::NotFound(name.to_string()))?;
        self.select_helper(outline, &chapter, collapse_on_enter_main)
    }

    fn select_helper(
        &self,
        outline: &mut dyn OutlineStore,
        chapter: &Rc<Chapter>,
        collapse_on_enter_main: bool,
    ) -> Result<(), ChapterError> {
        let selected = self.selected_chapter();

        if selected.is_none() && chapter.name().is_main() {
            chapter.remember(outline.current_position());
            return Ok(());
        }
        if selected.as_ref().is_some_and(|s| Rc::ptr_eq(s, chapter)) {
            chapter.remember(outline.current_position());
            return Ok(());
        }
        if !chapter.name().is_main() && chapter.find_root_node(&*outline).is_none() {
            return Err(ChapterError::NoRoot(chapter.name().clone()));
        }

        if let Some(previous) = selected.or_else(|| self.chapter(ChapterName::MAIN)) {
            previous.unselect(outline);
        }
        chapter.select(self, outline, None, true)?;

        if let Some(p) = chapter.position().or_else(|| outline.current_position()) {
            outline.set_current_position(&p);
            if collapse_on_enter_main && chapter.name().is_main() {
                let siblings = outline
                    .siblings(&p)
                    .into_iter()
                    .filter(|s| *s != p)
                    .collect();
                outline.notify(ChapterEvent::CollapseRequested {
                    position: p,
                    siblings,
                });
            }
        }
        outline.notify(ChapterEvent::Redraw);
        Ok(())
    }

    /// Selects the next chapter in name order, wrapping past the last.
    ///
    /// # Errors
    ///
    /// As for [`ChapterRegistry::select`].
    pub fn cycle_next(&self, outline: &mut dyn OutlineStore) -> Result<(), ChapterError> {
        self.cycle(outline, true)
    }

    /// Selects the previous chapter in name order, wrapping before the first.
    ///
    /// # Errors
    ///
    /// As for [`ChapterRegistry::select`].
    pub fn cycle_prev(&self, outline: &mut dyn OutlineStore) -> Result<(), ChapterError> {
        self.cycle(outline, false)
    }

    fn cycle(&self, outline: &mut dyn OutlineStore, forward: bool) -> Result<(), ChapterError> {
        // Held across discovery too: registering a command notifies listeners.
        let Some(_guard) = self.lockout.try_acquire() else {
            debug!("selection already in flight; ignoring cycle");
            return Ok(());
        };
        self.discover_all(outline);
        let names = self.names();
        let current = self.selected().unwrap_or_else(ChapterName::main);
        let index = names.iter().position(|n| *n == current).unwrap_or(0);
        let target = if forward {
            (index + 1) % names.len()
        } else {
            (index + names.len() - 1) % names.len()
        };
        let name = names[target].as_str();
        let chapter = self
            .chapter(name)
            .ok_or_else(|| ChapterError::NotFound(name.to_string()))?;
        self.select_helper(outline, &chapter, self.config.collapse_on_enter_main)
    }

    #[must_use]
    /// Name of the first chapter other than `main`, in discovery order, whose subtree contains
    /// `p`, else `main`.
    pub fn find_name_for_position(&self, outline: &dyn OutlineStore, p: &Position) -> ChapterName {
        if !outline.position_exists(p, None) {
            return ChapterName::main();
        }
        self.chapters_in_discovery_order()
            .into_iter()
            .find(|c| !c.name().is_main() && c.position_is_in_chapter(outline, p))
            .map_or_else(ChapterName::main, |c| c.name().clone())
    }

    /// Follows the cursor: selects a chapter containing `p`.
    ///
    /// `preferred`, or else the selected chapter, is tried first. Nothing happens while a
    /// selection is in flight, when `p` does not exist, or when the chapter tried first is
    /// `main` (which contains everything). Otherwise every other chapter is tried in discovery
    /// order, falling back to `main`.
    pub fn select_for_position(
        &self,
        outline: &mut dyn OutlineStore,
        p: &Position,
        preferred: Option<&str>,
    ) {
        if self.lockout.is_held() {
            return;
        }
        let Some(first) = preferred
            .and_then(|name| self.chapter(name))
            .or_else(|| self.selected_chapter())
        else {
            return;
        };
        if !outline.position_exists(p, None) || first.name().is_main() {
            return;
        }
        if first.position_is_in_chapter(&*outline, p) {
            self.select_logged(outline, first.name().as_str());
            return;
        }
        let target = self
            .chapters_in_discovery_order()
            .into_iter()
            .find(|c| {
                !c.name().is_main() && c.name() != first.name() && c.position_is_in_chapter(&*outline, p)
            })
            .map_or_else(ChapterName::main, |c| c.name().clone());
        self.select_logged(outline, target.as_str());
    }

    fn select_logged(&self, outline: &mut dyn OutlineStore, name: &str) {
        if let Err(error) = self.select(outline, name) {
            warn!(chapter = name, %error, "could not follow position into chapter");
        }
    }

    /// Runs a chapter command by name: `chapter-select-NAME`, `chapter-next` or `chapter-back`.
    ///
    /// # Errors
    ///
    /// [`ChapterError::UnknownCommand`] for anything that is not a registered command, and the
    /// errors of [`ChapterRegistry::select`].
    pub fn dispatch(&self, outline: &mut dyn OutlineStore, command: &str) -> Result<(), ChapterError> {
        match command {
            NEXT_COMMAND => self.cycle_next(outline),
            BACK_COMMAND => self.cycle_prev(outline),
            _ => {
                let registered = self.commands.borrow().contains_key(command);
                match command.strip_prefix("chapter-select-") {
                    Some(name) if registered => self.select_with(outline, name, true),
                    _ => Err(ChapterError::UnknownCommand(command.to_string())),
                }
            }
        }
    }

    #[must_use]
    /// True when the outline has any `@chapter` node at all.
    pub fn find_any_chapter_node(&self, outline: &dyn OutlineStore) -> bool {
        outline
            .all_unique_positions()
            .iter()
            .any(|p| outline.headline(p).and_then(parse_headline).is_some())
    }

    #[must_use]
    /// First `@chapter` node for `name` anywhere in the outline.
    pub fn find_chapter_node(&self, outline: &dyn OutlineStore, name: &str) -> Option<Position> {
        find_chapter_node(outline, name)
    }

    #[must_use]
    /// The chapter called `name`, if discovered.
    pub fn chapter(&self, name: &str) -> Option<Rc<Chapter>> {
        self.chapters.borrow().get(name).cloned()
    }

    #[must_use]
    /// Every chapter, in name order.
    pub fn chapters(&self) -> Vec<Rc<Chapter>> {
        self.chapters.borrow().values().cloned().collect()
    }

    #[must_use]
    /// Every chapter in the order discovery found them, `main` first.
    pub fn chapters_in_discovery_order(&self) -> Vec<Rc<Chapter>> {
        let chapters = self.chapters.borrow();
        self.order
            .borrow()
            .iter()
            .filter_map(|name| chapters.get(name).cloned())
            .collect()
    }

    #[must_use]
    /// Every chapter name, in lexicographic order.
    pub fn names(&self) -> Vec<ChapterName> {
        self.chapters.borrow().keys().cloned().collect()
    }

    #[must_use]
    /// Registered select commands with their key bindings.
    pub fn commands(&self) -> Vec<(String, Option<String>)> {
        self.commands
            .borrow()
            .iter()
            .map(|(command, binding)| (command.clone(), binding.clone()))
            .collect()
    }

    #[must_use]
    /// Name of the selected chapter. `None` means `main`.
    pub fn selected(&self) -> Option<ChapterName> {
        self.selected.borrow().clone()
    }

    #[must_use]
    /// The selected chapter, if any.
    pub fn selected_chapter(&self) -> Option<Rc<Chapter>> {
        let name = self.selected()?;
        self.chapter(name.as_str())
    }

    #[must_use]
    /// True when a chapter other than `main` is selected.
    pub fn in_chapter(&self) -> bool {
        self.selected().is_some_and(|name| !name.is_main())
    }

    #[must_use]
    /// True while a selection is in flight.
    pub fn is_locked(&self) -> bool {
        self.lockout.is_held()
    }

    #[must_use]
    /// True until [`ChapterRegistry::finish_create`] has run.
    pub fn is_initializing(&self) -> bool {
        self.initializing.get()
    }

    #[must_use]
    /// The configuration this registry was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn mark_selected(&self, name: &ChapterName) {
        *self.selected.borrow_mut() = Some(name.clone());
    }

    pub(crate) fn placeholder_headline(&self) -> &str {
        &self.config.placeholder_headline
    }
}

#[cfg(test)]
#[path = "tests/registry.rs"]
mod tests;
