//! outline-chapters: named, hoisted views over a shared outline.
//!
//! Any node whose headline starts with `@chapter NAME` defines a chapter. Selecting a chapter
//! hoists the outline to that node and restores where the user last was inside it, so one large
//! document can be worked on as several smaller ones. The implicit `main` chapter is the whole
//! outline.
//!
//! The [`ChapterRegistry`] owns the chapters of one document and is driven through
//! [`OutlineStore`], which the host outline implements. [`Outline`] is a self-contained store,
//! and [`import`] builds one from a markdown file.
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::module_name_repetitions)]

pub mod chapter;
pub mod config;
pub mod error;
pub mod event;
pub mod formats;
pub mod import;
pub mod lockout;
pub mod name;
pub mod outline;
pub mod registry;
pub mod report;

pub use chapter::{Chapter, EditorRef};
pub use error::{ChapterError, ImportError};
pub use event::ChapterEvent;
pub use name::ChapterName;
pub use outline::{HoistEntry, NodeId, Outline, OutlineStore, Position};
pub use registry::ChapterRegistry;
pub use report::ChapterReport;

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;
