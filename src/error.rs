//! Errors surfaced to the user by chapter commands.
//!
//! Only the expected, recoverable failures are represented here. A selection attempted while
//! another is in flight, or an unselect that cannot find its hoist entry, are degraded paths that
//! are logged and otherwise ignored.

use crate::name::ChapterName;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure of a chapter command. State is unchanged whenever one of these is returned.
pub enum ChapterError {
    /// No chapter with this name has been discovered.
    #[error("no such chapter: {0}")]
    NotFound(String),

    /// The chapter exists but its `@chapter` node cannot be found in the outline.
    #[error("no @chapter node for chapter: {0}")]
    NoRoot(ChapterName),

    /// The command dispatcher does not know this command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

#[derive(Debug, Error)]
/// Failure to build an outline from a document.
pub enum ImportError {
    /// The document could not be read.
    #[error("I/O error reading {path}: {error}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// The underlying I/O error.
        error: std::io::Error,
    },

    /// The tree-sitter grammar could not be loaded.
    #[error("incompatible tree-sitter grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// A heading query failed to compile.
    #[error("invalid heading query: {0}")]
    Query(#[from] tree_sitter::QueryError),

    /// The parser produced no tree.
    #[error("document could not be parsed")]
    Parse,
}
