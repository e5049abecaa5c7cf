//! Building an outline from a heading-structured document.
//!
//! Each heading becomes a node, nested under the closest preceding heading of a lower level. A
//! heading such as `## @chapter Design` therefore becomes a chapter marker whose subheadings are
//! the chapter's contents.

use crate::error::ImportError;
use crate::formats::markdown::MarkdownFormat;
use crate::formats::Format;
use crate::outline::{Outline, OutlineStore, Position};
use std::fs;
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tracing::debug;
use tree_sitter::{Parser, Query, QueryCursor};

/// Parses `source` with `format` and returns its headings as an outline.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded, the heading query does not compile, or the
/// parser gives up.
pub fn outline_from_source(source: &str, format: &dyn Format) -> Result<Outline, ImportError> {
    let language = format.language();
    let mut parser = Parser::new();
    parser.set_language(&language)?;
    let tree = parser.parse(source, None).ok_or(ImportError::Parse)?;
    let query = Query::new(&language, format.section_query())?;

    let mut outline = Outline::new();
    // Open headings, innermost last.
    let mut open: Vec<(usize, Position)> = Vec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let heading = capture.node;
            let Some(level) = format.heading_level(&heading) else {
                continue;
            };
            let mut walker = heading.walk();
            let title = heading
                .children(&mut walker)
                .find(|child| child.kind() == format.title_kind())
                .and_then(|node| node.utf8_text(source.as_bytes()).ok())
                .map(str::trim)
                .unwrap_or_default();

            while open.last().is_some_and(|(open_level, _)| *open_level >= level) {
                open.pop();
            }
            let position = match open.last() {
                Some((_, parent)) => outline.add_child(parent, title),
                None => Some(outline.add_top_level(title)),
            };
            if let Some(position) = position {
                open.push((level, position));
            }
        }
    }
    debug!(nodes = outline.all_positions().len(), "outline imported");
    Ok(outline)
}

/// Reads a markdown file into an outline.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn outline_from_path(path: &Path) -> Result<Outline, ImportError> {
    let source = fs::read_to_string(path).map_err(|error| ImportError::Io {
        path: path.display().to_string(),
        error,
    })?;
    outline_from_source(&source, &MarkdownFormat)
}

#[cfg(test)]
#[path = "tests/import.rs"]
mod tests;
