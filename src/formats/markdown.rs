//! Markdown format implementation using tree-sitter-md.
//!
//! Only ATX-style headings (# syntax) are recognised. The number of `#` gives the nesting level.

use crate::formats::Format;

/// Tree-sitter queries for ATX-style markdown headings (# syntax).
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_md::LANGUAGE.into()
    }

    fn section_query(&self) -> &'static str {
        "(atx_heading) @heading"
    }

    fn title_kind(&self) -> &'static str {
        "inline"
    }

    fn heading_level(&self, heading: &tree_sitter::Node<'_>) -> Option<usize> {
        let mut cursor = heading.walk();
        let level = heading
            .children(&mut cursor)
            .find_map(|child| match child.kind() {
                "atx_h1_marker" => Some(1),
                "atx_h2_marker" => Some(2),
                "atx_h3_marker" => Some(3),
                "atx_h4_marker" => Some(4),
                "atx_h5_marker" => Some(5),
                "atx_h6_marker" => Some(6),
                _ => None,
            });
        level
    }
}
