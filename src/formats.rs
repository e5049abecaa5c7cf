//! Format trait and implementations for different document types.
//!
//! A format tells the importer how to find headings in a document with tree-sitter and how deep
//! each heading sits, which is all that is needed to rebuild the document as an outline.

pub mod markdown;

/// Tree-sitter description of a heading-structured document format.
pub trait Format {
    /// Grammar used to parse documents of this format.
    fn language(&self) -> tree_sitter::Language;
    /// Query capturing every heading node.
    fn section_query(&self) -> &str;
    /// Kind of the heading child holding its text.
    fn title_kind(&self) -> &str;
    /// Nesting level of a heading node, 1 for the outermost.
    fn heading_level(&self, heading: &tree_sitter::Node<'_>) -> Option<usize>;
}
