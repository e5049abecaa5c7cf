//! Shared outlines for unit tests.

use crate::outline::{Outline, Position};

/// A small outline with two chapters and some plain nodes.
///
/// ```text
/// Intro                          [0]
///     Intro child                [0, 0]
/// @chapters                      [1]
///     @chapter Design            [1, 0]
///         Architecture           [1, 0, 0]
///         Modules                [1, 0, 1]
///     @chapter Tests @key=Ctrl-2 [1, 1]
///         Unit                   [1, 1, 0]
/// Plain Node                     [2]
/// ```
pub(crate) struct Book {
    pub outline: Outline,
    pub intro: Position,
    pub design: Position,
    pub architecture: Position,
    pub modules: Position,
    pub tests: Position,
    pub unit: Position,
    pub plain: Position,
}

pub(crate) fn book() -> Book {
    let mut outline = Outline::new();
    let intro = outline.add_top_level("Intro");
    outline.add_child(&intro, "Intro child").unwrap();
    let chapters = outline.add_top_level("@chapters");
    let design = outline.add_child(&chapters, "@chapter Design").unwrap();
    let architecture = outline.add_child(&design, "Architecture").unwrap();
    let modules = outline.add_child(&design, "Modules").unwrap();
    let tests = outline
        .add_child(&chapters, "@chapter Tests @key=Ctrl-2")
        .unwrap();
    let unit = outline.add_child(&tests, "Unit").unwrap();
    let plain = outline.add_top_level("Plain Node");
    Book {
        outline,
        intro,
        design,
        architecture,
        modules,
        tests,
        unit,
        plain,
    }
}
