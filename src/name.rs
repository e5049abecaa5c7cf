//! Chapter names and the `@chapter` headline syntax.
//!
//! This is the only place that interprets the document-format syntax for chapter markers. A
//! marker node's headline looks like `@chapter NAME` optionally followed by `@key=BINDING`, and
//! the name is sanitised into a safe identifier before it becomes a [`ChapterName`].

use std::borrow::Borrow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Longest chapter name kept after sanitising.
pub const MAX_NAME_LEN: usize = 128;

static CHAPTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    // name = group 1 (everything up to the next '@'), binding = group 3
    Regex::new(r"^@chapter\s+([^@]+)\s*(@key\s*=\s*(.+)\s*)?")
        .expect("chapter headline pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
/// Immutable key of a chapter.
///
/// Once a chapter exists its name never changes, even if the marker node that introduced it is
/// renamed, moved or deleted.
pub struct ChapterName(String);

impl ChapterName {
    /// Name of the unscoped whole-document chapter.
    pub const MAIN: &'static str = "main";

    #[must_use]
    /// The distinguished `main` chapter name.
    pub fn main() -> Self {
        Self(Self::MAIN.to_string())
    }

    #[must_use]
    /// Sanitises `raw` into a chapter name, or `None` if nothing usable remains.
    pub fn new(raw: &str) -> Option<Self> {
        let name = sanitize(raw);
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    #[must_use]
    /// True for the `main` chapter.
    pub fn is_main(&self) -> bool {
        self.0 == Self::MAIN
    }

    #[must_use]
    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChapterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ChapterName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ChapterName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ChapterName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ChapterName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[must_use]
/// Parses a headline into its chapter name and optional key binding.
///
/// Returns `None` when the headline is not a chapter marker or when the name sanitises to
/// nothing.
pub fn parse_headline(text: &str) -> Option<(ChapterName, Option<String>)> {
    let caps = CHAPTER_RE.captures(text)?;
    let name = ChapterName::new(caps.get(1)?.as_str())?;
    let binding = caps
        .get(3)
        .map(|m| m.as_str().trim().to_string())
        .filter(|b| !b.is_empty());
    Some((name, binding))
}

#[must_use]
/// True when `text` begins with the word `@chapter`.
pub fn is_chapter_marker(text: &str) -> bool {
    text.strip_prefix("@chapter")
        .is_some_and(|rest| rest.chars().next().is_none_or(|c| !c.is_alphanumeric() && c != '_'))
}

#[must_use]
/// Converts `raw` into a safe chapter identifier.
///
/// ASCII letters and digits are kept, spaces and tabs become `-` and everything else is dropped.
/// Each `--` is then replaced by `-` in a single pass, so three spaces still leave `--`. The
/// result is truncated to [`MAX_NAME_LEN`] characters.
pub fn sanitize(raw: &str) -> String {
    let kept: String = raw
        .trim()
        .chars()
        .filter_map(|ch| match ch {
            ' ' | '\t' => Some('-'),
            ch if ch.is_ascii_alphanumeric() => Some(ch),
            _ => None,
        })
        .collect();
    let mut out = kept.replace("--", "-");
    out.truncate(MAX_NAME_LEN);
    out
}

#[must_use]
/// Name of the command that selects `name`.
pub fn command_name(name: &ChapterName) -> String {
    format!("chapter-select-{name}")
}

#[cfg(test)]
#[path = "tests/name.rs"]
mod tests;
