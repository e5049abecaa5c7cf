//! Configuration to acknowledge user preferences as well as set defaults.
//!
//! We try to find a chapters.toml in the working directory, and if present we load settings from
//! there. Anything missing or unreadable falls back to the defaults.

use facet::Facet;
use std::fs;
use tracing::warn;

/// File looked up in the working directory.
pub const CONFIG_FILE: &str = "chapters.toml";

#[derive(Facet, Clone, Debug)]
/// User preferences loaded from chapters.toml or falling back to defaults.
pub struct Config {
    #[facet(default = true)]
    /// Ask the presentation layer to collapse sibling subtrees when entering `main`.
    pub collapse_on_enter_main: bool,
    #[facet(default = "New Headline".to_string())]
    /// Headline of the child created under an empty `@chapter` node.
    pub placeholder_headline: String,
    #[facet(default = "warn".to_string())]
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    #[facet(default = vec!["md".to_string()])]
    /// File suffixes accepted as outline documents.
    pub file_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collapse_on_enter_main: true,
            placeholder_headline: "New Headline".to_string(),
            log_filter: "warn".to_string(),
            file_extensions: vec!["md".to_string()],
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from chapters.toml if present.
    pub fn load() -> Self {
        match fs::read_to_string(CONFIG_FILE) {
            Ok(contents) => Self::from_toml(&contents),
            Err(_) => Self::default(),
        }
    }

    #[must_use]
    /// Parse configuration text, keeping defaults for anything it leaves out.
    pub fn from_toml(contents: &str) -> Self {
        match facet_toml::from_str::<Self>(contents) {
            Ok(config) => config,
            Err(error) => {
                warn!(file = CONFIG_FILE, %error, "ignoring unreadable configuration");
                Self::default()
            }
        }
    }
}
