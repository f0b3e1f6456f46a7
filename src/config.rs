//! Pipeline configuration.
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) gives the stock behavior. The CLI overlays its flags on
//! top of whatever the file says.
//!
//! ```toml
//! [notes]
//! sort_citations = true
//!
//! [resources]
//! fetch_bookmarks = true
//!
//! [resources.feed]
//! user = "someone"
//! secret = "0123abcd"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub notes: NotesConfig,
    pub resources: ResourcesConfig,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Check settings that only make sense together. Run again after
    /// overlaying command-line flags.
    pub fn validate(&self) -> Result<()> {
        let feed = &self.resources.feed;
        if feed.combined_count == 0 || feed.per_tag_count == 0 {
            return Err(Error::InvalidConfig(
                "feed counts must be at least 1".to_string(),
            ));
        }
        if feed.timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "resources.feed.timeout_ms must be at least 1".to_string(),
            ));
        }
        let schemes = [
            ("tag_scheme", &self.resources.tag_scheme),
            ("search_scheme", &self.resources.search_scheme),
            ("open_scheme", &self.resources.open_scheme),
        ];
        if let Some((key, _)) = schemes.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!("resources.{key} must not be empty")));
        }
        if self.resources.fetch_bookmarks && feed.user.is_empty() {
            return Err(Error::InvalidConfig(
                "fetch_bookmarks requires resources.feed.user".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotesConfig {
    /// Sort the References list by its rendered text, ignoring case.
    pub sort_citations: bool,
    /// Upper bound on waiting for the popover renderer, in milliseconds.
    pub popover_fallback_ms: u64,
}

impl NotesConfig {
    pub fn popover_fallback(&self) -> Duration {
        Duration::from_millis(self.popover_fallback_ms)
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            sort_citations: false,
            popover_fallback_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Build the "Additional Resources" panel.
    pub enabled: bool,
    /// Query the bookmark feed for the document's tags.
    pub fetch_bookmarks: bool,
    /// Prefix for per-tag links; the encoded tag is appended.
    pub tag_scheme: String,
    /// Prefix for the combined search link.
    pub search_scheme: String,
    /// Replacement prefix for local `file://…/Contents/Resources/` links.
    pub open_scheme: String,
    /// Tags never sent to external lookups.
    pub stoplist: Vec<String>,
    pub feed: FeedConfig,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fetch_bookmarks: false,
            tag_scheme: "ia-writer://quick-search?query=%23".to_string(),
            search_scheme: "x-devonthink://search?query=".to_string(),
            open_scheme: "ia-writer://open?path=/".to_string(),
            stoplist: crate::resources::DEFAULT_STOPLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            feed: FeedConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    pub user: String,
    pub secret: Option<String>,
    /// Where per-tag links on rendered bookmarks point.
    pub profile_base: String,
    pub combined_count: u32,
    pub per_tag_count: u32,
    pub timeout_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://feeds.pinboard.in/json/v1".to_string(),
            user: String::new(),
            secret: None,
            profile_base: "https://pinboard.in".to_string(),
            combined_count: 5,
            per_tag_count: 3,
            timeout_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.notes.sort_citations);
        assert_eq!(config.notes.popover_fallback(), Duration::from_secs(2));
        assert!(config.resources.stoplist.contains(&"cheatsheet".to_string()));
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [notes]
            sort_citations = true

            [resources.feed]
            user = "reader"
            per_tag_count = 7
            "#,
        )
        .unwrap();
        assert!(config.notes.sort_citations);
        assert_eq!(config.notes.popover_fallback_ms, 2000);
        assert_eq!(config.resources.feed.user, "reader");
        assert_eq!(config.resources.feed.per_tag_count, 7);
        assert_eq!(config.resources.feed.combined_count, 5);
    }

    #[test]
    fn test_fetch_without_user_is_rejected() {
        let err = Config::from_toml("[resources]\nfetch_bookmarks = true\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = Config::from_toml(
            "[resources]\nfetch_bookmarks = true\n[resources.feed]\nuser = \"a\"\ntimeout_ms = 0\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg.contains("timeout_ms")));
    }

    #[test]
    fn test_empty_scheme_is_rejected() {
        let err = Config::from_toml("[resources]\nsearch_scheme = \"\"\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg.contains("search_scheme")));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Config::from_toml("[notes\nsort_citations = 1"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("footcite.toml");
        std::fs::write(&path, "[notes]\npopover_fallback_ms = 50\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.notes.popover_fallback(), Duration::from_millis(50));
    }
}
