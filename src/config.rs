use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub catalogs: Vec<CatalogSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Search endpoint; `{query}` is replaced with the encoded `first+last` query
    pub search_url: String,
    /// Profile endpoint; `{unix_id}` is replaced with the resolved identifier
    pub profile_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Selector for the mailto link next to each listing's phone field
    #[serde(default = "default_search_selector")]
    pub search_selector: String,
    /// Selector for the education subsection of a profile page
    #[serde(default = "default_education_selector")]
    pub education_selector: String,
}

/// Tunables for the document cleaning pass. Layouts vary by source year, so
/// neither value is a universal constant.
#[derive(Debug, Clone, Deserialize)]
pub struct CleaningConfig {
    /// Trimmed lines at or below this length are dropped (blanks, page numbers)
    #[serde(default = "default_short_line_threshold")]
    pub short_line_threshold: usize,
    /// Window for the split-line rejoin heuristic; `None` disables the pass
    #[serde(default)]
    pub rejoin_window: Option<usize>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            short_line_threshold: default_short_line_threshold(),
            rejoin_window: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    /// Assumed age at undergraduate completion. A modeling assumption, so the
    /// resulting ages are estimates, not measurements.
    #[serde(default = "default_assumed_graduation_age")]
    pub assumed_graduation_age: i32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            assumed_graduation_age: default_assumed_graduation_age(),
        }
    }
}

/// One academic-year catalog to harvest.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSource {
    /// Academic-year label, e.g. "2015-16"
    pub label: String,
    /// Path to the text file produced by PDF extraction
    pub path: String,
    /// Section header token that marks the start of the faculty listing
    pub anchor: String,
    /// Calendar year the age estimate is relative to
    pub reference_year: i32,
    /// Another year's catalog to mine for degree lines before going online
    #[serde(default)]
    pub secondary_path: Option<String>,
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_search_selector() -> String {
    "td.phone + td a[href^='mailto:']".to_string()
}

fn default_education_selector() -> String {
    "div.education".to_string()
}

fn default_short_line_threshold() -> usize {
    4
}

fn default_assumed_graduation_age() -> i32 {
    22
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let mut config: Config = toml::from_str(&content)?;

        // Endpoint overrides for testing against a local fixture server
        if let Ok(url) = std::env::var("DIRECTORY_SEARCH_URL") {
            config.directory.search_url = url;
        }
        if let Ok(url) = std::env::var("DIRECTORY_PROFILE_URL") {
            config.directory.profile_url = url;
        }

        Ok(config)
    }
}
