//! Site configuration
//!
//! Everything here has a default matching the EcoConsciência pages, so an
//! empty TOML file is a valid configuration.

use std::path::Path;

use eco_dom::SelectorList;
use serde::{Deserialize, Serialize};

/// Site-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Title used when a fetched page has none
    pub default_title: String,
    /// Primary content region selectors, most preferred first
    pub content_regions: Vec<String>,
    /// Query parameter that defeats caches on content fetches
    pub cache_bust_param: String,
    /// Local storage key of the theme preference
    pub theme_storage_key: String,
    /// Class marking dark mode on `<body>`
    pub dark_class: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_title: "EcoConsciência".to_string(),
            content_regions: vec!["#app-content".to_string(), ".main-content".to_string()],
            cache_bust_param: "_".to_string(),
            theme_storage_key: "theme".to_string(),
            dark_class: "dark-mode".to_string(),
        }
    }
}

impl SiteConfig {
    /// Parse and validate TOML
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&source)
    }

    /// Check values that would otherwise only fail at use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_regions.is_empty() {
            return Err(ConfigError::Invalid("content_regions must not be empty".into()));
        }
        self.region_selectors()?;
        for (name, value) in [
            ("cache_bust_param", &self.cache_bust_param),
            ("theme_storage_key", &self.theme_storage_key),
            ("dark_class", &self.dark_class),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    /// Parsed content region selectors, in preference order
    pub fn region_selectors(&self) -> Result<Vec<SelectorList>, ConfigError> {
        self.content_regions
            .iter()
            .map(|s| SelectorList::parse(s).map_err(|e| ConfigError::Invalid(e.to_string())))
            .collect()
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
