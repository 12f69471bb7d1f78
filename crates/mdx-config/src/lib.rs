//! Configuration management for mdx.
//!
//! Parses `mdx.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [extensions]
//! attr_list = true
//!
//! [crossref]
//! enable_ref_group = true
//! fig_prefix = ["Figure", "Figures"]
//! remove_ref_types = ["sec"]
//! ```
//!
//! Malformed values (a number where a delimiter is expected, an unknown
//! reference type, a prefix list that is not `[singular, plural]`) are
//! rejected while loading, so a pipeline is never built from invalid options.

mod crossref;

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use crossref::{CrossRefConfig, PrefixPair, RefType};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdx.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which document passes are registered with the pipeline.
    pub extensions: ExtensionsConfig,
    /// Cross-reference rendering options.
    pub crossref: CrossRefConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Extension toggles.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Resolve `[@type:tag]` cross-references.
    pub crossref: bool,
    /// Attach `Table: ...` paragraphs to adjacent tables.
    pub table_captions: bool,
    /// Register the attribute-list capability (`{#id .class key=value}`).
    pub attr_list: bool,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            crossref: true,
            table_captions: true,
            attr_list: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error, including values of the wrong kind.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdx.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for invalid TOML or values of the wrong kind.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }
}
