use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::batch::OutputOptions;
use crate::error::ConfigError;
use crate::scan::{DEFAULT_STOP_WORDS, KeywordGate};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmfixConfig {
    #[serde(default)]
    pub rewrite: RewriteConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Default pairs for `replace`, applied in file order.
    #[serde(default)]
    pub renames: Vec<RenamePair>,
}

/// One `[[renames]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePair {
    pub from: String,
    #[serde(default)]
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteConfig {
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_replacement")]
    pub replacement: String,
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            replacement: default_replacement(),
            stop_words: default_stop_words(),
        }
    }
}

impl RewriteConfig {
    #[must_use]
    pub fn gate(&self) -> KeywordGate {
        KeywordGate {
            target: self.target.clone(),
            replacement: self.replacement.clone(),
            stop_words: self.stop_words.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub strip_cr_entities: bool,
}

impl From<OutputConfig> for OutputOptions {
    fn from(config: OutputConfig) -> Self {
        Self {
            strip_cr_entities: config.strip_cr_entities,
        }
    }
}

impl GmfixConfig {
    /// Rename pairs in application order.
    #[must_use]
    pub fn rename_pairs(&self) -> Vec<(String, String)> {
        self.renames
            .iter()
            .map(|pair| (pair.from.clone(), pair.to.clone()))
            .collect()
    }
}

/// `<config_dir>/gmfix/config.toml`, when the platform has a config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gmfix/config.toml"))
}

/// Load configuration from `explicit`, or from [`default_config_path`].
///
/// A missing default file yields defaults; a missing explicit file is an error.
///
/// # Errors
///
/// [`ConfigError::Read`] when the file cannot be read, [`ConfigError::Parse`]
/// when it is not valid TOML for [`GmfixConfig`].
pub fn load_config(explicit: Option<&Path>) -> Result<GmfixConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(GmfixConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}

fn default_target() -> String {
    "break".to_string()
}

fn default_replacement() -> String {
    "exit".to_string()
}

fn default_stop_words() -> Vec<String> {
    DEFAULT_STOP_WORDS.map(String::from).to_vec()
}
