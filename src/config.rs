use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::io::ExportOptions;
use crate::suggest::SuggestOptions;
use crate::trie::TrieOptions;

pub const LOCAL_CONFIG_FILE: &str = ".spelltrie.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dictionary used when none is given on the command line.
    pub dictionary: Option<PathBuf>,
    pub ignore_patterns: Vec<String>,
    pub case_sensitive: bool,
    pub trie: TrieOptions,
    pub suggest: SuggestOptions,
    pub export: ExportOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: None,
            ignore_patterns: vec![
                r"\b[A-Z0-9_]{2,}\b".to_string(),    // ALL_CAPS
                r"https?://\S+".to_string(),         // URLs
                r"\b[a-fA-F0-9]{32,}\b".to_string(), // Hashes
                r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}".to_string(), // Emails
            ],
            case_sensitive: false,
            trie: TrieOptions::default(),
            suggest: SuggestOptions::default(),
            export: ExportOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(dictionary: Option<PathBuf>, cli_patterns: Vec<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                log::debug!("loading config from {}", global_path.display());
                config = config.merge(Self::from_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            log::debug!("loading config from {}", local_path.display());
            config = config.merge(Self::from_file(&local_path)?);
        }

        if dictionary.is_some() {
            config.dictionary = dictionary;
        }
        config.ignore_patterns.extend(cli_patterns);

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Values in `other` that differ from the defaults win.
    pub fn merge(mut self, other: Self) -> Self {
        let defaults = Self::default();
        if other.dictionary.is_some() {
            self.dictionary = other.dictionary;
        }
        if other.ignore_patterns != defaults.ignore_patterns {
            self.ignore_patterns = other.ignore_patterns;
        }
        if other.trie != defaults.trie {
            self.trie = other.trie;
        }
        if other.suggest != defaults.suggest {
            self.suggest = other.suggest;
        }
        if other.export != defaults.export {
            self.export = other.export;
        }
        self.case_sensitive = other.case_sensitive;
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spelltrie").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Where dictionaries are looked up by bare name.
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spelltrie").map(|dirs| dirs.data_dir().to_path_buf())
    }
}
