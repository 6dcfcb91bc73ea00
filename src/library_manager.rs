//! # Tables Manager Module
//!
//! ## Purpose
//! Provides centralized management of the JSON table files used by the details parser
//! and the name standardizer. No table path is hardcoded elsewhere in the crate, and a
//! curated table can be switched to another version without touching code.
//!
//! ## Architecture
//! - **TablesConfig**: Serializable configuration structure (file paths + parser tunables)
//! - **TablesManager**: Core manager reading the configuration file
//! - **Global Access**: Thread-safe singleton pattern
//! - **Configuration File**: JSON-based persistent storage (crystal_tables.json)
//!
//! ## Configuration Format
//! ```json
//! {
//!   "compound_dictionary": "compound_dictionary.json",
//!   "mixtures": "mixture_compounds.json",
//!   "stop_words": "stop_words.json",
//!   "sensitive_replacements": "replacement_sensitive.json",
//!   "lowercase_replacements": "replacement_lowercase.json",
//!   "unknown_list": "unknown_list.json",
//!   "error_list": "error_list.json",
//!   "parser": { "numbered_compounds": ["jeffamine", "propoxylate"] }
//! }
//! ```
//!
//! ## Usage
//! ```rust
//! use crystal_details::library_manager::with_tables_manager;
//!
//! let path = with_tables_manager(|manager| {
//!     manager.get_config().compound_dictionary.clone()
//! });
//! ```

use crate::Crystallization::parser_config::ParserConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

pub const DEFAULT_CONFIG_FILE: &str = "crystal_tables.json";

/// Configuration structure for the table files.
///
/// # Fields
/// * `compound_dictionary` - canonical key -> canonical compound name
/// * `mixtures` - mixture name -> constituent fractions
/// * `stop_words` - domain stop words merged with the English list
/// * `sensitive_replacements` - ordered substitutions applied before lowercasing
/// * `lowercase_replacements` - ordered substitutions applied after lowercasing
/// * `unknown_list` - compounds curated as unknown
/// * `error_list` - compounds curated as parsing errors
/// * `parser` - tunables of the details parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablesConfig {
    pub compound_dictionary: String,
    pub mixtures: String,
    pub stop_words: String,
    pub sensitive_replacements: String,
    pub lowercase_replacements: String,
    pub unknown_list: String,
    pub error_list: String,
    #[serde(default)]
    pub parser: ParserConfig,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            compound_dictionary: "compound_dictionary.json".to_string(),
            mixtures: "mixture_compounds.json".to_string(),
            stop_words: "stop_words.json".to_string(),
            sensitive_replacements: "replacement_sensitive.json".to_string(),
            lowercase_replacements: "replacement_lowercase.json".to_string(),
            unknown_list: "unknown_list.json".to_string(),
            error_list: "error_list.json".to_string(),
            parser: ParserConfig::default(),
        }
    }
}

/// Core manager of the table file paths.
///
/// # Fields
/// * `config` - Current tables configuration
/// * `config_file` - Path to the configuration file it was read from
#[derive(Debug, Clone)]
pub struct TablesManager {
    config: TablesConfig,
    config_file: String,
}

impl Default for TablesManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TablesManager {
    /// Loads "crystal_tables.json" from the current directory, or falls back to defaults
    pub fn new() -> Self {
        Self::with_config_file(DEFAULT_CONFIG_FILE)
    }

    /// Creates a manager backed by a custom configuration file. An unreadable file gives
    /// the default configuration.
    pub fn with_config_file(config_file: &str) -> Self {
        let config = Self::load_config(config_file).unwrap_or_default();

        Self {
            config,
            config_file: config_file.to_string(),
        }
    }

    /// Reads the configuration; a missing file gives the default configuration
    fn load_config(config_file: &str) -> Result<TablesConfig, Box<dyn std::error::Error>> {
        if Path::new(config_file).exists() {
            let content = fs::read_to_string(config_file)?;
            let config: TablesConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(TablesConfig::default())
        }
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    pub fn get_config(&self) -> &TablesConfig {
        &self.config
    }
}

/// Global singleton instance of TablesManager
static GLOBAL_TABLES_MANAGER: OnceLock<Mutex<TablesManager>> = OnceLock::new();

/// Returns a mutex guard to the global TablesManager instance.
/// A poisoned mutex is recovered: the manager only holds paths, so its state stays usable
pub fn get_tables_manager() -> std::sync::MutexGuard<'static, TablesManager> {
    GLOBAL_TABLES_MANAGER
        .get_or_init(|| Mutex::new(TablesManager::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Executes a closure with read-only access to the TablesManager.
pub fn with_tables_manager<F, R>(f: F) -> R
where
    F: FnOnce(&TablesManager) -> R,
{
    let manager = get_tables_manager();
    f(&manager)
}
