//! Layered configuration loader
//!
//! ## Priority (highest first)
//!
//! 1. Process environment (`GOOGLE_API_KEY`, `GEMINI_API_KEY`, `UNCOMMIT_MODEL`)
//! 2. `.env.local` in the working directory (never overrides existing vars)
//! 3. `<config_dir>/uncommit/config.toml`, `[default]` section
//! 4. Built-in defaults

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Primary credential variable
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Secondary credential variable, checked when the primary one is unset
pub const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Model override variable
pub const MODEL_ENV: &str = "UNCOMMIT_MODEL";

/// Local override file loaded from the working directory
pub const LOCAL_ENV_FILE: &str = ".env.local";

const CONFIG_DIR_NAME: &str = "uncommit";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Model used for suggestions
    pub model: String,

    /// Credential for the suggestion service
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

/// On-disk layout of `config.toml`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    default: FileSection,
}

#[derive(Debug, Default, Deserialize)]
struct FileSection {
    model: Option<String>,
    api_key: Option<String>,
}

impl Config {
    /// Path of the user config file.
    ///
    /// `$XDG_CONFIG_HOME` wins when set, otherwise the platform config dir.
    pub fn config_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::config_dir)?;
        Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from every layer, using the current directory for `.env.local`
    pub fn load() -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            load_local_env(&cwd);
        }
        let path = Self::config_path();
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load from an explicit config file and environment lookup
    pub fn load_from(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = path {
            match read_config_file(path) {
                Ok(Some(file)) => config.merge_file(file.default),
                Ok(None) => {}
                // A broken config file falls back to defaults
                Err(e) => debug!("Ignoring config file {}: {}", path.display(), e),
            }
        }

        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = lookup(API_KEY_ENV).or_else(|| lookup(FALLBACK_API_KEY_ENV)) {
            config.api_key = Some(key);
        }
        if let Some(model) = lookup(MODEL_ENV) {
            config.model = model;
        }

        config
    }

    /// Apply a CLI model override
    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    fn merge_file(&mut self, section: FileSection) {
        if let Some(model) = section.model.filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
        if let Some(key) = section.api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }
}

fn read_config_file(path: &Path) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Load `.env.local` from `dir` into the process environment.
///
/// Existing variables are kept. Any error is ignored.
pub fn load_local_env(dir: &Path) {
    let path = dir.join(LOCAL_ENV_FILE);
    if !path.is_file() {
        return;
    }
    match dotenvy::from_path(&path) {
        Ok(()) => debug!("Loaded {}", path.display()),
        Err(e) => debug!("Ignoring {}: {}", path.display(), e),
    }
}
