use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::NullPolicy;
use crate::snippet::SnippetLanguage;

/// Settings file read at startup when `RUSTY_FRAMES_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "rusty_frames.json";

/// Application settings, read from an optional JSON file.
///
/// ```json
/// {
///   "storage_dir": "saved_tables",
///   "null_policy": "zero",
///   "snippet_language": "python",
///   "preview_rows": 100
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory every saved table is written to.
    pub storage_dir: PathBuf,
    /// Policy selected when the app starts.
    pub null_policy: NullPolicy,
    pub snippet_language: SnippetLanguage,
    /// Rows shown in the preview window.
    pub preview_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("saved_tables"),
            null_policy: NullPolicy::Drop,
            snippet_language: SnippetLanguage::Rust,
            preview_rows: 50,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing settings file {}", path.display()))
    }

    /// Settings file from `RUSTY_FRAMES_CONFIG`, then
    /// `RUSTY_FRAMES_STORAGE_DIR` overriding the storage directory.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os("RUSTY_FRAMES_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut settings = Self::load(&path)?;
        if let Some(dir) = std::env::var_os("RUSTY_FRAMES_STORAGE_DIR") {
            settings.storage_dir = PathBuf::from(dir);
        }
        Ok(settings)
    }
}
