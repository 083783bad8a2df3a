//! Tool configuration loaded from `mill.toml`.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Startup configuration for the mill binary.
///
/// All fields have defaults so a missing or partial `mill.toml` is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MillConfig {
    /// Echo each command to the log before executing it.
    pub echo: bool,
    /// Prompt string for the interactive loop.
    pub prompt: String,
    /// Stop a script at the first failed command.
    pub abort_on_error: bool,
}

impl Default for MillConfig {
    fn default() -> Self {
        Self {
            echo: false,
            prompt: "mill> ".to_string(),
            abort_on_error: true,
        }
    }
}

impl MillConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load `mill.toml` from `dir`, falling back to defaults when the file
    /// does not exist. A file that exists but fails to parse is an error.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join("mill.toml");
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&text)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
