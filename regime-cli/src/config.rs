//! Optional TOML configuration file.
//!
//! ```toml
//! [engine]
//! municipal_tax = "excluded"
//!
//! [engine.simplified]
//! revenue_cap = "4800000"
//!
//! [logging]
//! level = "debug"
//! file = "regime.log"
//! ```
//!
//! Every table and key is optional; missing values keep their defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regime_core::EngineConfig;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level or full filter directive; `RUST_LOG` overrides it.
    pub level: String,
    pub file: Option<PathBuf>,
    /// Force colours on or off; detected from the terminal when unset.
    pub ansi: Option<bool>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            ansi: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid configuration file")?;
        config
            .engine
            .validate()
            .context("invalid engine configuration")?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("in config file {}", path.display()))
    }
}
