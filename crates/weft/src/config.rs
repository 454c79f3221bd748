//! Configuration file support for weft.
//!
//! Configuration lives in a `weft.toml` file:
//! - `[trace]` - trace record output
//! - `[advisor]` - which methods the trace advisor applies to
//! - `[app]` - demo application behavior
//!
//! Every section has working defaults; a missing file means defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The default config file name.
pub const CONFIG_FILE: &str = "weft.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// Trace record output settings.
    pub trace: TraceConfig,
    /// Advisor/pointcut settings.
    pub advisor: AdvisorConfig,
    /// Demo application settings.
    pub app: AppConfig,
}

/// Trace output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Whether the trace advisor is registered at all.
    pub enabled: bool,
    /// Optional JSONL file for trace records. When unset, records go to the
    /// process log.
    pub output: Option<PathBuf>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: None,
        }
    }
}

/// Advisor configuration: which methods get the trace advisor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Method-name globs for the name-match pointcut.
    pub mapped_names: Vec<String>,
    /// Optional `execution(..)` expression; takes precedence over
    /// `mapped_names` when set.
    pub expression: Option<String>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            mapped_names: vec![
                "request*".to_string(),
                "order*".to_string(),
                "save*".to_string(),
            ],
            expression: None,
        }
    }
}

/// Demo application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Simulated repository latency in milliseconds.
    pub delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { delay_ms: 1000 }
    }
}

impl Config {
    /// Load configuration from a specific file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load from an explicit path, from `weft.toml` in the current
    /// directory, or fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
