//! Rune transition configuration
//!
//! This crate loads the defaults used by the transition engine from
//! `rune-transitions.toml`, with environment variables taking precedence.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "rune-transitions.toml";

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TransitionConfig {
    /// Instance defaults that decide whether transitions fire
    pub transitions: TransitionsSection,
    /// Frame driver settings
    pub driver: DriverConfig,
    /// Diagnostic output settings
    pub diagnostics: DiagnosticsConfig,
}

/// Defaults applied to instances that do not declare their own settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransitionsSection {
    /// Master switch for intro/outro transitions
    pub enabled: bool,
    /// Skip intros during an instance's first render
    pub no_intro: bool,
    /// Skip outros while an instance is torn down
    pub no_outro: bool,
    /// Let transitions fire while an ancestor is transitioning the same way
    pub nested: bool,
}

/// Frame driver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    /// Milliseconds advanced per frame tick; must be finite and positive
    pub frame_ms: f64,
}

/// Diagnostics configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Emit each distinct warning only once
    pub warn_once: bool,
}

impl Default for TransitionsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            no_intro: false,
            no_outro: false,
            nested: true,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { frame_ms: 16.0 }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { warn_once: true }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl TransitionConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `rune-transitions.toml` in the current
    /// directory, or return the defaults if it is missing or invalid
    pub fn load_or_default() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary key lookup
    pub fn merge_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("RUNE_TRANSITIONS_ENABLED") {
            self.transitions.enabled = parse_flag(&val);
        }
        if let Some(val) = lookup("RUNE_NO_INTRO") {
            self.transitions.no_intro = parse_flag(&val);
        }
        if let Some(val) = lookup("RUNE_NO_OUTRO") {
            self.transitions.no_outro = parse_flag(&val);
        }
        if let Some(val) = lookup("RUNE_NESTED_TRANSITIONS") {
            self.transitions.nested = parse_flag(&val);
        }

        if let Some(val) = lookup("RUNE_FRAME_MS") {
            match val.parse::<f64>() {
                Ok(frame_ms) if frame_ms.is_finite() && frame_ms > 0.0 => {
                    self.driver.frame_ms = frame_ms;
                }
                _ => {}
            }
        }

        if let Some(val) = lookup("RUNE_WARN_ONCE") {
            self.diagnostics.warn_once = parse_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune-transitions.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
