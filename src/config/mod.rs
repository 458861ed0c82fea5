// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for the padseq host.
//!
//! Settings live in a small TOML file. Every field has a default, and
//! out-of-range tempo or pattern length values are clamped when applied
//! rather than rejected.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sequencer::{clamp_pattern_length, DEFAULT_PATTERN_LENGTH};
use crate::timing::{clamp_tempo, DEFAULT_TEMPO};

/// Engine and host settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequencerConfig {
    /// Tempo in BPM (1 - 999)
    #[serde(default = "default_tempo")]
    pub tempo: u32,
    /// Pattern length in steps (1 - 16)
    #[serde(default = "default_pattern_length")]
    pub pattern_length: usize,
    /// Directory scanned for kit YAML files
    #[serde(default = "default_kits_dir")]
    pub kits_dir: PathBuf,
    /// Kit selected at startup (falls back to the first kit)
    #[serde(default)]
    pub default_kit: Option<String>,
    /// Reload kit files when they change on disk
    #[serde(default)]
    pub watch_kits: bool,
    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_tempo() -> u32 {
    DEFAULT_TEMPO
}
fn default_pattern_length() -> usize {
    DEFAULT_PATTERN_LENGTH
}
fn default_kits_dir() -> PathBuf {
    PathBuf::from("kits")
}
fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            tempo: default_tempo(),
            pattern_length: default_pattern_length(),
            kits_dir: default_kits_dir(),
            default_kit: None,
            watch_kits: false,
            log_filter: default_log_filter(),
        }
    }
}

impl SequencerConfig {
    /// Load a configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_toml(&contents)
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = self.to_toml()?;
        fs::write(path.as_ref(), text)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Tempo clamped to the accepted range
    pub fn effective_tempo(&self) -> u32 {
        clamp_tempo(self.tempo)
    }

    /// Pattern length clamped to the accepted range
    pub fn effective_pattern_length(&self) -> usize {
        clamp_pattern_length(self.pattern_length)
    }
}
