// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sound kits and pad descriptors.
//!
//! A kit is an ordered list of up to [`MAX_PADS`] pad descriptors. The index
//! of a pad in its kit is the pad index the sequencer uses, so swapping kits
//! re-voices a pattern without touching it.

pub mod library;
pub mod watcher;

pub use library::KitLibrary;
pub use watcher::{KitEvent, KitWatcher};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::sequencer::MAX_PADS;

/// Audio file extensions a pad may point at
pub const AUDIO_EXTENSIONS: [&str; 4] = ["wav", "mp3", "aiff", "au"];

/// Errors raised while loading, saving or managing kits
#[derive(Error, Debug)]
pub enum KitError {
    #[error("failed to read kit file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write kit file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid kit YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("kit already exists: {0}")]
    DuplicateKit(String),

    #[error("unknown kit: {0}")]
    UnknownKit(String),

    #[error("cannot remove the last remaining kit")]
    LastKit,

    #[error("missing audio file for pad '{pad}': {path}")]
    MissingAudioFile { pad: String, path: String },
}

/// Display color of a pad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PadColor {
    /// Neutral grey used for pads without a custom color
    pub const DEFAULT: PadColor = PadColor { r: 77, g: 77, b: 77 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for PadColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One addressable trigger slot of a kit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadDescriptor {
    /// Display name
    pub name: String,
    /// Path handed to the audio sink when the pad fires
    pub file_path: String,
    /// Pad color
    #[serde(default)]
    pub color: PadColor,
    /// Playback volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Disabled pads are never dispatched
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Free-form description
    #[serde(default)]
    pub description: String,
}

fn default_volume() -> f32 {
    1.0
}
fn default_enabled() -> bool {
    true
}

impl PadDescriptor {
    /// Create an enabled pad at full volume with the default color
    pub fn new(name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            color: PadColor::DEFAULT,
            volume: default_volume(),
            enabled: default_enabled(),
            description: String::new(),
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: PadColor) -> Self {
        self.color = color;
        self
    }

    /// Set the volume, clamped to 0.0 - 1.0
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.set_volume(volume);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Enable or disable the pad
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the volume, clamped to 0.0 - 1.0
    pub fn set_volume(&mut self, volume: f32) {
        // NaN would survive clamp
        self.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    }

    /// Whether the pad uses something other than the default color
    pub fn has_custom_color(&self) -> bool {
        self.color != PadColor::DEFAULT
    }

    /// Name as shown on a pad button; bracketed when disabled
    pub fn display_text(&self) -> String {
        if self.enabled {
            self.name.clone()
        } else {
            format!("[{}]", self.name)
        }
    }

    /// Whether the file exists and carries a supported audio extension
    pub fn is_file_valid(&self) -> bool {
        if self.file_path.is_empty() {
            return false;
        }
        let path = Path::new(&self.file_path);
        path.is_file() && has_audio_extension(path)
    }
}

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Supplier of the ordered pad list the sequencer plays from.
///
/// Implementations return an immutable snapshot; the sequencer keeps the
/// snapshot it was handed and never observes later mutation of the source.
pub trait KitSource {
    /// Snapshot of the current pads, in pad-index order
    fn current_pads(&self) -> Arc<[PadDescriptor]>;
}

impl KitSource for Arc<[PadDescriptor]> {
    fn current_pads(&self) -> Arc<[PadDescriptor]> {
        if self.len() <= MAX_PADS {
            Arc::clone(self)
        } else {
            self[..].current_pads()
        }
    }
}

impl KitSource for [PadDescriptor] {
    fn current_pads(&self) -> Arc<[PadDescriptor]> {
        self.iter().take(MAX_PADS).cloned().collect()
    }
}

impl KitSource for Vec<PadDescriptor> {
    fn current_pads(&self) -> Arc<[PadDescriptor]> {
        self.as_slice().current_pads()
    }
}

/// A named, ordered set of at most [`MAX_PADS`] pads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundKit {
    /// Kit name, unique within a library
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Directory the kit's samples live in
    #[serde(default)]
    pub kit_path: String,
    /// Pads in index order
    #[serde(default)]
    pads: Vec<PadDescriptor>,
}

impl SoundKit {
    /// Create an empty kit
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kit_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kit_path: kit_path.into(),
            pads: Vec::new(),
        }
    }

    /// Create a kit from a pad list; pads past the capacity are dropped
    pub fn with_pads(
        name: impl Into<String>,
        description: impl Into<String>,
        kit_path: impl Into<String>,
        pads: impl IntoIterator<Item = PadDescriptor>,
    ) -> Self {
        let mut kit = Self::new(name, description, kit_path);
        for pad in pads {
            kit.add_pad(pad);
        }
        kit
    }

    /// Load a kit from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, KitError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| KitError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse a kit from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, KitError> {
        let mut kit: SoundKit = serde_yaml::from_str(yaml)?;
        kit.normalize();
        Ok(kit)
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String, KitError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Save the kit to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), KitError> {
        let path = path.as_ref();
        let yaml = self.to_yaml()?;
        fs::write(path, yaml).map_err(|source| KitError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Enforce capacity and value ranges on data that bypassed the setters
    fn normalize(&mut self) {
        if self.pads.len() > MAX_PADS {
            warn!(
                "Kit '{}' lists {} pads, keeping the first {}",
                self.name,
                self.pads.len(),
                MAX_PADS
            );
            self.pads.truncate(MAX_PADS);
        }
        for pad in &mut self.pads {
            let volume = pad.volume;
            pad.set_volume(volume);
        }
    }

    /// Append a pad; ignored once the kit is full
    pub fn add_pad(&mut self, pad: PadDescriptor) {
        if !self.is_full() {
            self.pads.push(pad);
        }
    }

    /// Remove the pad at `index`, shifting later pads down
    pub fn remove_pad(&mut self, index: usize) {
        if index < self.pads.len() {
            self.pads.remove(index);
        }
    }

    /// Replace the pad at `index`
    pub fn replace_pad(&mut self, index: usize, pad: PadDescriptor) {
        if let Some(slot) = self.pads.get_mut(index) {
            *slot = pad;
        }
    }

    /// Get the pad at `index`
    pub fn pad(&self, index: usize) -> Option<&PadDescriptor> {
        self.pads.get(index)
    }

    /// All pads in index order
    pub fn pads(&self) -> &[PadDescriptor] {
        &self.pads
    }

    pub fn pad_count(&self) -> usize {
        self.pads.len()
    }

    pub fn is_full(&self) -> bool {
        self.pads.len() >= MAX_PADS
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }
}

impl KitSource for SoundKit {
    fn current_pads(&self) -> Arc<[PadDescriptor]> {
        self.pads.current_pads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pads(count: usize) -> Vec<PadDescriptor> {
        (0..count)
            .map(|i| PadDescriptor::new(format!("Pad {}", i), format!("sounds/{}.wav", i)))
            .collect()
    }

    #[test]
    fn test_pad_defaults() {
        let pad = PadDescriptor::new("Kick", "sounds/kick.wav");
        assert_eq!(pad.color, PadColor::DEFAULT);
        assert_eq!(pad.volume, 1.0);
        assert!(pad.enabled);
        assert!(pad.description.is_empty());
        assert!(!pad.has_custom_color());
    }

    #[test]
    fn test_pad_volume_clamping() {
        let pad = PadDescriptor::new("Kick", "kick.wav").with_volume(1.5);
        assert_eq!(pad.volume, 1.0);

        let pad = PadDescriptor::new("Kick", "kick.wav").with_volume(-0.5);
        assert_eq!(pad.volume, 0.0);

        let pad = PadDescriptor::new("Kick", "kick.wav").with_volume(f32::NAN);
        assert_eq!(pad.volume, 0.0);
    }

    #[test]
    fn test_display_text() {
        let pad = PadDescriptor::new("Snare", "snare.wav");
        assert_eq!(pad.display_text(), "Snare");
        assert_eq!(pad.with_enabled(false).display_text(), "[Snare]");
    }

    #[test]
    fn test_file_validity() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("kick.WAV");
        let txt = dir.path().join("notes.txt");
        fs::write(&wav, b"RIFF").unwrap();
        fs::write(&txt, b"hello").unwrap();

        assert!(PadDescriptor::new("Kick", wav.to_string_lossy()).is_file_valid());
        assert!(!PadDescriptor::new("Notes", txt.to_string_lossy()).is_file_valid());
        assert!(!PadDescriptor::new("Gone", "does/not/exist.wav").is_file_valid());
        assert!(!PadDescriptor::new("Empty", "").is_file_valid());
    }

    #[test]
    fn test_kit_capacity() {
        let kit = SoundKit::with_pads("Big", "", "sounds/", pads(12));
        assert_eq!(kit.pad_count(), MAX_PADS);
        assert!(kit.is_full());
        assert_eq!(kit.current_pads().len(), MAX_PADS);
    }

    #[test]
    fn test_every_source_caps_at_nine_pads() {
        let many = pads(12);
        let shared: Arc<[PadDescriptor]> = many.clone().into();
        assert_eq!(shared.current_pads().len(), MAX_PADS);
        assert_eq!(many.current_pads().len(), MAX_PADS);
        assert_eq!(many[..].current_pads().len(), MAX_PADS);
        assert_eq!(shared.current_pads()[MAX_PADS - 1], many[MAX_PADS - 1]);

        let few: Arc<[PadDescriptor]> = pads(3).into();
        assert!(Arc::ptr_eq(&few.current_pads(), &few));
    }

    #[test]
    fn test_kit_pad_management() {
        let mut kit = SoundKit::with_pads("Small", "", "sounds/", pads(3));

        kit.replace_pad(1, PadDescriptor::new("Clap", "clap.wav"));
        assert_eq!(kit.pad(1).unwrap().name, "Clap");

        kit.remove_pad(0);
        assert_eq!(kit.pad_count(), 2);
        assert_eq!(kit.pad(0).unwrap().name, "Clap");

        // Out of range is ignored
        kit.remove_pad(10);
        kit.replace_pad(10, PadDescriptor::new("X", "x.wav"));
        assert_eq!(kit.pad_count(), 2);
        assert!(kit.pad(10).is_none());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut kit = SoundKit::with_pads("Kit", "", "sounds/", pads(2));
        let snapshot = kit.current_pads();

        kit.replace_pad(0, PadDescriptor::new("Changed", "changed.wav"));
        kit.add_pad(PadDescriptor::new("Extra", "extra.wav"));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "Pad 0");
    }

    #[test]
    fn test_parse_kit_yaml() {
        let yaml = r#"
name: "Acoustic"
description: "Live drums"
kit_path: "sounds/acoustic/"
pads:
  - name: "Kick"
    file_path: "sounds/acoustic/kick.wav"
  - name: "Snare"
    file_path: "sounds/acoustic/snare.wav"
    volume: 3.0
    enabled: false
    color: { r: 200, g: 10, b: 10 }
"#;

        let kit = SoundKit::from_yaml(yaml).unwrap();
        assert_eq!(kit.name, "Acoustic");
        assert_eq!(kit.pad_count(), 2);

        let kick = kit.pad(0).unwrap();
        assert_eq!(kick.volume, 1.0);
        assert!(kick.enabled);

        let snare = kit.pad(1).unwrap();
        assert_eq!(snare.volume, 1.0);
        assert!(!snare.enabled);
        assert!(snare.has_custom_color());
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = SoundKit::from_yaml("name: [unterminated");
        assert!(matches!(result, Err(KitError::Parse(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kit.yaml");

        let kit = SoundKit::with_pads("Saved", "On disk", "sounds/saved/", pads(4));
        kit.save(&path).unwrap();

        let loaded = SoundKit::load(&path).unwrap();
        assert_eq!(loaded, kit);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SoundKit::load("/definitely/not/here.yaml");
        assert!(matches!(result, Err(KitError::Read { .. })));
    }
}
