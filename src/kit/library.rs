// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Registry of available kits.
//!
//! The library is an ordinary value owned by the host. It is handed to the
//! sequencer as a [`KitSource`] whenever the active kit changes; nothing in
//! the engine reaches it globally.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{KitError, KitSource, PadDescriptor, SoundKit};

/// Root directory of the bundled samples
pub const SOUNDS_DIRECTORY: &str = "sounds/";

/// Ordered collection of kits with one current selection
#[derive(Debug, Clone)]
pub struct KitLibrary {
    /// Kits in insertion order
    kits: Vec<SoundKit>,
    /// Index of the current kit
    current: usize,
}

impl KitLibrary {
    /// Create a library holding the built-in kits, with "Default" selected
    pub fn new() -> Self {
        Self {
            kits: builtin_kits(),
            current: 0,
        }
    }

    /// Create a library from an explicit kit list.
    ///
    /// Kits with duplicate names after the first are skipped. An empty list
    /// falls back to the built-in kits so a current kit always exists.
    pub fn with_kits(kits: impl IntoIterator<Item = SoundKit>) -> Self {
        let mut library = Self {
            kits: Vec::new(),
            current: 0,
        };
        for kit in kits {
            if let Err(e) = library.add_kit(kit) {
                warn!("Skipping kit: {}", e);
            }
        }
        if library.kits.is_empty() {
            library.kits = builtin_kits();
        }
        library
    }

    /// Load every `*.yaml` / `*.yml` kit in `dir` on top of the built-in kits.
    ///
    /// Files that fail to parse are logged and skipped. A missing directory
    /// is not an error; the built-in kits are used alone.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let mut library = Self::new();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => {
                info!("Kits directory {:?} not found, using built-in kits only", dir);
                return library;
            }
        };

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_kit_file(path))
            .collect();
        paths.sort();

        for path in paths {
            match SoundKit::load(&path) {
                Ok(kit) => {
                    debug!("Loaded kit '{}' from {:?}", kit.name, path);
                    if let Err(e) = library.add_kit(kit) {
                        warn!("Skipping {:?}: {}", path, e);
                    }
                }
                Err(e) => warn!("Error loading kit {:?}: {}", path, e),
            }
        }

        info!("Kit library ready with {} kits", library.kit_count());
        library
    }

    /// Add a kit; names must be unique
    pub fn add_kit(&mut self, kit: SoundKit) -> Result<(), KitError> {
        if self.has_kit(&kit.name) {
            return Err(KitError::DuplicateKit(kit.name));
        }
        self.kits.push(kit);
        Ok(())
    }

    /// Replace a kit of the same name, or add it if absent
    pub fn upsert_kit(&mut self, kit: SoundKit) {
        match self.position(&kit.name) {
            Some(index) => self.kits[index] = kit,
            None => self.kits.push(kit),
        }
    }

    /// Remove a kit by name.
    ///
    /// The last remaining kit cannot be removed. Removing the current kit
    /// selects the first kit left.
    pub fn remove_kit(&mut self, name: &str) -> Result<SoundKit, KitError> {
        let index = self
            .position(name)
            .ok_or_else(|| KitError::UnknownKit(name.to_string()))?;
        if self.kits.len() <= 1 {
            return Err(KitError::LastKit);
        }

        let removed = self.kits.remove(index);
        if index == self.current {
            self.current = 0;
        } else if index < self.current {
            self.current -= 1;
        }
        Ok(removed)
    }

    /// Make the named kit current
    pub fn switch_to(&mut self, name: &str) -> Result<&SoundKit, KitError> {
        let index = self
            .position(name)
            .ok_or_else(|| KitError::UnknownKit(name.to_string()))?;
        self.current = index;
        info!("Switched to kit: {}", name);
        Ok(&self.kits[index])
    }

    /// The current kit
    pub fn current_kit(&self) -> &SoundKit {
        &self.kits[self.current]
    }

    /// Look up a kit by name
    pub fn kit(&self, name: &str) -> Option<&SoundKit> {
        self.kits.iter().find(|kit| kit.name == name)
    }

    /// Kit names in library order
    pub fn kit_names(&self) -> impl Iterator<Item = &str> {
        self.kits.iter().map(|kit| kit.name.as_str())
    }

    /// All kits in library order
    pub fn kits(&self) -> &[SoundKit] {
        &self.kits
    }

    pub fn kit_count(&self) -> usize {
        self.kits.len()
    }

    pub fn has_kit(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.kits.iter().position(|kit| kit.name == name)
    }

    /// Check that every pad of `kit` points at an existing file
    pub fn validate_kit(kit: &SoundKit) -> Result<(), KitError> {
        for pad in kit.pads() {
            if !Path::new(&pad.file_path).exists() {
                warn!("Missing audio file: {}", pad.file_path);
                return Err(KitError::MissingAudioFile {
                    pad: pad.name.clone(),
                    path: pad.file_path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Create an empty kit whose samples live in `sounds/<lowercase name>/`.
    ///
    /// The kit is returned, not added; call [`KitLibrary::add_kit`] once its
    /// pads are filled in.
    pub fn create_empty_kit(&self, name: &str, description: &str) -> Result<SoundKit, KitError> {
        if self.has_kit(name) {
            return Err(KitError::DuplicateKit(name.to_string()));
        }
        let kit_path = format!("{}{}/", SOUNDS_DIRECTORY, name.to_lowercase());
        Ok(SoundKit::new(name, description, kit_path))
    }
}

impl Default for KitLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl KitSource for KitLibrary {
    fn current_pads(&self) -> Arc<[PadDescriptor]> {
        self.current_kit().current_pads()
    }
}

fn is_kit_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false)
}

fn builtin_kit(name: &str, description: &str, subdir: &str, pads: [(&str, &str); 9]) -> SoundKit {
    let kit_path = format!("{}{}", SOUNDS_DIRECTORY, subdir);
    let descriptors = pads
        .iter()
        .map(|(pad_name, file)| PadDescriptor::new(*pad_name, format!("{}{}", kit_path, file)))
        .collect::<Vec<_>>();
    SoundKit::with_pads(name, description, kit_path, descriptors)
}

/// Kits available without any kit files on disk
pub fn builtin_kits() -> Vec<SoundKit> {
    vec![
        builtin_kit(
            "Default",
            "Default sound kit",
            "",
            [
                ("Kick", "kick.wav"),
                ("Snare", "snare.wav"),
                ("Pluck", "pluck.wav"),
                ("Slap", "slap.wav"),
                ("HiHat", "hihat.wav"),
                ("Clap", "clap.wav"),
                ("Healing", "healing.wav"),
                ("Netflix", "netflix.wav"),
                ("Lazer", "lazer.wav"),
            ],
        ),
        builtin_kit(
            "Metal",
            "Brutal metal kit",
            "metal/",
            [
                ("MetalKick", "metalkick.wav"),
                ("GrindSnare", "grindcoresnare.wav"),
                ("Ride", "ride.wav"),
                ("China", "china.wav"),
                ("Note 1", "note1.wav"),
                ("Note 2", "note2.wav"),
                ("Note 3", "note3.wav"),
                ("Note 4", "note4.wav"),
                ("Note 5", "note5.wav"),
            ],
        ),
        builtin_kit(
            "Test",
            "Test kit",
            "test/",
            [
                ("A", "a.wav"),
                ("B", "b.wav"),
                ("C", "c.wav"),
                ("D", "d.wav"),
                ("E", "e.wav"),
                ("F", "f.wav"),
                ("G", "g.wav"),
                ("H", "h.wav"),
                ("I", "i.wav"),
            ],
        ),
    ]
}
