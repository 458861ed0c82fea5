// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! File watcher for hot-reloading kit files.
//!
//! Edited kit files are re-parsed after a debounce period and handed back to
//! the host, which decides whether to rebind the sequencer. Playback is never
//! interrupted by a reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

use super::SoundKit;

/// Events emitted by the kit watcher
#[derive(Debug, Clone)]
pub enum KitEvent {
    /// A kit file was modified and successfully reloaded
    Reloaded(Box<SoundKit>),
    /// A kit file was modified but failed to parse
    Error(String),
    /// A new file appeared in the kits directory
    FileCreated(PathBuf),
    /// A file was removed from the kits directory
    FileDeleted(PathBuf),
}

/// Kit directory watcher with debouncing
pub struct KitWatcher {
    _watcher: RecommendedWatcher,
    event_receiver: Receiver<KitEvent>,
    watched_path: PathBuf,
}

impl KitWatcher {
    /// Watch a kits directory (or a single kit file).
    ///
    /// # Arguments
    /// * `path` - Path to watch
    /// * `debounce_ms` - Debounce duration in milliseconds (default: 500)
    pub fn new<P: AsRef<Path>>(path: P, debounce_ms: Option<u64>) -> Result<Self> {
        let watched_path = path.as_ref().to_path_buf();
        let debounce = Duration::from_millis(debounce_ms.unwrap_or(500));

        let (event_tx, event_rx): (Sender<KitEvent>, Receiver<KitEvent>) = mpsc::channel();
        let (notify_tx, notify_rx): (Sender<Event>, Receiver<Event>) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create kit watcher: {}", e))?;

        let mode = if watched_path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&watched_path, mode)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", watched_path, e))?;

        std::thread::spawn(move || debounce_loop(notify_rx, event_tx, debounce));

        Ok(Self {
            _watcher: watcher,
            event_receiver: event_rx,
            watched_path,
        })
    }

    /// Try to receive the next kit event (non-blocking)
    pub fn try_recv(&self) -> Option<KitEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Receive all pending kit events
    pub fn recv_all(&self) -> Vec<KitEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Get the path being watched
    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}

fn debounce_loop(notify_rx: Receiver<Event>, event_tx: Sender<KitEvent>, debounce: Duration) {
    let mut last_event_time: Option<Instant> = None;
    let mut pending_paths: Vec<PathBuf> = Vec::new();

    loop {
        match notify_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => match event.kind {
                EventKind::Create(_) => {
                    for path in event.paths {
                        let _ = event_tx.send(KitEvent::FileCreated(path));
                    }
                }
                EventKind::Remove(_) => {
                    for path in event.paths {
                        let _ = event_tx.send(KitEvent::FileDeleted(path));
                    }
                }
                EventKind::Modify(_) => {
                    for path in event.paths {
                        if !pending_paths.contains(&path) {
                            pending_paths.push(path);
                        }
                    }
                    last_event_time = Some(Instant::now());
                }
                _ => {}
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let settled = last_event_time
                    .map(|t| t.elapsed() >= debounce)
                    .unwrap_or(false);
                if settled {
                    for path in pending_paths.drain(..).filter(|p| is_kit_path(p)) {
                        let event = match SoundKit::load(&path) {
                            Ok(kit) => {
                                debug!("Reloaded kit '{}' from {:?}", kit.name, path);
                                KitEvent::Reloaded(Box::new(kit))
                            }
                            Err(e) => KitEvent::Error(format!("Failed to load {:?}: {}", path, e)),
                        };
                        if event_tx.send(event).is_err() {
                            return;
                        }
                    }
                    last_event_time = None;
                }
            }
            // Watcher was dropped
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn is_kit_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false)
}
