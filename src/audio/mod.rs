// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio sink boundary.
//!
//! The sequencer never decodes or plays audio itself. It hands file paths to
//! an [`AudioSink`] and moves on; decoding, mixing and releasing resources
//! are the sink's business. Failures inside a sink are never reported back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info};

/// Fire-and-forget playback target.
///
/// `play` is called from the tick path and must return quickly. Overlapping
/// calls for the same path must be handled independently.
pub trait AudioSink: Send + Sync {
    fn play(&self, path: &str);
}

impl<F> AudioSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn play(&self, path: &str) {
        self(path)
    }
}

/// Sink that only logs what would have played
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&self, path: &str) {
        info!("Playing {}", path);
    }
}

/// Sink that discards every trigger
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&self, _path: &str) {}
}

/// Runs each `play` of a blocking sink on the runtime's blocking pool.
///
/// Wrapping a sink that loads and plays a file synchronously makes it safe
/// for the tick path: every trigger gets its own thread, so triggers overlap
/// freely, and a panic inside the inner sink stays on that thread.
pub struct SpawningSink<S> {
    inner: Arc<S>,
    runtime: Handle,
    dispatched: AtomicU64,
}

impl<S: AudioSink + 'static> SpawningSink<S> {
    /// Wrap `inner`, spawning onto `runtime`
    pub fn new(inner: S, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(inner),
            runtime,
            dispatched: AtomicU64::new(0),
        }
    }

    /// Number of triggers handed to the blocking pool so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }
}

impl<S: AudioSink + 'static> AudioSink for SpawningSink<S> {
    fn play(&self, path: &str) {
        let inner = Arc::clone(&self.inner);
        let path = path.to_owned();
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        debug!("Dispatching {} to blocking pool", path);
        // JoinHandle dropped on purpose: nobody awaits playback
        let _ = self.runtime.spawn_blocking(move || inner.play(&path));
    }
}
