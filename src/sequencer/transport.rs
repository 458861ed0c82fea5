// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport state machine.
//!
//! [`TransportController`] owns the pattern, the step cursor, the kit
//! binding and the tempo clock behind a single lock. Host threads mutate
//! through it while the clock task ticks through it, so a tick always sees
//! the grid either fully before or fully after a mutation.
//!
//! A tick reads everything it needs under the lock, releases it, and only
//! then calls the audio sink and the step observer.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

use super::{
    clamp_pattern_length, KitBinding, PatternMatrix, StepObserver, DEFAULT_PATTERN_LENGTH,
};
use crate::audio::AudioSink;
use crate::config::SequencerConfig;
use crate::kit::{KitSource, PadDescriptor};
use crate::timing::{TempoClock, TickHandler, DEFAULT_TEMPO};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// Not ticking, cursor at 0
    #[default]
    Stopped,
    /// Ticking
    Playing,
    /// Not ticking, cursor retained
    Paused,
}

/// Everything guarded by the engine lock
struct EngineState {
    transport: TransportState,
    pattern: PatternMatrix,
    cursor: usize,
    pattern_length: usize,
    kit: KitBinding,
    clock: TempoClock,
    observer: Option<Arc<dyn StepObserver>>,
    disposed: bool,
}

struct Shared {
    state: Mutex<EngineState>,
    /// Serializes ticks from the clock task and manual `tick` calls
    tick_lock: Mutex<()>,
    sink: Arc<dyn AudioSink>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking sink or observer must not wedge the engine
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Work a tick collected under the lock
struct TickPlan {
    step: usize,
    epoch: u64,
    active: Vec<usize>,
    kit: KitBinding,
}

impl Shared {
    fn tick(&self, epoch: Option<u64>) -> bool {
        let _serial = lock(&self.tick_lock);

        let plan = {
            let mut state = lock(&self.state);
            if state.disposed || state.transport != TransportState::Playing {
                return false;
            }
            if let Some(epoch) = epoch {
                if epoch != state.clock.epoch() {
                    trace!("Dropping stale tick from epoch {}", epoch);
                    return false;
                }
            }

            let step = state.cursor;
            let active = state.pattern.active_pads(step);
            state.cursor = (step + 1) % state.pattern_length;

            TickPlan {
                step,
                epoch: state.clock.epoch(),
                active,
                kit: state.kit.clone(),
            }
        };

        for pad in plan.active.iter().filter_map(|&index| plan.kit.resolve(index)) {
            if !pad.enabled {
                continue;
            }
            debug!("Step {}: Playing {}", plan.step, pad.name);
            let sink = &self.sink;
            if catch_unwind(AssertUnwindSafe(|| sink.play(&pad.file_path))).is_err() {
                warn!("Audio sink panicked playing {}", pad.file_path);
            }
        }

        if let Some((observer, step)) = self.pending_notification(plan.epoch) {
            if catch_unwind(AssertUnwindSafe(|| observer.on_step_changed(step))).is_err() {
                warn!("Step observer panicked at step {}", step);
            }
        }
        true
    }

    /// Observer and live cursor to report once dispatch is done.
    ///
    /// The sink runs without the lock, so the transport may have been
    /// stopped, paused or shortened meanwhile. Nothing is reported unless
    /// the engine is still Playing in the epoch the tick started in.
    fn pending_notification(&self, epoch: u64) -> Option<(Arc<dyn StepObserver>, usize)> {
        let state = lock(&self.state);
        if state.disposed
            || state.transport != TransportState::Playing
            || state.clock.epoch() != epoch
        {
            trace!("Transport changed during dispatch, step not reported");
            return None;
        }
        state.observer.clone().map(|observer| (observer, state.cursor))
    }
}

impl TickHandler for Shared {
    fn on_tick(&self, epoch: u64) {
        self.tick(Some(epoch));
    }
}

/// Step sequencer engine: pattern, cursor, kit binding and transport.
///
/// All methods take `&self` and may be called from any thread. Once
/// [`dispose`](Self::dispose) has run, every operation is a no-op.
pub struct TransportController {
    shared: Arc<Shared>,
}

impl TransportController {
    /// Create an engine scheduling ticks on the ambient tokio runtime, if
    /// there is one. Outside a runtime, ticks must be driven with
    /// [`tick`](Self::tick).
    pub fn new(sink: Arc<dyn AudioSink>, kit: Option<&dyn KitSource>) -> Self {
        Self::with_runtime(sink, kit, Handle::try_current().ok())
    }

    /// Create an engine scheduling ticks on `runtime`
    pub fn with_runtime(
        sink: Arc<dyn AudioSink>,
        kit: Option<&dyn KitSource>,
        runtime: Option<Handle>,
    ) -> Self {
        let mut binding = KitBinding::new();
        binding.set_current_kit(kit);

        let state = EngineState {
            transport: TransportState::Stopped,
            pattern: PatternMatrix::new(),
            cursor: 0,
            pattern_length: DEFAULT_PATTERN_LENGTH,
            kit: binding,
            clock: TempoClock::new(DEFAULT_TEMPO, runtime),
            observer: None,
            disposed: false,
        };

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                tick_lock: Mutex::new(()),
                sink,
            }),
        }
    }

    /// Apply tempo and pattern length from a config
    pub fn configure(&self, config: &SequencerConfig) {
        self.set_tempo(config.tempo);
        self.set_pattern_length(config.pattern_length);
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        lock(&self.shared.state)
    }

    /// Run `op` on live state; logs and skips it after disposal
    fn mutate<R>(&self, name: &str, op: impl FnOnce(&mut EngineState) -> R) -> Option<R> {
        let mut state = self.state();
        if state.disposed {
            warn!("Ignoring {} on a disposed sequencer", name);
            return None;
        }
        Some(op(&mut *state))
    }

    // Transport

    /// Start or resume ticking. From Stopped the first tick plays step 0;
    /// from Paused it plays the retained step. No-op while Playing.
    pub fn play(&self) {
        let weak: Weak<dyn TickHandler> = {
            let handler: Arc<dyn TickHandler> = self.shared.clone();
            Arc::downgrade(&handler)
        };
        self.mutate("play", |state| {
            if state.transport == TransportState::Playing {
                return;
            }
            state.transport = TransportState::Playing;
            state.clock.start(weak);
            info!(
                "Sequencer started - BPM: {}, Length: {}, Step: {}",
                state.clock.tempo(),
                state.pattern_length,
                state.cursor
            );
        });
    }

    /// Stop ticking and rewind to step 0. Safe in any state.
    pub fn stop(&self) {
        let mut state = self.state();
        if state.disposed {
            return;
        }
        Self::stop_locked(&mut *state);
    }

    fn stop_locked(state: &mut EngineState) {
        state.clock.stop();
        let was = state.transport;
        state.transport = TransportState::Stopped;
        state.cursor = 0;
        if was != TransportState::Stopped {
            info!("Sequencer stopped");
        }
    }

    /// Stop ticking but keep the cursor. Only acts while Playing.
    pub fn pause(&self) {
        self.mutate("pause", |state| {
            if state.transport != TransportState::Playing {
                return;
            }
            state.clock.stop();
            state.transport = TransportState::Paused;
            info!("Sequencer paused at step {}", state.cursor);
        });
    }

    /// Stop and release the clock. The engine is inert afterwards.
    pub fn dispose(&self) {
        let mut state = self.state();
        if state.disposed {
            return;
        }
        Self::stop_locked(&mut *state);
        state.clock.shutdown();
        state.observer = None;
        state.disposed = true;
        info!("Sequencer disposed");
    }

    /// Run one tick now, as the clock would.
    ///
    /// Returns `false` when nothing happened because the engine is not
    /// Playing. Hosts without a runtime drive the engine with this; with a
    /// runtime attached, manual ticks come on top of scheduled ones.
    pub fn tick(&self) -> bool {
        self.shared.tick(None)
    }

    // Timing and length

    /// Set the tempo, clamped to 1 - 999 BPM. Takes effect from the next
    /// scheduled tick.
    pub fn set_tempo(&self, bpm: u32) {
        self.mutate("set_tempo", |state| state.clock.set_tempo(bpm));
    }

    /// Set the pattern length, clamped to 1 - 16. A cursor at or past the
    /// new length jumps back to step 0 immediately.
    pub fn set_pattern_length(&self, length: usize) {
        self.mutate("set_pattern_length", |state| {
            state.pattern_length = clamp_pattern_length(length);
            if state.cursor >= state.pattern_length {
                state.cursor = 0;
            }
            debug!("Pattern length set to {}", state.pattern_length);
        });
    }

    // Pattern

    /// Set one cell; out-of-range indices are ignored
    pub fn set_step(&self, pad: usize, step: usize, active: bool) {
        self.mutate("set_step", |state| state.pattern.set_step(pad, step, active));
    }

    /// Flip one cell; out-of-range indices are ignored
    pub fn toggle_step(&self, pad: usize, step: usize) {
        self.mutate("toggle_step", |state| state.pattern.toggle_step(pad, step));
    }

    /// Clear the whole pattern
    pub fn clear(&self) {
        self.mutate("clear", |state| {
            state.pattern.clear();
            info!("Pattern cleared");
        });
    }

    /// Clear one pad's row
    pub fn clear_pad(&self, pad: usize) {
        self.mutate("clear_pad", |state| state.pattern.clear_pad(pad));
    }

    /// Replace the whole pattern in one step
    pub fn set_pattern(&self, pattern: PatternMatrix) {
        self.mutate("set_pattern", |state| state.pattern = pattern);
    }

    // Kit and observer

    /// Bind a snapshot of `kit`, or unbind with `None`. Used from the next tick.
    pub fn set_current_kit(&self, kit: Option<&dyn KitSource>) {
        self.mutate("set_current_kit", |state| {
            state.kit.set_current_kit(kit);
            debug!("Kit bound with {} pads", state.kit.len());
        });
    }

    /// Replace the step observer
    pub fn set_step_observer(&self, observer: Option<Arc<dyn StepObserver>>) {
        self.mutate("set_step_observer", |state| state.observer = observer);
    }

    // Queries

    pub fn transport_state(&self) -> TransportState {
        self.state().transport
    }

    pub fn is_playing(&self) -> bool {
        self.transport_state() == TransportState::Playing
    }

    pub fn is_disposed(&self) -> bool {
        self.state().disposed
    }

    /// Step the next tick will play
    pub fn current_step(&self) -> usize {
        self.state().cursor
    }

    pub fn pattern_length(&self) -> usize {
        self.state().pattern_length
    }

    pub fn tempo(&self) -> u32 {
        self.state().clock.tempo()
    }

    pub fn step_interval(&self) -> Duration {
        self.state().clock.step_interval()
    }

    /// Read one cell; out-of-range reads as `false`
    pub fn get_step(&self, pad: usize, step: usize) -> bool {
        self.state().pattern.get_step(pad, step)
    }

    /// Copy of the whole pattern
    pub fn pattern(&self) -> PatternMatrix {
        self.state().pattern
    }

    /// Snapshot of the bound kit's pads
    pub fn current_kit(&self) -> Option<Arc<[PadDescriptor]>> {
        self.state().kit.snapshot()
    }

    /// Deadlines the clock dropped because ticks ran late
    pub fn skipped_ticks(&self) -> u64 {
        self.state().clock.skipped_ticks()
    }
}

impl std::fmt::Debug for TransportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("TransportController")
            .field("transport", &state.transport)
            .field("cursor", &state.cursor)
            .field("pattern_length", &state.pattern_length)
            .field("clock", &state.clock)
            .field("kit_pads", &state.kit.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}
