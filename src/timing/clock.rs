// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tempo clock.
//!
//! Converts a BPM tempo into a sixteenth-note step interval and owns the one
//! repeating timer task that delivers ticks. Deadlines accumulate from the
//! previous deadline rather than from "now", so handler latency does not
//! drift the grid.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace, warn};

/// Slowest accepted tempo
pub const MIN_TEMPO: u32 = 1;
/// Fastest accepted tempo
pub const MAX_TEMPO: u32 = 999;
/// Tempo of a freshly created clock
pub const DEFAULT_TEMPO: u32 = 120;
/// Steps per beat (sixteenth notes)
pub const STEPS_PER_BEAT: u32 = 4;

/// Clamp a tempo into the accepted range
pub fn clamp_tempo(bpm: u32) -> u32 {
    bpm.clamp(MIN_TEMPO, MAX_TEMPO)
}

/// Step interval in whole milliseconds: `60000 / (bpm * 4)`, rounded down
pub fn step_interval_ms(bpm: u32) -> u64 {
    60_000 / (clamp_tempo(bpm) as u64 * STEPS_PER_BEAT as u64)
}

/// Receiver of clock ticks.
///
/// `epoch` identifies the `start` call that produced the tick; handlers
/// compare it with [`TempoClock::epoch`] to discard ticks that were already
/// in flight when the clock was stopped.
pub trait TickHandler: Send + Sync {
    fn on_tick(&self, epoch: u64);
}

/// Running timer task
struct ClockTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Tempo-driven tick source
pub struct TempoClock {
    /// Current tempo in BPM
    tempo: u32,
    /// Step interval shared with the timer task
    interval_ms: Arc<AtomicU64>,
    /// Runtime the timer task is spawned on
    runtime: Option<Handle>,
    /// Active timer task
    task: Option<ClockTask>,
    /// Incremented on every start and stop
    epoch: u64,
    /// Deadlines dropped by the backlog policy
    skipped: Arc<AtomicU64>,
}

impl TempoClock {
    /// Create a clock at `bpm` that schedules ticks on `runtime`.
    ///
    /// Without a runtime the clock only computes intervals and ticks must be
    /// driven by the caller.
    pub fn new(bpm: u32, runtime: Option<Handle>) -> Self {
        let tempo = clamp_tempo(bpm);
        Self {
            tempo,
            interval_ms: Arc::new(AtomicU64::new(step_interval_ms(tempo))),
            runtime,
            task: None,
            epoch: 0,
            skipped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current tempo in BPM
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Set the tempo. The new interval is used from the next scheduled
    /// deadline; a tick already armed still fires at the old interval.
    pub fn set_tempo(&mut self, bpm: u32) {
        self.tempo = clamp_tempo(bpm);
        self.interval_ms
            .store(step_interval_ms(self.tempo), Ordering::Release);
        debug!("Tempo set to {} BPM ({} ms/step)", self.tempo, self.interval_ms());
    }

    /// Current step interval in milliseconds
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms.load(Ordering::Acquire)
    }

    /// Current step interval
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms())
    }

    /// Epoch of the most recent start or stop
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether a timer task is running
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Whether ticks are scheduled automatically
    pub fn has_runtime(&self) -> bool {
        self.runtime.is_some()
    }

    /// Number of deadlines skipped because the tick path fell behind
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Start delivering ticks to `handler`, first one interval from now.
    ///
    /// Any running task is stopped first. Returns the new epoch.
    pub fn start(&mut self, handler: Weak<dyn TickHandler>) -> u64 {
        self.stop();
        self.epoch += 1;

        let Some(runtime) = self.runtime.as_ref() else {
            debug!("No runtime attached, ticks must be driven manually");
            return self.epoch;
        };

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = runtime.spawn(run_clock(
            Arc::clone(&self.interval_ms),
            Arc::clone(&self.skipped),
            self.epoch,
            handler,
            stop_rx,
        ));
        self.task = Some(ClockTask {
            stop: stop_tx,
            handle,
        });
        self.epoch
    }

    /// Stop delivering ticks. Ticks already in flight carry a stale epoch.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.stop.send(());
            self.epoch += 1;
        }
    }

    /// Stop and detach from the runtime; the clock can no longer schedule
    pub fn shutdown(&mut self) {
        if let Some(task) = self.task.take() {
            task.handle.abort();
            self.epoch += 1;
        }
        self.runtime = None;
    }
}

impl Drop for TempoClock {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TempoClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempoClock")
            .field("tempo", &self.tempo)
            .field("interval_ms", &self.interval_ms())
            .field("running", &self.is_running())
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Advance a deadline by one period, skipping whole periods already missed.
///
/// Returns the next deadline and how many deadlines were dropped. The result
/// stays on the grid anchored at `deadline`, so phase is preserved.
pub(crate) fn next_deadline(deadline: Instant, now: Instant, period: Duration) -> (Instant, u64) {
    let next = deadline + period;
    if next > now {
        return (next, 0);
    }
    let behind = now.duration_since(next).as_nanos();
    let missed = (behind / period.as_nanos().max(1)) as u64 + 1;
    (next + period * missed as u32, missed)
}

async fn run_clock(
    interval_ms: Arc<AtomicU64>,
    skipped: Arc<AtomicU64>,
    epoch: u64,
    handler: Weak<dyn TickHandler>,
    mut stop: oneshot::Receiver<()>,
) {
    let period = || Duration::from_millis(interval_ms.load(Ordering::Acquire));
    let mut deadline = Instant::now() + period();

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = sleep_until(deadline) => {}
        }

        let Some(handler) = handler.upgrade() else {
            break;
        };
        trace!("Clock tick (epoch {})", epoch);
        handler.on_tick(epoch);
        drop(handler);

        let (next, missed) = next_deadline(deadline, Instant::now(), period());
        if missed > 0 {
            skipped.fetch_add(missed, Ordering::Relaxed);
            warn!("Tick path fell behind, skipped {} step(s)", missed);
        }
        deadline = next;
    }
    debug!("Clock task for epoch {} finished", epoch);
}
