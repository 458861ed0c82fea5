// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! padseq - a pad step sequencer engine.
//!
//! The engine advances a step cursor at a tempo-derived interval, reads a
//! 9 × 16 pad/step grid and fires the active pads of the bound kit through
//! an [`AudioSink`]. Hosts supply the sink, the kit and (optionally) a step
//! observer; the engine supplies timing and state.

pub mod audio;
pub mod config;
pub mod kit;
pub mod sequencer;
pub mod timing;

pub use audio::{AudioSink, LogSink, NullSink, SpawningSink};
pub use config::SequencerConfig;
pub use kit::{KitError, KitEvent, KitLibrary, KitSource, KitWatcher, PadColor, PadDescriptor, SoundKit};
pub use sequencer::{
    ChannelObserver, KitBinding, PatternMatrix, StepObserver, TransportController, TransportState,
    MAX_PADS, MAX_STEPS,
};
pub use timing::{step_interval_ms, TempoClock, TickHandler};
