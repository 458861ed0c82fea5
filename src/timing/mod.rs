// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing and clock module.
//!
//! This module converts tempo into step intervals and owns the scheduled
//! task that drives the sequencer.

pub mod clock;

pub use clock::{
    clamp_tempo, step_interval_ms, TempoClock, TickHandler, DEFAULT_TEMPO, MAX_TEMPO, MIN_TEMPO,
    STEPS_PER_BEAT,
};
