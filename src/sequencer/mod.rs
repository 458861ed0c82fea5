// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step sequencer core.
//!
//! This module provides the sequencing engine:
//! - Pad × step pattern matrix
//! - Kit binding from pad index to sample
//! - Transport state machine driven by the tempo clock
//! - Step observer notifications

pub mod binding;
pub mod observer;
pub mod pattern;
pub mod transport;

pub use binding::KitBinding;
pub use observer::{ChannelObserver, StepObserver};
pub use pattern::PatternMatrix;
pub use transport::{TransportController, TransportState};

/// Number of addressable pads
pub const MAX_PADS: usize = 9;
/// Number of steps in the pattern grid
pub const MAX_STEPS: usize = 16;
/// Shortest pattern length
pub const MIN_PATTERN_LENGTH: usize = 1;
/// Pattern length of a fresh engine
pub const DEFAULT_PATTERN_LENGTH: usize = MAX_STEPS;

/// Clamp a pattern length into 1..=16
pub fn clamp_pattern_length(length: usize) -> usize {
    length.clamp(MIN_PATTERN_LENGTH, MAX_STEPS)
}
