// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pad × step activation grid.
//!
//! The matrix has a fixed capacity of [`MAX_PADS`] rows and [`MAX_STEPS`]
//! columns. Indices coming from the host are never trusted: anything out of
//! range is ignored on write and reads back as inactive.

use super::{MAX_PADS, MAX_STEPS};

/// Boolean grid of which pads fire at which steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatrix {
    cells: [[bool; MAX_STEPS]; MAX_PADS],
}

impl PatternMatrix {
    /// Create an empty pattern
    pub fn new() -> Self {
        Self {
            cells: [[false; MAX_STEPS]; MAX_PADS],
        }
    }

    fn in_range(pad: usize, step: usize) -> bool {
        pad < MAX_PADS && step < MAX_STEPS
    }

    /// Set a single cell. Out-of-range indices are ignored.
    pub fn set_step(&mut self, pad: usize, step: usize, active: bool) {
        if Self::in_range(pad, step) {
            self.cells[pad][step] = active;
        }
    }

    /// Read a single cell. Out-of-range indices read as `false`.
    pub fn get_step(&self, pad: usize, step: usize) -> bool {
        Self::in_range(pad, step) && self.cells[pad][step]
    }

    /// Flip a single cell. Out-of-range indices are ignored.
    pub fn toggle_step(&mut self, pad: usize, step: usize) {
        if Self::in_range(pad, step) {
            self.cells[pad][step] = !self.cells[pad][step];
        }
    }

    /// Reset every cell to inactive
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Reset one pad's row to inactive
    pub fn clear_pad(&mut self, pad: usize) {
        if pad < MAX_PADS {
            self.cells[pad] = [false; MAX_STEPS];
        }
    }

    /// Pad indices active at `step`, in ascending order
    pub fn active_pads(&self, step: usize) -> Vec<usize> {
        if step >= MAX_STEPS {
            return Vec::new();
        }
        (0..MAX_PADS).filter(|&pad| self.cells[pad][step]).collect()
    }

    /// Total number of active cells
    pub fn active_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|&&cell| cell).count())
            .sum()
    }

    /// Whether no cell is active
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}

impl Default for PatternMatrix {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pattern_is_empty() {
        let pattern = PatternMatrix::new();
        assert!(pattern.is_empty());
        for pad in 0..MAX_PADS {
            for step in 0..MAX_STEPS {
                assert!(!pattern.get_step(pad, step));
            }
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut pattern = PatternMatrix::new();
        pattern.set_step(3, 7, true);
        assert!(pattern.get_step(3, 7));
        assert_eq!(pattern.active_count(), 1);

        pattern.set_step(3, 7, false);
        assert!(!pattern.get_step(3, 7));
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut pattern = PatternMatrix::new();
        pattern.set_step(0, 0, true);

        for pad in 0..MAX_PADS {
            for step in 0..MAX_STEPS {
                let before = pattern.get_step(pad, step);
                pattern.toggle_step(pad, step);
                assert_ne!(pattern.get_step(pad, step), before);
                pattern.toggle_step(pad, step);
                assert_eq!(pattern.get_step(pad, step), before);
            }
        }
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut pattern = PatternMatrix::new();
        pattern.set_step(2, 2, true);
        let before = pattern;

        pattern.set_step(MAX_PADS, 0, true);
        pattern.set_step(0, MAX_STEPS, true);
        pattern.set_step(usize::MAX, usize::MAX, true);
        pattern.toggle_step(MAX_PADS, 3);
        pattern.toggle_step(1, MAX_STEPS + 4);
        pattern.clear_pad(MAX_PADS);

        assert_eq!(pattern, before);
        assert!(!pattern.get_step(MAX_PADS, 0));
        assert!(pattern.active_pads(MAX_STEPS).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut pattern = PatternMatrix::new();
        for pad in 0..MAX_PADS {
            pattern.set_step(pad, pad, true);
        }
        assert_eq!(pattern.active_count(), MAX_PADS);

        pattern.clear();
        assert!(pattern.is_empty());
    }

    #[test]
    fn test_clear_pad_leaves_other_rows() {
        let mut pattern = PatternMatrix::new();
        pattern.set_step(0, 0, true);
        pattern.set_step(0, 4, true);
        pattern.set_step(1, 4, true);

        pattern.clear_pad(0);
        assert!(!pattern.get_step(0, 0));
        assert!(!pattern.get_step(0, 4));
        assert!(pattern.get_step(1, 4));
    }

    #[test]
    fn test_active_pads_ordered() {
        let mut pattern = PatternMatrix::new();
        pattern.set_step(8, 5, true);
        pattern.set_step(0, 5, true);
        pattern.set_step(4, 5, true);
        pattern.set_step(4, 6, true);

        assert_eq!(pattern.active_pads(5), vec![0, 4, 8]);
        assert_eq!(pattern.active_pads(6), vec![4]);
        assert!(pattern.active_pads(7).is_empty());
    }
}
