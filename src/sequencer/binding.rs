// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Binding between pad indices and the active kit.

use std::sync::Arc;

use crate::kit::{KitSource, PadDescriptor};

/// Snapshot of the active kit's pads.
///
/// Rebinding swaps the whole snapshot; the pad list behind it is never
/// mutated, so a tick holding an old snapshot keeps a consistent view.
#[derive(Debug, Clone, Default)]
pub struct KitBinding {
    pads: Option<Arc<[PadDescriptor]>>,
}

impl KitBinding {
    /// Create an unbound binding
    pub fn new() -> Self {
        Self { pads: None }
    }

    /// Create a binding from a kit source, snapshotting it now
    pub fn from_source(source: &(impl KitSource + ?Sized)) -> Self {
        Self {
            pads: Some(source.current_pads()),
        }
    }

    /// Replace the binding with a fresh snapshot of `source`, or unbind
    pub fn set_current_kit(&mut self, source: Option<&dyn KitSource>) {
        self.pads = source.map(|s| s.current_pads());
    }

    /// Whether a kit is bound (an empty kit still counts as bound)
    pub fn is_bound(&self) -> bool {
        self.pads.is_some()
    }

    /// Number of pads in the bound kit
    pub fn len(&self) -> usize {
        self.pads.as_ref().map_or(0, |pads| pads.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pad at `index`; `None` when unbound or past the end of the kit
    pub fn resolve(&self, index: usize) -> Option<&PadDescriptor> {
        self.pads.as_ref().and_then(|pads| pads.get(index))
    }

    /// The bound snapshot itself
    pub fn snapshot(&self) -> Option<Arc<[PadDescriptor]>> {
        self.pads.clone()
    }
}
