// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step change notification.

use std::sync::mpsc::{self, Receiver, Sender};

/// Listener told about every step the cursor moves to.
///
/// Called on whichever thread delivered the tick, once per tick, in order.
/// Implementations must return quickly; anything heavy (redrawing a grid,
/// say) belongs on the host's own thread. [`ChannelObserver`] does that
/// hand-off.
pub trait StepObserver: Send + Sync {
    fn on_step_changed(&self, step: usize);
}

impl<F> StepObserver for F
where
    F: Fn(usize) + Send + Sync,
{
    fn on_step_changed(&self, step: usize) {
        self(step)
    }
}

/// Observer that forwards steps over a channel to the host thread
pub struct ChannelObserver {
    sender: Sender<usize>,
}

impl ChannelObserver {
    /// Create the observer and the receiving end for the host
    pub fn new() -> (Self, Receiver<usize>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl StepObserver for ChannelObserver {
    fn on_step_changed(&self, step: usize) {
        // Host went away; nothing to tell
        let _ = self.sender.send(step);
    }
}
