//! Coalescing of resolution triggers into at most one pass per display frame.

/// A change observed in the rendered element tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualMutation {
    ElementAdded { id: String },
    ElementRemoved { id: String },
    /// An element gained or lost its "selected" state
    SelectionClassToggled { id: String },
    /// Any other attribute change; element geometry is unaffected
    AttributeChanged { id: String, attribute: String },
}

impl VisualMutation {
    /// Whether this change can move elements and so needs a resolution pass
    pub fn affects_layout(&self) -> bool {
        !matches!(self, VisualMutation::AttributeChanged { .. })
    }
}

/// Single-slot task queue drained once per frame.
///
/// Scheduling while a task is pending replaces it, so any number of triggers
/// inside one frame collapse into one run. After `close` nothing is accepted
/// and nothing is returned.
#[derive(Debug)]
pub struct FrameSlot<T> {
    pending: Option<T>,
    closed: bool,
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self {
            pending: None,
            closed: false,
        }
    }
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a pending task was overwritten
    pub fn schedule(&mut self, task: T) -> bool {
        if self.closed {
            return false;
        }
        self.pending.replace(task).is_some()
    }

    /// Called on the frame boundary
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop a scheduled task without running it
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Cancel and refuse all later scheduling
    pub fn close(&mut self) {
        self.cancel();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
