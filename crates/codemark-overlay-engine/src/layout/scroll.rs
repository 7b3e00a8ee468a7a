//! Keeps the annotation column's scroll position and the editor's top line in step.
//!
//! The column rests a little below its top (`neutral_offset_px`). Scrolling it
//! near the top means "show the line above", scrolling it past the lower
//! threshold means "show the line below". Wheel events over the column are
//! translated into whole editor lines.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    /// Offsets at or above the top edge plus this reveal the previous line
    pub reveal_above_px: f64,
    /// Offsets at or past this reveal the next line
    pub reveal_below_px: f64,
    /// Where the column is parked after the editor moves
    pub neutral_offset_px: f64,
    /// Pixel height of one line when wheel deltas arrive in pixels
    pub wheel_line_height_px: f64,
    /// Wheel state is forgotten after this long without events
    pub wheel_idle_ms: u64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            reveal_above_px: 5.0,
            reveal_below_px: 20.0,
            neutral_offset_px: 18.0,
            wheel_line_height_px: 18.0,
            wheel_idle_ms: 500,
        }
    }
}

/// Tracks one scroll gesture over the annotation column
#[derive(Debug, Clone, Default)]
pub struct ScrollSync {
    settings: ScrollSettings,
    /// Editor top line when the current gesture began
    gesture_top: Option<u32>,
}

impl ScrollSync {
    pub fn new(settings: ScrollSettings) -> Self {
        Self {
            settings,
            gesture_top: None,
        }
    }

    /// Line to reveal for a scroll to `offset_px` while the editor's top line is `current_top`.
    ///
    /// Returns at most one line per gesture, and nothing when the editor already shows it.
    /// A gesture ends when the column reports an offset between the two thresholds,
    /// i.e. once it has been parked again.
    pub fn on_scroll(&mut self, offset_px: f64, current_top: u32) -> Option<u32> {
        let above = offset_px <= self.settings.reveal_above_px;
        let below = offset_px >= self.settings.reveal_below_px;
        if !above && !below {
            self.gesture_top = None;
            return None;
        }

        // an editor that jumped elsewhere mid-gesture starts a fresh one
        let base = match self.gesture_top {
            Some(base) if base.abs_diff(current_top) <= 1 => base,
            _ => current_top,
        };
        self.gesture_top = Some(base);

        let target = if above {
            base.saturating_sub(1)
        } else {
            base.saturating_add(1)
        };

        if target == current_top {
            return None;
        }
        Some(target)
    }

    /// Offset the column should be parked at after the editor moved.
    ///
    /// The gesture stays open until the column reports that offset back.
    pub fn recenter(&self) -> f64 {
        self.settings.neutral_offset_px
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture_top.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelDeltaMode {
    Pixels,
    Lines,
    Pages,
}

#[derive(Debug, Clone, Copy)]
struct WheelState {
    accumulated_px: f64,
    top_line: u32,
    last_event: Instant,
}

/// Turns wheel deltas over the column into editor top-line changes.
///
/// Editor round trips are slower than wheel events, so the tracked top line
/// runs ahead of what the host has reported until the gesture goes idle.
#[derive(Debug, Clone, Default)]
pub struct WheelTracker {
    settings: ScrollSettings,
    state: Option<WheelState>,
}

impl WheelTracker {
    pub fn new(settings: ScrollSettings) -> Self {
        Self {
            settings,
            state: None,
        }
    }

    /// New top line for the editor, if the wheel moved it by at least one line
    pub fn on_wheel(
        &mut self,
        delta_y: f64,
        mode: WheelDeltaMode,
        current_top: u32,
        line_count: u32,
        now: Instant,
    ) -> Option<u32> {
        if delta_y == 0.0 {
            return None;
        }

        let idle = Duration::from_millis(self.settings.wheel_idle_ms);
        let mut state = match self.state {
            Some(state) if now.saturating_duration_since(state.last_event) <= idle => state,
            _ => WheelState {
                accumulated_px: 0.0,
                top_line: current_top,
                last_event: now,
            },
        };
        state.last_event = now;

        let lines = match mode {
            WheelDeltaMode::Pixels => {
                let line_height = self.settings.wheel_line_height_px;
                let pixels = state.accumulated_px + delta_y;
                state.accumulated_px = pixels % line_height;
                let lines = pixels / line_height;
                if pixels < 0.0 { lines.ceil() } else { lines.floor() }
            }
            WheelDeltaMode::Lines => delta_y.trunc(),
            WheelDeltaMode::Pages => 0.0,
        };
        self.state = Some(state);

        if lines == 0.0 {
            return None;
        }

        let target = (f64::from(state.top_line) + lines).clamp(0.0, f64::from(line_count)) as u32;
        if target == state.top_line {
            return None;
        }

        if let Some(state) = self.state.as_mut() {
            state.top_line = target;
        }
        Some(target)
    }

    /// Forget the gesture, e.g. when the pointer leaves the column
    pub fn reset(&mut self) {
        self.state = None;
    }
}
