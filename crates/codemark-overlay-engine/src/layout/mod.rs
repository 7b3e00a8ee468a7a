/*!
 * # Inline Codemark Layout
 *
 * Positions codemark elements beside a host editor whose viewport may be
 * scrolled, folded, or split into several disjoint visible ranges.
 *
 * ## Pipeline
 *
 * 1. **`viewport`**: maps a contiguous local line index (visible lines only)
 *    to absolute document lines and back
 * 2. **`visibility`**: decides which codemarks the current filters hide and
 *    counts those scrolled out above or below
 * 3. **`anchors`**: gives every codemark a line of its own, shifting
 *    collisions downward
 * 4. **`affordance`**: places the per-line "add codemark" row(s)
 * 5. **`overlap`**: pushes rendered elements down so none overlap, once per
 *    frame via **`frame`**
 * 6. **`scroll`**: turns column scrolling into editor reveal requests
 *
 * Every stage is a pure function of the current inputs. The visible ranges
 * and annotations are never mutated; each pass derives fresh tables from
 * them, so a pass triggered from inside another callback can't observe
 * half-updated state.
 */

pub mod affordance;
pub mod anchors;
pub mod frame;
pub mod overlap;
pub mod scroll;
pub mod viewport;
pub mod visibility;

pub use affordance::{
    AffordanceLayout, AffordanceRow, AffordanceState, ComposeKind, ComposeRequest, EditorMetrics,
    Placement,
};
pub use anchors::{LineAssignment, assign_lines};
pub use frame::{FrameSlot, VisualMutation};
pub use overlap::{
    ElementGeometry, ElementKind, OverlapSettings, PositionedElement, Resolution, resolve,
};
pub use scroll::{ScrollSettings, ScrollSync, WheelDeltaMode, WheelTracker};
pub use viewport::{to_absolute, to_local, total_visible_lines};
pub use visibility::{
    DisplayFilters, FilterCounts, ViewportCounts, ViewportPosition, compute_visibility, is_hidden,
};
