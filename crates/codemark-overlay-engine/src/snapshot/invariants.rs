use std::collections::HashSet;

use crate::layout::overlap::{OverlapSettings, PositionedElement, Resolution};
use crate::panel::RenderPass;

const EPSILON: f64 = 1e-9;

pub fn check(pass: &RenderPass, resolution: Option<&Resolution>, settings: OverlapSettings) {
    let mut seen = HashSet::new();
    for id in pass
        .assignment
        .visible
        .values()
        .chain(pass.assignment.hidden.values())
    {
        assert!(seen.insert(id), "codemark {id} assigned to more than one line");
    }

    for id in pass.assignment.visible.values() {
        assert!(
            !pass.hidden_ids.contains(id),
            "hidden codemark {id} occupies a visible line"
        );
    }

    for marker in &pass.markers {
        assert!(
            marker.top >= 0.0 && marker.top < pass.field_height_px,
            "marker {} at {} outside column of height {}",
            marker.id,
            marker.top,
            pass.field_height_px
        );
    }

    if let Some(resolution) = resolution {
        check_stack(&resolution.visible, settings);
        check_stack(&resolution.hidden, settings);
    }
}

fn check_stack(stack: &[PositionedElement], settings: OverlapSettings) {
    for element in stack {
        assert!(
            element.applied_offset >= 0.0,
            "{} moved up by {}",
            element.id,
            element.applied_offset
        );
    }
    for pair in stack.windows(2) {
        assert!(
            pair[1].top() + EPSILON >= pair[0].bottom() + settings.min_gap_px,
            "{} (top {}) overlaps {} (bottom {})",
            pair[1].id,
            pair[1].top(),
            pair[0].id,
            pair[0].bottom()
        );
    }
}
