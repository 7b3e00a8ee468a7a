use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Annotation, VisibleRangeSet};

/// Display toggles from the panel's view selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayFilters {
    pub show_archived: bool,
    pub show_resolved: bool,
}

/// Hidden when archived and archived aren't shown, or closed and resolved aren't shown
pub fn is_hidden(annotation: &Annotation, filters: DisplayFilters) -> bool {
    (!annotation.pinned && !filters.show_archived)
        || (annotation.is_closed() && !filters.show_resolved)
}

/// `id -> hidden` for the current filters, rebuilt on every pass
pub fn compute_visibility(
    annotations: &[Annotation],
    filters: DisplayFilters,
) -> HashMap<String, bool> {
    annotations
        .iter()
        .map(|a| (a.id.clone(), is_hidden(a, filters)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewportPosition {
    Above,
    Inside,
    Below,
}

/// Where `line` sits relative to the first and last visible lines.
///
/// Lines inside a fold between two visible ranges count as inside.
pub fn classify(line: u32, ranges: &VisibleRangeSet) -> Option<ViewportPosition> {
    let first = ranges.first_line()?;
    let last = ranges.last_line()?;
    Some(if line < first {
        ViewportPosition::Above
    } else if line > last {
        ViewportPosition::Below
    } else {
        ViewportPosition::Inside
    })
}

/// Visible annotations scrolled out above and below the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ViewportCounts {
    pub above: usize,
    pub below: usize,
}

impl ViewportCounts {
    pub fn from_lines(lines: impl IntoIterator<Item = u32>, ranges: &VisibleRangeSet) -> Self {
        let mut counts = Self::default();
        for line in lines {
            match classify(line, ranges) {
                Some(ViewportPosition::Above) => counts.above += 1,
                Some(ViewportPosition::Below) => counts.below += 1,
                Some(ViewportPosition::Inside) | None => {}
            }
        }
        counts
    }
}

/// Totals shown next to the archived and resolved toggles, regardless of filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FilterCounts {
    pub archived: usize,
    pub resolved: usize,
}

impl FilterCounts {
    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        Self {
            archived: annotations.iter().filter(|a| a.is_archived()).count(),
            resolved: annotations.iter().filter(|a| a.is_closed()).count(),
        }
    }
}
