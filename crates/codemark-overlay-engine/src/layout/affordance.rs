//! Placement of the per-line "add codemark" affordance.
//!
//! Either one row sits on the open line (the caret or active selection), or,
//! when nothing is open in the viewport, every visible line gets a row that
//! lights up on hover. Rows are positioned proportionally in the column
//! because the host editor's line height isn't reliably known.

use serde::{Deserialize, Serialize};

use crate::layout::viewport::{line_top, to_absolute, to_local, total_visible_lines};
use crate::models::{Range, Selection, VisibleRangeSet};

/// Open-line bookkeeping carried between render passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AffordanceState {
    /// Absolute line the single affordance row is pinned to
    pub open_line: Option<u32>,
    /// Cursor line seen on the previous selection change
    pub last_selected_line: Option<u32>,
    /// Set by an affordance click; suppresses reopening for the selection that follows
    pub clicked_plus: bool,
    /// False while the editor has no selection at all (not focused)
    pub focused: bool,
}

impl AffordanceState {
    /// Next state after the host reports `selection`
    pub fn derive(previous: AffordanceState, selection: Option<&Selection>) -> AffordanceState {
        let Some(selection) = selection else {
            return AffordanceState::default();
        };
        let cursor_line = selection.cursor.line;

        if selection.is_empty() {
            return AffordanceState {
                open_line: Some(cursor_line),
                last_selected_line: Some(cursor_line),
                clicked_plus: false,
                focused: true,
            };
        }

        if previous.clicked_plus {
            return AffordanceState {
                open_line: None,
                last_selected_line: Some(cursor_line),
                clicked_plus: false,
                focused: true,
            };
        }

        if previous.last_selected_line != Some(cursor_line) {
            return AffordanceState {
                open_line: Some(cursor_line),
                last_selected_line: Some(cursor_line),
                clicked_plus: false,
                focused: true,
            };
        }

        AffordanceState {
            focused: true,
            ..previous
        }
    }

    /// Record an affordance click
    pub fn after_click(self) -> AffordanceState {
        AffordanceState {
            open_line: None,
            clicked_plus: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposeKind {
    Comment,
    Issue,
    Bookmark,
    Link,
}

/// Asks the composition collaborator to open a form for a line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeRequest {
    pub kind: ComposeKind,
    pub absolute_line: u32,
    pub range: Range,
    /// Whether the host should select `range` before the form opens
    pub set_selection: bool,
    /// Where the affordance row was drawn, so the form opens beside it
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffordanceRow {
    pub local_index: u32,
    pub absolute_line: u32,
    pub top: f64,
    pub hover: bool,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AffordanceLayout {
    None,
    Single(AffordanceRow),
    Column(Vec<AffordanceRow>),
}

impl AffordanceLayout {
    pub fn rows(&self) -> &[AffordanceRow] {
        match self {
            AffordanceLayout::None => &[],
            AffordanceLayout::Single(row) => std::slice::from_ref(row),
            AffordanceLayout::Column(rows) => rows,
        }
    }
}

/// Inputs for one placement pass
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub ranges: &'a VisibleRangeSet,
    pub viewport_height_px: f64,
    pub state: AffordanceState,
    /// Local index under the pointer
    pub hovered: Option<u32>,
    /// Local index the attention ripple is currently passing over
    pub rippled: Option<u32>,
    /// Affordances give way to an open compose form
    pub compose_open: bool,
}

pub fn place(placement: Placement<'_>) -> AffordanceLayout {
    if placement.compose_open || !placement.state.focused {
        return AffordanceLayout::None;
    }
    let total = total_visible_lines(placement.ranges);
    if total == 0 {
        return AffordanceLayout::None;
    }

    let open_local = placement
        .state
        .open_line
        .and_then(|line| to_local(line, placement.ranges));

    if let Some(local_index) = open_local
        && let Some(top) = line_top(local_index, placement.viewport_height_px, total)
        && let Some(absolute_line) = to_absolute(local_index, placement.ranges)
    {
        return AffordanceLayout::Single(AffordanceRow {
            local_index,
            absolute_line,
            top,
            hover: false,
            open: true,
        });
    }

    let rows = (0..total)
        .filter_map(|local_index| {
            let absolute_line = to_absolute(local_index, placement.ranges)?;
            let top = line_top(local_index, placement.viewport_height_px, total)?;
            Some(AffordanceRow {
                local_index,
                absolute_line,
                top,
                hover: placement.hovered == Some(local_index),
                open: placement.rippled == Some(local_index),
            })
        })
        .collect();
    AffordanceLayout::Column(rows)
}

/// Compose request for a click on the row at `local_index`.
///
/// Clicking the open row keeps a live selection; any other row selects its whole line.
pub fn compose_for_click(
    kind: ComposeKind,
    local_index: u32,
    top: f64,
    ranges: &VisibleRangeSet,
    state: AffordanceState,
    selection: Option<&Selection>,
) -> Option<ComposeRequest> {
    let absolute_line = to_absolute(local_index, ranges)?;

    let live_selection = selection.filter(|s| !s.is_empty());
    let (range, set_selection) = match live_selection {
        Some(selection) if state.open_line == Some(absolute_line) => (selection.range(), false),
        _ => (Range::whole_line(absolute_line), true),
    };

    Some(ComposeRequest {
        kind,
        absolute_line,
        range,
        set_selection,
        top,
    })
}

/// Font and margin metrics the host reports for its editor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorMetrics {
    pub font_size: Option<f64>,
    pub line_height: Option<f64>,
    pub margin_top: Option<f64>,
}

const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Height of the affordance column.
///
/// When the whole file fits with room to spare, the column shrinks to the
/// expected height of the visible lines; otherwise it fills the window below
/// the top margin. Two extra lines account for partially visible lines at
/// either edge.
pub fn field_height(
    metrics: EditorMetrics,
    window_height_px: f64,
    visible_lines: u32,
    line_count: u32,
    last_visible_line: Option<u32>,
) -> f64 {
    let padding_top = metrics.margin_top.unwrap_or(0.0);
    let per_line = (window_height_px - padding_top) / (f64::from(visible_lines) + 2.0);
    let expected_line_height = metrics.font_size.unwrap_or(DEFAULT_FONT_SIZE) * 1.5;
    let last_line_visible = last_visible_line.is_some_and(|last| line_count <= last.saturating_add(1));

    if per_line > expected_line_height && last_line_visible {
        expected_line_height * f64::from(visible_lines) + padding_top
    } else {
        window_height_px - padding_top
    }
}
