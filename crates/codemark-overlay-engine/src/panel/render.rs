use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::host::EditorContext;
use crate::layout::affordance::{self, AffordanceLayout, AffordanceState, Placement};
use crate::layout::anchors::{LineAssignment, assign_lines, document_order};
use crate::layout::viewport::{fold_boundaries, line_top, to_local, total_visible_lines};
use crate::layout::visibility::{DisplayFilters, FilterCounts, ViewportCounts, compute_visibility};
use crate::models::Annotation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStyle {
    #[default]
    Inline,
    List,
}

/// One codemark element to draw beside its line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPlacement {
    pub id: String,
    pub line: u32,
    pub local_index: u32,
    /// Declared top; the overlap pass adds its offset on top of this
    pub top: f64,
    pub hidden: bool,
    pub selected: bool,
    pub hover: bool,
}

/// Everything the rendering collaborator needs for one pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPass {
    pub view_style: ViewStyle,
    pub loading: bool,
    pub field_height_px: f64,
    pub assignment: LineAssignment,
    pub hidden_ids: BTreeSet<String>,
    pub viewport_counts: ViewportCounts,
    pub filter_counts: FilterCounts,
    /// Inline view: codemarks whose assigned line is on screen
    pub markers: Vec<MarkerPlacement>,
    /// List view: visible codemark ids in document order
    pub list: Vec<String>,
    /// Tops of the folded-code indicators between visible ranges
    pub fold_indicators: Vec<f64>,
    pub affordances: AffordanceLayout,
}

/// Per-pass UI state owned by the panel
#[derive(Debug, Clone, Copy)]
pub(crate) struct RenderInputs<'a> {
    pub context: &'a EditorContext,
    pub annotations: &'a [Annotation],
    pub filters: DisplayFilters,
    pub view_style: ViewStyle,
    pub loading: bool,
    pub affordance: AffordanceState,
    pub hovered_line: Option<u32>,
    pub rippled_line: Option<u32>,
    pub selected: Option<&'a str>,
    pub highlighted: Option<&'a str>,
    pub compose_open: bool,
    pub window_height_px: f64,
}

pub(crate) fn render(inputs: RenderInputs<'_>) -> RenderPass {
    let ranges = inputs.context.visible_ranges();
    let total = total_visible_lines(ranges);

    let hidden = compute_visibility(inputs.annotations, inputs.filters);
    let assignment = assign_lines(inputs.annotations, &hidden);
    let hidden_ids: BTreeSet<String> = hidden
        .iter()
        .filter(|(_, is_hidden)| **is_hidden)
        .map(|(id, _)| id.clone())
        .collect();

    let field_height_px = affordance::field_height(
        inputs.context.metrics,
        inputs.window_height_px,
        total,
        inputs.context.line_count,
        inputs.context.last_visible_line(),
    );

    let mut pass = RenderPass {
        view_style: inputs.view_style,
        loading: inputs.loading,
        field_height_px,
        viewport_counts: assignment.viewport_counts(ranges),
        filter_counts: FilterCounts::from_annotations(inputs.annotations),
        hidden_ids,
        markers: Vec::new(),
        list: Vec::new(),
        fold_indicators: Vec::new(),
        affordances: AffordanceLayout::None,
        assignment: LineAssignment::default(),
    };

    if inputs.loading {
        pass.assignment = assignment;
        return pass;
    }

    match inputs.view_style {
        ViewStyle::List => {
            pass.list = document_order(inputs.annotations)
                .into_iter()
                .filter(|(_, a)| !pass.hidden_ids.contains(&a.id))
                .map(|(_, a)| a.id.clone())
                .collect();
        }
        ViewStyle::Inline => {
            let shown = assignment.visible.iter().map(|(line, id)| (line, id, false));
            let filtered = assignment.hidden.iter().map(|(line, id)| (line, id, true));
            let mut markers: Vec<MarkerPlacement> = shown
                .chain(filtered)
                .filter_map(|(&line, id, is_hidden)| {
                    let local_index = to_local(line, ranges)?;
                    let top = line_top(local_index, field_height_px, total)?;
                    Some(MarkerPlacement {
                        id: id.clone(),
                        line,
                        local_index,
                        top,
                        hidden: is_hidden,
                        selected: inputs.selected == Some(id.as_str()),
                        hover: inputs.highlighted == Some(id.as_str()),
                    })
                })
                .collect();
            markers.sort_by_key(|m| (m.local_index, m.hidden));
            pass.markers = markers;

            pass.fold_indicators = fold_boundaries(ranges)
                .into_iter()
                .filter_map(|local| line_top(local, field_height_px, total))
                .collect();
        }
    }

    pass.affordances = affordance::place(Placement {
        ranges,
        viewport_height_px: field_height_px,
        state: inputs.affordance,
        hovered: inputs.hovered_line,
        rippled: inputs.rippled_line,
        compose_open: inputs.compose_open,
    });
    pass.assignment = assignment;
    pass
}
