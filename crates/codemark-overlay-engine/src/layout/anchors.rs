//! Assigns each annotation to a distinct absolute line.
//!
//! Annotations are walked in document order (nominal start line, then creation
//! time) and each one claims the first unoccupied line at or after its nominal
//! start. Colliding annotations shift downward rather than being dropped.
//! Hidden annotations are placed in their own table so they never push a
//! visible annotation off its line.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::layout::visibility::ViewportCounts;
use crate::models::{Annotation, VisibleRangeSet};

/// Line → annotation id, rebuilt every render pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineAssignment {
    pub visible: BTreeMap<u32, String>,
    pub hidden: BTreeMap<u32, String>,
}

impl LineAssignment {
    /// Visible annotation claiming `line`
    pub fn visible_at(&self, line: u32) -> Option<&str> {
        self.visible.get(&line).map(String::as_str)
    }

    /// Hidden annotation claiming `line`
    pub fn hidden_at(&self, line: u32) -> Option<&str> {
        self.hidden.get(&line).map(String::as_str)
    }

    pub fn hidden_ids(&self) -> impl Iterator<Item = &str> {
        self.hidden.values().map(String::as_str)
    }

    pub fn line_of(&self, id: &str) -> Option<u32> {
        self.visible
            .iter()
            .chain(self.hidden.iter())
            .find(|(_, assigned)| assigned.as_str() == id)
            .map(|(line, _)| *line)
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.hidden.is_empty()
    }

    /// Above/below counts for the visible table only
    pub fn viewport_counts(&self, ranges: &VisibleRangeSet) -> ViewportCounts {
        ViewportCounts::from_lines(self.visible.keys().copied(), ranges)
    }
}

/// Annotations in the order they contend for lines.
///
/// Annotations with no location are left out entirely.
pub fn document_order(annotations: &[Annotation]) -> Vec<(u32, &Annotation)> {
    let mut ordered: Vec<(u32, &Annotation)> = annotations
        .iter()
        .filter_map(|a| a.nominal_start_line().map(|line| (line, a)))
        .collect();
    ordered.sort_by_key(|(line, a)| (*line, a.created_at));
    ordered
}

/// Build the line table. `hidden` is the per-pass visibility map; ids missing from it count as visible.
pub fn assign_lines(annotations: &[Annotation], hidden: &HashMap<String, bool>) -> LineAssignment {
    let mut assignment = LineAssignment::default();

    for (nominal, annotation) in document_order(annotations) {
        let is_hidden = hidden.get(&annotation.id).copied().unwrap_or(false);
        let table = if is_hidden {
            &mut assignment.hidden
        } else {
            &mut assignment.visible
        };

        let mut line = Some(nominal);
        while let Some(candidate) = line
            && table.contains_key(&candidate)
        {
            line = candidate.checked_add(1);
        }
        let Some(line) = line else {
            log::warn!(
                "codemark {} has no free line at or after {}, skipping it",
                annotation.id,
                nominal
            );
            continue;
        };
        if line != nominal {
            log::debug!(
                "codemark {} shifted from line {} to {} by earlier annotations",
                annotation.id,
                nominal,
                line
            );
        }
        table.insert(line, annotation.id.clone());
    }

    assignment
}
