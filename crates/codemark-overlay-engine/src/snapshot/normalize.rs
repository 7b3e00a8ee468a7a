use std::fmt;

use serde::Serialize;

use crate::layout::affordance::AffordanceLayout;
use crate::layout::overlap::Resolution;
use crate::panel::{RenderPass, ViewStyle};

/// One line per fact, in a fixed order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snap {
    pub lines: Vec<String>,
}

impl fmt::Display for Snap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

pub fn normalize(pass: &RenderPass, resolution: Option<&Resolution>) -> Snap {
    let mut lines = Vec::new();

    let style = match pass.view_style {
        ViewStyle::Inline => "inline",
        ViewStyle::List => "list",
    };
    lines.push(format!("{style} column {}px", pass.field_height_px));
    if pass.loading {
        lines.push("loading".to_string());
    }
    lines.push(format!(
        "above {} below {}",
        pass.viewport_counts.above, pass.viewport_counts.below
    ));
    lines.push(format!(
        "archived {} resolved {}",
        pass.filter_counts.archived, pass.filter_counts.resolved
    ));

    for (line, id) in &pass.assignment.visible {
        lines.push(format!("line {line}: {id}"));
    }
    for (line, id) in &pass.assignment.hidden {
        lines.push(format!("line {line}: {id} (hidden)"));
    }

    for marker in &pass.markers {
        let mut flags = String::new();
        if marker.hidden {
            flags.push_str(" hidden");
        }
        if marker.selected {
            flags.push_str(" selected");
        }
        if marker.hover {
            flags.push_str(" hover");
        }
        lines.push(format!(
            "marker {} @{} (row {}){flags}",
            marker.id, marker.top, marker.local_index
        ));
    }

    for id in &pass.list {
        lines.push(format!("list {id}"));
    }

    for top in &pass.fold_indicators {
        lines.push(format!("fold @{top}"));
    }

    match &pass.affordances {
        AffordanceLayout::None => {}
        AffordanceLayout::Single(row) => {
            lines.push(format!("affordance line {} @{}", row.absolute_line, row.top));
        }
        AffordanceLayout::Column(rows) => {
            let hovered = rows.iter().find(|row| row.hover).map(|row| row.absolute_line);
            match hovered {
                Some(line) => lines.push(format!("affordances {} (hover line {line})", rows.len())),
                None => lines.push(format!("affordances {}", rows.len())),
            }
        }
    }

    if let Some(resolution) = resolution {
        for element in &resolution.visible {
            lines.push(format!("offset {} +{}", element.id, element.applied_offset));
        }
        for element in &resolution.hidden {
            lines.push(format!("offset {} +{} (hidden)", element.id, element.applied_offset));
        }
    }

    Snap { lines }
}
