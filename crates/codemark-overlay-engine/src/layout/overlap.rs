//! Push-down stacking of rendered annotation elements.
//!
//! Elements are sorted by the top they were declared with at creation and
//! swept once from the top. Each element is pushed down just far enough to
//! sit `min_gap_px` below the bottom of the element before it. An element's
//! offset depends only on elements above it, and re-running on an unchanged
//! geometry gives the same offsets, so the resolver can run after every
//! visual mutation without oscillating.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapSettings {
    /// Minimum vertical space between two stacked elements
    pub min_gap_px: f64,
    /// Bottom edge assumed above the first element
    pub initial_bottom_px: f64,
}

impl Default for OverlapSettings {
    fn default() -> Self {
        Self {
            min_gap_px: 20.0,
            initial_bottom_px: -30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Codemark,
    /// The floating compose form; stacks with the visible codemarks
    Compose,
}

/// Geometry of one rendered element as measured by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementGeometry {
    pub id: String,
    pub kind: ElementKind,
    pub declared_top: f64,
    pub measured_height: f64,
    #[serde(default)]
    pub hidden: bool,
}

impl ElementGeometry {
    pub fn codemark(id: impl Into<String>, declared_top: f64, measured_height: f64) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Codemark,
            declared_top,
            measured_height,
            hidden: false,
        }
    }

    pub fn compose(declared_top: f64, measured_height: f64) -> Self {
        Self {
            id: "compose".to_string(),
            kind: ElementKind::Compose,
            declared_top,
            measured_height,
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Final placement of one element after a resolution pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedElement {
    pub id: String,
    pub declared_top: f64,
    pub measured_height: f64,
    pub applied_offset: f64,
}

impl PositionedElement {
    pub fn top(&self) -> f64 {
        self.declared_top + self.applied_offset
    }

    pub fn bottom(&self) -> f64 {
        self.top() + self.measured_height
    }
}

/// Result of one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub visible: Vec<PositionedElement>,
    pub hidden: Vec<PositionedElement>,
}

impl Resolution {
    pub fn offset_of(&self, id: &str) -> Option<f64> {
        self.visible
            .iter()
            .chain(self.hidden.iter())
            .find(|e| e.id == id)
            .map(|e| e.applied_offset)
    }
}

/// Stack one group of elements, returned in sweep order
pub fn stack(elements: &[ElementGeometry], settings: OverlapSettings) -> Vec<PositionedElement> {
    let mut ordered: Vec<&ElementGeometry> = elements.iter().collect();
    ordered.sort_by(|a, b| a.declared_top.total_cmp(&b.declared_top));

    let mut bottom_of_last = settings.initial_bottom_px;
    ordered
        .into_iter()
        .map(|element| {
            let gap = bottom_of_last - element.declared_top + settings.min_gap_px;
            let applied_offset = if gap > 0.0 { gap } else { 0.0 };
            bottom_of_last = element.declared_top + element.measured_height + applied_offset;
            PositionedElement {
                id: element.id.clone(),
                declared_top: element.declared_top,
                measured_height: element.measured_height,
                applied_offset,
            }
        })
        .collect()
}

/// Resolve visible elements and hidden elements as two independent stacks
pub fn resolve(elements: &[ElementGeometry], settings: OverlapSettings) -> Resolution {
    let (hidden, visible): (Vec<ElementGeometry>, Vec<ElementGeometry>) =
        elements.iter().cloned().partition(|e| e.hidden);
    Resolution {
        visible: stack(&visible, settings),
        hidden: stack(&hidden, settings),
    }
}
