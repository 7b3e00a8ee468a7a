//! Scenario files: a frozen editor state plus a few gestures to replay.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use codemark_overlay_engine::host::MarkerDocument;
use codemark_overlay_engine::host::recording::{HostCall, RecordingHost};
use codemark_overlay_engine::snapshot::{self, Snap};
use codemark_overlay_engine::{
    Annotation, EditorContext, EditorMetrics, ElementGeometry, InlineCodemarksPanel,
    PanelSettings, Range, Selection, VisibleRangeSet, VisualMutation,
};
use futures_executor::block_on;
use serde::Deserialize;

const DEFAULT_ELEMENT_HEIGHT_PX: f64 = 30.0;

#[derive(Debug, Deserialize)]
pub struct AnnotationEntry {
    #[serde(flatten)]
    pub annotation: Annotation,
    /// Shorthand for a whole-line range
    pub line: Option<u32>,
}

impl AnnotationEntry {
    fn into_annotation(self) -> Annotation {
        let mut annotation = self.annotation;
        if annotation.range.is_none()
            && let Some(line) = self.line
        {
            annotation.range = Some(Range::whole_line(line));
        }
        annotation
    }
}

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub uri: String,
    pub line_count: u32,
    pub window_height_px: f64,
    /// Inclusive `[start, end]` line pairs, in order
    pub visible_ranges: Vec<(u32, u32)>,
    #[serde(default)]
    pub selection: Option<Selection>,
    #[serde(default)]
    pub metrics: EditorMetrics,
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
    /// Measured element heights by codemark id
    #[serde(default)]
    pub heights: HashMap<String, f64>,
    /// Codemarks clicked before rendering
    #[serde(default)]
    pub clicks: Vec<String>,
    /// Local row under the pointer
    #[serde(default)]
    pub hover_line: Option<u32>,
    /// Column scroll offsets replayed after rendering
    #[serde(default)]
    pub scroll_offsets: Vec<f64>,
}

/// What a replay produced
#[derive(Debug)]
pub struct Report {
    pub snap: Snap,
    pub revealed: Vec<u32>,
    pub calls: Vec<HostCall>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.snap)?;
        for line in &self.revealed {
            writeln!(f, "scrolled to line {line}")?;
        }
        for call in &self.calls {
            writeln!(f, "host {}", describe(call))?;
        }
        Ok(())
    }
}

fn describe(call: &HostCall) -> String {
    match call {
        HostCall::RevealRange(request) => format!(
            "reveal_range line {}{}",
            request.range.start.line,
            if request.at_top { " at top" } else { "" }
        ),
        HostCall::SelectRange(request) => format!(
            "select_range {}:{}",
            request.selection.cursor.line, request.selection.cursor.character
        ),
        HostCall::HighlightRange(request) => format!(
            "highlight_range line {} {}",
            request.range.start.line,
            if request.highlight { "on" } else { "off" }
        ),
        HostCall::FetchDocumentFromMarker { marker_id } => {
            format!("fetch_document_from_marker {marker_id}")
        }
        HostCall::FetchDocumentMarkers { uri } => format!("fetch_document_markers {uri}"),
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse scenario {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn run(self, settings: PanelSettings) -> Result<Report> {
        let visible_ranges = VisibleRangeSet::from_pairs(&self.visible_ranges)?;
        let context = EditorContext {
            uri: Some(self.uri.clone()),
            visible_ranges,
            line_count: self.line_count,
            selection: self.selection,
            metrics: self.metrics,
        };

        let annotations: Vec<Annotation> = self
            .annotations
            .into_iter()
            .map(AnnotationEntry::into_annotation)
            .collect();

        // every marker resolves to where the scenario says it is
        let host = annotations.iter().fold(
            RecordingHost::new().with_markers(self.uri.clone(), annotations.clone()),
            |host, annotation| match annotation.range {
                Some(range) => host.with_marker_document(
                    annotation.id.clone(),
                    MarkerDocument {
                        uri: self.uri.clone(),
                        range,
                    },
                ),
                None => host,
            },
        );

        let mut panel = InlineCodemarksPanel::new(host, settings);
        block_on(async {
            panel.update_context(context).await;
            panel
                .mount(Box::new(|| log::debug!("Scenario observer released")))
                .await;
            for id in &self.clicks {
                panel.click_codemark(id).await;
            }
        });
        if let Some(local_index) = self.hover_line {
            panel.hover_line(local_index);
        }

        let pass = panel.render(self.window_height_px);
        log::info!(
            "Rendered {} codemarks in a {}px column",
            pass.markers.len(),
            pass.field_height_px
        );

        let elements: Vec<ElementGeometry> = pass
            .markers
            .iter()
            .map(|marker| {
                let height = self
                    .heights
                    .get(&marker.id)
                    .copied()
                    .unwrap_or(DEFAULT_ELEMENT_HEIGHT_PX);
                let element = ElementGeometry::codemark(marker.id.clone(), marker.top, height);
                if marker.hidden { element.hidden() } else { element }
            })
            .collect();
        for element in &elements {
            panel.observe_mutation(VisualMutation::ElementAdded {
                id: element.id.clone(),
            });
        }
        let resolution = panel.on_frame(&elements).cloned();
        let snap = snapshot::normalize(&pass, resolution.as_ref());

        let mut revealed = Vec::new();
        for offset in &self.scroll_offsets {
            if let Some(line) = block_on(panel.on_scroll(*offset)) {
                revealed.push(line);
            }
        }

        let calls = panel.host().calls();
        panel.teardown();

        Ok(Report {
            snap,
            revealed,
            calls,
        })
    }
}
