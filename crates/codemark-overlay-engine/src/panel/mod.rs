/*!
 * # Inline Codemarks Panel
 *
 * Stateful controller that owns the current editor context and annotation
 * list, feeds them through the layout stages, and turns user gestures into
 * host requests.
 *
 * All callbacks run on one logical thread. A host request is awaited before
 * the callback returns; when it fails the failure is logged and the panel is
 * left exactly as it was before the request. After `teardown` every callback
 * is a no-op.
 */

mod render;

pub use render::{MarkerPlacement, RenderPass, ViewStyle};

use std::time::Instant;

use log::{debug, warn};

use crate::host::{
    Disposable, EditorContext, EditorHost, HighlightRangeRequest, HostError, HostNotification,
    RevealRangeRequest, SelectRangeRequest,
};
use crate::layout::affordance::{self, AffordanceState, ComposeKind, ComposeRequest};
use crate::layout::anchors::assign_lines;
use crate::layout::frame::{FrameSlot, VisualMutation};
use crate::layout::overlap::{ElementGeometry, OverlapSettings, Resolution, resolve};
use crate::layout::scroll::{ScrollSettings, ScrollSync, WheelDeltaMode, WheelTracker};
use crate::layout::viewport::total_visible_lines;
use crate::layout::visibility::{DisplayFilters, compute_visibility};
use crate::layout::LineAssignment;
use crate::models::{Annotation, Range, Selection};

/// User-adjustable knobs, normally loaded from the config file
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelSettings {
    pub filters: DisplayFilters,
    pub view_style: ViewStyle,
    pub overlap: OverlapSettings,
    pub scroll: ScrollSettings,
}

pub struct InlineCodemarksPanel<H: EditorHost> {
    host: H,
    settings: PanelSettings,
    context: EditorContext,
    annotations: Vec<Annotation>,
    loading: bool,
    affordance: AffordanceState,
    hovered_line: Option<u32>,
    rippled_line: Option<u32>,
    compose_open: bool,
    selected: Option<String>,
    highlighted: Option<String>,
    scroll: ScrollSync,
    wheel: WheelTracker,
    frame: FrameSlot<VisualMutation>,
    last_resolution: Option<Resolution>,
    disposables: Vec<Box<dyn Disposable>>,
    torn_down: bool,
}

impl<H: EditorHost> InlineCodemarksPanel<H> {
    pub fn new(host: H, settings: PanelSettings) -> Self {
        Self {
            host,
            settings,
            context: EditorContext::default(),
            annotations: Vec::new(),
            loading: false,
            affordance: AffordanceState::default(),
            hovered_line: None,
            rippled_line: None,
            compose_open: false,
            selected: None,
            highlighted: None,
            scroll: ScrollSync::new(settings.scroll),
            wheel: WheelTracker::new(settings.scroll),
            frame: FrameSlot::new(),
            last_resolution: None,
            disposables: Vec::new(),
            torn_down: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> PanelSettings {
        self.settings
    }

    pub fn context(&self) -> &EditorContext {
        &self.context
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn affordance_state(&self) -> AffordanceState {
        self.affordance
    }

    pub fn is_compose_open(&self) -> bool {
        self.compose_open
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn last_resolution(&self) -> Option<&Resolution> {
        self.last_resolution.as_ref()
    }

    /// Subscribe to host notifications, take ownership of the visual-tree
    /// observer handle and load markers for the current document.
    pub async fn mount(&mut self, observer: Box<dyn Disposable>) {
        if self.torn_down {
            observer.dispose();
            return;
        }
        self.disposables.push(self.host.subscribe());
        self.disposables.push(observer);
        self.reload_markers().await;
    }

    /// Replace the editor context.
    ///
    /// Returns the offset the annotation column should be parked at when the
    /// editor's first visible line moved.
    pub async fn update_context(&mut self, context: EditorContext) -> Option<f64> {
        if self.torn_down {
            return None;
        }

        let previous = std::mem::replace(&mut self.context, context);
        self.affordance = AffordanceState::derive(self.affordance, self.context.current_selection());

        if previous.uri != self.context.uri {
            self.selected = None;
            self.highlighted = None;
            self.annotations.clear();
            self.reload_markers().await;
        }

        let first = self.context.first_visible_line();
        let moved = first.is_none() || previous.first_visible_line() != first;
        if moved {
            self.wheel.reset();
            Some(self.scroll.recenter())
        } else {
            None
        }
    }

    async fn reload_markers(&mut self) {
        let Some(uri) = self.context.uri.clone() else {
            return;
        };

        self.loading = true;
        match self.host.fetch_document_markers(&uri).await {
            Ok(annotations) => {
                debug!("Loaded {} markers for {uri}", annotations.len());
                self.annotations = annotations;
            }
            Err(e) => warn!("Keeping previous markers for {uri}: {e}"),
        }
        self.loading = false;
    }

    /// Line assignment for the current annotations and filters
    pub fn assignment(&self) -> LineAssignment {
        let hidden = compute_visibility(&self.annotations, self.settings.filters);
        assign_lines(&self.annotations, &hidden)
    }

    pub fn render(&self, window_height_px: f64) -> RenderPass {
        render::render(render::RenderInputs {
            context: &self.context,
            annotations: &self.annotations,
            filters: self.settings.filters,
            view_style: self.settings.view_style,
            loading: self.loading,
            affordance: self.affordance,
            hovered_line: self.hovered_line,
            rippled_line: self.rippled_line,
            selected: self.selected.as_deref(),
            highlighted: self.highlighted.as_deref(),
            compose_open: self.compose_open,
            window_height_px,
        })
    }

    /// Feed one change from the visual-tree observer.
    ///
    /// Returns true when a resolution pass is now pending for the next frame.
    pub fn observe_mutation(&mut self, mutation: VisualMutation) -> bool {
        if self.torn_down || !mutation.affects_layout() {
            return false;
        }
        if self.frame.schedule(mutation) {
            debug!("Coalesced layout trigger into pending frame");
        }
        self.frame.is_pending()
    }

    /// Frame boundary: run the pending resolution pass, if any, against the
    /// element heights measured for this frame.
    pub fn on_frame(&mut self, elements: &[ElementGeometry]) -> Option<&Resolution> {
        if self.torn_down {
            return None;
        }
        self.frame.take()?;
        self.last_resolution = Some(resolve(elements, self.settings.overlap));
        self.last_resolution.as_ref()
    }

    pub fn hover_line(&mut self, local_index: u32) {
        if self.torn_down {
            return;
        }
        self.hovered_line = Some(local_index);
    }

    pub fn unhover_line(&mut self, local_index: u32) {
        if self.hovered_line == Some(local_index) {
            self.hovered_line = None;
        }
    }

    /// Start a pass that opens each affordance row in turn, top to bottom.
    ///
    /// Returns the first rippled local index, or `None` when nothing is on
    /// screen.
    pub fn start_ripple(&mut self) -> Option<u32> {
        if self.torn_down {
            return None;
        }
        self.rippled_line = (total_visible_lines(self.context.visible_ranges()) > 0).then_some(0);
        self.rippled_line
    }

    /// One ripple step; the pass ends after the last visible line.
    pub fn advance_ripple(&mut self) -> Option<u32> {
        let total = total_visible_lines(self.context.visible_ranges());
        self.rippled_line = self
            .rippled_line
            .and_then(|line| line.checked_add(1))
            .filter(|&line| line < total);
        self.rippled_line
    }

    /// Click on an affordance row. The returned request is handed to the
    /// compose form; the panel itself only tracks that one is open.
    pub fn click_affordance(
        &mut self,
        kind: ComposeKind,
        local_index: u32,
        top: f64,
    ) -> Option<ComposeRequest> {
        if self.torn_down {
            return None;
        }

        let request = affordance::compose_for_click(
            kind,
            local_index,
            top,
            self.context.visible_ranges(),
            self.affordance,
            self.context.current_selection(),
        )?;

        self.affordance = self.affordance.after_click();
        self.hovered_line = None;
        self.compose_open = true;
        Some(request)
    }

    pub fn close_compose(&mut self) {
        self.compose_open = false;
    }

    /// Select a codemark and scroll the editor to where its marker lives now
    pub async fn click_codemark(&mut self, annotation_id: &str) {
        if self.torn_down {
            return;
        }

        match self.host.fetch_document_from_marker(annotation_id).await {
            Ok(Some(document)) => {
                let request = RevealRangeRequest {
                    uri: document.uri,
                    range: document.range,
                    at_top: false,
                    preserve_focus: true,
                };
                if let Err(e) = self.host.reveal_range(request).await {
                    log_failure(e);
                    return;
                }
            }
            Ok(None) => {
                debug!("Marker {annotation_id} has no document location");
                return;
            }
            Err(e) => {
                log_failure(e);
                return;
            }
        }

        self.selected = Some(annotation_id.to_owned());
        self.clear_editor_selection().await;
    }

    /// Highlight (or un-highlight) the code a codemark points at
    pub async fn hover_codemark(&mut self, annotation_id: &str, highlight: bool) {
        if self.torn_down {
            return;
        }
        let Some(uri) = self.context.uri.clone() else {
            return;
        };

        let Some(range) = self.marker_range(annotation_id).await else {
            debug!("No range to highlight for {annotation_id}");
            return;
        };

        let request = HighlightRangeRequest {
            uri,
            range,
            highlight,
        };
        match self.host.highlight_range(request).await {
            Ok(()) if highlight => self.highlighted = Some(annotation_id.to_owned()),
            Ok(()) => {
                if self.highlighted.as_deref() == Some(annotation_id) {
                    self.highlighted = None;
                }
            }
            Err(e) => log_failure(e),
        }
    }

    async fn marker_range(&self, annotation_id: &str) -> Option<Range> {
        let known = self
            .annotations
            .iter()
            .find(|a| a.id == annotation_id)
            .and_then(|a| a.range);
        if known.is_some() {
            return known;
        }
        match self.host.fetch_document_from_marker(annotation_id).await {
            Ok(document) => document.map(|d| d.range),
            Err(e) => {
                log_failure(e);
                None
            }
        }
    }

    /// Reveal the nearest visible codemark above the viewport.
    ///
    /// Returns the line that was revealed at the top of the editor.
    pub async fn show_above(&mut self) -> Option<u32> {
        if self.torn_down {
            return None;
        }
        let first = self.context.first_visible_line()?;
        let line = self
            .assignment()
            .visible
            .range(..first)
            .next_back()
            .map(|(line, _)| line.saturating_sub(1))?;

        self.reveal_line(line, true).await.then_some(line)
    }

    /// Reveal the nearest visible codemark below the viewport
    pub async fn show_below(&mut self) -> Option<u32> {
        if self.torn_down {
            return None;
        }
        let last = self.context.last_visible_line()?;
        let line = self
            .assignment()
            .visible
            .range(last.saturating_add(1)..)
            .next()
            .map(|(line, _)| line.saturating_add(1).min(self.context.line_count))?;

        self.reveal_line(line, false).await.then_some(line)
    }

    /// Scroll event on the annotation column
    pub async fn on_scroll(&mut self, offset_px: f64) -> Option<u32> {
        if self.torn_down {
            return None;
        }
        let current_top = self.context.first_visible_line()?;
        let target = self
            .scroll
            .on_scroll(offset_px, current_top)?
            .min(self.context.line_count);

        self.reveal_line(target, true).await.then_some(target)
    }

    /// Wheel event over the annotation column
    pub async fn on_wheel(&mut self, delta_y: f64, mode: WheelDeltaMode, now: Instant) -> Option<u32> {
        if self.torn_down {
            return None;
        }
        let current_top = self.context.first_visible_line()?;
        let target =
            self.wheel
                .on_wheel(delta_y, mode, current_top, self.context.line_count, now)?;

        self.reveal_line(target, true).await.then_some(target)
    }

    async fn reveal_line(&self, line: u32, at_top: bool) -> bool {
        let Some(uri) = self.context.uri.clone() else {
            return false;
        };
        let request = RevealRangeRequest {
            uri,
            range: Range::at_line(line),
            at_top,
            preserve_focus: true,
        };
        match self.host.reveal_range(request).await {
            Ok(()) => true,
            Err(e) => {
                log_failure(e);
                false
            }
        }
    }

    /// Drop the selected codemark and collapse the editor selection
    pub async fn deselect(&mut self) {
        if self.torn_down {
            return;
        }
        self.selected = None;
        self.compose_open = false;
        self.clear_editor_selection().await;
    }

    async fn clear_editor_selection(&mut self) {
        let Some(uri) = self.context.uri.clone() else {
            return;
        };
        let Some(selection) = self.context.current_selection().copied() else {
            return;
        };
        if selection.is_empty() {
            return;
        }

        let request = SelectRangeRequest {
            uri,
            selection: Selection::caret(selection.cursor),
            preserve_focus: true,
        };
        match self.host.select_range(request).await {
            Ok(response) if response.success => {
                self.affordance.open_line = None;
            }
            Ok(_) => debug!("Host declined to collapse the selection"),
            Err(e) => log_failure(e),
        }
    }

    pub fn toggle_show_archived(&mut self) -> bool {
        self.settings.filters.show_archived = !self.settings.filters.show_archived;
        self.settings.filters.show_archived
    }

    pub fn toggle_show_resolved(&mut self) -> bool {
        self.settings.filters.show_resolved = !self.settings.filters.show_resolved;
        self.settings.filters.show_resolved
    }

    pub fn toggle_view_style(&mut self) -> ViewStyle {
        self.settings.view_style = match self.settings.view_style {
            ViewStyle::Inline => ViewStyle::List,
            ViewStyle::List => ViewStyle::Inline,
        };
        self.settings.view_style
    }

    pub async fn handle_notification(&mut self, notification: HostNotification) {
        if self.torn_down {
            return;
        }
        match notification {
            HostNotification::DocumentMarkersChanged { uri } => {
                if self.context.uri.as_deref() == Some(uri.as_str()) {
                    self.reload_markers().await;
                }
            }
            HostNotification::ShowCodemark { annotation_id } => {
                if self.annotations.iter().any(|a| a.id == annotation_id) {
                    self.selected = Some(annotation_id);
                } else {
                    debug!("Asked to show unknown codemark {annotation_id}");
                }
            }
        }
    }

    /// Release every subscription and observer synchronously
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.frame.close();
        self.hovered_line = None;
        self.rippled_line = None;
        for disposable in self.disposables.drain(..) {
            disposable.dispose();
        }
        debug!("Inline codemarks panel torn down");
    }
}

impl<H: EditorHost> Drop for InlineCodemarksPanel<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn log_failure(error: HostError) {
    warn!("{error}");
}

#[cfg(test)]
mod tests;
