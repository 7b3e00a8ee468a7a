//! Interface to the host editor.
//!
//! Requests are asynchronous request/response calls with no timeout on this
//! side; a host that never answers leaves the panel in its last state. The
//! panel is single-threaded, so futures here are not required to be `Send`.

pub mod recording;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::EditorMetrics;
use crate::layout::viewport::total_visible_lines;
use crate::models::{Annotation, Range, RangeSetError, Selection, VisibleRange, VisibleRangeSet};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Host request {method} failed: {reason}")]
    RequestFailed { method: &'static str, reason: String },

    #[error("Host connection closed")]
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevealRangeRequest {
    pub uri: String,
    pub range: Range,
    pub at_top: bool,
    pub preserve_focus: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectRangeRequest {
    pub uri: String,
    pub selection: Selection,
    pub preserve_focus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectRangeResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightRangeRequest {
    pub uri: String,
    pub range: Range,
    pub highlight: bool,
}

/// Where a marker currently lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDocument {
    pub uri: String,
    pub range: Range,
}

/// Pushed by the host outside of any request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNotification {
    DocumentMarkersChanged { uri: String },
    /// The host asked for a codemark to be brought into focus
    ShowCodemark { annotation_id: String },
}

/// Something that must be released synchronously at teardown
pub trait Disposable {
    fn dispose(self: Box<Self>);
}

impl<F: FnOnce()> Disposable for F {
    fn dispose(self: Box<Self>) {
        (*self)()
    }
}

#[async_trait(?Send)]
pub trait EditorHost {
    async fn reveal_range(&self, request: RevealRangeRequest) -> Result<(), HostError>;

    async fn select_range(
        &self,
        request: SelectRangeRequest,
    ) -> Result<SelectRangeResponse, HostError>;

    async fn highlight_range(&self, request: HighlightRangeRequest) -> Result<(), HostError>;

    /// `None` when the marker no longer resolves to a document location
    async fn fetch_document_from_marker(
        &self,
        marker_id: &str,
    ) -> Result<Option<MarkerDocument>, HostError>;

    async fn fetch_document_markers(&self, uri: &str) -> Result<Vec<Annotation>, HostError>;

    /// Start delivering notifications; disposing the handle stops delivery
    fn subscribe(&self) -> Box<dyn Disposable>;
}

/// What the host last reported about the active editor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorContext {
    pub uri: Option<String>,
    pub visible_ranges: VisibleRangeSet,
    pub line_count: u32,
    pub selection: Option<Selection>,
    pub metrics: EditorMetrics,
}

impl EditorContext {
    /// Build from the raw ranges the host reports
    pub fn from_host_ranges(
        uri: Option<String>,
        ranges: &[Range],
        line_count: u32,
        selection: Option<Selection>,
        metrics: EditorMetrics,
    ) -> Result<Self, RangeSetError> {
        let visible_ranges =
            VisibleRangeSet::new(ranges.iter().copied().map(VisibleRange::from).collect())?;
        Ok(Self {
            uri,
            visible_ranges,
            line_count,
            selection,
            metrics,
        })
    }

    pub fn visible_ranges(&self) -> &VisibleRangeSet {
        &self.visible_ranges
    }

    pub fn visible_line_count(&self) -> u32 {
        total_visible_lines(&self.visible_ranges)
    }

    pub fn current_selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn first_visible_line(&self) -> Option<u32> {
        self.visible_ranges.first_line()
    }

    pub fn last_visible_line(&self) -> Option<u32> {
        self.visible_ranges.last_line()
    }
}
