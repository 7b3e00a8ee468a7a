//! In-process host that answers from fixed data and records every request.
//!
//! Used by the scenario runner and by tests that drive the panel without an
//! editor attached.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;

use super::{
    Disposable, EditorHost, HighlightRangeRequest, HostError, MarkerDocument, RevealRangeRequest,
    SelectRangeRequest, SelectRangeResponse,
};
use crate::models::Annotation;

/// One request the panel sent to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum HostCall {
    RevealRange(RevealRangeRequest),
    SelectRange(SelectRangeRequest),
    HighlightRange(HighlightRangeRequest),
    FetchDocumentFromMarker { marker_id: String },
    FetchDocumentMarkers { uri: String },
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    markers: RefCell<HashMap<String, Vec<Annotation>>>,
    marker_documents: HashMap<String, MarkerDocument>,
    calls: RefCell<Vec<HostCall>>,
    failing: Cell<bool>,
    subscriptions: Rc<Cell<usize>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(self, uri: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        self.markers.borrow_mut().insert(uri.into(), annotations);
        self
    }

    pub fn with_marker_document(mut self, marker_id: impl Into<String>, document: MarkerDocument) -> Self {
        self.marker_documents.insert(marker_id.into(), document);
        self
    }

    /// Change what `fetch_document_markers` returns from now on
    pub fn replace_markers(&self, uri: impl Into<String>, annotations: Vec<Annotation>) {
        self.markers.borrow_mut().insert(uri.into(), annotations);
    }

    /// Make every later request fail until switched back
    pub fn fail_requests(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<HostCall> {
        self.calls.take()
    }

    /// Subscriptions handed out and not yet disposed
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.get()
    }

    fn record(&self, method: &'static str, call: HostCall) -> Result<(), HostError> {
        self.calls.borrow_mut().push(call);
        if self.failing.get() {
            return Err(HostError::RequestFailed {
                method,
                reason: "host unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl EditorHost for RecordingHost {
    async fn reveal_range(&self, request: RevealRangeRequest) -> Result<(), HostError> {
        self.record("reveal_range", HostCall::RevealRange(request))
    }

    async fn select_range(
        &self,
        request: SelectRangeRequest,
    ) -> Result<SelectRangeResponse, HostError> {
        self.record("select_range", HostCall::SelectRange(request))?;
        Ok(SelectRangeResponse { success: true })
    }

    async fn highlight_range(&self, request: HighlightRangeRequest) -> Result<(), HostError> {
        self.record("highlight_range", HostCall::HighlightRange(request))
    }

    async fn fetch_document_from_marker(
        &self,
        marker_id: &str,
    ) -> Result<Option<MarkerDocument>, HostError> {
        self.record(
            "fetch_document_from_marker",
            HostCall::FetchDocumentFromMarker {
                marker_id: marker_id.to_string(),
            },
        )?;
        Ok(self.marker_documents.get(marker_id).cloned())
    }

    async fn fetch_document_markers(&self, uri: &str) -> Result<Vec<Annotation>, HostError> {
        self.record(
            "fetch_document_markers",
            HostCall::FetchDocumentMarkers {
                uri: uri.to_string(),
            },
        )?;
        Ok(self.markers.borrow().get(uri).cloned().unwrap_or_default())
    }

    fn subscribe(&self) -> Box<dyn Disposable> {
        let subscriptions = self.subscriptions.clone();
        subscriptions.set(subscriptions.get() + 1);
        Box::new(move || subscriptions.set(subscriptions.get().saturating_sub(1)))
    }
}
