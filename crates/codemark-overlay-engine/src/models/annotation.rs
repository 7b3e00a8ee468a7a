use serde::{Deserialize, Serialize};

use crate::models::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    #[default]
    Comment,
    Issue,
    Bookmark,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationStatus {
    #[default]
    Open,
    Closed,
}

/// A codemark anchored to a document, as read from the host's marker store.
///
/// The engine only reads these per render pass; it never writes them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    #[serde(default)]
    pub kind: AnnotationKind,
    #[serde(default)]
    pub status: AnnotationStatus,
    #[serde(default = "default_pinned")]
    pub pinned: bool,
    /// Current marker range, absent when the host could not relocate it
    #[serde(default)]
    pub range: Option<Range>,
    /// `[start_line, start_char, end_line, end_char]`, 1-based lines, recorded at creation
    #[serde(default)]
    pub location_when_created: Option<[u32; 4]>,
    /// Creation timestamp, used to order annotations that start on the same line
    #[serde(default)]
    pub created_at: i64,
}

fn default_pinned() -> bool {
    true
}

impl Annotation {
    /// An open, pinned comment anchored at `line`
    pub fn at_line(id: impl Into<String>, line: u32) -> Self {
        Self {
            id: id.into(),
            kind: AnnotationKind::Comment,
            status: AnnotationStatus::Open,
            pinned: true,
            range: Some(Range::whole_line(line)),
            location_when_created: None,
            created_at: 0,
        }
    }

    /// Unpinned codemarks are what the panel calls "archived"
    pub fn is_archived(&self) -> bool {
        !self.pinned
    }

    pub fn is_closed(&self) -> bool {
        self.status == AnnotationStatus::Closed
    }

    /// The line this annotation wants to sit on, if its marker has any location at all
    pub fn nominal_start_line(&self) -> Option<u32> {
        if let Some(range) = &self.range {
            return Some(range.start.line);
        }
        self.location_when_created
            .map(|location| location[0].saturating_sub(1))
    }
}
