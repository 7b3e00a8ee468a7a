use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Character offset used for "to the end of the line" ranges
pub const MAX_RANGE_VALUE: u32 = u32::MAX;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeSetError {
    #[error("Visible range {start_line}..={end_line} ends before it starts")]
    Inverted { start_line: u32, end_line: u32 },

    #[error("Visible range starting at line {start_line} overlaps or precedes the range ending at line {previous_end}")]
    OutOfOrder { start_line: u32, previous_end: u32 },
}

/// A 0-based position in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A span of document positions as the host editor reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width range at the start of `line`
    pub fn at_line(line: u32) -> Self {
        let position = Position::new(line, 0);
        Self::new(position, position)
    }

    /// Range covering all of `line`
    pub fn whole_line(line: u32) -> Self {
        Self::new(Position::new(line, 0), Position::new(line, MAX_RANGE_VALUE))
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The host editor's current selection; `cursor` is the active end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
    pub cursor: Position,
}

impl Selection {
    /// A caret with nothing selected
    pub fn caret(at: Position) -> Self {
        Self {
            start: at,
            end: at,
            cursor: at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range {
        Range::new(self.start, self.end)
    }
}

/// An inclusive span of absolute document lines that the editor is rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start_line: u32,
    pub end_line: u32,
}

impl VisibleRange {
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// Number of lines in the range, capped at `u32::MAX` for `0..=u32::MAX`
    pub fn len(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line).saturating_add(1)
    }

    pub fn contains(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}

impl From<Range> for VisibleRange {
    fn from(range: Range) -> Self {
        Self::new(range.start.line, range.end.line)
    }
}

/// Ordered, non-overlapping visible ranges. Gaps are folded or scrolled-out code.
///
/// Built once per host viewport report and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisibleRangeSet {
    ranges: Vec<VisibleRange>,
}

impl VisibleRangeSet {
    pub fn new(ranges: Vec<VisibleRange>) -> Result<Self, RangeSetError> {
        let mut previous_end: Option<u32> = None;
        for range in &ranges {
            if range.start_line > range.end_line {
                return Err(RangeSetError::Inverted {
                    start_line: range.start_line,
                    end_line: range.end_line,
                });
            }
            if let Some(previous_end) = previous_end
                && range.start_line <= previous_end
            {
                return Err(RangeSetError::OutOfOrder {
                    start_line: range.start_line,
                    previous_end,
                });
            }
            previous_end = Some(range.end_line);
        }
        Ok(Self { ranges })
    }

    /// Build from `(start, end)` pairs, mostly for tests and scenario files
    pub fn from_pairs(pairs: &[(u32, u32)]) -> Result<Self, RangeSetError> {
        Self::new(
            pairs
                .iter()
                .map(|&(start, end)| VisibleRange::new(start, end))
                .collect(),
        )
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisibleRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn first_line(&self) -> Option<u32> {
        self.ranges.first().map(|r| r.start_line)
    }

    pub fn last_line(&self) -> Option<u32> {
        self.ranges.last().map(|r| r.end_line)
    }

    /// Whether `line` is rendered by the editor
    pub fn contains(&self, line: u32) -> bool {
        self.ranges.iter().any(|r| r.contains(line))
    }
}
