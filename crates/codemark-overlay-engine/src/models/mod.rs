pub mod annotation;
pub mod range;

pub use annotation::{Annotation, AnnotationKind, AnnotationStatus};
pub use range::{
    MAX_RANGE_VALUE, Position, Range, RangeSetError, Selection, VisibleRange, VisibleRangeSet,
};
