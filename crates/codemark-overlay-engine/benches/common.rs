use codemark_overlay_engine::{Annotation, ElementGeometry};

// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_annotations(count: usize) -> Vec<Annotation> {
    (0..count)
        .map(|i| {
            // every third codemark collides with its neighbour
            let line = (i - i % 3) as u32;
            Annotation {
                created_at: i as i64,
                pinned: i % 7 != 0,
                ..Annotation::at_line(format!("cm-{i}"), line)
            }
        })
        .collect()
}

#[allow(dead_code)]
pub fn generate_elements(count: usize) -> Vec<ElementGeometry> {
    (0..count)
        .map(|i| {
            let element = ElementGeometry::codemark(format!("cm-{i}"), i as f64 * 12.0, 40.0);
            if i % 5 == 0 { element.hidden() } else { element }
        })
        .collect()
}
