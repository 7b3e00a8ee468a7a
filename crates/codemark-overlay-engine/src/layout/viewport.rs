//! Mapping between local line indices and absolute document lines.
//!
//! A local index is a 0-based position in the concatenation of every visible
//! range, so folded regions take up no local slots. Lookups that fall outside
//! the visible ranges return `None`; callers treat that as a no-op.

use crate::models::VisibleRangeSet;

/// Total number of lines rendered across every visible range, saturating at `u32::MAX`
pub fn total_visible_lines(ranges: &VisibleRangeSet) -> u32 {
    ranges.iter().fold(0u32, |total, r| total.saturating_add(r.len()))
}

/// Absolute document line shown at `local_index`
pub fn to_absolute(local_index: u32, ranges: &VisibleRangeSet) -> Option<u32> {
    let mut consumed = 0u32;
    for range in ranges.iter() {
        let len = range.len();
        if local_index < consumed.saturating_add(len) {
            return Some(range.start_line + (local_index - consumed));
        }
        consumed = consumed.saturating_add(len);
    }
    None
}

/// Local index of `absolute_line`, if the editor is rendering it
pub fn to_local(absolute_line: u32, ranges: &VisibleRangeSet) -> Option<u32> {
    let mut consumed = 0u32;
    for range in ranges.iter() {
        if range.contains(absolute_line) {
            return Some(consumed.saturating_add(absolute_line - range.start_line));
        }
        consumed = consumed.saturating_add(range.len());
    }
    None
}

/// Local indices where one visible range ends and the next begins.
///
/// The panel draws a folded-code marker at each of these.
pub fn fold_boundaries(ranges: &VisibleRangeSet) -> Vec<u32> {
    let mut boundaries = Vec::new();
    let mut consumed = 0u32;
    let count = ranges.len();
    for (index, range) in ranges.iter().enumerate() {
        consumed = consumed.saturating_add(range.len());
        if index + 1 < count {
            boundaries.push(consumed);
        }
    }
    boundaries
}

/// Pixel offset of `local_index` in a column `height_px` tall holding `total_lines` lines.
///
/// Positions are proportional because the host's own line height can't be queried.
pub fn line_top(local_index: u32, height_px: f64, total_lines: u32) -> Option<f64> {
    if total_lines == 0 {
        return None;
    }
    Some(height_px * f64::from(local_index) / f64::from(total_lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn folded() -> VisibleRangeSet {
        VisibleRangeSet::from_pairs(&[(10, 14), (20, 22)]).unwrap()
    }

    #[rstest]
    #[case(0, Some(10))]
    #[case(4, Some(14))]
    #[case(5, Some(20))]
    #[case(7, Some(22))]
    #[case(8, None)]
    fn test_to_absolute_across_fold(#[case] local: u32, #[case] expected: Option<u32>) {
        let ranges = folded();
        assert_eq!(total_visible_lines(&ranges), 8);
        assert_eq!(to_absolute(local, &ranges), expected);
    }

    #[rstest]
    #[case(10, Some(0))]
    #[case(14, Some(4))]
    #[case(20, Some(5))]
    #[case(22, Some(7))]
    #[case(17, None)]
    #[case(9, None)]
    #[case(23, None)]
    fn test_to_local_across_fold(#[case] absolute: u32, #[case] expected: Option<u32>) {
        assert_eq!(to_local(absolute, &folded()), expected);
    }

    #[test]
    fn test_empty_range_set_maps_nothing() {
        let ranges = VisibleRangeSet::empty();
        assert_eq!(to_absolute(0, &ranges), None);
        assert_eq!(to_local(0, &ranges), None);
        assert_eq!(total_visible_lines(&ranges), 0);
        assert!(fold_boundaries(&ranges).is_empty());
    }

    #[test]
    fn test_whole_line_space_does_not_overflow() {
        // one more line than a u32 can count
        let ranges = VisibleRangeSet::from_pairs(&[(0, 9), (10, u32::MAX)]).unwrap();
        assert_eq!(total_visible_lines(&ranges), u32::MAX);
        assert_eq!(to_absolute(12, &ranges), Some(12));
        assert_eq!(to_local(u32::MAX, &ranges), Some(u32::MAX));
        assert_eq!(fold_boundaries(&ranges), vec![10]);
    }

    #[test]
    fn test_fold_boundaries_between_ranges() {
        let ranges = VisibleRangeSet::from_pairs(&[(0, 2), (10, 11), (30, 30)]).unwrap();
        assert_eq!(fold_boundaries(&ranges), vec![3, 5]);
    }

    #[test]
    fn test_line_top_is_proportional() {
        assert_eq!(line_top(0, 400.0, 8), Some(0.0));
        assert_eq!(line_top(4, 400.0, 8), Some(200.0));
        assert_eq!(line_top(1, 100.0, 3), Some(100.0 / 3.0));
        assert_eq!(line_top(1, 100.0, 0), None);
    }

    fn range_set_strategy() -> impl Strategy<Value = VisibleRangeSet> {
        prop::collection::vec((0u32..20, 1u32..15), 0..8).prop_map(|spans| {
            let mut ranges = Vec::new();
            let mut next_start = 0u32;
            for (gap, len) in spans {
                let start = next_start + gap;
                let end = start + len - 1;
                ranges.push(crate::models::VisibleRange::new(start, end));
                next_start = end + 2;
            }
            VisibleRangeSet::new(ranges).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_local_round_trips(ranges in range_set_strategy()) {
            let total = total_visible_lines(&ranges);
            for local in 0..total {
                let absolute = to_absolute(local, &ranges).unwrap();
                prop_assert!(ranges.contains(absolute));
                prop_assert_eq!(to_local(absolute, &ranges), Some(local));
            }
            prop_assert_eq!(to_absolute(total, &ranges), None);
        }

        #[test]
        fn prop_absolute_round_trips(ranges in range_set_strategy(), line in 0u32..200) {
            match to_local(line, &ranges) {
                Some(local) => prop_assert_eq!(to_absolute(local, &ranges), Some(line)),
                None => prop_assert!(!ranges.contains(line)),
            }
        }

        #[test]
        fn prop_mapping_is_monotonic(ranges in range_set_strategy()) {
            let total = total_visible_lines(&ranges);
            let lines: Vec<u32> = (0..total).filter_map(|i| to_absolute(i, &ranges)).collect();
            prop_assert!(lines.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
