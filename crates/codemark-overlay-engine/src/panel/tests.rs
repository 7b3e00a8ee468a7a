use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use futures_executor::block_on;
use pretty_assertions::assert_eq;

use super::*;
use crate::host::MarkerDocument;
use crate::host::recording::{HostCall, RecordingHost};
use crate::layout::affordance::{AffordanceLayout, EditorMetrics};
use crate::models::{Position, VisibleRangeSet};

const URI: &str = "file:///src/main.rs";

fn context(ranges: &[(u32, u32)], line_count: u32, selection: Option<Selection>) -> EditorContext {
    EditorContext {
        uri: Some(URI.to_string()),
        visible_ranges: VisibleRangeSet::from_pairs(ranges).unwrap(),
        line_count,
        selection,
        metrics: EditorMetrics::default(),
    }
}

fn annotation(id: &str, line: u32, created_at: i64) -> Annotation {
    Annotation {
        created_at,
        ..Annotation::at_line(id, line)
    }
}

fn noop_observer() -> Box<dyn Disposable> {
    Box::new(|| {})
}

/// Panel mounted on `URI` with the viewport at lines 10..=29 of 100
fn mounted(annotations: Vec<Annotation>) -> InlineCodemarksPanel<RecordingHost> {
    let host = RecordingHost::new().with_markers(URI, annotations);
    mounted_with(host, None)
}

fn mounted_with(
    host: RecordingHost,
    selection: Option<Selection>,
) -> InlineCodemarksPanel<RecordingHost> {
    let mut panel = InlineCodemarksPanel::new(host, PanelSettings::default());
    block_on(async {
        panel.update_context(context(&[(10, 29)], 100, selection)).await;
        panel.mount(noop_observer()).await;
    });
    panel.host().take_calls();
    panel
}

fn reveals(calls: &[HostCall]) -> Vec<(u32, bool)> {
    calls
        .iter()
        .filter_map(|call| match call {
            HostCall::RevealRange(request) => Some((request.range.start.line, request.at_top)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_mount_subscribes_and_loads_markers() {
    let host = RecordingHost::new().with_markers(URI, vec![annotation("a", 12, 0)]);
    let mut panel = InlineCodemarksPanel::new(host, PanelSettings::default());

    block_on(async {
        panel.update_context(context(&[(10, 29)], 100, None)).await;
        panel.mount(noop_observer()).await;
    });

    assert_eq!(panel.host().active_subscriptions(), 1);
    assert_eq!(panel.annotations().len(), 1);
    assert_eq!(
        panel.host().calls().last(),
        Some(&HostCall::FetchDocumentMarkers {
            uri: URI.to_string()
        })
    );
}

#[test]
fn test_first_line_change_recenters_column() {
    let mut panel = mounted(vec![]);

    let parked = block_on(panel.update_context(context(&[(11, 30)], 100, None)));
    assert_eq!(parked, Some(18.0));

    let parked = block_on(panel.update_context(context(&[(11, 30)], 100, None)));
    assert_eq!(parked, None);
}

#[test]
fn test_render_places_shifted_codemarks_beside_their_lines() {
    let panel = mounted(vec![
        annotation("a", 12, 0),
        annotation("b", 12, 1),
        annotation("c", 13, 2),
    ]);

    let pass = panel.render(600.0);

    let placed: Vec<(&str, u32, f64)> = pass
        .markers
        .iter()
        .map(|m| (m.id.as_str(), m.line, m.top))
        .collect();
    // 20 visible lines in a 600px column: 30px per line
    assert_eq!(placed, vec![("a", 12, 60.0), ("b", 13, 90.0), ("c", 14, 120.0)]);
    assert_eq!(pass.viewport_counts.above, 0);
    assert_eq!(pass.viewport_counts.below, 0);
    assert_eq!(pass.field_height_px, 600.0);
}

#[test]
fn test_render_counts_codemarks_outside_viewport() {
    let panel = mounted(vec![
        annotation("early", 2, 0),
        annotation("inside", 15, 0),
        annotation("late", 80, 0),
        annotation("later", 90, 0),
    ]);

    let pass = panel.render(600.0);
    assert_eq!(pass.viewport_counts.above, 1);
    assert_eq!(pass.viewport_counts.below, 2);
    assert_eq!(pass.markers.len(), 1);
}

#[test]
fn test_filters_toggle_hidden_codemarks() {
    let archived = Annotation {
        pinned: false,
        ..annotation("archived", 15, 0)
    };
    let mut panel = mounted(vec![archived, annotation("open", 15, 1)]);

    let pass = panel.render(600.0);
    assert_eq!(pass.filter_counts.archived, 1);
    assert!(pass.hidden_ids.contains("archived"));
    // hidden codemarks never push visible ones off their line
    assert_eq!(pass.assignment.visible_at(15), Some("open"));

    assert!(panel.toggle_show_archived());
    let pass = panel.render(600.0);
    assert!(pass.hidden_ids.is_empty());
    assert_eq!(pass.assignment.visible_at(15), Some("archived"));
    assert_eq!(pass.assignment.visible_at(16), Some("open"));
}

#[test]
fn test_list_view_orders_visible_codemarks() {
    let closed = Annotation {
        status: crate::models::AnnotationStatus::Closed,
        ..annotation("closed", 1, 0)
    };
    let mut panel = mounted(vec![annotation("z", 50, 0), closed, annotation("y", 5, 0)]);

    assert_eq!(panel.toggle_view_style(), ViewStyle::List);
    let pass = panel.render(600.0);
    assert_eq!(pass.list, vec!["y".to_string(), "z".to_string()]);
    assert!(pass.markers.is_empty());
}

#[test]
fn test_show_above_reveals_line_before_nearest_codemark() {
    let mut panel = mounted(vec![annotation("far", 3, 0), annotation("near", 7, 0)]);

    assert_eq!(block_on(panel.show_above()), Some(6));
    assert_eq!(reveals(&panel.host().calls()), vec![(6, true)]);
}

#[test]
fn test_show_below_reveals_line_after_nearest_codemark() {
    let mut panel = mounted(vec![annotation("near", 40, 0), annotation("far", 70, 0)]);

    assert_eq!(block_on(panel.show_below()), Some(41));
    assert_eq!(reveals(&panel.host().calls()), vec![(41, false)]);
}

#[test]
fn test_show_above_without_codemarks_sends_nothing() {
    let mut panel = mounted(vec![annotation("inside", 12, 0)]);

    assert_eq!(block_on(panel.show_above()), None);
    assert!(panel.host().calls().is_empty());
}

#[test]
fn test_column_scroll_reveals_one_line_per_gesture() {
    let host = RecordingHost::new();
    let mut panel = InlineCodemarksPanel::new(host, PanelSettings::default());
    block_on(panel.update_context(context(&[(100, 139)], 500, None)));

    assert_eq!(block_on(panel.on_scroll(3.0)), Some(99));

    // the editor catches up and the column is parked again
    let parked = block_on(panel.update_context(context(&[(99, 138)], 500, None)));
    assert_eq!(parked, Some(18.0));
    assert_eq!(block_on(panel.on_scroll(18.0)), None);

    assert_eq!(reveals(&panel.host().calls()), vec![(99, true)]);
}

#[test]
fn test_column_scroll_before_parking_requests_nothing_more() {
    let host = RecordingHost::new();
    let mut panel = InlineCodemarksPanel::new(host, PanelSettings::default());
    block_on(panel.update_context(context(&[(100, 139)], 500, None)));

    assert_eq!(block_on(panel.on_scroll(3.0)), Some(99));
    block_on(panel.update_context(context(&[(99, 138)], 500, None)));
    // the column hasn't reached its parked offset yet
    assert_eq!(block_on(panel.on_scroll(3.0)), None);

    assert_eq!(reveals(&panel.host().calls()), vec![(99, true)]);
}

#[test]
fn test_wheel_moves_editor_by_lines() {
    let mut panel = mounted(vec![]);

    let now = Instant::now();
    assert_eq!(
        block_on(panel.on_wheel(3.0, WheelDeltaMode::Lines, now)),
        Some(13)
    );
    assert_eq!(reveals(&panel.host().calls()), vec![(13, true)]);
}

#[test]
fn test_click_codemark_reveals_and_collapses_selection() {
    let selection = Selection {
        start: Position::new(12, 0),
        end: Position::new(14, 3),
        cursor: Position::new(14, 3),
    };
    let host = RecordingHost::new()
        .with_markers(URI, vec![annotation("a", 20, 0)])
        .with_marker_document(
            "a",
            MarkerDocument {
                uri: URI.to_string(),
                range: Range::whole_line(21),
            },
        );
    let mut panel = mounted_with(host, Some(selection));

    block_on(panel.click_codemark("a"));

    assert_eq!(panel.selected(), Some("a"));
    assert_eq!(
        panel.host().calls(),
        vec![
            HostCall::FetchDocumentFromMarker {
                marker_id: "a".to_string()
            },
            HostCall::RevealRange(RevealRangeRequest {
                uri: URI.to_string(),
                range: Range::whole_line(21),
                at_top: false,
                preserve_focus: true,
            }),
            HostCall::SelectRange(SelectRangeRequest {
                uri: URI.to_string(),
                selection: Selection::caret(Position::new(14, 3)),
                preserve_focus: true,
            }),
        ]
    );
    assert_eq!(panel.affordance_state().open_line, None);
}

#[test]
fn test_click_codemark_without_marker_location_is_abandoned() {
    let mut panel = mounted(vec![annotation("a", 20, 0)]);

    block_on(panel.click_codemark("a"));

    assert_eq!(panel.selected(), None);
    assert!(reveals(&panel.host().calls()).is_empty());
}

#[test]
fn test_host_failure_leaves_state_unchanged() {
    let host = RecordingHost::new()
        .with_markers(URI, vec![annotation("a", 20, 0)])
        .with_marker_document(
            "a",
            MarkerDocument {
                uri: URI.to_string(),
                range: Range::whole_line(20),
            },
        );
    let mut panel = mounted_with(host, None);
    panel.host().fail_requests(true);

    block_on(panel.click_codemark("a"));
    assert_eq!(panel.selected(), None);

    // a failed reload keeps the markers already shown
    block_on(panel.handle_notification(HostNotification::DocumentMarkersChanged {
        uri: URI.to_string(),
    }));
    assert_eq!(panel.annotations().len(), 1);
}

#[test]
fn test_hover_codemark_highlights_its_range() {
    let mut panel = mounted(vec![annotation("a", 20, 0)]);

    block_on(panel.hover_codemark("a", true));
    assert_eq!(panel.highlighted(), Some("a"));

    block_on(panel.hover_codemark("a", false));
    assert_eq!(panel.highlighted(), None);

    let highlights: Vec<bool> = panel
        .host()
        .calls()
        .iter()
        .filter_map(|call| match call {
            HostCall::HighlightRange(request) => Some(request.highlight),
            _ => None,
        })
        .collect();
    assert_eq!(highlights, vec![true, false]);
}

#[test]
fn test_affordance_click_opens_compose_for_whole_line() {
    let caret = Selection::caret(Position::new(12, 4));
    let mut panel = mounted_with(RecordingHost::new(), Some(caret));

    let pass = panel.render(600.0);
    assert!(matches!(pass.affordances, AffordanceLayout::Single(ref row) if row.absolute_line == 12));

    let request = panel.click_affordance(ComposeKind::Comment, 5, 150.0).unwrap();
    assert_eq!(request.absolute_line, 15);
    assert_eq!(request.range, Range::whole_line(15));
    assert!(request.set_selection);

    assert!(panel.is_compose_open());
    assert_eq!(panel.render(600.0).affordances, AffordanceLayout::None);

    panel.close_compose();
    assert!(!panel.is_compose_open());
}

#[test]
fn test_hovering_rows_tracks_local_line() {
    let mut panel = mounted(vec![]);
    panel.hover_line(4);
    panel.unhover_line(3);
    assert_eq!(panel.hovered_line, Some(4));
    panel.unhover_line(4);
    assert_eq!(panel.hovered_line, None);
}

#[test]
fn test_ripple_opens_each_column_row_in_turn() {
    let mut panel = InlineCodemarksPanel::new(RecordingHost::new(), PanelSettings::default());
    // caret inside the fold, so every visible row is offered
    let caret = Selection::caret(Position::new(15, 0));
    block_on(panel.update_context(context(&[(10, 11), (20, 21)], 100, Some(caret))));

    let open_rows = |panel: &InlineCodemarksPanel<RecordingHost>| -> Vec<u32> {
        panel
            .render(80.0)
            .affordances
            .rows()
            .iter()
            .filter(|row| row.open)
            .map(|row| row.absolute_line)
            .collect()
    };
    assert!(open_rows(&panel).is_empty());

    assert_eq!(panel.start_ripple(), Some(0));
    assert_eq!(open_rows(&panel), vec![10]);

    let mut seen = vec![];
    while let Some(local_index) = panel.advance_ripple() {
        seen.push(local_index);
    }
    assert_eq!(seen, vec![1, 2, 3]);
    assert!(open_rows(&panel).is_empty());
}

#[test]
fn test_ripple_needs_visible_lines() {
    let mut panel = InlineCodemarksPanel::new(RecordingHost::new(), PanelSettings::default());
    assert_eq!(panel.start_ripple(), None);
    assert_eq!(panel.advance_ripple(), None);
}

#[test]
fn test_mutations_within_a_frame_resolve_once() {
    let mut panel = mounted(vec![]);

    assert!(panel.observe_mutation(VisualMutation::ElementAdded { id: "a".into() }));
    assert!(panel.observe_mutation(VisualMutation::ElementAdded { id: "b".into() }));
    assert!(!panel.observe_mutation(VisualMutation::AttributeChanged {
        id: "a".into(),
        attribute: "style".into(),
    }));

    let elements = [
        ElementGeometry::codemark("a", 0.0, 40.0),
        ElementGeometry::codemark("b", 10.0, 30.0),
    ];
    let resolution = panel.on_frame(&elements).cloned().unwrap();
    assert_eq!(resolution.offset_of("a"), Some(0.0));
    assert_eq!(resolution.offset_of("b"), Some(50.0));

    assert!(panel.on_frame(&elements).is_none());
    assert_eq!(panel.last_resolution(), Some(&resolution));
}

#[test]
fn test_show_codemark_notification_selects_known_codemark() {
    let mut panel = mounted(vec![annotation("a", 20, 0)]);

    block_on(panel.handle_notification(HostNotification::ShowCodemark {
        annotation_id: "missing".into(),
    }));
    assert_eq!(panel.selected(), None);

    block_on(panel.handle_notification(HostNotification::ShowCodemark {
        annotation_id: "a".into(),
    }));
    assert_eq!(panel.selected(), Some("a"));

    block_on(panel.deselect());
    assert_eq!(panel.selected(), None);
}

#[test]
fn test_markers_changed_elsewhere_is_ignored() {
    let mut panel = mounted(vec![annotation("a", 20, 0)]);
    panel
        .host()
        .replace_markers(URI, vec![annotation("a", 20, 0), annotation("b", 21, 0)]);

    block_on(panel.handle_notification(HostNotification::DocumentMarkersChanged {
        uri: "file:///other.rs".into(),
    }));
    assert_eq!(panel.annotations().len(), 1);

    block_on(panel.handle_notification(HostNotification::DocumentMarkersChanged {
        uri: URI.into(),
    }));
    assert_eq!(panel.annotations().len(), 2);
}

#[test]
fn test_teardown_disposes_everything_once() {
    let observed = Rc::new(Cell::new(0));
    let counter = observed.clone();
    let host = RecordingHost::new().with_markers(URI, vec![annotation("near", 40, 0)]);
    let mut panel = InlineCodemarksPanel::new(host, PanelSettings::default());
    block_on(async {
        panel.update_context(context(&[(10, 29)], 100, None)).await;
        panel
            .mount(Box::new(move || counter.set(counter.get() + 1)))
            .await;
    });
    panel.observe_mutation(VisualMutation::ElementAdded { id: "a".into() });
    panel.host().take_calls();

    panel.teardown();
    panel.teardown();

    assert_eq!(observed.get(), 1);
    assert_eq!(panel.host().active_subscriptions(), 0);
    assert!(panel.is_torn_down());

    // every later callback is inert
    assert!(panel.on_frame(&[]).is_none());
    assert!(!panel.observe_mutation(VisualMutation::ElementRemoved { id: "a".into() }));
    assert_eq!(block_on(panel.show_below()), None);
    assert_eq!(block_on(panel.on_scroll(0.0)), None);
    assert!(panel.click_affordance(ComposeKind::Comment, 0, 0.0).is_none());
    assert!(panel.host().calls().is_empty());

    drop(panel);
    assert_eq!(observed.get(), 1);
}
