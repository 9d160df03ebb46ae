use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use gpui::{Axis, ElementId, point, size};
use gpui_dnd_reorder::{
    DragEvent, DragLayout, DraggableConfig, DraggableState, Error, ItemBounds, ItemInfo,
    ItemPosition, LazyListItemInfo, LazyListLayout, LazyListLayoutInfo, MIN_SCROLL, ScrollDriver,
    interpolate_out_of_bounds_scroll,
};

fn key(ix: usize) -> ElementId {
    ElementId::Name(format!("row-{ix}").into())
}

fn column(count: usize, item_size: f32) -> Vec<LazyListItemInfo> {
    (0..count)
        .map(|ix| LazyListItemInfo {
            index: ix,
            key: Some(key(ix)),
            offset: ix as f32 * item_size,
            size: item_size,
        })
        .collect()
}

/// Five 72px rows in a 400px tall viewport.
fn five_rows() -> LazyListLayout {
    LazyListLayoutInfo::new(Axis::Vertical, size(300., 400.))
        .items(column(5, 72.))
        .layout()
}

type Moves = Rc<RefCell<Vec<(usize, usize)>>>;

/// A state whose reorder callback records every proposed move and accepts it unless
/// the indices match.
fn recording_state() -> (DraggableState<ItemBounds>, Moves) {
    let moves: Moves = Rc::new(RefCell::new(Vec::new()));
    let state = DraggableState::new({
        let moves = moves.clone();
        move |from: &ItemPosition, to: &ItemPosition| {
            moves.borrow_mut().push((from.index, to.index));
            from.index == to.index
        }
    });
    (state, moves)
}

/// Free-form layout with gaps between items.
struct Grid {
    items: Vec<ItemBounds>,
}

impl Grid {
    fn new(cols: usize, rows: usize) -> Self {
        let mut items = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                let (left, top) = (col as f32 * 110., row as f32 * 60.);
                items.push(
                    ItemBounds::new(items.len(), None).with_rect(left, top, left + 100., top + 50.),
                );
            }
        }
        Self { items }
    }
}

impl DragLayout for Grid {
    type Item = ItemBounds;

    fn visible_items(&self) -> &[ItemBounds] {
        &self.items
    }

    fn viewport_start(&self) -> f32 {
        0.
    }

    fn viewport_end(&self) -> f32 {
        1000.
    }
}

#[test]
fn drag_down_two_rows_surfaces_nearest_candidates_first() {
    let layout = five_rows();
    let (mut state, moves) = recording_state();

    assert!(state.on_drag_start(&layout, 10., 160.));
    assert_eq!(state.dragging_item_index(), Some(2));
    assert_eq!(state.dragging_item_key(), Some(&key(2)));

    let selected = state.selected().cloned().unwrap();
    let targets = state.find_targets(&layout, point(0., 100.), &selected);
    let indices: Vec<_> = targets.iter().map(|t| t.item.index).collect();
    assert_eq!(indices, vec![3, 4]);

    state.on_drag(&layout, 0., 100.).unwrap();
    assert_eq!(moves.borrow().as_slice(), &[(2, 3)]);
    assert_eq!(state.dragging_item_index(), Some(3));
    assert_eq!(state.delta(), point(0., 100.));
}

#[test]
fn overshooting_the_viewport_end_scrolls_forward_and_ramps_up() {
    let layout = five_rows();
    let (mut state, _) = recording_state();

    assert!(state.on_drag_start(&layout, 0., 300.));
    state.on_drag(&layout, 0., 60.).unwrap();
    assert!(state.is_auto_scrolling());

    let max = state.settings().max_scroll_per_frame;
    let samples: Vec<f32> = [0, 1_000, 1_250, 1_500]
        .into_iter()
        .map(|ms| state.calc_auto_scroll_offset(&layout, Duration::from_millis(ms)))
        .collect();
    assert_eq!(samples[0], 1.);
    for pair in samples[1..].windows(2) {
        assert!(pair[0] < pair[1], "{samples:?}");
    }
    assert!(samples.iter().all(|v| *v > 0. && *v < max));
    assert_eq!(
        samples[3],
        state.calc_auto_scroll_offset(&layout, Duration::from_secs(10))
    );
}

#[test]
fn auto_scroll_loop_ends_once_the_item_is_back_inside() {
    let layout = five_rows();
    let (mut state, _) = recording_state();
    let now = Instant::now();

    assert!(state.on_drag_start(&layout, 0., 300.));
    state.on_drag(&layout, 0., 60.).unwrap();
    assert_eq!(state.auto_scroll_frame(&layout, now), Some(1.));
    let later = state
        .auto_scroll_frame(&layout, now + Duration::from_millis(1_000))
        .unwrap();
    assert!(later > 1.);

    state.on_drag(&layout, 0., -60.).unwrap();
    assert_eq!(
        state.auto_scroll_frame(&layout, now + Duration::from_millis(1_016)),
        None
    );
    assert!(!state.is_auto_scrolling());
    assert_eq!(state.auto_scroll_frame(&layout, now + Duration::from_millis(1_032)), None);
}

#[test]
fn ignored_index_snaps_back_without_animation() {
    let layout = five_rows();
    let (state, _) = recording_state();
    let mut state = state.ignore_animation_indices([2]);

    assert!(state.on_drag_start(&layout, 0., 150.));
    state.on_drag(&layout, 0., 20.).unwrap();
    let end = state.on_drag_canceled(&layout).unwrap();

    assert!(!end.animated);
    assert_eq!((end.start_index, end.end_index), (2, 2));
    assert!(state.cancel_animation_state().position().is_none());
    assert_eq!(state.cancel_animation_state().offset(), point(0., 0.));
    state.tick_animation(Instant::now());
    assert_eq!(state.cancel_animation_state().offset(), point(0., 0.));
}

#[test]
fn no_op_move_keeps_the_dragging_index() {
    let layout = five_rows();
    let mut state = DraggableState::new(|from: &ItemPosition, to: &ItemPosition| {
        assert_eq!((from.index, to.index), (2, 3));
        true
    });

    assert!(state.on_drag_start(&layout, 0., 150.));
    state.on_drag(&layout, 0., 100.).unwrap();
    assert_eq!(state.dragging_item_index(), Some(2));
}

#[test]
fn capture_picks_the_single_item_under_the_pointer() {
    let grid = Grid::new(3, 3);
    for (x, y, expected) in [
        (5., 5., Some(0)),
        (150., 70., Some(4)),
        (309., 169., Some(8)),
        (105., 20., None),
        (50., 55., None),
        (400., 20., None),
    ] {
        let mut state = DraggableState::new(|_: &ItemPosition, _: &ItemPosition| false);
        assert_eq!(state.on_drag_start(&grid, x, y), expected.is_some(), "({x}, {y})");
        assert_eq!(state.dragging_item_index(), expected, "({x}, {y})");
    }
}

#[test]
fn targets_overlap_and_are_sorted_by_distance() {
    let grid = Grid::new(4, 4);
    let mut state = DraggableState::new(|_: &ItemPosition, _: &ItemPosition| true);
    assert!(state.on_drag_start(&grid, 120., 70.));
    let selected = state.selected().cloned().unwrap();

    for (dx, dy) in [(0., 0.), (40., 25.), (-90., 10.), (130., 70.), (55., -35.), (300., 200.)] {
        let delta = point(dx, dy);
        let projected = selected.translated(delta);
        let targets = state.find_targets(&grid, delta, &selected);

        for target in &targets {
            assert!(projected.overlaps(target.item), "delta {delta:?}");
            assert_ne!(target.item.index, selected.index);
        }
        for pair in targets.windows(2) {
            assert!(pair[0].distance <= pair[1].distance, "delta {delta:?}");
        }
    }
}

#[test]
fn rejected_slots_are_never_targets() {
    let layout = five_rows();
    let (state, moves) = recording_state();
    let mut state = state.can_drag_over(|position| position.index != 3);

    assert!(state.on_drag_start(&layout, 0., 150.));
    let selected = state.selected().cloned().unwrap();
    let targets = state.find_targets(&layout, point(0., 100.), &selected);
    assert!(targets.iter().all(|t| t.item.index != 3));

    state.on_drag(&layout, 0., 100.).unwrap();
    assert!(moves.borrow().iter().all(|(_, to)| *to != 3));
}

#[test]
fn scroll_velocity_follows_overshoot_sign() {
    let max = 20.;
    for elapsed in [0, 16, 100, 300, 500, 800, 1_500, 4_000] {
        let elapsed = Duration::from_millis(elapsed);
        let limit = Duration::from_millis(1_500);
        assert_eq!(interpolate_out_of_bounds_scroll(72., 0., elapsed, max, limit), 0.);

        for over in [0.5, 10., 72., 300.] {
            let down = interpolate_out_of_bounds_scroll(72., over, elapsed, max, limit);
            let up = interpolate_out_of_bounds_scroll(72., -over, elapsed, max, limit);
            assert!((MIN_SCROLL..=max).contains(&down), "{over} after {elapsed:?}: {down}");
            assert!((-max..=-MIN_SCROLL).contains(&up), "{over} after {elapsed:?}: {up}");
        }
    }
}

#[test]
fn cancel_resets_the_session() {
    let layout = five_rows();
    let (mut state, _) = recording_state();

    assert!(state.on_drag_start(&layout, 0., 300.));
    state.on_drag(&layout, 0., 60.).unwrap();
    assert!(state.is_auto_scrolling());

    let end = state.on_drag_canceled(&layout).unwrap();
    assert!(end.animated);
    assert_eq!(state.dragging_item_index(), None);
    assert_eq!(state.delta(), point(0., 0.));
    assert!(!state.is_auto_scrolling());
    assert!(state.selected().is_none());
    assert_eq!(state.auto_scroll_frame(&layout, Instant::now()), None);
}

#[test]
fn drag_calls_outside_a_session_are_rejected() {
    let layout = five_rows();
    let (mut state, moves) = recording_state();

    assert!(matches!(state.on_drag(&layout, 0., 40.), Err(Error::NoActiveDrag)));
    assert!(matches!(state.on_drag_canceled(&layout), Err(Error::NoActiveDrag)));
    assert_eq!(state.delta(), point(0., 0.));
    assert!(moves.borrow().is_empty());

    // Nothing under the pointer: no session starts.
    assert!(!state.on_drag_start(&layout, 0., 390.));
    assert!(matches!(state.on_drag(&layout, 0., 40.), Err(Error::NoActiveDrag)));
}

#[test]
fn second_drag_start_is_ignored_while_dragging() {
    let layout = five_rows();
    let (mut state, _) = recording_state();

    assert!(state.on_drag_start(&layout, 0., 10.));
    assert!(!state.on_drag_start(&layout, 0., 150.));
    assert_eq!(state.dragging_item_index(), Some(0));
}

#[test]
fn listeners_see_the_session_in_order() {
    let layout = five_rows();
    let (mut state, _) = recording_state();
    let events = Rc::new(RefCell::new(Vec::new()));
    state.subscribe({
        let events = events.clone();
        move |event| events.borrow_mut().push(event.clone())
    });

    let ended = Rc::new(RefCell::new(None));
    let mut state = state.on_drag_end({
        let ended = ended.clone();
        move |from, to| *ended.borrow_mut() = Some((from, to))
    });

    let now = Instant::now();
    assert!(state.on_drag_start(&layout, 0., 150.));
    state.on_drag(&layout, 0., 100.).unwrap();
    state.on_drag_canceled(&layout).unwrap();
    state.tick_animation(now);
    state.tick_animation(now + Duration::from_secs(2));

    let moved_to = ItemPosition::new(3, Some(key(3)));
    assert_eq!(
        events.borrow().as_slice(),
        &[
            DragEvent::Started {
                index: 2,
                key: Some(key(2)),
            },
            DragEvent::Moved {
                from: ItemPosition::new(2, Some(key(2))),
                to: moved_to,
            },
            DragEvent::CancelAnimationStarted(ItemPosition::new(3, Some(key(2)))),
            DragEvent::Ended {
                start_index: 2,
                end_index: 3,
            },
            DragEvent::CancelAnimationFinished,
        ]
    );
    assert_eq!(*ended.borrow(), Some((2, 3)));
}

#[test]
fn horizontal_lists_drag_along_x() {
    let layout = LazyListLayoutInfo::new(Axis::Horizontal, size(500., 60.))
        .items(column(5, 100.))
        .layout();
    let (mut state, moves) = recording_state();

    // The cross axis is ignored when hit-testing.
    assert!(state.on_drag_start(&layout, 150., 45.));
    assert_eq!(state.dragging_item_index(), Some(1));

    state.on_drag(&layout, 120., 30.).unwrap();
    assert_eq!(moves.borrow().as_slice(), &[(1, 2)]);
    assert_eq!(state.dragging_item_left(&layout), 20.);
    assert_eq!(state.dragging_item_top(&layout), 30.);
}

#[test]
fn reversed_lists_grow_upwards() {
    let layout = LazyListLayoutInfo::new(Axis::Vertical, size(300., 400.))
        .reverse_layout(true)
        .items(column(5, 72.))
        .layout();
    let (mut state, moves) = recording_state();

    // Row 2 sits at 184..256 when rows stack up from the bottom edge.
    assert!(state.on_drag_start(&layout, 0., 200.));
    assert_eq!(state.dragging_item_index(), Some(2));

    state.on_drag(&layout, 0., -60.).unwrap();
    assert!(moves.borrow().is_empty());
    state.on_drag(&layout, 0., -20.).unwrap();
    assert_eq!(moves.borrow().as_slice(), &[(2, 3)]);
}

#[test]
fn reversed_lists_scroll_towards_the_top_edge() {
    let layout = LazyListLayoutInfo::new(Axis::Vertical, size(300., 400.))
        .reverse_layout(true)
        .items(column(5, 72.))
        .layout();
    let (mut state, _) = recording_state();

    // Row 4 spans 40..112; dragging it 60px up leaves it 20px above the viewport.
    assert!(state.on_drag_start(&layout, 0., 50.));
    state.on_drag(&layout, 0., -60.).unwrap();
    assert!(state.is_auto_scrolling());
    assert!(state.calc_auto_scroll_offset(&layout, Duration::from_millis(1_500)) < -1.);
}

#[test]
fn config_changes_scroll_speed() {
    let layout = five_rows();
    let config = DraggableConfig {
        max_scroll_per_frame: 40.,
        ..DraggableConfig::default()
    };
    let (state, _) = recording_state();
    let mut state = state.config(config);

    assert!(state.on_drag_start(&layout, 0., 300.));
    state.on_drag(&layout, 0., 400.).unwrap();
    assert_eq!(
        state.calc_auto_scroll_offset(&layout, Duration::from_secs(2)),
        40.
    );
}

#[test]
fn dragged_item_that_scrolled_away_keeps_its_session() {
    let layout = five_rows();
    let (mut state, moves) = recording_state();
    assert!(state.on_drag_start(&layout, 0., 10.));

    // Row 0 is no longer laid out.
    let scrolled = LazyListLayoutInfo::new(Axis::Vertical, size(300., 400.))
        .items(column(5, 72.).into_iter().skip(1).collect::<Vec<_>>())
        .layout();
    state.on_drag(&scrolled, 0., 100.).unwrap();
    assert!(moves.borrow().is_empty());
    assert_eq!(state.dragging_item_index(), Some(0));
    assert_eq!(state.dragging_item_top(&scrolled), 0.);
    assert_eq!(state.delta(), point(0., 100.));
    assert!(scrolled.item_at_index(0).is_none());
    assert_eq!(layout.item_at_index(0).map(|item| item.top()), Some(0.));
}

/// Rows of a list scrolled to `scroll`, clipped to a `viewport` tall window.
fn scrolled_column(count: usize, item_size: f32, scroll: f32, viewport: f32) -> LazyListLayout {
    let visible: Vec<_> = column(count, item_size)
        .into_iter()
        .map(|item| LazyListItemInfo {
            offset: item.offset - scroll,
            ..item
        })
        .filter(|item| item.offset < viewport && item.offset + item.size > 0.)
        .collect();
    LazyListLayoutInfo::new(Axis::Vertical, size(300., viewport))
        .items(visible)
        .layout()
}

#[test]
fn scrolling_under_a_still_pointer_resolves_a_new_target() {
    let (mut state, moves) = recording_state();
    let mut scroll = ScrollDriver::default();
    scroll.set_extent(8. * 72., 400.);

    let layout = scrolled_column(8, 72., scroll.position(), 400.);
    assert!(!scroll.observe(layout.visible_window()));
    assert!(state.on_drag_start(&layout, 0., 300.));
    assert_eq!(state.dragging_item_index(), Some(4));

    // Row 4 now sticks 20px out of the bottom edge without passing row 5.
    state.on_drag(&layout, 0., 60.).unwrap();
    assert!(moves.borrow().is_empty());
    assert!(state.is_auto_scrolling());

    let velocity = state.auto_scroll_frame(&layout, Instant::now()).unwrap();
    assert!(velocity >= MIN_SCROLL);
    assert_eq!(scroll.scroll_by(80.), 80.);

    let scrolled = scrolled_column(8, 72., scroll.position(), 400.);
    assert!(scroll.observe(scrolled.visible_window()));
    state.on_drag(&scrolled, 0., 0.).unwrap();

    assert_eq!(moves.borrow().as_slice(), &[(4, 5)]);
    assert_eq!(state.dragging_item_index(), Some(5));
    assert_eq!(state.delta(), point(0., 60.));
    // Row 5 slid up to 280..352, the item keeps following the pointer at 348.
    assert_eq!(state.dragging_item_top(&scrolled), 68.);
}
