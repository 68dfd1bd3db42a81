use std::{cell::RefCell, rc::Rc};

use glam::Vec2;

use crate::{
    error::RecyclerError,
    grid::{GridSizing, GridSpec, Padding, grid_dimensions},
    pool::{Template, TemplateId},
    recycler::{RecyclerArgs, RecyclerView},
    scroll::{MovementPolicy, ScrollInput, ScrollSettings},
    testing::{ContainerId, RecordingNode},
};

const CARDS: TemplateId = TemplateId(10);
const FRAME: f32 = 1.0 / 60.0;

fn cards(args: RecyclerArgs, items: usize) -> RecyclerView<RecordingNode> {
    let mut view = RecyclerView::new(ContainerId(3), args);
    view.register_template(RecordingNode::template(CARDS));
    view.initialize(CARDS, items, |node, index| node.show(index), None)
        .unwrap();
    view
}

fn column_args(row_height: f32, viewport_height: f32) -> RecyclerArgs {
    RecyclerArgs::default()
        .grid(GridSpec::default().cell_size(Vec2::new(120.0, row_height)))
        .viewport_size(Vec2::new(120.0, viewport_height))
}

fn assert_pool_invariants(view: &RecyclerView<RecordingNode>) {
    let stats = view.pool_stats();
    assert_eq!(stats.active + stats.free, stats.total_created);
    assert_eq!(stats.active, view.active_count());
    assert!(stats.active <= view.item_count());
}

#[test]
fn test_uniform_hundred_is_square() {
    assert_eq!(grid_dimensions(GridSizing::Uniform, 100), (10, 10));
    let layout = GridSpec::default()
        .sizing(GridSizing::Uniform)
        .measure(100, Vec2::splat(500.0));
    assert_eq!((layout.rows(), layout.columns()), (10, 10));
}

#[test]
fn test_grid_counts_never_zero() {
    for sizing in [
        GridSizing::Uniform,
        GridSizing::FixedColumns(0),
        GridSizing::FixedColumns(4),
        GridSizing::FixedRows(0),
        GridSizing::FixedRows(3),
    ] {
        for items in [0, 1, 2, 3, 5, 7, 10, 17, 99, 1000] {
            let (rows, columns) = grid_dimensions(sizing, items);
            assert!(rows >= 1 && columns >= 1, "{sizing:?} with {items}");
            assert!(rows * columns >= items, "{sizing:?} with {items}");
        }
    }
}

#[test]
fn test_fixed_columns_rounds_rows_up() {
    let view = cards(
        RecyclerArgs::default()
            .grid(GridSpec::default().sizing(GridSizing::FixedColumns(3)))
            .viewport_size(Vec2::new(300.0, 1000.0)),
        10,
    );
    assert_eq!(view.layout().rows(), 4);
    assert_eq!(view.layout().columns(), 3);
}

#[test]
fn test_pool_sized_to_viewport() {
    let view = cards(column_args(50.0, 220.0), 1_000);
    assert_eq!(view.active_count(), 6);
    assert_eq!(view.pool_stats().total_created, 6);
    assert_pool_invariants(&view);
}

#[test]
fn test_short_content_does_not_scroll() {
    let mut view = cards(column_args(50.0, 220.0), 3);
    assert!(!view.is_scrolling_allowed());
    assert_eq!(view.handle_size(), 1.0);
    assert!(!view.set_normalized_scroll_position(0.6, true));

    view.tick(FRAME, ScrollInput::wheel(30.0)).unwrap();
    assert_eq!(view.normalized_position(), 0.0);
    assert_eq!(view.visible_window().start_index, 0);
}

#[test]
fn test_stepped_request_snaps_to_row() {
    let args = column_args(40.0, 30.0).scroll(
        ScrollSettings::default()
            .movement(MovementPolicy::Direct)
            .step_scrolling(true),
    );
    // 10 rows of 40 in a 30 tall viewport: max extent 370.
    let mut view = cards(args, 10);
    assert_eq!(view.scroll().max_extent(), 370.0);

    view.set_normalized_scroll_position(37.0 / 370.0, true);
    assert_eq!(view.scroll().position(), 40.0);
    view.scroll_to_end(true);
    assert_eq!(view.scroll().position(), 370.0);
}

#[test]
fn test_position_stays_in_range_under_input() {
    let mut view = cards(column_args(50.0, 200.0), 200);
    let max = view.scroll().max_extent();
    let inputs = [
        ScrollInput::wheel(400.0),
        ScrollInput::drag(-10_000.0),
        ScrollInput::wheel(50_000.0),
        ScrollInput::drag(-3.5),
        ScrollInput::default(),
    ];
    for input in inputs.into_iter().cycle().take(60) {
        view.tick(FRAME, input).unwrap();
        let position = view.scroll().position();
        assert!((0.0..=max).contains(&position));
        let normalized = view.normalized_position();
        assert!((0.0..=1.0).contains(&normalized));
        assert_pool_invariants(&view);
    }
}

#[test]
fn test_eased_scroll_walks_the_window() {
    let args = column_args(50.0, 200.0).scroll(ScrollSettings::default().ease_duration(0.2));
    let mut view = cards(args, 500);
    view.scroll_to_end(false);

    let mut previous = view.visible_window().start_index;
    for _ in 0..240 {
        view.tick(FRAME, ScrollInput::default()).unwrap();
        let start = view.visible_window().start_index;
        assert!(start >= previous);
        previous = start;
    }
    assert_eq!(view.normalized_position(), 1.0);
    assert!(view.visible_window().contains(499));
    assert_eq!(view.pool_stats().total_created, 5);
}

#[test]
fn test_snap_then_readback_contains_index() {
    let args = RecyclerArgs::default()
        .grid(
            GridSpec::default()
                .sizing(GridSizing::FixedColumns(4))
                .cell_size(Vec2::new(50.0, 30.0))
                .spacing(Vec2::new(4.0, 6.0))
                .padding(Padding::all(10.0)),
        )
        .viewport_size(Vec2::new(220.0, 180.0));
    let mut view = cards(args, 333);

    for index in [0, 3, 4, 57, 150, 212, 329, 332] {
        view.snap_to_element(index, true).unwrap();
        view.tick(FRAME, ScrollInput::default()).unwrap();
        assert!(view.visible_window().contains(index), "index {index}");
        let node = view
            .displayed()
            .find(|(shown, _)| *shown == index)
            .map(|(_, node)| node.clone())
            .unwrap();
        assert_eq!(node.content, Some(index));
        assert_eq!(node.frame, view.layout().cell_frame(index));
    }
}

#[test]
fn test_update_all_is_idempotent() {
    let mut view = cards(column_args(50.0, 200.0), 40);
    view.snap_to_element(12, true).unwrap();

    view.update_all_displayed_items().unwrap();
    let first: Vec<RecordingNode> = view.displayed().map(|(_, node)| node.clone()).collect();
    view.update_all_displayed_items().unwrap();
    let second: Vec<RecordingNode> = view.displayed().map(|(_, node)| node.clone()).collect();

    let content = |nodes: &[RecordingNode]| {
        nodes
            .iter()
            .map(|node| (node.serial, node.content, node.frame))
            .collect::<Vec<_>>()
    };
    assert_eq!(content(&first), content(&second));
    assert!(second.iter().all(|node| node.updates > 0));
}

#[test]
fn test_zero_items() {
    let mut view = cards(column_args(50.0, 200.0), 0);
    assert_eq!(view.active_count(), 0);
    assert!(!view.is_scrolling_allowed());
    assert!(matches!(
        view.snap_to_element(0, true),
        Err(RecyclerError::IndexOutOfRange { index: 0, len: 0 })
    ));
    view.tick(FRAME, ScrollInput::wheel(10.0)).unwrap();
    assert_eq!(view.visible_window().count, 0);
}

#[test]
fn test_growing_dataset_reuses_pool() {
    let mut view = cards(column_args(50.0, 200.0), 2);
    assert_eq!(view.active_count(), 2);

    view.set_item_count(100);
    view.tick(FRAME, ScrollInput::default()).unwrap();
    assert_eq!(view.active_count(), 5);

    view.set_item_count(1);
    view.tick(FRAME, ScrollInput::default()).unwrap();
    let stats = view.pool_stats();
    assert_eq!((stats.active, stats.free, stats.total_created), (1, 4, 5));
}

#[test]
fn test_template_switch_keeps_pools_apart() {
    const ROWS: TemplateId = TemplateId(11);
    let mut view = cards(column_args(50.0, 200.0), 30);
    view.register_template(RecordingNode::template(ROWS));

    view.initialize(ROWS, 30, |node, index| node.show(index), None)
        .unwrap();
    assert_eq!(view.pools().pool(CARDS).unwrap().stats().active, 0);
    assert_eq!(view.pools().pool(ROWS).unwrap().stats().active, 5);

    view.initialize(CARDS, 30, |node, index| node.show(index), None)
        .unwrap();
    assert_eq!(view.pools().pool(CARDS).unwrap().stats().active, 5);
    assert_eq!(view.pools().pool(CARDS).unwrap().stats().total_created, 5);
    assert_eq!(view.pools().pool(ROWS).unwrap().stats().active, 0);
}

#[test]
fn test_factory_failure_aborts_refresh() {
    const FLAKY: TemplateId = TemplateId(12);
    let budget = Rc::new(RefCell::new(2));
    let remaining = budget.clone();

    let mut view = RecyclerView::new(ContainerId(3), column_args(50.0, 200.0));
    view.register_template(Template::new(FLAKY, move || {
        let mut left = remaining.borrow_mut();
        if *left == 0 {
            return Err("scene is full".into());
        }
        *left -= 1;
        Ok(RecordingNode::new(*left))
    }));

    let err = view
        .initialize(FLAKY, 50, |node, index| node.show(index), None)
        .unwrap_err();
    assert!(matches!(err, RecyclerError::Pool(_)));
    assert_eq!(view.pool_stats().total_created, 2);
    assert_eq!(*budget.borrow(), 0);
}

#[test]
fn test_factory_failure_is_not_retried_every_frame() {
    const FLAKY: TemplateId = TemplateId(13);
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();

    let mut view = RecyclerView::new(ContainerId(3), column_args(50.0, 200.0));
    view.register_template(Template::new(FLAKY, move || {
        let mut calls = counter.borrow_mut();
        *calls += 1;
        if *calls > 2 {
            return Err("scene is full".into());
        }
        Ok(RecordingNode::new(*calls))
    }));
    let pushes = Rc::new(RefCell::new(0));
    let sink = pushes.clone();
    view.set_scrollbar_listener(move |_| *sink.borrow_mut() += 1);

    assert!(
        view.initialize(FLAKY, 50, |node, index| node.show(index), None)
            .is_err()
    );
    assert_eq!(*calls.borrow(), 3);
    assert_eq!(view.visible_window().count, 2);

    for _ in 0..10 {
        view.tick(FRAME, ScrollInput::default()).unwrap();
    }
    assert_eq!(*calls.borrow(), 3);
    assert_eq!(*pushes.borrow(), 1);
    assert_eq!(view.visible_window().count, 2);

    assert!(view.refresh().is_err());
    assert_eq!(*calls.borrow(), 4);
    assert_eq!(view.active_count(), 2);
}
