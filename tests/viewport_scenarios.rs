use grid_monitor::model::{Position, SnapshotUpdate, WorldSnapshot};
use grid_monitor::render::{CellRect, fog_mask};
use grid_monitor::state::{picker, seers};
use grid_monitor::{Point, Transform, ViewerConfig, ViewportBounds, ViewportState};

const CELL: f64 = 20.0;

fn world(width: i32, height: i32, entities: &str) -> WorldSnapshot {
    let mut snapshot = WorldSnapshot::default();
    let st = format!(
        r#"{{"static": {{"sim": "scenario", "grid": {{"width": {width}, "height": {height}}},
            "teams": {{"A": {{"name": "A"}}, "B": {{"name": "B"}}}}, "blockTypes": ["b0"]}}}}"#
    );
    let dy = format!(r#"{{"dynamic": {{"step": 1, "entities": [{entities}]}}}}"#);
    for raw in [st, dy] {
        snapshot.apply(SnapshotUpdate::from_json(&raw).expect("scenario json"));
    }
    snapshot
}

fn agent(id: u64, name: &str, team: &str, x: i32, y: i32, vision: i32) -> String {
    format!(
        r#"{{"id": {id}, "name": "{name}", "team": "{team}", "pos": [{x}, {y}], "vision": {vision}}}"#
    )
}

/// Screen point at the center of `cell` under the default transform.
fn screen_of(cell: Position) -> Point {
    Point::new((cell.x as f64 + 0.5) * CELL, (cell.y as f64 + 0.5) * CELL)
}

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

#[test]
fn vision_does_not_wrap_across_the_edge() {
    let snapshot = world(8, 8, &agent(1, "agentA1", "A", 7, 7, 1));
    let mut vp = ViewportState::default();
    let bounds = ViewportBounds::at_origin(400.0, 400.0);

    assert!(vp.hover_at(Some(screen_of(Position::new(0, 0))), &bounds, &snapshot));
    let hover = vp.hover.expect("hovered cell");
    assert_eq!(hover, Position::new(0, 0));
    assert!(
        seers(snapshot.entities(), hover).is_empty(),
        "(7,7) is two steps away only through the wrap"
    );

    // The same cell next to the entity is seen.
    let near = seers(snapshot.entities(), Position::new(7, 6));
    assert_eq!(near.len(), 1);
}

#[test]
fn picks_repeat_every_world_width() {
    let snapshot = world(8, 8, &agent(1, "agentA1", "A", 3, 2, 1));
    let grid = snapshot.grid();
    // Shift the view right so negative world columns are on screen too.
    let transform = Transform {
        x: 400.0,
        y: 0.0,
        scale: CELL,
    };
    let bounds = ViewportBounds::at_origin(2000.0, 200.0);

    let reference = picker::invert(transform.apply(Point::new(3.5, 2.5)), &bounds, &transform, grid);
    assert_eq!(reference, Some(Position::new(3, 2)));
    for k in -2..=7 {
        let world_x = 3.5 + (8 * k) as f64;
        let screen = transform.apply(Point::new(world_x, 2.5));
        assert_eq!(
            picker::invert(screen, &bounds, &transform, grid),
            reference,
            "copy k={k} at screen x {}",
            screen.x
        );

        let mut vp = ViewportState::default();
        vp.set_transform(transform);
        assert_eq!(vp.pick_at(screen, &bounds, &snapshot), Some(1), "copy k={k}");
    }
}

#[test]
fn stacked_cell_cycles_front_to_back() {
    let entities = [
        agent(10, "agentA1", "A", 4, 4, 1),
        agent(11, "agentB1", "B", 4, 4, 1),
        agent(12, "agentA2", "A", 4, 4, 1),
    ]
    .join(",");
    let snapshot = world(8, 8, &entities);
    let mut vp = ViewportState::default();
    let bounds = ViewportBounds::at_origin(400.0, 400.0);
    let at = screen_of(Position::new(4, 4));

    // Painted A1, A2, B1; the topmost is offered first.
    let picks: Vec<_> = (0..4)
        .map(|_| vp.pick_at(at, &bounds, &snapshot))
        .collect();
    assert_eq!(picks, [Some(11), Some(12), Some(10), Some(11)]);
}

#[test]
fn short_press_picks_and_long_press_pans() {
    let snapshot = world(8, 8, &agent(7, "agentA1", "A", 2, 1, 1));
    let bounds = ViewportBounds {
        left: 50.0,
        top: 50.0,
        width: 400.0,
        height: 400.0,
    };
    let down = Point::new(50.0 + 50.0, 50.0 + 30.0);

    let mut vp = ViewportState::default();
    vp.pointer_down(0, down, &bounds);
    vp.pointer_move(Point::new(down.x + 12.0, down.y + 12.0), &bounds);
    assert_eq!(vp.pointer_up(&bounds, &snapshot), Some(7));
    assert_eq!(vp.transform, Transform::with_scale(CELL));

    let mut vp = ViewportState::default();
    vp.pointer_down(0, down, &bounds);
    vp.pointer_move(Point::new(down.x + 30.0, down.y), &bounds);
    assert_eq!(vp.pointer_up(&bounds, &snapshot), None);
    assert_eq!(vp.current_selection(), None);
    assert!(approx_eq(vp.transform.x, 30.0, 1e-9));
}

#[test]
fn zoom_keeps_anchor_and_stays_in_bounds() {
    let cfg = ViewerConfig::default();
    let mut vp = ViewportState::new(&cfg);
    // Deterministic pseudo-random walk over anchors and factors.
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        (seed % 10_000) as f64 / 10_000.0
    };
    for _ in 0..500 {
        let anchor = Point::new(next() * 800.0, next() * 600.0);
        let factor = 0.5 + next() * 1.5;
        let before = vp.transform.invert(anchor);
        let applied = vp.zoom_at(anchor, factor);
        let scale = vp.transform.scale;
        assert!(
            (cfg.min_scale..=cfg.max_scale).contains(&scale),
            "scale {scale} escaped limits"
        );
        let after = vp.transform.invert(anchor);
        if approx_eq(applied, factor, 1e-12) {
            assert!(approx_eq(before.x, after.x, 1e-6) && approx_eq(before.y, after.y, 1e-6));
        }
    }
}

#[test]
fn apply_then_invert_stays_in_the_same_cell() {
    let bounds = ViewportBounds::at_origin(640.0, 480.0);
    for &(x, y, scale) in &[(0.0, 0.0, 20.0), (-137.5, 42.25, 10.0), (310.0, -95.0, 73.3)] {
        let transform = Transform { x, y, scale };
        for sy in (0..480).step_by(37) {
            for sx in (0..640).step_by(41) {
                let screen = Point::new(sx as f64, sy as f64);
                let world = transform.invert(screen);
                let back = transform.apply(world);
                assert!(approx_eq(back.x, screen.x, 1e-6) && approx_eq(back.y, screen.y, 1e-6));
                assert_eq!(picker::invert(screen, &bounds, &transform, None), Some(world.cell()));
            }
        }
    }
}

#[test]
fn fog_leaves_the_vision_diamond_clear() {
    let bounds = CellRect { x: 0, y: 0, w: 9, h: 9 };
    let mask = fog_mask(Position::new(4, 4), 2, bounds);
    let fogged: i64 = mask.iter().map(CellRect::area).sum();
    assert_eq!(bounds.area() - fogged, 2 * 2 * 2 + 2 * 2 + 1);
}
