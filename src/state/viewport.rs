//! Viewport state owned by the map view: transform, gesture, selection,
//! hover, and the redraw flag.

use tracing::{debug, trace};

use super::gesture::{GestureConfig, GestureOutcome, GestureState, WheelMode, wheel_factor};
use super::picker::{self, ViewportBounds};
use super::selection::SelectionModel;
use super::transform::{Point, Transform};
use crate::config::ViewerConfig;
use crate::model::{Entity, EntityId, Position, WorldSnapshot};
use crate::util::taxicab;

/// Coalesces redraw requests: any number of requests between two frames
/// result in one paint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameScheduler {
    dirty: bool,
}

impl FrameScheduler {
    /// Marks the view dirty. Returns `true` only for the first request
    /// since the last frame, i.e. when the driver must schedule a frame.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.dirty, true)
    }

    /// Called once per frame by the driver; clears the flag.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_pending(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone)]
pub struct ViewportState {
    pub transform: Transform,
    pub gesture: GestureState,
    pub selection: SelectionModel,
    pub hover: Option<Position>,
    /// Darken everything outside the selected entity's vision.
    pub show_fog: bool,
    pub frames: FrameScheduler,
    initial_transform: Transform,
    cfg: GestureConfig,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}

impl ViewportState {
    pub fn new(cfg: &ViewerConfig) -> Self {
        let transform = Transform::with_scale(cfg.initial_scale);
        Self {
            transform,
            gesture: GestureState::Idle,
            selection: SelectionModel::default(),
            hover: None,
            show_fog: false,
            frames: FrameScheduler::default(),
            initial_transform: transform,
            cfg: GestureConfig::from(cfg),
        }
    }

    pub fn gesture_config(&self) -> &GestureConfig {
        &self.cfg
    }

    /// Returns whether a new animation frame must be scheduled.
    pub fn request_redraw(&mut self) -> bool {
        self.frames.request()
    }

    /// Polled by the frame driver. `true` means paint now.
    pub fn begin_frame(&mut self) -> bool {
        let dirty = self.frames.take();
        // Active gestures keep the frame loop armed until release.
        if self.gesture.is_active() {
            self.frames.request();
        }
        dirty
    }

    pub fn set_transform(&mut self, transform: Transform) {
        let limits = self.cfg.limits;
        self.transform = Transform {
            scale: transform.scale.clamp(limits.min, limits.max),
            ..transform
        };
        self.request_redraw();
    }

    pub fn reset_transform(&mut self) {
        self.set_transform(self.initial_transform);
    }

    /// `anchor` is in canvas-local pixels.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> f64 {
        let applied = self.transform.zoom(anchor, factor, self.cfg.limits);
        if applied != factor {
            debug!(requested = factor, applied, scale = self.transform.scale, "zoom clamped");
        }
        self.request_redraw();
        applied
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform.pan(dx, dy);
        self.request_redraw();
    }

    pub fn center_on(&mut self, cell: Position, width: f64, height: f64) {
        self.transform.center_on(
            Point::new(cell.x as f64 + 0.5, cell.y as f64 + 0.5),
            width,
            height,
        );
        self.request_redraw();
    }

    /// View-only state following one entity: centered on its cell in a
    /// `size` x `size` canvas, selected, with its fog shown.
    pub fn focused_on(cfg: &ViewerConfig, entity: &Entity, size: f64) -> Self {
        let mut vp = Self::new(cfg);
        vp.selection.select(Some(entity.id));
        vp.show_fog = true;
        vp.center_on(entity.pos, size, size);
        vp
    }

    pub fn current_selection(&self) -> Option<EntityId> {
        self.selection.current()
    }

    /// Inverts `screen` and advances the selection on that cell.
    pub fn pick_at(
        &mut self,
        screen: Point,
        bounds: &ViewportBounds,
        snapshot: &WorldSnapshot,
    ) -> Option<EntityId> {
        let grid = snapshot.grid();
        let picked = match picker::invert(screen, bounds, &self.transform, grid) {
            Some(cell) => self.selection.pick_at(cell, snapshot.entities(), grid),
            None => None,
        };
        self.request_redraw();
        picked
    }

    /// Updates the hovered cell; `true` when it changed.
    pub fn hover_at(
        &mut self,
        screen: Option<Point>,
        bounds: &ViewportBounds,
        snapshot: &WorldSnapshot,
    ) -> bool {
        let cell = screen.and_then(|p| picker::invert(p, bounds, &self.transform, snapshot.grid()));
        if cell == self.hover {
            return false;
        }
        self.hover = cell;
        self.request_redraw();
        true
    }

    pub fn pointer_down(&mut self, button: i16, client: Point, bounds: &ViewportBounds) {
        let outcome = self.gesture.pointer_down(button, bounds.to_local(client));
        self.settle(outcome);
    }

    pub fn pointer_move(&mut self, client: Point, bounds: &ViewportBounds) {
        let outcome = self
            .gesture
            .pointer_move(bounds.to_local(client), &mut self.transform, &self.cfg);
        self.settle(outcome);
    }

    /// Ends a mouse drag. A tap picks at the press point.
    pub fn pointer_up(
        &mut self,
        bounds: &ViewportBounds,
        snapshot: &WorldSnapshot,
    ) -> Option<EntityId> {
        let outcome = self.gesture.pointer_up();
        self.finish(outcome, bounds, snapshot)
    }

    pub fn touch_start(&mut self, contacts: &[Point], bounds: &ViewportBounds) {
        let local = to_local_all(contacts, bounds);
        let outcome = self.gesture.touch_start(&local, &self.transform, &self.cfg);
        self.settle(outcome);
    }

    pub fn touch_move(&mut self, contacts: &[Point], bounds: &ViewportBounds) {
        let local = to_local_all(contacts, bounds);
        let outcome = self
            .gesture
            .touch_move(&local, &mut self.transform, &self.cfg);
        self.settle(outcome);
    }

    /// `remaining` are the touches still down after the release.
    pub fn touch_end(
        &mut self,
        remaining: &[Point],
        bounds: &ViewportBounds,
        snapshot: &WorldSnapshot,
    ) -> Option<EntityId> {
        let outcome = self.gesture.touch_end(remaining);
        self.finish(outcome, bounds, snapshot)
    }

    pub fn cancel_gesture(&mut self) {
        let outcome = self.gesture.cancel();
        self.settle(outcome);
    }

    /// Wheel zoom anchored under the pointer.
    pub fn wheel(&mut self, client: Point, bounds: &ViewportBounds, delta_y: f64, mode: WheelMode) {
        let factor = wheel_factor(delta_y, mode, self.cfg.wheel_base);
        self.zoom_at(bounds.to_local(client), factor);
    }

    fn settle(&mut self, outcome: GestureOutcome) {
        if outcome != GestureOutcome::Ignored {
            trace!(?outcome, "gesture");
            self.request_redraw();
        }
    }

    fn finish(
        &mut self,
        outcome: GestureOutcome,
        bounds: &ViewportBounds,
        snapshot: &WorldSnapshot,
    ) -> Option<EntityId> {
        match outcome {
            GestureOutcome::Tap(at) => self.pick_at(bounds.to_client(at), bounds, snapshot),
            other => {
                self.settle(other);
                None
            }
        }
    }
}

fn to_local_all(points: &[Point], bounds: &ViewportBounds) -> Vec<Point> {
    points.iter().map(|p| bounds.to_local(*p)).collect()
}

/// Entities whose own vision reaches `cell`. Distance is measured between
/// raw positions; vision does not wrap across the torus edge.
pub fn seers(entities: &[Entity], cell: Position) -> Vec<&Entity> {
    entities
        .iter()
        .filter(|e| taxicab(e.pos, cell) <= e.vision)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DynamicWorld, SnapshotUpdate, StaticWorld, WorldGrid};
    use std::collections::BTreeMap;

    fn snapshot(entities: Vec<Entity>) -> WorldSnapshot {
        let mut s = WorldSnapshot::default();
        s.apply(SnapshotUpdate::Static(StaticWorld {
            sim: "t".into(),
            grid: WorldGrid { width: 8, height: 8 },
            teams: BTreeMap::new(),
            block_types: vec![],
            max_energy: 100,
            steps: 1,
        }));
        s.apply(SnapshotUpdate::Dynamic(DynamicWorld {
            entities,
            ..DynamicWorld::default()
        }));
        s
    }

    fn agent(id: EntityId, name: &str, x: i32, y: i32, vision: i32) -> Entity {
        Entity {
            id,
            name: name.into(),
            team: "A".into(),
            pos: Position::new(x, y),
            vision,
            ..Entity::default()
        }
    }

    #[test]
    fn redraw_requests_coalesce() {
        let mut vp = ViewportState::default();
        assert!(vp.request_redraw());
        assert!(!vp.request_redraw());
        vp.pan(5.0, 5.0);
        assert!(vp.begin_frame());
        assert!(!vp.begin_frame());
    }

    #[test]
    fn active_gesture_rearms_frames() {
        let mut vp = ViewportState::default();
        vp.pointer_down(0, Point::new(10.0, 10.0), &ViewportBounds::at_origin(100.0, 100.0));
        assert!(vp.begin_frame());
        assert!(vp.frames.is_pending());
        let s = snapshot(vec![]);
        vp.pointer_up(&ViewportBounds::at_origin(100.0, 100.0), &s);
        assert!(vp.begin_frame());
        assert!(!vp.frames.is_pending());
    }

    #[test]
    fn tap_selects_entity_under_press_point() {
        let s = snapshot(vec![agent(1, "a1", 2, 1, 3)]);
        let mut vp = ViewportState::default();
        let bounds = ViewportBounds::at_origin(400.0, 400.0);
        vp.pointer_down(0, Point::new(50.0, 30.0), &bounds);
        vp.pointer_move(Point::new(58.0, 30.0), &bounds);
        assert_eq!(vp.pointer_up(&bounds, &s), Some(1));
        assert_eq!(vp.transform, Transform::with_scale(20.0));
    }

    #[test]
    fn drag_pans_and_does_not_pick() {
        let s = snapshot(vec![agent(1, "a1", 2, 1, 3)]);
        let mut vp = ViewportState::default();
        let bounds = ViewportBounds::at_origin(400.0, 400.0);
        vp.pointer_down(0, Point::new(50.0, 30.0), &bounds);
        vp.pointer_move(Point::new(90.0, 30.0), &bounds);
        assert_eq!(vp.pointer_up(&bounds, &s), None);
        assert_eq!(vp.current_selection(), None);
        assert_eq!(vp.transform.x, 40.0);
    }

    #[test]
    fn set_transform_clamps_scale() {
        let mut vp = ViewportState::default();
        vp.set_transform(Transform {
            x: 1.0,
            y: 2.0,
            scale: 1000.0,
        });
        assert_eq!(vp.transform.scale, 100.0);
        vp.reset_transform();
        assert_eq!(vp.transform, Transform::with_scale(20.0));
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut vp = ViewportState::default();
        let bounds = ViewportBounds::at_origin(400.0, 400.0);
        for _ in 0..20 {
            vp.wheel(Point::new(100.0, 100.0), &bounds, -300.0, WheelMode::Pixel);
        }
        assert!((vp.transform.scale - 100.0).abs() < 1e-9);
        for _ in 0..20 {
            vp.wheel(Point::new(100.0, 100.0), &bounds, 30.0, WheelMode::Page);
        }
        assert!((vp.transform.scale - 10.0).abs() < 1e-9);
    }

    #[test]
    fn jitter_inside_the_dead_zone_does_not_redraw() {
        let mut vp = ViewportState::default();
        let bounds = ViewportBounds::at_origin(400.0, 400.0);
        vp.pointer_down(0, Point::new(50.0, 50.0), &bounds);
        vp.frames.take();
        vp.pointer_move(Point::new(55.0, 58.0), &bounds);
        assert!(!vp.frames.is_pending());
        assert_eq!(vp.transform, Transform::with_scale(20.0));
        vp.pointer_move(Point::new(80.0, 50.0), &bounds);
        assert!(vp.frames.is_pending());
        assert_eq!(vp.transform.x, 30.0);
    }

    #[test]
    fn hover_only_reports_changes() {
        let s = snapshot(vec![]);
        let mut vp = ViewportState::default();
        let bounds = ViewportBounds::at_origin(400.0, 400.0);
        assert!(vp.hover_at(Some(Point::new(5.0, 5.0)), &bounds, &s));
        assert!(!vp.hover_at(Some(Point::new(15.0, 15.0)), &bounds, &s));
        assert_eq!(vp.hover, Some(Position::new(0, 0)));
        assert!(vp.hover_at(None, &bounds, &s));
        assert_eq!(vp.hover, None);
    }

    #[test]
    fn tap_in_offset_canvas_picks_under_the_press_point() {
        let s = snapshot(vec![agent(1, "a1", 2, 1, 3)]);
        let mut vp = ViewportState::default();
        let bounds = ViewportBounds {
            left: 300.0,
            top: 40.0,
            width: 400.0,
            height: 400.0,
        };
        vp.touch_start(&[Point::new(350.0, 70.0)], &bounds);
        assert_eq!(vp.touch_end(&[], &bounds, &s), Some(1));
    }

    #[test]
    fn pinch_zooms_around_canvas_local_center() {
        let mut vp = ViewportState::default();
        let bounds = ViewportBounds {
            left: 100.0,
            top: 100.0,
            width: 400.0,
            height: 400.0,
        };
        vp.touch_start(&[Point::new(150.0, 200.0), Point::new(250.0, 200.0)], &bounds);
        vp.touch_move(&[Point::new(100.0, 200.0), Point::new(300.0, 200.0)], &bounds);
        assert!((vp.transform.scale - 40.0).abs() < 1e-9);
        // Local center (100, 100) still shows world point (5, 5).
        let w = vp.transform.invert(Point::new(100.0, 100.0));
        assert!((w.x - 5.0).abs() < 1e-9 && (w.y - 5.0).abs() < 1e-9);
        let s = snapshot(vec![]);
        assert_eq!(vp.touch_end(&[Point::new(100.0, 200.0)], &bounds, &s), None);
        assert!(!vp.gesture.is_active());
    }

    #[test]
    fn focused_view_centers_and_selects_the_entity() {
        let cfg = ViewerConfig::default();
        let e = agent(9, "a9", 5, 3, 2);
        let vp = ViewportState::focused_on(&cfg, &e, 250.0);
        assert_eq!(vp.current_selection(), Some(9));
        assert!(vp.show_fog);
        assert!(!vp.gesture.is_active());
        let middle = vp.transform.invert(Point::new(125.0, 125.0));
        assert!((middle.x - 5.5).abs() < 1e-9 && (middle.y - 3.5).abs() < 1e-9);
        assert_eq!(vp.transform.scale, cfg.initial_scale);
        let bounds = ViewportBounds::at_origin(250.0, 250.0);
        assert_eq!(picker::invert(Point::new(125.0, 125.0), &bounds, &vp.transform, None), Some(e.pos));
    }

    #[test]
    fn vision_does_not_wrap() {
        let entities = vec![agent(1, "a1", 7, 7, 1), agent(2, "a2", 1, 0, 1)];
        let ids: Vec<_> = seers(&entities, Position::new(0, 0)).iter().map(|e| e.id).collect();
        assert_eq!(ids, [2]);
    }
}
