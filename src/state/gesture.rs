//! Drag and pinch gesture state machine.
//!
//! Raw pointer, touch and wheel input is fed in as plain points so the
//! machine can be driven from DOM callbacks or directly from tests. Every
//! handled input returns a [`GestureOutcome`]; the caller turns
//! [`GestureOutcome::Changed`] into a redraw request and
//! [`GestureOutcome::Tap`] into a pick.

use tracing::trace;

use super::transform::{Point, ScaleLimits, Transform};
use crate::config::ViewerConfig;

pub const PRIMARY_BUTTON: i16 = 0;

/// Wheel deltas reported in lines or pages are scaled by this instead
/// of 100.
const LINE_MODE_DIVISOR: f64 = 6.25;
const PIXEL_MODE_DIVISOR: f64 = 100.0;

/// Unit of a wheel delta, as in `WheelEvent.deltaMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WheelMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl WheelMode {
    /// 0 pixel, 1 line, 2 page; anything else is read as pixels.
    pub fn from_dom(delta_mode: u32) -> Self {
        match delta_mode {
            1 => WheelMode::Line,
            2 => WheelMode::Page,
            _ => WheelMode::Pixel,
        }
    }

    fn divisor(self) -> f64 {
        match self {
            WheelMode::Pixel => PIXEL_MODE_DIVISOR,
            WheelMode::Line | WheelMode::Page => LINE_MODE_DIVISOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub dead_zone: f64,
    pub pinch_min_distance: f64,
    pub wheel_base: f64,
    pub limits: ScaleLimits,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for GestureConfig {
    fn from(cfg: &ViewerConfig) -> Self {
        Self {
            dead_zone: cfg.drag_dead_zone,
            pinch_min_distance: cfg.pinch_min_distance,
            wheel_base: cfg.wheel_zoom_base,
            limits: cfg.scale_limits(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub first: Point,
    pub latest: Point,
    /// Set once the pointer has left the dead zone around `first`.
    pub started: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchAnchor {
    pub center: Point,
    pub distance: f64,
}

/// Captured at two-finger-down; every later frame is computed from here,
/// so zoom is relative to the gesture start rather than cumulative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    pub initial_transform: Transform,
    pub anchor: PinchAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(DragGesture),
    Pinching(PinchGesture),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    Ignored,
    Changed,
    /// Press and release inside the dead zone; pick at the press point.
    Tap(Point),
}

impl GestureState {
    pub fn is_active(&self) -> bool {
        !matches!(self, GestureState::Idle)
    }

    pub fn pointer_down(&mut self, button: i16, point: Point) -> GestureOutcome {
        if button != PRIMARY_BUTTON || matches!(self, GestureState::Pinching(_)) {
            return GestureOutcome::Ignored;
        }
        trace!(x = point.x, y = point.y, "drag begin");
        *self = GestureState::Dragging(DragGesture {
            first: point,
            latest: point,
            started: false,
        });
        GestureOutcome::Changed
    }

    pub fn pointer_move(
        &mut self,
        point: Point,
        transform: &mut Transform,
        cfg: &GestureConfig,
    ) -> GestureOutcome {
        let GestureState::Dragging(drag) = self else {
            return GestureOutcome::Ignored;
        };
        if !drag.started && point.distance_sq(drag.first) > cfg.dead_zone * cfg.dead_zone {
            trace!("drag left dead zone");
            drag.started = true;
        }
        if !drag.started {
            return GestureOutcome::Ignored;
        }
        transform.pan(point.x - drag.latest.x, point.y - drag.latest.y);
        drag.latest = point;
        GestureOutcome::Changed
    }

    pub fn pointer_up(&mut self) -> GestureOutcome {
        match std::mem::take(self) {
            GestureState::Dragging(drag) if !drag.started => {
                trace!(x = drag.first.x, y = drag.first.y, "tap");
                GestureOutcome::Tap(drag.first)
            }
            GestureState::Dragging(_) => GestureOutcome::Changed,
            other => {
                *self = other;
                GestureOutcome::Ignored
            }
        }
    }

    /// `contacts` is the full list of touches currently on the surface.
    pub fn touch_start(
        &mut self,
        contacts: &[Point],
        transform: &Transform,
        cfg: &GestureConfig,
    ) -> GestureOutcome {
        match contacts {
            [a, b, ..] => {
                let anchor = PinchAnchor {
                    center: a.midpoint(*b),
                    distance: a.distance(*b).max(cfg.pinch_min_distance),
                };
                trace!(distance = anchor.distance, "pinch begin");
                *self = GestureState::Pinching(PinchGesture {
                    initial_transform: *transform,
                    anchor,
                });
                GestureOutcome::Changed
            }
            [a] if !self.is_active() => self.pointer_down(PRIMARY_BUTTON, *a),
            _ => GestureOutcome::Ignored,
        }
    }

    pub fn touch_move(
        &mut self,
        contacts: &[Point],
        transform: &mut Transform,
        cfg: &GestureConfig,
    ) -> GestureOutcome {
        match (*self, contacts) {
            (GestureState::Pinching(pinch), [a, b, ..]) => {
                let center = a.midpoint(*b);
                let factor = a.distance(*b) / pinch.anchor.distance;
                *transform = pinch.initial_transform;
                transform.zoom(pinch.anchor.center.midpoint(center), factor, cfg.limits);
                GestureOutcome::Changed
            }
            (GestureState::Dragging(_), [a, ..]) => self.pointer_move(*a, transform, cfg),
            _ => GestureOutcome::Ignored,
        }
    }

    /// `remaining` lists the touches still down after the release.
    pub fn touch_end(&mut self, remaining: &[Point]) -> GestureOutcome {
        match *self {
            GestureState::Pinching(_) if remaining.len() < 2 => {
                trace!("pinch end");
                *self = GestureState::Idle;
                GestureOutcome::Changed
            }
            GestureState::Dragging(_) if remaining.is_empty() => self.pointer_up(),
            _ => GestureOutcome::Ignored,
        }
    }

    /// Contact lost without a release (touchcancel); never picks.
    pub fn cancel(&mut self) -> GestureOutcome {
        if self.is_active() {
            *self = GestureState::Idle;
            GestureOutcome::Changed
        } else {
            GestureOutcome::Ignored
        }
    }
}

/// Zoom factor for one wheel event.
pub fn wheel_factor(delta_y: f64, mode: WheelMode, base: f64) -> f64 {
    base.powf(-delta_y / mode.divisor())
}
