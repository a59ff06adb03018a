// Drawing target used by the tile renderer. The browser implementation
// lives in `canvas.rs`; `RecordingSurface` captures calls for tests.

use crate::state::{Point, Transform};

pub trait Surface {
    /// Canvas size in pixels.
    fn size(&self) -> (f64, f64);
    /// Fills the whole canvas in screen space.
    fn clear(&mut self, color: &str);
    /// All following calls are in world units.
    fn set_world_transform(&mut self, transform: &Transform);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, line_width: f64, color: &str);
    fn fill_circle(&mut self, center: Point, radius: f64, color: &str);
    fn stroke_circle(&mut self, center: Point, radius: f64, line_width: f64, color: &str);
    fn line(&mut self, from: Point, to: Point, line_width: f64, color: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(String),
    Transform(Transform),
    FillRect { x: f64, y: f64, w: f64, h: f64, color: String },
    StrokeRect { x: f64, y: f64, w: f64, h: f64, color: String },
    FillCircle { center: Point, radius: f64, color: String },
    StrokeCircle { center: Point, radius: f64, color: String },
    Line { from: Point, to: Point, color: String },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Filled rectangles of exactly `color`.
    pub fn fills(&self, color: &str) -> Vec<(f64, f64, f64, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { x, y, w, h, color: c } if c == color => Some((*x, *y, *w, *h)),
                _ => None,
            })
            .collect()
    }

    /// Index of the first op satisfying `pred`.
    pub fn position(&self, pred: impl Fn(&DrawOp) -> bool) -> Option<usize> {
        self.ops.iter().position(pred)
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: &str) {
        self.ops.push(DrawOp::Clear(color.into()));
    }

    fn set_world_transform(&mut self, transform: &Transform) {
        self.ops.push(DrawOp::Transform(*transform));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            w,
            h,
            color: color.into(),
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, _line_width: f64, color: &str) {
        self.ops.push(DrawOp::StrokeRect {
            x,
            y,
            w,
            h,
            color: color.into(),
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: &str) {
        self.ops.push(DrawOp::FillCircle {
            center,
            radius,
            color: color.into(),
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, _line_width: f64, color: &str) {
        self.ops.push(DrawOp::StrokeCircle {
            center,
            radius,
            color: color.into(),
        });
    }

    fn line(&mut self, from: Point, to: Point, _line_width: f64, color: &str) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            color: color.into(),
        });
    }
}
