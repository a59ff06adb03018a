use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::Surface;
use crate::error::ViewerError;
use crate::state::{Point, Transform};

/// 2d context of the map canvas.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, ViewerError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| ViewerError::Canvas(format!("{e:?}")))?
            .ok_or_else(|| ViewerError::Canvas("no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ViewerError::Canvas("unexpected context type".into()))?;
        Ok(Self {
            ctx,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
        })
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: &str) {
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
    }

    fn set_world_transform(&mut self, t: &Transform) {
        self.ctx
            .set_transform(t.scale, 0.0, 0.0, t.scale, t.x, t.y)
            .ok();
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, line_width: f64, color: &str) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: &str) {
        self.ctx.begin_path();
        self.ctx.set_fill_style_str(color);
        self.ctx.arc(center.x, center.y, radius, 0.0, PI * 2.0).ok();
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, line_width: f64, color: &str) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.arc(center.x, center.y, radius, 0.0, PI * 2.0).ok();
        self.ctx.stroke();
    }

    fn line(&mut self, from: Point, to: Point, line_width: f64, color: &str) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }
}
