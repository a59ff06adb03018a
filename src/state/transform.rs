// Affine map between canvas pixels and world units:
// screen = world * scale + (x, y).

use crate::model::Position;

/// A point in either screen pixels or world units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(self, other: Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Cell containing this world point.
    pub fn cell(self) -> Position {
        Position::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            min: 10.0,
            max: 100.0,
        }
    }
}

impl ScaleLimits {
    /// Adjusts `factor` so `scale * factor` lands inside the limits,
    /// exactly on the bound when it would overshoot.
    pub fn clamp_factor(&self, scale: f64, factor: f64) -> f64 {
        if scale * factor < self.min {
            self.min / scale
        } else if scale * factor > self.max {
            self.max / scale
        } else {
            factor
        }
    }
}

/// Inclusive world-cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldRect {
    pub xmin: i32,
    pub xmax: i32,
    pub ymin: i32,
    pub ymax: i32,
}

impl WorldRect {
    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 20.0,
        }
    }
}

impl Transform {
    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    pub fn apply(&self, world: Point) -> Point {
        Point::new(world.x * self.scale + self.x, world.y * self.scale + self.y)
    }

    pub fn invert(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.x) / self.scale,
            (screen.y - self.y) / self.scale,
        )
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Scales around `anchor` so the world point under it does not move.
    /// Returns the factor actually applied after clamping.
    pub fn zoom(&mut self, anchor: Point, factor: f64, limits: ScaleLimits) -> f64 {
        let factor = limits.clamp_factor(self.scale, factor);
        if factor != 1.0 {
            self.x = anchor.x + (self.x - anchor.x) * factor;
            self.y = anchor.y + (self.y - anchor.y) * factor;
            // Float rounding in `scale * (max / scale)` can overshoot.
            self.scale = (self.scale * factor).clamp(limits.min, limits.max);
        }
        factor
    }

    /// World cells touched by a `width` x `height` pixel canvas.
    pub fn visible_rect(&self, width: f64, height: f64) -> WorldRect {
        let top_left = self.invert(Point::new(0.0, 0.0));
        let bottom_right = self.invert(Point::new(width, height));
        WorldRect {
            xmin: top_left.x.floor() as i32,
            xmax: bottom_right.x.ceil() as i32,
            ymin: top_left.y.floor() as i32,
            ymax: bottom_right.y.ceil() as i32,
        }
    }

    /// Centers the given world point in a canvas.
    pub fn center_on(&mut self, world: Point, width: f64, height: f64) {
        self.x = width * 0.5 - self.scale * world.x;
        self.y = height * 0.5 - self.scale * world.y;
    }
}
