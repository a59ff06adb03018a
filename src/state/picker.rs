// Screen to world-cell inversion for hover and click picking.

use super::transform::{Point, Transform};
use crate::model::{Position, WorldGrid};

/// Canvas rectangle in the same coordinate space as incoming pointer
/// positions (client pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportBounds {
    pub fn at_origin(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left
            && p.y >= self.top
            && p.x < self.left + self.width
            && p.y < self.top + self.height
    }

    /// Converts a client point into canvas-local pixels.
    pub fn to_local(&self, p: Point) -> Point {
        Point::new(p.x - self.left, p.y - self.top)
    }

    pub fn to_client(&self, p: Point) -> Point {
        Point::new(p.x + self.left, p.y + self.top)
    }
}

/// World cell under `screen`, or `None` outside `bounds`. Wraps onto the
/// torus when the grid is known, otherwise returns the raw cell.
pub fn invert(
    screen: Point,
    bounds: &ViewportBounds,
    transform: &Transform,
    grid: Option<WorldGrid>,
) -> Option<Position> {
    if !bounds.contains(screen) {
        return None;
    }
    let cell = transform.invert(bounds.to_local(screen)).cell();
    Some(match grid {
        Some(grid) => grid.normalize(cell),
        None => cell,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ViewportBounds {
        ViewportBounds {
            left: 10.0,
            top: 20.0,
            width: 400.0,
            height: 300.0,
        }
    }

    #[test]
    fn outside_bounds_is_no_pick() {
        let t = Transform::default();
        assert_eq!(invert(Point::new(5.0, 50.0), &bounds(), &t, None), None);
        assert_eq!(invert(Point::new(410.0, 50.0), &bounds(), &t, None), None);
        assert_eq!(invert(Point::new(50.0, 320.0), &bounds(), &t, None), None);
    }

    #[test]
    fn subtracts_viewport_origin_before_inverting() {
        let t = Transform::with_scale(20.0);
        assert_eq!(
            invert(Point::new(10.0, 20.0), &bounds(), &t, None),
            Some(Position::new(0, 0))
        );
        assert_eq!(
            invert(Point::new(55.0, 61.0), &bounds(), &t, None),
            Some(Position::new(2, 2))
        );
    }

    #[test]
    fn negative_cells_wrap_euclidean() {
        let t = Transform {
            x: 100.0,
            y: 100.0,
            scale: 20.0,
        };
        let grid = WorldGrid::new(8, 8);
        // One pixel left of and above the world origin.
        let p = Point::new(10.0 + 99.0, 20.0 + 99.0);
        assert_eq!(invert(p, &bounds(), &t, None), Some(Position::new(-1, -1)));
        assert_eq!(invert(p, &bounds(), &t, grid), Some(Position::new(7, 7)));
    }

    #[test]
    fn apply_then_invert_lands_in_the_same_cell() {
        let t = Transform {
            x: -13.0,
            y: 7.5,
            scale: 33.0,
        };
        let b = ViewportBounds::at_origin(800.0, 600.0);
        for &(wx, wy) in &[(1.2, 3.7), (10.0, 0.0), (5.99, 14.01)] {
            let screen = t.apply(Point::new(wx, wy));
            let cell = invert(screen, &b, &t, None).unwrap();
            assert_eq!(cell, Point::new(wx, wy).cell());
        }
    }
}
