//! Fog of war around a focused entity.
//!
//! The entity sees every cell within taxicab distance `vision`. The fog
//! covers the rest of a bounding box using as few rectangles as possible:
//!
//! ```text
//!   ###########   top band (rows above the diamond)
//!   #####.#####
//!   ####...####   left / right bands beside the diamond's column span,
//!   ###.....###   single-cell patches for the corners inside it
//!   ####...####
//!   #####.#####
//!   ###########   bottom band
//! ```
//!
//! The pieces never overlap, so translucent fog does not stack.

use crate::model::Position;
use crate::util::taxicab;

/// Half-open rectangle of whole cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl CellRect {
    /// From corner coordinates `[x0, x1) x [y0, y1)`; `None` if empty.
    pub fn span(x0: i32, x1: i32, y0: i32, y1: i32) -> Option<Self> {
        (x1 > x0 && y1 > y0).then_some(Self {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        })
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn intersect(&self, other: &CellRect) -> Option<CellRect> {
        Self::span(
            self.x.max(other.x),
            self.right().min(other.right()),
            self.y.max(other.y),
            self.bottom().min(other.bottom()),
        )
    }

    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| Position::new(x, y)))
    }
}

/// Cells within taxicab distance `vision` of `center`, row by row.
pub fn vision_diamond(center: Position, vision: i32) -> Vec<Position> {
    let v = vision.max(0);
    (-v..=v)
        .flat_map(|dy| {
            let reach = v - dy.abs();
            (-reach..=reach).map(move |dx| center.offset(dx, dy))
        })
        .collect()
}

/// Cells of the diamond of `radius` around `center` that fall inside
/// `clip`. Only the clipped rows and columns are visited, so the cost
/// does not depend on the radius.
pub fn diamond_within(
    center: Position,
    radius: i32,
    clip: CellRect,
) -> impl Iterator<Item = Position> {
    let r = i64::from(radius.max(0));
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    let y0 = (cy - r).max(i64::from(clip.y));
    let y1 = (cy + r).min(i64::from(clip.bottom()) - 1);
    (y0..=y1).flat_map(move |y| {
        let reach = r - (y - cy).abs();
        let x0 = (cx - reach).max(i64::from(clip.x));
        let x1 = (cx + reach).min(i64::from(clip.right()) - 1);
        // Both ends are inside `clip`, so they fit back into i32.
        (x0..=x1).map(move |x| Position::new(x as i32, y as i32))
    })
}

/// Rectangles that darken `bounds` except for the vision diamond.
pub fn fog_mask(center: Position, vision: i32, bounds: CellRect) -> Vec<CellRect> {
    let v = vision.max(0);
    let (bx0, bx1, by0, by1) = (bounds.x, bounds.right(), bounds.y, bounds.bottom());

    // Row and column span of the diamond, clipped to the bounds.
    let ry0 = center.y.saturating_sub(v).clamp(by0, by1);
    let ry1 = center.y.saturating_add(v).saturating_add(1).clamp(by0, by1);
    let cx0 = center.x.saturating_sub(v).clamp(bx0, bx1);
    let cx1 = center.x.saturating_add(v).saturating_add(1).clamp(bx0, bx1);

    let mut mask: Vec<CellRect> = [
        CellRect::span(bx0, bx1, by0, ry0),
        CellRect::span(bx0, bx1, ry1, by1),
        CellRect::span(bx0, cx0, ry0, ry1),
        CellRect::span(cx1, bx1, ry0, ry1),
    ]
    .into_iter()
    .flatten()
    .collect();

    for y in ry0..ry1 {
        for x in cx0..cx1 {
            let cell = Position::new(x, y);
            if taxicab(cell, center) > v {
                mask.push(CellRect { x, y, w: 1, h: 1 });
            }
        }
    }
    mask
}
