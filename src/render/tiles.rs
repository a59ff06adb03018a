//! Map renderer. The finite world is repeated across the whole visible
//! area so panning past an edge shows the world wrapping around.

use tracing::trace;

use super::fog::{CellRect, diamond_within, fog_mask};
use super::style;
use super::surface::Surface;
use crate::model::{Entity, Position, WorldGrid, WorldSnapshot, Zone};
use crate::state::{Point, SelectionModel, Transform, WorldRect, seers};
use crate::util::{compare_entity, floor_div};

/// Per-frame extras that are not part of the world snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overlay {
    pub hover: Option<Position>,
    pub show_fog: bool,
}

/// Offsets `(k * width, j * height)` of every world copy overlapping
/// `rect`. Without a grid the world is drawn once, unshifted.
pub fn tile_offsets(rect: &WorldRect, grid: Option<WorldGrid>) -> Vec<(i32, i32)> {
    let Some(g) = grid else {
        return vec![(0, 0)];
    };
    let (kx0, kx1) = (floor_div(rect.xmin, g.width), floor_div(rect.xmax, g.width));
    let (ky0, ky1) = (floor_div(rect.ymin, g.height), floor_div(rect.ymax, g.height));
    let mut offsets = Vec::new();
    for j in ky0..=ky1 {
        for k in kx0..=kx1 {
            offsets.push((k * g.width, j * g.height));
        }
    }
    offsets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionIndicator {
    Failed,
    /// Unit step the entity just took.
    Moved(i32, i32),
}

fn action_indicator(e: &Entity) -> Option<ActionIndicator> {
    if e.action.is_empty() {
        return None;
    }
    if e.action_failed() {
        return Some(ActionIndicator::Failed);
    }
    if e.action != "move" || e.action_result != "success" {
        return None;
    }
    match e.action_params.first().map(String::as_str) {
        Some("n") => Some(ActionIndicator::Moved(0, -1)),
        Some("s") => Some(ActionIndicator::Moved(0, 1)),
        Some("e") => Some(ActionIndicator::Moved(1, 0)),
        Some("w") => Some(ActionIndicator::Moved(-1, 0)),
        _ => None,
    }
}

struct Frame<'a> {
    snapshot: &'a WorldSnapshot,
    grid: Option<WorldGrid>,
    visible: WorldRect,
    /// One screen pixel in world units.
    px: f64,
    painted: Vec<&'a Entity>,
    selected: Option<&'a Entity>,
    seers: Vec<&'a Entity>,
    overlay: Overlay,
}

impl Frame<'_> {
    fn visible_cells(&self) -> CellRect {
        CellRect {
            x: self.visible.xmin,
            y: self.visible.ymin,
            w: self.visible.xmax - self.visible.xmin + 1,
            h: self.visible.ymax - self.visible.ymin + 1,
        }
    }

    /// Visible cells expressed in the unshifted coordinates of the world
    /// copy at `offset`.
    fn visible_in_copy(&self, (dx, dy): (i32, i32)) -> CellRect {
        self.visible_cells().translate(-dx, -dy)
    }

    /// Shifted position if it falls inside the visible rectangle.
    fn cull(&self, pos: Position, (dx, dy): (i32, i32)) -> Option<Position> {
        let p = pos.offset(dx, dy);
        self.visible.contains(p).then_some(p)
    }
}

/// Draws one frame. Reads the snapshot and selection, mutates nothing but
/// the surface. A selection whose entity vanished is ignored.
pub fn render<S: Surface>(
    surface: &mut S,
    snapshot: &WorldSnapshot,
    transform: &Transform,
    selection: &SelectionModel,
    overlay: Overlay,
) {
    let (width, height) = surface.size();
    surface.clear(style::BACKGROUND);
    surface.set_world_transform(transform);

    let entities = snapshot.entities();
    let mut painted: Vec<&Entity> = entities.iter().collect();
    painted.sort_by(|a, b| compare_entity(a, b));

    let frame = Frame {
        snapshot,
        grid: snapshot.grid(),
        visible: transform.visible_rect(width, height),
        px: (1.0 / transform.scale).max(0.001),
        painted,
        selected: selection.resolve(entities),
        seers: overlay.hover.map_or_else(Vec::new, |cell| seers(entities, cell)),
        overlay,
    };

    let offsets = tile_offsets(&frame.visible, frame.grid);
    trace!(tiles = offsets.len(), visible = ?frame.visible, "render");
    for offset in offsets {
        draw_tile(surface, &frame, offset);
    }
}

fn draw_tile<S: Surface>(surface: &mut S, frame: &Frame, offset: (i32, i32)) {
    let area = match frame.grid {
        Some(g) => CellRect {
            x: offset.0,
            y: offset.1,
            w: g.width,
            h: g.height,
        },
        None => frame.visible_cells(),
    };
    draw_checkerboard(surface, frame, area);

    let Some(world) = frame.snapshot.dynamic.as_ref() else {
        return;
    };

    draw_zones(surface, frame, &world.goal_zones, offset, style::GOAL_ZONE);
    draw_zones(surface, frame, &world.role_zones, offset, style::ROLE_ZONE);

    for obstacle in &world.obstacles {
        if let Some(p) = frame.cull(obstacle.pos, offset) {
            surface.fill_rect(p.x as f64, p.y as f64, 1.0, 1.0, style::OBSTACLE);
        }
    }

    for dispenser in &world.dispensers {
        if let Some(p) = frame.cull(dispenser.pos, offset) {
            let color = style::block(frame.snapshot.block_type_index(&dispenser.kind));
            let (x, y) = (p.x as f64, p.y as f64);
            surface.fill_rect(x, y, 1.0, 1.0, color);
            surface.stroke_rect(x + 0.1, y + 0.1, 0.8, 0.8, 2.0 * frame.px, style::OUTLINE);
        }
    }

    for block in &world.blocks {
        if let Some(p) = frame.cull(block.pos, offset) {
            let color = style::block(frame.snapshot.block_type_index(&block.kind));
            surface.fill_rect(p.x as f64 + 0.05, p.y as f64 + 0.05, 0.9, 0.9, color);
        }
    }

    for entity in &frame.painted {
        if let Some(p) = frame.cull(entity.pos, offset) {
            draw_entity(surface, frame, entity, p);
        }
    }

    if let Some(selected) = frame.selected {
        for cell in selected.attached.iter().flatten() {
            if let Some(p) = frame.cull(*cell, offset) {
                surface.stroke_rect(p.x as f64, p.y as f64, 1.0, 1.0, 3.0 * frame.px, style::ATTACHED);
            }
        }
        if let Some(p) = frame.cull(selected.pos, offset) {
            surface.stroke_circle(center(p), 0.48, 3.0 * frame.px, style::SELECTED);
        }
    }

    for event in &world.clear {
        for cell in diamond_within(event.pos, event.r, frame.visible_in_copy(offset)) {
            if let Some(p) = frame.cull(cell, offset) {
                surface.stroke_rect(p.x as f64, p.y as f64, 1.0, 1.0, 2.0 * frame.px, style::CLEAR_EVENT);
            }
        }
    }

    if let Some(p) = frame.overlay.hover.and_then(|h| frame.cull(h, offset)) {
        surface.fill_rect(p.x as f64, p.y as f64, 1.0, 1.0, style::HOVER);
    }
    for seer in &frame.seers {
        if let Some(p) = frame.cull(seer.pos, offset) {
            surface.stroke_circle(center(p), 0.45, 2.0 * frame.px, style::SEER);
        }
    }

    if frame.overlay.show_fog {
        if let Some(selected) = frame.selected {
            draw_fog(surface, frame, selected, area, offset);
        }
    }
}

fn center(p: Position) -> Point {
    Point::new(p.x as f64 + 0.5, p.y as f64 + 0.5)
}

fn draw_checkerboard<S: Surface>(surface: &mut S, frame: &Frame, area: CellRect) {
    let Some(cells) = area.intersect(&frame.visible_cells()) else {
        return;
    };
    for cell in cells.cells() {
        if (cell.x + cell.y).rem_euclid(2) == 0 {
            surface.fill_rect(cell.x as f64, cell.y as f64, 1.0, 1.0, style::CHECKER);
        }
    }
}

fn draw_zones<S: Surface>(
    surface: &mut S,
    frame: &Frame,
    zones: &[Zone],
    offset: (i32, i32),
    color: &str,
) {
    for zone in zones {
        for cell in diamond_within(zone.pos, zone.r, frame.visible_in_copy(offset)) {
            if let Some(p) = frame.cull(cell, offset) {
                surface.fill_rect(p.x as f64, p.y as f64, 1.0, 1.0, color);
            }
        }
    }
}

fn draw_entity<S: Surface>(surface: &mut S, frame: &Frame, entity: &Entity, p: Position) {
    let c = center(p);
    let fill = if entity.deactivated {
        style::DEACTIVATED
    } else {
        style::team(frame.snapshot.team_index(&entity.team))
    };
    surface.fill_circle(c, 0.4, fill);
    surface.stroke_circle(c, 0.4, frame.px, style::OUTLINE);

    match action_indicator(entity) {
        Some(ActionIndicator::Failed) => {
            surface.fill_rect(p.x as f64 + 0.7, p.y as f64 + 0.05, 0.25, 0.25, style::FAILED_ACTION);
        }
        Some(ActionIndicator::Moved(dx, dy)) => {
            let from = Point::new(c.x - dx as f64 * 0.5, c.y - dy as f64 * 0.5);
            surface.line(from, c, 2.0 * frame.px, style::ACTION_TRAIL);
        }
        None => {}
    }
}

fn draw_fog<S: Surface>(
    surface: &mut S,
    frame: &Frame,
    focus: &Entity,
    area: CellRect,
    offset: (i32, i32),
) {
    let focus_pos = match frame.grid {
        Some(g) => g.normalize(focus.pos).offset(offset.0, offset.1),
        None => focus.pos,
    };
    let visible = frame.visible_cells();
    for rect in fog_mask(focus_pos, focus.vision, area) {
        if let Some(r) = rect.intersect(&visible) {
            surface.fill_rect(r.x as f64, r.y as f64, r.w as f64, r.h as f64, style::FOG);
        }
    }
}
