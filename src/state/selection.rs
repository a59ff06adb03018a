use tracing::debug;

use crate::model::{Entity, EntityId, Position, WorldGrid};
use crate::util::{compare_entity, same_pos};

/// Entities on `cell`, front-to-back: reverse paint order, so the one
/// drawn on top comes first.
pub fn stack_at<'a>(
    entities: &'a [Entity],
    cell: Position,
    grid: Option<WorldGrid>,
) -> Vec<&'a Entity> {
    let mut stack: Vec<&Entity> = entities
        .iter()
        .filter(|e| {
            let pos = grid.map_or(e.pos, |g| g.normalize(e.pos));
            same_pos(pos, cell)
        })
        .collect();
    stack.sort_by(|a, b| compare_entity(b, a));
    stack
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: Option<EntityId>,
}

impl SelectionModel {
    pub fn current(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<EntityId>) {
        self.selected = id;
    }

    /// Selected entity if it is still part of `entities`.
    pub fn resolve<'a>(&self, entities: &'a [Entity]) -> Option<&'a Entity> {
        let id = self.selected?;
        entities.iter().find(|e| e.id == id)
    }

    /// Click on `cell`. Repeated clicks on a crowded cell walk down the
    /// stack and wrap; a selection that is not on this cell (or no longer
    /// exists) restarts from the top.
    pub fn pick_at(
        &mut self,
        cell: Position,
        entities: &[Entity],
        grid: Option<WorldGrid>,
    ) -> Option<EntityId> {
        let stack = stack_at(entities, cell, grid);
        let next = match self.selected.and_then(|id| stack.iter().position(|e| e.id == id)) {
            Some(i) => stack.get((i + 1) % stack.len()),
            None => stack.first(),
        };
        self.selected = next.map(|e| e.id);
        debug!(x = cell.x, y = cell.y, candidates = stack.len(), selected = ?self.selected, "pick");
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: EntityId, team: &str, name: &str, x: i32, y: i32) -> Entity {
        Entity {
            id,
            team: team.into(),
            name: name.into(),
            pos: Position::new(x, y),
            ..Entity::default()
        }
    }

    #[test]
    fn empty_cell_clears_selection() {
        let entities = vec![entity(1, "A", "a1", 0, 0)];
        let mut sel = SelectionModel::default();
        sel.pick_at(Position::new(0, 0), &entities, None);
        assert_eq!(sel.current(), Some(1));
        assert_eq!(sel.pick_at(Position::new(3, 3), &entities, None), None);
    }

    #[test]
    fn stack_is_front_to_back() {
        let entities = vec![
            entity(1, "A", "a1", 2, 2),
            entity(2, "B", "b1", 2, 2),
            entity(3, "A", "a2", 2, 2),
        ];
        let ids: Vec<_> = stack_at(&entities, Position::new(2, 2), None)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, [2, 3, 1]);
    }

    #[test]
    fn repeated_clicks_cycle_and_wrap() {
        // Paint order a1, a2, b1: b1 is on top.
        let entities = vec![
            entity(1, "A", "a1", 2, 2),
            entity(2, "B", "b1", 2, 2),
            entity(3, "A", "a2", 2, 2),
        ];
        let mut sel = SelectionModel::default();
        let cell = Position::new(2, 2);
        let picks: Vec<_> = (0..4).map(|_| sel.pick_at(cell, &entities, None)).collect();
        assert_eq!(picks, [Some(2), Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn clicking_elsewhere_restarts_from_top() {
        let entities = vec![
            entity(1, "A", "a1", 2, 2),
            entity(2, "A", "a2", 2, 2),
            entity(3, "A", "a3", 5, 5),
        ];
        let mut sel = SelectionModel::default();
        sel.pick_at(Position::new(2, 2), &entities, None);
        sel.pick_at(Position::new(5, 5), &entities, None);
        assert_eq!(sel.pick_at(Position::new(2, 2), &entities, None), Some(2));
    }

    #[test]
    fn stale_selection_is_treated_as_empty() {
        let mut sel = SelectionModel::default();
        sel.select(Some(99));
        let entities = vec![entity(1, "A", "a1", 0, 0), entity(2, "A", "a2", 0, 0)];
        assert!(sel.resolve(&entities).is_none());
        assert_eq!(sel.pick_at(Position::new(0, 0), &entities, None), Some(2));
    }

    #[test]
    fn unnormalized_entity_positions_match_with_grid() {
        let entities = vec![entity(1, "A", "a1", -1, 9)];
        let mut sel = SelectionModel::default();
        let grid = WorldGrid::new(8, 8);
        assert_eq!(sel.pick_at(Position::new(7, 1), &entities, grid), Some(1));
    }
}
