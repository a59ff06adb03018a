//! Snapshot data models for the monitor.
//! Mirrors the JSON the simulation server broadcasts: a static part sent
//! once per match and a dynamic part sent every step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;
use yew::Reducible;

use crate::error::ViewerError;
use crate::util::{compare_numbered, same_pos, taxicab, wrap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldGrid {
    pub width: i32,
    pub height: i32,
}

impl WorldGrid {
    pub fn new(width: i32, height: i32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    pub fn normalize(&self, pos: Position) -> Position {
        Position::new(wrap(pos.x, self.width), wrap(pos.y, self.height))
    }
}

/// Grid cell. On the wire it is a two-element array `[x, y]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<[i32; 2]> for Position {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [i32; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

pub type EntityId = u64;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub team: String,
    pub pos: Position,
    pub energy: i64,
    pub vision: i32,
    /// Cells of things attached to this entity, absolute positions.
    pub attached: Option<Vec<Position>>,
    pub deactivated: bool,
    /// Empty before the first step.
    pub action: String,
    pub action_result: String,
    pub action_params: Vec<String>,
    pub role: String,
}

impl Entity {
    pub fn action_failed(&self) -> bool {
        self.action_result.starts_with("failed")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub pos: Position,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attached: Option<Vec<Position>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dispenser {
    pub pos: Position,
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Position,
}

/// Taxicab diamond around `pos`; used for goal zones, role zones and
/// clear events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub pos: Position,
    pub r: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticWorld {
    pub sim: String,
    pub grid: WorldGrid,
    #[serde(default)]
    pub teams: BTreeMap<String, Team>,
    #[serde(default)]
    pub block_types: Vec<String>,
    #[serde(default)]
    pub max_energy: i64,
    #[serde(default)]
    pub steps: u64,
}

impl StaticWorld {
    /// Team names in palette order.
    pub fn team_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.teams.values().map(|t| t.name.clone()).collect();
        names.sort_by(|a, b| compare_numbered(a, b));
        names
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynamicWorld {
    pub step: i64,
    pub obstacles: Vec<Obstacle>,
    pub goal_zones: Vec<Zone>,
    pub role_zones: Vec<Zone>,
    pub entities: Vec<Entity>,
    pub blocks: Vec<Block>,
    pub dispensers: Vec<Dispenser>,
    pub clear: Vec<Zone>,
}

/// One update from the data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapshotUpdate {
    Static(StaticWorld),
    Dynamic(DynamicWorld),
}

impl SnapshotUpdate {
    pub fn from_json(raw: &str) -> Result<Self, ViewerError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Everything a render pass reads. Replaced as a whole through the
/// reducer, never patched in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSnapshot {
    pub static_world: Option<StaticWorld>,
    pub dynamic: Option<DynamicWorld>,
    pub team_names: Vec<String>,
    /// Bumped on every applied update.
    pub version: u64,
}

impl WorldSnapshot {
    /// Demo world shipped with the viewer so it has something to show
    /// before a data source connects.
    pub fn demo() -> Result<Self, ViewerError> {
        let mut snapshot = Self::default();
        for raw in [
            include_str!("../demos/static.json"),
            include_str!("../demos/dynamic.json"),
        ] {
            snapshot.apply(SnapshotUpdate::from_json(raw)?);
        }
        Ok(snapshot)
    }

    pub fn apply(&mut self, update: SnapshotUpdate) {
        match update {
            SnapshotUpdate::Static(st) => {
                self.team_names = st.team_names();
                self.static_world = Some(st);
            }
            SnapshotUpdate::Dynamic(dy) => self.dynamic = Some(dy),
        }
        self.version += 1;
    }

    /// `None` until a static world with a valid grid has arrived.
    pub fn grid(&self) -> Option<WorldGrid> {
        self.static_world
            .as_ref()
            .and_then(|st| WorldGrid::new(st.grid.width, st.grid.height))
    }

    pub fn entities(&self) -> &[Entity] {
        self.dynamic.as_ref().map_or(&[], |d| d.entities.as_slice())
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities().iter().find(|e| e.id == id)
    }

    pub fn team_index(&self, team: &str) -> usize {
        self.team_names
            .iter()
            .position(|t| t == team)
            .unwrap_or(0)
    }

    pub fn block_type_index(&self, kind: &str) -> usize {
        self.static_world
            .as_ref()
            .and_then(|st| st.block_types.iter().position(|t| t == kind))
            .unwrap_or(0)
    }
}

impl WorldSnapshot {
    /// What occupies `cell`, one line per thing, for the hover readout.
    pub fn describe_cell(&self, cell: Position) -> Vec<String> {
        let Some(dy) = &self.dynamic else {
            return Vec::new();
        };
        let grid = self.grid();
        let at = |p: Position| same_pos(grid.map_or(p, |g| g.normalize(p)), cell);
        let in_zone = |z: &Zone| taxicab(z.pos, cell) <= z.r;

        let mut lines = Vec::new();
        if dy.obstacles.iter().any(|o| at(o.pos)) {
            lines.push("obstacle".to_string());
        }
        if dy.goal_zones.iter().any(in_zone) {
            lines.push("goal zone".to_string());
        }
        if dy.role_zones.iter().any(in_zone) {
            lines.push("role zone".to_string());
        }
        lines.extend(
            dy.dispensers
                .iter()
                .filter(|d| at(d.pos))
                .map(|d| format!("dispenser {}", d.kind)),
        );
        lines.extend(
            dy.blocks
                .iter()
                .filter(|b| at(b.pos))
                .map(|b| format!("block {}", b.kind)),
        );
        lines.extend(
            dy.entities
                .iter()
                .filter(|e| at(e.pos))
                .map(|e| format!("{} ({})", e.name, e.team)),
        );
        lines
    }
}

impl Reducible for WorldSnapshot {
    type Action = SnapshotUpdate;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_uses_array_encoding() {
        let p: Position = serde_json::from_str("[3, -4]").unwrap();
        assert_eq!(p, Position::new(3, -4));
        assert_eq!(serde_json::to_string(&p).unwrap(), "[3,-4]");
    }

    #[test]
    fn dynamic_update_ignores_unknown_fields() {
        let raw = r#"{"dynamic": {
            "step": 4,
            "entities": [{"id": 1, "name": "agentA1", "team": "A", "pos": [2, 3],
                          "energy": 100, "vision": 5, "action": "move",
                          "actionResult": "success", "actionParams": ["n"],
                          "role": "default", "deactivated": false}],
            "tasks": [], "norms": [], "scores": [["A", 0]]
        }}"#;
        let SnapshotUpdate::Dynamic(dy) = SnapshotUpdate::from_json(raw).unwrap() else {
            panic!("expected dynamic update");
        };
        assert_eq!(dy.step, 4);
        assert_eq!(dy.entities[0].pos, Position::new(2, 3));
        assert_eq!(dy.entities[0].action_params, ["n"]);
        assert!(dy.blocks.is_empty());
    }

    #[test]
    fn malformed_update_is_an_error() {
        assert!(SnapshotUpdate::from_json("{\"static\": 1}").is_err());
    }

    #[test]
    fn grid_absent_until_static_world() {
        let mut snapshot = WorldSnapshot::default();
        assert_eq!(snapshot.grid(), None);
        snapshot.apply(SnapshotUpdate::Static(StaticWorld {
            sim: "test".into(),
            grid: WorldGrid { width: 8, height: 6 },
            teams: BTreeMap::new(),
            block_types: vec![],
            max_energy: 100,
            steps: 10,
        }));
        assert_eq!(snapshot.grid(), WorldGrid::new(8, 6));
        assert_eq!(snapshot.version, 1);
    }

    #[test]
    fn demo_world_parses() {
        let snapshot = WorldSnapshot::demo().unwrap();
        assert!(snapshot.grid().is_some());
        assert!(!snapshot.entities().is_empty());
        assert_eq!(snapshot.team_names, ["A", "B"]);
    }

    #[test]
    fn describe_cell_lists_occupants() {
        let snapshot = WorldSnapshot::demo().unwrap();
        assert_eq!(
            snapshot.describe_cell(Position::new(8, 6)),
            ["agentA1 (A)", "agentA2 (A)", "agentB1 (B)"]
        );
        assert_eq!(snapshot.describe_cell(Position::new(8, 7)), ["block b1"]);
        assert_eq!(snapshot.describe_cell(Position::new(15, 4)), ["goal zone"]);
        assert!(snapshot.describe_cell(Position::new(0, 0)).is_empty());
        assert!(WorldSnapshot::default().describe_cell(Position::new(0, 0)).is_empty());
    }

    #[test]
    fn normalize_wraps_both_axes() {
        let grid = WorldGrid::new(8, 6).unwrap();
        assert_eq!(grid.normalize(Position::new(-1, 13)), Position::new(7, 1));
    }
}
