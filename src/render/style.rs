// Colors used by the map renderer.

const TEAMS: [&str; 14] = [
    "#0000ff", "#00ff00", "#ff1493", "#8b0000", "#ed553b", "#a63d40", "#e9b872", "#90a959",
    "#6494aa", "#192457", "#2b5397", "#a2dcdc", "#27ec5f", "#3ab1ad",
];

const BLOCKS: [&str; 7] = [
    "#41470b", "#78730d", "#bab217", "#e3d682", "#b3a06f", "#9c7640", "#5a4c35",
];

pub const BACKGROUND: &str = "#eeeeee";
pub const CHECKER: &str = "#dddddd";
pub const GOAL_ZONE: &str = "rgba(255, 0, 0, 0.4)";
pub const ROLE_ZONE: &str = "rgba(0, 0, 255, 0.4)";
pub const OBSTACLE: &str = "#333333";
pub const OUTLINE: &str = "#000000";
pub const DEACTIVATED: &str = "#999999";
pub const FAILED_ACTION: &str = "#ff3333";
pub const ACTION_TRAIL: &str = "rgba(0, 0, 0, 0.5)";
pub const SELECTED: &str = "#ff00ff";
pub const ATTACHED: &str = "rgba(255, 0, 255, 0.8)";
pub const CLEAR_EVENT: &str = "rgba(255, 165, 0, 0.9)";
pub const HOVER: &str = "rgba(180, 180, 255, 0.4)";
pub const SEER: &str = "#00b0ff";
pub const FOG: &str = "rgba(0, 0, 0, 0.45)";

pub fn team(index: usize) -> &'static str {
    TEAMS[index % TEAMS.len()]
}

pub fn block(index: usize) -> &'static str {
    BLOCKS[index % BLOCKS.len()]
}
