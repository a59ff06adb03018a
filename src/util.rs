// Geometry helpers shared by the picker, selection and renderer, plus the
// console logging glue for the web shell.

use std::cmp::Ordering;
use std::io;

use wasm_bindgen::JsValue;

use crate::model::{Entity, Position};

pub fn same_pos(a: Position, b: Position) -> bool {
    a.x == b.x && a.y == b.y
}

/// Manhattan distance between two raw (unwrapped) positions.
pub fn taxicab(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Euclidean modulo: always in `[0, n)` for `n > 0`.
pub fn wrap(v: i32, n: i32) -> i32 {
    v.rem_euclid(n)
}

/// Integer division rounding toward negative infinity.
pub fn floor_div(v: i32, n: i32) -> i32 {
    v.div_euclid(n)
}

/// Numeric suffix of a display name: leading non-digits are skipped and
/// the following run of digits is parsed. `agentA12` gives `Some(12)`.
pub fn name_suffix(name: &str) -> Option<u64> {
    let rest = name.trim_start_matches(|c: char| !c.is_ascii_digit());
    let digits: &str = match rest.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &rest[..end],
        None => rest,
    };
    digits.parse().ok()
}

/// Paint order for entities stacked on a cell: team, then numeric name
/// suffix (names without digits first), then the name itself.
pub fn compare_entity(a: &Entity, b: &Entity) -> Ordering {
    a.team
        .cmp(&b.team)
        .then_with(|| name_suffix(&a.name).cmp(&name_suffix(&b.name)))
        .then_with(|| a.name.cmp(&b.name))
}

/// Ordering for names like `A`, `B` or `team12`: by the first embedded
/// number (missing sorts first), then lexicographically.
pub fn compare_numbered(a: &str, b: &str) -> Ordering {
    let first_number = |s: &str| -> Option<u64> {
        let rest = s.trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '-');
        let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        rest[..end].parse().ok()
    };
    first_number(a)
        .cmp(&first_number(b))
        .then_with(|| a.cmp(b))
}

pub fn clog(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

/// Line buffer handed to `tracing-subscriber`; every formatted event is
/// forwarded to the browser console when the writer is dropped.
#[derive(Default)]
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        clog(line.trim_end());
    }
}

/// Installs the console-backed subscriber. Safe to call more than once;
/// later calls are ignored.
pub fn init_logging(level: &str) {
    let max_level = level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let installed = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_writer(ConsoleWriter::default)
        .try_init();
    if installed.is_err() {
        clog("logging already initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(team: &str, name: &str) -> Entity {
        Entity {
            team: team.into(),
            name: name.into(),
            ..Entity::default()
        }
    }

    #[test]
    fn wrap_is_non_negative() {
        assert_eq!(wrap(-1, 8), 7);
        assert_eq!(wrap(-17, 8), 7);
        assert_eq!(wrap(8, 8), 0);
        assert_eq!(wrap(3, 8), 3);
    }

    #[test]
    fn floor_div_rounds_down() {
        assert_eq!(floor_div(-1, 8), -1);
        assert_eq!(floor_div(-8, 8), -1);
        assert_eq!(floor_div(-9, 8), -2);
        assert_eq!(floor_div(7, 8), 0);
    }

    #[test]
    fn taxicab_ignores_wraparound() {
        assert_eq!(taxicab(Position::new(7, 7), Position::new(0, 0)), 14);
        assert_eq!(taxicab(Position::new(1, 2), Position::new(3, 1)), 3);
    }

    #[test]
    fn suffix_parsing() {
        assert_eq!(name_suffix("agentA12"), Some(12));
        assert_eq!(name_suffix("connectionB3x"), Some(3));
        assert_eq!(name_suffix("nodigits"), None);
    }

    #[test]
    fn entities_sort_by_team_then_number_then_name() {
        let mut v = vec![
            entity("B", "agentB1"),
            entity("A", "agentA10"),
            entity("A", "agentA2"),
            entity("A", "scout"),
        ];
        v.sort_by(compare_entity);
        let names: Vec<_> = v.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["scout", "agentA2", "agentA10", "agentB1"]);
    }

    #[test]
    fn numbered_names() {
        assert_eq!(compare_numbered("team2", "team10"), Ordering::Less);
        assert_eq!(compare_numbered("A", "B"), Ordering::Less);
        assert_eq!(compare_numbered("B", "team1"), Ordering::Less);
    }
}
