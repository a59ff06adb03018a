//! Interactive map viewer for multi-agent simulations on a toroidal grid.
//!
//! The viewport core (`state`, `render`) is plain Rust and runs under
//! `cargo test`; `components` wires it to the browser through yew.

pub mod components;
pub mod config;
pub mod error;
pub mod model;
pub mod render;
pub mod state;
pub mod util;

pub use config::ViewerConfig;
pub use error::ViewerError;
pub use model::{EntityId, Position, SnapshotUpdate, WorldGrid, WorldSnapshot};
pub use state::{Point, Transform, ViewportBounds, ViewportState};
