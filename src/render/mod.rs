pub mod canvas;
pub mod fog;
pub mod style;
pub mod surface;
pub mod tiles;

pub use canvas::CanvasSurface;
pub use fog::{CellRect, diamond_within, fog_mask, vision_diamond};
pub use surface::{DrawOp, RecordingSurface, Surface};
pub use tiles::{Overlay, render, tile_offsets};
