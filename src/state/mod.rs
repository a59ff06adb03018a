pub mod gesture;
pub mod picker;
pub mod selection;
pub mod transform;
pub mod viewport;

pub use gesture::{GestureConfig, GestureOutcome, GestureState, WheelMode};
pub use picker::ViewportBounds;
pub use selection::SelectionModel;
pub use transform::{Point, ScaleLimits, Transform, WorldRect};
pub use viewport::{FrameScheduler, ViewportState, seers};
