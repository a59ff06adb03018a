pub mod app;
pub mod camera_controls;
pub mod entity_view;
pub mod map_view;
pub mod status_panel;
