//! Viewer tuning read once at startup.

use serde::Deserialize;

use crate::error::ViewerError;
use crate::state::transform::ScaleLimits;

pub const CONFIG_ELEMENT_ID: &str = "viewer-config";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Pixels per world cell at mount and after "reset zoom".
    pub initial_scale: f64,
    /// Pointer travel in pixels before a press turns into a pan.
    pub drag_dead_zone: f64,
    /// Floor for the finger distance captured at pinch start.
    pub pinch_min_distance: f64,
    pub wheel_zoom_base: f64,
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_scale: 10.0,
            max_scale: 100.0,
            initial_scale: 20.0,
            drag_dead_zone: 20.0,
            pinch_min_distance: 20.0,
            wheel_zoom_base: 1.5,
            log_level: "info".into(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(raw: &str) -> Result<Self, ViewerError> {
        let mut cfg: Self = serde_json::from_str(raw).map_err(ViewerError::Config)?;
        if cfg.min_scale > cfg.max_scale {
            std::mem::swap(&mut cfg.min_scale, &mut cfg.max_scale);
        }
        cfg.initial_scale = cfg.initial_scale.clamp(cfg.min_scale, cfg.max_scale);
        Ok(cfg)
    }

    /// Reads the JSON config embedded in the page. Missing element means
    /// defaults; a present but broken one is reported.
    pub fn from_document() -> Result<Self, ViewerError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(ViewerError::Dom("document"))?;
        match document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        {
            Some(raw) if !raw.trim().is_empty() => Self::from_json(&raw),
            _ => Ok(Self::default()),
        }
    }

    pub fn scale_limits(&self) -> ScaleLimits {
        ScaleLimits {
            min: self.min_scale,
            max: self.max_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ViewerConfig::from_json(r#"{"max_scale": 60}"#).unwrap();
        assert_eq!(cfg.max_scale, 60.0);
        assert_eq!(cfg.min_scale, 10.0);
        assert_eq!(cfg.drag_dead_zone, 20.0);
    }

    #[test]
    fn initial_scale_is_clamped_into_limits() {
        let cfg = ViewerConfig::from_json(r#"{"initial_scale": 500}"#).unwrap();
        assert_eq!(cfg.initial_scale, 100.0);
    }

    #[test]
    fn broken_json_is_a_config_error() {
        let err = ViewerConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }
}
