use std::path::PathBuf;

use egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

use crate::shape::Attributes;
use crate::store::DEFAULT_STORAGE_KEY;

/// Environment variable overriding [`EditorConfig::storage_dir`]
pub const STORAGE_DIR_ENV: &str = "EFRAME_SHAPES_DIR";

/// Look of the live preview drawn while dragging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f32,
    pub dash: String,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            fill: "none".to_string(),
            stroke: "black".to_string(),
            stroke_width: 2.0,
            dash: "5,5".to_string(),
        }
    }
}

impl PreviewStyle {
    /// Style attributes applied to preview and selection overlays
    pub fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.set("fill", self.fill.as_str());
        attrs.set("stroke", self.stroke.as_str());
        attrs.set("stroke-width", self.stroke_width);
        attrs.set("stroke-dasharray", self.dash.as_str());
        attrs
    }
}

/// Editor settings, persisted between sessions by the app shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Storage key the document is written under
    pub storage_key: String,
    /// Native storage directory
    pub storage_dir: PathBuf,
    /// Surface size in surface units
    pub surface_size: Vec2,
    /// Distance of the style toolbar above the selected shape, in screen points
    pub toolbar_offset: f32,
    pub handle_radius: f32,
    /// Extra slack when hit testing thin outlines
    pub hit_tolerance: f32,
    pub preview: PreviewStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: PathBuf::from(".eframe_shapes"),
            surface_size: vec2(800.0, 600.0),
            toolbar_offset: 100.0,
            handle_radius: 8.0,
            hit_tolerance: 3.0,
            preview: PreviewStyle::default(),
        }
    }
}

impl EditorConfig {
    /// Apply overrides from the environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(STORAGE_DIR_ENV) {
            log::info!("Using storage directory from {STORAGE_DIR_ENV}");
            self.storage_dir = PathBuf::from(dir);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"storage_key":"doc","preview":{"dash":"2,2"}}"#).unwrap();

        assert_eq!(config.storage_key, "doc");
        assert_eq!(config.toolbar_offset, 100.0);
        assert_eq!(config.preview.dash, "2,2");
        assert_eq!(config.preview.stroke_width, 2.0);
    }

    #[test]
    fn preview_attributes_carry_the_dash() {
        let attrs = PreviewStyle::default().attributes();
        assert_eq!(attrs.text("fill"), Some("none"));
        assert_eq!(attrs.number("stroke-width"), Some(2.0));
        assert_eq!(attrs.text("stroke-dasharray"), Some("5,5"));
    }
}
