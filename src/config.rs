use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Geometry and timing constants of the diagram. Every field can be overridden
/// from a JSON file; missing fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub margin: f32,
    pub small_padding: f32,
    pub box_height: f32,
    pub box_width: f32,
    pub small_font_size: f32,
    pub large_font_size: f32,
    /// Horizontal bulge of cross-reference curves at both ends.
    pub edge_curve_offset: f32,
    /// Stroke width for the smallest and the largest link count.
    pub stroke_width_range: [f32; 2],
    pub transition_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 20.0,
            small_padding: 5.0,
            box_height: 40.0,
            box_width: 120.0,
            small_font_size: 10.0,
            large_font_size: 14.0,
            edge_curve_offset: 100.0,
            stroke_width_range: [1.0, 10.0],
            transition_ms: 500,
        }
    }
}

impl LayoutConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid layout config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.margin >= 0.0, "margin must not be negative");
        ensure!(self.small_padding >= 0.0, "small_padding must not be negative");
        ensure!(
            self.box_width > 0.0 && self.box_height > 0.0,
            "box_width and box_height must be positive"
        );
        ensure!(
            self.small_font_size > 0.0 && self.large_font_size > 0.0,
            "font sizes must be positive"
        );

        let [thin, thick] = self.stroke_width_range;
        ensure!(
            thin > 0.0 && thin <= thick,
            "stroke_width_range must be increasing and positive, got [{thin}, {thick}]"
        );
        Ok(())
    }
}
