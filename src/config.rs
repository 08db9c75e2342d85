use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "OLYMPIC_BUMP_CONFIG";

// ---------------------------------------------------------------------------
// Chart configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 60.0,
            right: 150.0,
            bottom: 60.0,
            left: 80.0,
        }
    }
}

/// Geometry and behaviour knobs for the chart.  Lengths are in logical
/// units of the fixed `width` × `height` canvas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
    /// Size of the qualifying set.
    pub top_n: usize,
    /// Opacity of non-highlighted series and inactive legend swatches.
    pub dim_opacity: f32,
    pub marker_radius: f32,
    pub line_width: f32,
    /// Horizontal gap between the last point and the series label.
    pub label_offset: f32,
    pub legend_row_height: f32,
    /// Duration of the highlight fade, in seconds.
    pub transition_secs: f32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            margins: Margins::default(),
            top_n: 10,
            dim_opacity: 0.2,
            marker_radius: 4.0,
            line_width: 2.0,
            label_offset: 6.0,
            legend_row_height: 20.0,
            transition_secs: 0.3,
        }
    }
}

impl ChartConfig {
    /// Width of the plot area inside the margins.
    pub fn plot_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    /// Height of the plot area inside the margins.
    pub fn plot_height(&self) -> f32 {
        self.height - self.margins.top - self.margins.bottom
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing chart config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Config from the file named by [`CONFIG_ENV`], or the defaults.
    pub fn from_env() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::load(Path::new(&path)) {
            Ok(config) => {
                log::info!("Loaded chart config from {path}");
                config
            }
            Err(e) => {
                log::error!("Ignoring chart config: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plot_area() {
        let config = ChartConfig::default();
        assert_eq!(config.plot_width(), 730.0);
        assert_eq!(config.plot_height(), 480.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ChartConfig::from_json(r#"{"top_n": 5, "margins": {"right": 200}}"#).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.margins.right, 200.0);
        assert_eq!(config.margins.left, 80.0);
        assert_eq!(config.dim_opacity, 0.2);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ChartConfig::from_json("{top_n: 5").is_err());
    }
}
