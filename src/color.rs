use std::collections::BTreeMap;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Categorical schemes
// ---------------------------------------------------------------------------

/// Tableau 10 followed by ColorBrewer Set3.
const CATEGORICAL: [&str; 22] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f",
    "#edc949", "#af7aa1", "#ff9da7", "#9c755f", "#bab0ab",
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3",
    "#fdb462", "#b3de69", "#fccde5", "#d9d9d9", "#bc80bd",
    "#ccebc5", "#ffed6f",
];

fn categorical() -> Vec<Color32> {
    CATEGORICAL
        .iter()
        .filter_map(|hex| Srgb::<u8>::from_str(hex).ok())
        .map(|rgb| Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
        .collect()
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// `n` distinct colours: the categorical scheme first, generated hues after.
pub fn country_palette(n: usize) -> Vec<Color32> {
    let mut colors = categorical();
    if n > colors.len() {
        colors.extend(generate_palette(n - colors.len()));
    }
    colors.truncate(n);
    colors
}

/// `#rrggbb` for SVG output.
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

// ---------------------------------------------------------------------------
// Color assignment: country → Color32
// ---------------------------------------------------------------------------

/// Fixed country colours, assigned once per dataset in qualifying order.
#[derive(Debug, Clone)]
pub struct ColorAssignment {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorAssignment {
    pub fn new(countries: &[String]) -> Self {
        let palette = country_palette(countries.len());
        let mapping = countries
            .iter()
            .zip(palette)
            .map(|(c, color)| (c.clone(), color))
            .collect();

        ColorAssignment {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping
            .get(country)
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
