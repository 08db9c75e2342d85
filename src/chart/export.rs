use std::path::Path;

use anyhow::{Context, Result};
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Line, Path as SvgPath, Rectangle, Text};

use super::scene::{Scene, X_TITLE, Y_TITLE};
use crate::color::to_hex;
use crate::config::ChartConfig;

const GRID: &str = "#ddd";

/// Render a scene as a standalone, responsive SVG document.
pub fn render(scene: &Scene, config: &ChartConfig) -> Document {
    let plot = scene.plot;
    let mut document = Document::new()
        .set("viewBox", (0.0_f32, 0.0_f32, scene.size.x, scene.size.y))
        .set("preserveAspectRatio", "xMidYMid meet")
        .set("font-family", "sans-serif")
        .set("font-size", 10);

    let mut grid = Group::new().set("class", "grid");
    for tick in &scene.rank_ticks {
        grid = grid.add(
            Line::new()
                .set("x1", plot.left())
                .set("x2", plot.right())
                .set("y1", tick.pos)
                .set("y2", tick.pos)
                .set("stroke", GRID)
                .set("stroke-dasharray", "1.5, 1.5"),
        );
    }
    document = document.add(grid);

    let mut axes = Group::new().set("class", "axes");
    for tick in &scene.year_ticks {
        axes = axes.add(
            Text::new(tick.value.to_string())
                .set("x", tick.pos)
                .set("y", plot.bottom() + 18.0)
                .set("text-anchor", "middle"),
        );
    }
    for tick in &scene.rank_ticks {
        axes = axes.add(
            Text::new(tick.value.to_string())
                .set("x", plot.left() - 9.0)
                .set("y", tick.pos)
                .set("dy", "0.32em")
                .set("text-anchor", "end"),
        );
    }
    axes = axes
        .add(
            Text::new(X_TITLE)
                .set("x", scene.x_title.x)
                .set("y", scene.x_title.y)
                .set("text-anchor", "middle")
                .set("font-weight", "bold"),
        )
        .add(
            Text::new(Y_TITLE)
                .set(
                    "transform",
                    format!("translate({},{}) rotate(-90)", scene.y_title.x, scene.y_title.y),
                )
                .set("text-anchor", "middle")
                .set("font-weight", "bold"),
        );
    document = document.add(axes);

    let mut lines = Group::new().set("class", "line-group");
    let mut circles = Group::new().set("class", "circle-group");
    for series in &scene.series {
        let color = to_hex(series.color);
        if let Some((first, rest)) = series.line.split_first() {
            let data = rest
                .iter()
                .fold(Data::new().move_to((first.x, first.y)), |d, p| d.line_to((p.x, p.y)));
            lines = lines.add(
                SvgPath::new()
                    .set("class", "country-line")
                    .set("data-country", series.country.as_str())
                    .set("fill", "none")
                    .set("stroke", color.as_str())
                    .set("stroke-width", config.line_width)
                    .set("opacity", series.opacity)
                    .set("d", data),
            );
        }
        lines = lines.add(
            Text::new(series.country.as_str())
                .set("x", series.label.x)
                .set("y", series.label.y)
                .set("dy", "0.32em")
                .set("font-size", "12px")
                .set("fill", color.as_str()),
        );
        for marker in &series.markers {
            let o = &marker.observation;
            circles = circles.add(
                Circle::new()
                    .set("class", "country-circle")
                    .set("data-country", o.country.as_str())
                    .set("data-year", o.year)
                    .set("data-rank", o.rank)
                    .set("data-points", o.total_points)
                    .set("cx", marker.pos.x)
                    .set("cy", marker.pos.y)
                    .set("r", config.marker_radius)
                    .set("fill", color.as_str())
                    .set("opacity", series.opacity),
            );
        }
    }
    document = document.add(lines).add(circles);

    let mut legend = Group::new().set("class", "legend");
    for item in &scene.legend {
        let mut swatch = Rectangle::new()
            .set("x", item.swatch.left())
            .set("y", item.swatch.top())
            .set("width", item.swatch.width())
            .set("height", item.swatch.height())
            .set("fill", to_hex(item.color))
            .set("opacity", item.opacity(config.dim_opacity));
        if item.active {
            swatch = swatch.set("stroke", "black").set("stroke-width", 2);
        }
        legend = legend.add(swatch).add(
            Text::new(item.country.as_str())
                .set("x", item.label.x)
                .set("y", item.label.y)
                .set("dy", "0.32em"),
        );
    }
    document.add(legend)
}

/// Write the scene to `path` as SVG.
pub fn save(path: &Path, scene: &Scene, config: &ChartConfig) -> Result<()> {
    let document = render(scene, config);
    svg::save(path, &document).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{BumpDataset, Observation};
    use crate::state::AppState;

    fn scene(state: &mut AppState) -> Scene {
        let rows = vec![
            Observation::new("Norway", 2018, 1, 39.0),
            Observation::new("Norway", 2022, 1, 37.0),
            Observation::new("Germany", 2018, 2, 31.0),
            Observation::new("Germany", 2022, 3, 27.0),
        ];
        state.set_dataset(BumpDataset::from_observations(rows, 10).unwrap());
        Scene::build(state).unwrap()
    }

    #[test]
    fn document_has_view_box_and_one_path_per_series() {
        let mut state = AppState::default();
        let text = render(&scene(&mut state), &state.config).to_string();
        assert!(text.contains(r#"viewBox="0 0 960 600""#));
        assert_eq!(text.matches("class=\"country-line\"").count(), 2);
        assert_eq!(text.matches("class=\"country-circle\"").count(), 4);
        assert!(text.contains("Olympic Year"));
    }

    #[test]
    fn inactive_legend_entries_have_no_outline() {
        let mut state = AppState::default();
        scene(&mut state);
        state.toggle_country("Germany");
        let text = render(&Scene::build(&state).unwrap(), &state.config).to_string();
        assert_eq!(text.matches("class=\"country-line\"").count(), 1);
        assert_eq!(text.matches("stroke=\"black\"").count(), 1);
    }

    #[test]
    fn save_writes_a_file() {
        let mut state = AppState::default();
        let scene = scene(&mut state);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        save(&path, &scene, &state.config).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<svg"));
        assert!(written.contains("Norway"));
    }
}
