use eframe::egui::{Color32, Pos2, Rect, Vec2, pos2, vec2};

use super::scale::{PointScale, RankScale, rank_ticks};
use crate::data::model::Observation;
use crate::state::AppState;

/// Outer padding of the year axis, in steps.
const YEAR_PADDING: f32 = 1.0;
/// Rough glyph width used for legend hit boxes.
const LEGEND_CHAR_WIDTH: f32 = 7.0;

// ---------------------------------------------------------------------------
// Scene – everything the chart draws, in logical canvas coordinates
// ---------------------------------------------------------------------------

/// A point marker carrying its observation for the tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub pos: Pos2,
    pub observation: Observation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesShape {
    pub country: String,
    pub color: Color32,
    /// Target opacity of the line and markers.
    pub opacity: f32,
    /// Polyline through the points in year order.
    pub line: Vec<Pos2>,
    pub markers: Vec<Marker>,
    /// Left-center anchor of the label at the latest point.
    pub label: Pos2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub country: String,
    pub color: Color32,
    pub active: bool,
    pub swatch: Rect,
    /// Left-center anchor of the label.
    pub label: Pos2,
    /// Clickable area covering swatch and label.
    pub hit: Rect,
}

impl LegendItem {
    /// Swatch opacity: full when active, dimmed otherwise.
    pub fn opacity(&self, dim: f32) -> f32 {
        if self.active { 1.0 } else { dim }
    }
}

/// A tick on either axis: value and its position along that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub value: i64,
    pub pos: f32,
}

/// Renderer-independent description of the chart for one state.
///
/// Rebuilt from scratch on every change, so redrawing can never leave
/// stale series behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Logical canvas size.
    pub size: Vec2,
    /// Plot area inside the margins.
    pub plot: Rect,
    pub series: Vec<SeriesShape>,
    pub legend: Vec<LegendItem>,
    /// x positions of the year ticks.
    pub year_ticks: Vec<Tick>,
    /// y positions of the rank ticks and grid lines.
    pub rank_ticks: Vec<Tick>,
    pub x_title: Pos2,
    /// Center of the rotated y-axis title.
    pub y_title: Pos2,
}

pub const X_TITLE: &str = "Olympic Year";
pub const Y_TITLE: &str = "Rank (1 = Highest)";

impl Scene {
    /// Build the scene for the current state, or `None` with no dataset.
    pub fn build(state: &AppState) -> Option<Scene> {
        let dataset = state.dataset.as_ref()?;
        let config = &state.config;
        let origin = pos2(config.margins.left, config.margins.top);
        let plot = Rect::from_min_size(origin, vec2(config.plot_width(), config.plot_height()));

        let x = PointScale::new(dataset.years.clone(), plot.width(), YEAR_PADDING);
        let y = RankScale::new(dataset.max_rank, plot.height());
        let color_of = |country: &str| {
            state
                .colors
                .as_ref()
                .map_or(Color32::GRAY, |c| c.color_for(country))
        };

        let series = state
            .visible_series()
            .into_iter()
            .filter_map(|s| {
                let markers: Vec<Marker> = s
                    .points
                    .iter()
                    .filter_map(|o| {
                        let px = x.map(o.year)?;
                        Some(Marker {
                            pos: origin + vec2(px, y.map(o.rank)),
                            observation: o.clone(),
                        })
                    })
                    .collect();
                let last = markers.last()?.pos;
                Some(SeriesShape {
                    color: color_of(&s.country),
                    opacity: state.opacity_for(&s.country),
                    line: markers.iter().map(|m| m.pos).collect(),
                    label: last + vec2(config.label_offset, 0.0),
                    markers,
                    country: s.country,
                })
            })
            .collect();

        let legend_origin = pos2(plot.right() + 20.0, plot.top());
        let legend = dataset
            .countries
            .iter()
            .enumerate()
            .map(|(i, country)| {
                let row = legend_origin + vec2(0.0, i as f32 * config.legend_row_height);
                let label_width = country.chars().count() as f32 * LEGEND_CHAR_WIDTH;
                LegendItem {
                    country: country.clone(),
                    color: color_of(country),
                    active: state.is_active(country),
                    swatch: Rect::from_min_size(row + vec2(-15.0, -10.0), vec2(10.0, 10.0)),
                    label: row,
                    hit: Rect::from_min_max(row + vec2(-15.0, -10.0), row + vec2(label_width, 10.0)),
                }
            })
            .collect();

        let year_ticks = dataset
            .years
            .iter()
            .filter_map(|&year| {
                Some(Tick {
                    value: year,
                    pos: plot.left() + x.map(year)?,
                })
            })
            .collect();
        let rank_ticks = rank_ticks(y.max_rank())
            .into_iter()
            .map(|rank| Tick {
                value: rank,
                pos: plot.top() + y.map(rank),
            })
            .collect();

        Some(Scene {
            size: vec2(config.width, config.height),
            plot,
            series,
            legend,
            year_ticks,
            rank_ticks,
            x_title: pos2(plot.center().x, plot.bottom() + 40.0),
            y_title: pos2(plot.left() - 50.0, plot.center().y),
        })
    }

    /// Topmost marker within `tolerance` of `pos`.
    pub fn marker_at(&self, pos: Pos2, tolerance: f32) -> Option<&Marker> {
        self.series
            .iter()
            .rev()
            .flat_map(|s| s.markers.iter().rev())
            .find(|m| m.pos.distance(pos) <= tolerance)
    }

    /// Legend entry whose swatch or label contains `pos`.
    pub fn legend_item_at(&self, pos: Pos2) -> Option<&LegendItem> {
        self.legend.iter().find(|item| item.hit.contains(pos))
    }

    pub fn series_for(&self, country: &str) -> Option<&SeriesShape> {
        self.series.iter().find(|s| s.country == country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::BumpDataset;

    /// A ranks [1,2,1], B [3,3,3], C [2,1,2] across three games.
    fn state() -> AppState {
        let mut rows = Vec::new();
        for (country, ranks) in [("A", [1, 2, 1]), ("B", [3, 3, 3]), ("C", [2, 1, 2])] {
            for (year, rank) in [2012, 2016, 2020].into_iter().zip(ranks) {
                rows.push(Observation::new(country, year, rank, 10.0));
            }
        }
        let mut state = AppState::default();
        state.set_dataset(BumpDataset::from_observations(rows, 10).unwrap());
        state
    }

    #[test]
    fn no_dataset_no_scene() {
        assert!(Scene::build(&AppState::default()).is_none());
    }

    #[test]
    fn geometry_follows_the_scales() {
        let scene = Scene::build(&state()).unwrap();
        assert_eq!(scene.plot, Rect::from_min_size(pos2(80.0, 60.0), vec2(730.0, 480.0)));

        let a = scene.series_for("A").unwrap();
        assert_eq!(a.markers.len(), 3);
        // 730 / (3 - 1 + 2) = 182.5 per step, first year one step in.
        assert_eq!(a.line[0], pos2(80.0 + 182.5, 60.0));
        assert_eq!(a.line[1], pos2(80.0 + 365.0, 60.0 + 240.0));
        assert_eq!(a.label, a.line[2] + vec2(6.0, 0.0));

        let b = scene.series_for("B").unwrap();
        assert!(b.line.iter().all(|p| p.y == 540.0));
    }

    #[test]
    fn axes_and_titles() {
        let scene = Scene::build(&state()).unwrap();
        let years: Vec<i64> = scene.year_ticks.iter().map(|t| t.value).collect();
        assert_eq!(years, vec![2012, 2016, 2020]);
        let ranks: Vec<i64> = scene.rank_ticks.iter().map(|t| t.value).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(scene.rank_ticks[0].pos, 60.0);
        assert_eq!(scene.x_title, pos2(445.0, 580.0));
        assert_eq!(scene.y_title, pos2(30.0, 300.0));
    }

    #[test]
    fn toggling_removes_and_restores_a_series() {
        let mut state = state();
        state.toggle_country("A");
        let scene = Scene::build(&state).unwrap();
        assert!(scene.series_for("A").is_none());
        let item = scene.legend.iter().find(|l| l.country == "A").unwrap();
        assert!(!item.active);
        assert_eq!(item.opacity(state.config.dim_opacity), 0.2);

        state.toggle_country("A");
        let scene = Scene::build(&state).unwrap();
        assert!(scene.series_for("A").is_some());
        assert!(scene.legend.iter().all(|l| l.active));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut state = state();
        state.toggle_country("B");
        state.toggle_country("B");
        let first = Scene::build(&state).unwrap();
        let second = Scene::build(&state).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.series.len(), 3);
    }

    #[test]
    fn highlight_only_changes_opacity() {
        let mut state = state();
        let plain = Scene::build(&state).unwrap();
        state.set_highlight(Some("C"));
        let lit = Scene::build(&state).unwrap();
        for (before, after) in plain.series.iter().zip(&lit.series) {
            assert_eq!(before.line, after.line);
            let expected = if after.country == "C" { 1.0 } else { 0.2 };
            assert_eq!(after.opacity, expected);
        }
    }

    #[test]
    fn hit_testing() {
        let scene = Scene::build(&state()).unwrap();
        let a0 = scene.series_for("A").unwrap().markers[0].clone();
        let hit = scene.marker_at(a0.pos + vec2(3.0, 0.0), 6.0).unwrap();
        assert_eq!(hit.observation, a0.observation);
        assert!(scene.marker_at(pos2(0.0, 0.0), 6.0).is_none());

        let second = &scene.legend[1];
        assert_eq!(
            scene.legend_item_at(second.swatch.center()).map(|l| l.country.as_str()),
            Some(second.country.as_str())
        );
        assert!(scene.legend_item_at(pos2(5.0, 5.0)).is_none());
    }
}
