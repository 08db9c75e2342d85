use std::f32::consts::FRAC_PI_2;

use eframe::egui::epaint::TextShape;
use eframe::egui::{
    self, Align2, Color32, CursorIcon, FontId, Id, Painter, Sense, Shape, Stroke, Ui, vec2,
};

use crate::chart::scale::FitTransform;
use crate::chart::scene::{Scene, X_TITLE, Y_TITLE};
use crate::config::ChartConfig;
use crate::data::model::Observation;
use crate::state::AppState;

/// Extra pick radius around markers, in logical units.
const HOVER_SLACK: f32 = 2.0;

// ---------------------------------------------------------------------------
// Bump chart (central panel)
// ---------------------------------------------------------------------------

/// Render the bump chart and apply legend clicks and marker hover.
pub fn bump_chart(ui: &mut Ui, state: &mut AppState) {
    let Some(scene) = Scene::build(state) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a rank table to view the chart  (File → Open…)");
        });
        return;
    };

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
    let fit = FitTransform::new(scene.size, response.rect);
    let text_color = ui.visuals().text_color();
    let grid_color = ui.visuals().weak_text_color().gamma_multiply(0.5);

    draw_axes(&painter, &scene, &fit, text_color, grid_color);
    draw_series(ui.ctx(), &painter, &scene, &fit, &state.config);
    draw_legend(&painter, &scene, &fit, &state.config, text_color);

    let pointer = response.hover_pos().map(|p| fit.to_logical(p));
    if pointer.is_some_and(|p| scene.legend_item_at(p).is_some()) {
        ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
    }

    if response.clicked() {
        let clicked = response
            .interact_pointer_pos()
            .and_then(|p| scene.legend_item_at(fit.to_logical(p)));
        if let Some(item) = clicked {
            state.toggle_country(&item.country);
        }
    }

    let tolerance = state.config.marker_radius + HOVER_SLACK;
    state.hovered = pointer
        .and_then(|p| scene.marker_at(p, tolerance))
        .map(|m| m.observation.clone());

    if let Some(observation) = &state.hovered {
        response.on_hover_ui_at_pointer(|ui: &mut Ui| tooltip(ui, observation));
    }
}

fn tooltip(ui: &mut Ui, o: &Observation) {
    ui.strong(&o.country);
    ui.label(format!("Year: {}", o.year));
    ui.label(format!("Rank: {}", o.rank));
    ui.label(format!("TotalPoints: {}", o.total_points));
}

// ---------------------------------------------------------------------------
// Drawing helpers
// ---------------------------------------------------------------------------

fn draw_axes(
    painter: &Painter,
    scene: &Scene,
    fit: &FitTransform,
    text_color: Color32,
    grid_color: Color32,
) {
    let plot = fit.rect_to_screen(scene.plot);
    let tick_font = FontId::proportional(fit.scaled(10.0));
    let title_font = FontId::proportional(fit.scaled(13.0));
    let axis = Stroke::new(1.0, text_color);

    for tick in &scene.rank_ticks {
        let y = fit.to_screen(egui::pos2(scene.plot.left(), tick.pos)).y;
        painter.extend(Shape::dashed_line(
            &[egui::pos2(plot.left(), y), egui::pos2(plot.right(), y)],
            Stroke::new(1.0, grid_color),
            fit.scaled(1.5),
            fit.scaled(1.5),
        ));
        painter.text(
            egui::pos2(plot.left() - fit.scaled(9.0), y),
            Align2::RIGHT_CENTER,
            tick.value.to_string(),
            tick_font.clone(),
            text_color,
        );
    }

    painter.line_segment([plot.left_bottom(), plot.right_bottom()], axis);
    for tick in &scene.year_ticks {
        let x = fit.to_screen(egui::pos2(tick.pos, scene.plot.bottom())).x;
        let base = egui::pos2(x, plot.bottom());
        painter.line_segment([base, base + vec2(0.0, fit.scaled(6.0))], axis);
        painter.text(
            base + vec2(0.0, fit.scaled(9.0)),
            Align2::CENTER_TOP,
            tick.value.to_string(),
            tick_font.clone(),
            text_color,
        );
    }

    painter.text(
        fit.to_screen(scene.x_title),
        Align2::CENTER_CENTER,
        X_TITLE,
        title_font.clone(),
        text_color,
    );

    // Rotated text pivots on its top-left corner.
    let galley = painter.layout_no_wrap(Y_TITLE.to_string(), title_font, text_color);
    let centre = fit.to_screen(scene.y_title);
    let anchor = centre + vec2(-galley.size().y / 2.0, galley.size().x / 2.0);
    painter.add(TextShape::new(anchor, galley, text_color).with_angle(-FRAC_PI_2));
}

fn draw_series(
    ctx: &egui::Context,
    painter: &Painter,
    scene: &Scene,
    fit: &FitTransform,
    config: &ChartConfig,
) {
    let label_font = FontId::proportional(fit.scaled(12.0));

    for series in &scene.series {
        let opacity = ctx.animate_value_with_time(
            Id::new(("series_opacity", series.country.as_str())),
            series.opacity,
            config.transition_secs,
        );
        let color = series.color.gamma_multiply(opacity);

        let points = series.line.iter().map(|p| fit.to_screen(*p)).collect();
        painter.add(Shape::line(
            points,
            Stroke::new(fit.scaled(config.line_width), color),
        ));
        for marker in &series.markers {
            painter.circle_filled(
                fit.to_screen(marker.pos),
                fit.scaled(config.marker_radius),
                color,
            );
        }
        painter.text(
            fit.to_screen(series.label),
            Align2::LEFT_CENTER,
            &series.country,
            label_font.clone(),
            series.color,
        );
    }
}

fn draw_legend(
    painter: &Painter,
    scene: &Scene,
    fit: &FitTransform,
    config: &ChartConfig,
    text_color: Color32,
) {
    let font = FontId::proportional(fit.scaled(12.0));

    for item in &scene.legend {
        let swatch = fit.rect_to_screen(item.swatch);
        painter.rect_filled(
            swatch,
            0.0,
            item.color.gamma_multiply(item.opacity(config.dim_opacity)),
        );
        if item.active {
            let outline = vec![
                swatch.left_top(),
                swatch.right_top(),
                swatch.right_bottom(),
                swatch.left_bottom(),
            ];
            painter.add(Shape::closed_line(
                outline,
                Stroke::new(fit.scaled(2.0), text_color),
            ));
        }
        painter.text(
            fit.to_screen(item.label),
            Align2::LEFT_CENTER,
            &item.country,
            font.clone(),
            text_color,
        );
    }
}
