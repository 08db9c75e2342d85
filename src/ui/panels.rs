use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::chart::export;
use crate::chart::scene::Scene;
use crate::data::model::CountrySeries;
use crate::state::AppState;

const NO_HIGHLIGHT: &str = "-- Select a country to highlight --";

// ---------------------------------------------------------------------------
// Left side panel – highlight selector and observations
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Highlight");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the combo box.
    let countries = state.countries().to_vec();
    let current = state.highlighted().map(str::to_string);

    egui::ComboBox::from_id_salt("highlight_country")
        .width(ui.available_width())
        .selected_text(current.as_deref().unwrap_or(NO_HIGHLIGHT))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), NO_HIGHLIGHT).clicked() {
                state.set_highlight(None);
            }
            for country in &countries {
                let selected = current.as_deref() == Some(country.as_str());
                if ui.selectable_label(selected, country).clicked() {
                    state.set_highlight(Some(country.as_str()));
                }
            }
        });

    ui.add_space(4.0);
    ui.label(
        RichText::new(format!(
            "{} of {} countries shown. Click a legend entry to toggle it.",
            state.active_count(),
            countries.len()
        ))
        .weak(),
    );
    ui.separator();

    let series = state
        .highlighted()
        .and_then(|c| state.dataset.as_ref()?.series_for(c));
    match series {
        Some(series) => {
            ui.strong(&series.country);
            observations_table(ui, &series);
        }
        None => {
            ui.label("Highlight a country to list its results.");
        }
    }
}

fn observations_table(ui: &mut Ui, series: &CountrySeries) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Year");
            });
            header.col(|ui| {
                ui.strong("Rank");
            });
            header.col(|ui| {
                ui.strong("Points");
            });
        })
        .body(|mut body| {
            for o in &series.points {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(o.year.to_string());
                    });
                    row.col(|ui| {
                        ui.label(o.rank.to_string());
                    });
                    row.col(|ui| {
                        ui.label(o.total_points.to_string());
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export SVG…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(path)) = (&state.dataset, &state.source) {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} countries, {} games",
                ds.countries.len(),
                ds.years.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open rank table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_from_path(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(scene) = Scene::build(state) else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export chart")
        .add_filter("SVG", &["svg"])
        .set_file_name("bump_chart.svg")
        .save_file();

    if let Some(path) = file {
        match export::save(&path, &scene, &state.config) {
            Ok(()) => {
                log::info!("Exported chart to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export chart: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}
