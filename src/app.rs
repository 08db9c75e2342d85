use eframe::egui;

use crate::state::AppState;
use crate::ui::{chart, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct OlympicBumpApp {
    pub state: AppState,
}

impl OlympicBumpApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl Default for OlympicBumpApp {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl eframe::App for OlympicBumpApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: highlight selector ----
        egui::SidePanel::left("highlight_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: bump chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            chart::bump_chart(ui, &mut self.state);
        });
    }
}
