use std::path::PathBuf;

use eframe::egui;
use olympic_bump::app::OlympicBumpApp;
use olympic_bump::config::ChartConfig;
use olympic_bump::state::AppState;

/// Opened at startup when no path is given and the file exists.
const DEFAULT_DATA: &str = "bump_data_decade.csv";

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = AppState::new(ChartConfig::from_env());
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from(DEFAULT_DATA)).filter(|p| p.exists()));
    if let Some(path) = path {
        state.load_from_path(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 720.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Olympic Bump Chart",
        options,
        Box::new(|_cc| Ok(Box::new(OlympicBumpApp::new(state)))),
    )
}
