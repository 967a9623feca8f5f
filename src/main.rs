mod app;
mod state;
mod ui;

use app::RustyFramesApp;
use eframe::egui;
use rusty_frames::config::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::from_env().unwrap_or_else(|e| {
        log::warn!("Using default settings: {e:#}");
        Settings::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Frames – Table Manager",
        options,
        Box::new(|_cc| Ok(Box::new(RustyFramesApp::new(settings)?))),
    )
}
