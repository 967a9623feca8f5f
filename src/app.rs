use eframe::egui;
use rusty_frames::config::Settings;
use rusty_frames::controller::Controller;

use crate::state::AppState;
use crate::ui::{panels, windows};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyFramesApp {
    pub state: AppState,
}

impl RustyFramesApp {
    pub fn new(settings: Settings) -> rusty_frames::Result<Self> {
        let controller = Controller::open(settings)?;
        Ok(Self {
            state: AppState::new(controller),
        })
    }
}

impl eframe::App for RustyFramesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Bottom panel: status bar ----
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            panels::status_bar(ui, &self.state);
        });

        // ---- Left side panel: groups and files ----
        egui::SidePanel::left("group_panel")
            .default_width(380.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::group_panel(ui, &mut self.state);
            });

        // ---- Central panel: table operations ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::table_panel(ui, &mut self.state);
        });

        // ---- Floating windows ----
        windows::preview_window(ctx, &mut self.state);
        windows::snippet_window(ctx, &mut self.state);
        windows::confirm_dialog(ctx, &mut self.state);
    }
}
