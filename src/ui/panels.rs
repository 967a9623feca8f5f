use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_frames::data::{FileFormat, NullPolicy};

use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – groups and their files
// ---------------------------------------------------------------------------

/// Render the group management panel.
pub fn group_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("File Groups");
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Group Name:");
        let response = ui.text_edit_singleline(&mut state.group_name_input);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("New Group").clicked() || submitted {
            state.create_group();
        }
    });
    ui.add_space(4.0);

    ui.strong("Select Group:");
    let groups = state.controller.catalog().group_names();
    ScrollArea::vertical()
        .id_salt("groups")
        .max_height(160.0)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            if groups.is_empty() {
                ui.label("No groups yet.");
            }
            for name in groups {
                let selected = state.selected_group.as_deref() == Some(name.as_str());
                if ui.selectable_label(selected, &name).clicked() {
                    state.select_group(name);
                }
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Add Files…").clicked() {
            let paths = pick_data_files();
            state.add_files(paths);
        }
        if ui.button("Remove Files").clicked() {
            state.remove_selected_files();
        }
        if ui.button("Delete Group").clicked() {
            state.ask_delete_group();
        }
    });
    ui.separator();

    ui.strong("Files in Group:");
    let entries: Vec<(PathBuf, String, usize)> = state
        .selected_group
        .as_deref()
        .and_then(|name| state.controller.catalog().group(name).ok())
        .map(|group| {
            group
                .entries
                .iter()
                .map(|e| (e.path.clone(), e.display_name(), e.table.num_rows()))
                .collect()
        })
        .unwrap_or_default();

    ScrollArea::vertical()
        .id_salt("files")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (path, name, rows) in entries {
                let selected = state.selected_files.contains(&path);
                let label = ui
                    .selectable_label(selected, format!("{name}  ({rows} rows)"))
                    .on_hover_text(path.display().to_string());
                if label.clicked() {
                    state.toggle_file(path);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Central panel – processing and saved tables
// ---------------------------------------------------------------------------

/// Render null handling, save controls and the saved-table list.
pub fn table_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Table Operations");
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Handle Null Values:");
        egui::ComboBox::from_id_salt("null_policy")
            .selected_text(state.null_policy.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for policy in NullPolicy::ALL {
                    ui.selectable_value(&mut state.null_policy, policy, policy.as_str());
                }
            });
    });

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Table Name:");
        ui.text_edit_singleline(&mut state.table_name_input);
    });

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Process & Save").clicked() {
            state.process_and_save();
        }
        if ui.button("Preview Data").clicked() {
            state.preview();
        }
    });
    ui.separator();

    ui.strong("Saved Tables:");
    let saved = state.saved_tables.clone();
    ScrollArea::vertical()
        .id_salt("saved")
        .max_height((ui.available_height() - 40.0).max(60.0))
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            if saved.is_empty() {
                ui.label("Nothing saved yet.");
            }
            for name in saved {
                let selected = state.selected_saved.as_deref() == Some(name.as_str());
                if ui.selectable_label(selected, &name).clicked() {
                    state.selected_saved = Some(name);
                }
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Load Snippet").clicked() {
            let language = state.controller.store().language();
            state.show_snippet(language);
        }
        if ui.button("Delete Table").clicked() {
            state.ask_delete_saved();
        }
        if ui.button("Refresh").clicked() {
            state.refresh_saved();
        }
    });
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

pub fn status_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        match &state.status {
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {
                ui.label("Ready");
            }
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(format!(
                "Storage: {}",
                state.controller.store().dir().display()
            ));
        });
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn pick_data_files() -> Vec<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select data files")
        .add_filter("Data files", FileFormat::EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xls"])
        .add_filter("Simulation output", &["rowOut", "rowout"])
        .pick_files()
        .unwrap_or_default()
}
