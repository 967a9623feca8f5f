use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use arrow::util::pretty::pretty_format_batches;
use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use rusty_frames::data::Table;
use rusty_frames::snippet::SnippetLanguage;

use crate::state::{AppState, Confirm, Status};

// ---------------------------------------------------------------------------
// Preview window
// ---------------------------------------------------------------------------

fn cell_text(column: &dyn Array, row: usize) -> String {
    if column.is_null(row) {
        return "<null>".to_string();
    }
    array_value_to_string(column, row).unwrap_or_else(|e| format!("<{e}>"))
}

fn preview_table(ui: &mut Ui, table: &Table) {
    let schema = table.schema();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(32.0))
        .columns(Column::auto().at_least(60.0), table.num_columns())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for field in schema.fields() {
                header.col(|ui| {
                    ui.strong(field.name()).on_hover_text(field.data_type().to_string());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.num_rows(), |mut row| {
                let idx = row.index();
                row.col(|ui| {
                    ui.label(idx.to_string());
                });
                for column in table.columns() {
                    row.col(|ui| {
                        ui.label(cell_text(column.as_ref(), idx));
                    });
                }
            });
        });
}

/// Shape, columns and the first rows of the processed group.
pub fn preview_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(preview) = &state.preview else {
        return;
    };
    let limit = state.controller.settings().preview_rows;
    let head = preview.table.slice(0, preview.table.num_rows().min(limit));
    let columns: Vec<String> = preview
        .table
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let mut open = true;
    let mut copied = None;
    egui::Window::new(format!("Preview: {}", preview.group))
        .open(&mut open)
        .default_size([800.0, 600.0])
        .show(ctx, |ui| {
            ui.label(format!(
                "Shape: {} rows × {} columns",
                preview.table.num_rows(),
                preview.table.num_columns()
            ));
            ui.label(format!("Columns: {}", columns.join(", ")));
            ui.label(format!("Null handling: {}", preview.policy));
            ui.horizontal(|ui| {
                if ui.button("Copy as text").clicked() {
                    copied = Some(match pretty_format_batches(&[head.clone()]) {
                        Ok(text) => {
                            ctx.copy_text(text.to_string());
                            Status::Info("Preview copied to clipboard".into())
                        }
                        Err(e) => Status::Error(format!("Error: {e}")),
                    });
                }
                if head.num_rows() < preview.table.num_rows() {
                    ui.label(RichText::new(format!("first {} rows shown", head.num_rows())).weak());
                }
            });
            ui.separator();
            egui::ScrollArea::horizontal().show(ui, |ui| {
                preview_table(ui, &head);
            });
        });

    if copied.is_some() {
        state.status = copied;
    }
    if !open {
        state.preview = None;
    }
}

// ---------------------------------------------------------------------------
// Snippet window
// ---------------------------------------------------------------------------

/// Load-snippet for a saved table, with a copy-to-clipboard button.
pub fn snippet_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(snippet) = &state.snippet else {
        return;
    };

    let mut open = true;
    let mut copied = false;
    let mut language = snippet.language;
    egui::Window::new(format!("Load table: {}", snippet.name))
        .open(&mut open)
        .default_size([600.0, 300.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Use this code to load your table:");
                for lang in SnippetLanguage::ALL {
                    ui.selectable_value(&mut language, lang, lang.to_string());
                }
            });
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut snippet.code.as_str())
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });
            if ui.button("Copy to Clipboard").clicked() {
                ctx.copy_text(snippet.code.clone());
                copied = true;
            }
        });

    let name = snippet.name.clone();
    let changed = language != snippet.language;
    if copied {
        state.status = Some(Status::Info("Code copied to clipboard".into()));
    }
    if !open {
        state.snippet = None;
    } else if changed {
        state.load_snippet(name, language);
    }
}

// ---------------------------------------------------------------------------
// Confirmation dialog
// ---------------------------------------------------------------------------

pub fn confirm_dialog(ctx: &egui::Context, state: &mut AppState) {
    let Some(confirm) = &state.confirm else {
        return;
    };
    let question = match confirm {
        Confirm::DeleteGroup(name) => {
            format!("Are you sure you want to delete group '{name}'?")
        }
        Confirm::DeleteSaved(name) => {
            format!("Are you sure you want to delete saved table '{name}'?")
        }
    };

    let mut answer = None;
    egui::Window::new("Confirm")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(question);
            ui.horizontal(|ui| {
                if ui.button("Yes").clicked() {
                    answer = Some(true);
                }
                if ui.button("No").clicked() {
                    answer = Some(false);
                }
            });
        });

    match answer {
        Some(true) => {
            if let Some(confirm) = state.confirm.take() {
                state.confirmed(confirm);
            }
        }
        Some(false) => state.confirm = None,
        None => {}
    }
}
