use std::path::PathBuf;

use rusty_frames::controller::{Command, Controller, Response};
use rusty_frames::data::{NullPolicy, Table};
use rusty_frames::snippet::SnippetLanguage;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Message shown in the status bar.
pub enum Status {
    Info(String),
    Error(String),
}

/// An open preview window.
pub struct Preview {
    pub group: String,
    pub policy: NullPolicy,
    pub table: Table,
}

/// An open load-snippet window.
pub struct SnippetView {
    pub name: String,
    pub language: SnippetLanguage,
    pub code: String,
}

/// A destructive action waiting for a yes/no answer.
pub enum Confirm {
    DeleteGroup(String),
    DeleteSaved(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub controller: Controller,

    /// Text of the "Group Name" field.
    pub group_name_input: String,
    pub selected_group: Option<String>,
    /// Files marked for removal; clicking a file toggles it.
    pub selected_files: Vec<PathBuf>,

    pub null_policy: NullPolicy,
    /// Text of the "Table Name" field.
    pub table_name_input: String,

    /// Saved tables, refreshed after every store mutation.
    pub saved_tables: Vec<String>,
    pub selected_saved: Option<String>,

    pub status: Option<Status>,
    pub preview: Option<Preview>,
    pub snippet: Option<SnippetView>,
    pub confirm: Option<Confirm>,
}

impl AppState {
    pub fn new(controller: Controller) -> Self {
        let null_policy = controller.settings().null_policy;
        let mut state = Self {
            controller,
            group_name_input: String::new(),
            selected_group: None,
            selected_files: Vec::new(),
            null_policy,
            table_name_input: String::new(),
            saved_tables: Vec::new(),
            selected_saved: None,
            status: None,
            preview: None,
            snippet: None,
            confirm: None,
        };
        state.refresh_saved();
        state
    }

    /// Dispatch a command and report failures in the status bar.
    fn run(&mut self, command: Command) -> Option<Response> {
        match self.controller.dispatch(command) {
            Ok(response) => {
                if let Response::Done(msg) = &response {
                    self.status = Some(Status::Info(msg.clone()));
                }
                Some(response)
            }
            Err(e) => {
                self.status = Some(Status::Error(format!("Error: {e}")));
                None
            }
        }
    }

    fn require_group(&mut self) -> Option<String> {
        if self.selected_group.is_none() {
            self.status = Some(Status::Error("Please select a group first".into()));
        }
        self.selected_group.clone()
    }

    fn require_saved(&mut self) -> Option<String> {
        if self.selected_saved.is_none() {
            self.status = Some(Status::Error("Please select a saved table first".into()));
        }
        self.selected_saved.clone()
    }

    pub fn refresh_saved(&mut self) {
        if let Some(Response::SavedList(names)) = self.run(Command::ListSaved) {
            if let Some(sel) = &self.selected_saved {
                if !names.contains(sel) {
                    self.selected_saved = None;
                }
            }
            self.saved_tables = names;
        }
    }

    pub fn select_group(&mut self, name: String) {
        self.selected_group = Some(name);
        self.selected_files.clear();
    }

    // -- Group actions --

    pub fn create_group(&mut self) {
        let name = self.group_name_input.trim().to_string();
        if self.run(Command::CreateGroup { name: name.clone() }).is_some() {
            self.group_name_input.clear();
            self.select_group(name);
        }
    }

    pub fn add_files(&mut self, paths: Vec<PathBuf>) {
        let Some(group) = self.require_group() else {
            return;
        };
        if paths.is_empty() {
            return;
        }
        self.run(Command::AddFiles { group, paths });
    }

    pub fn toggle_file(&mut self, path: PathBuf) {
        match self.selected_files.iter().position(|p| *p == path) {
            Some(idx) => {
                self.selected_files.remove(idx);
            }
            None => self.selected_files.push(path),
        }
    }

    pub fn remove_selected_files(&mut self) {
        let Some(group) = self.require_group() else {
            return;
        };
        if self.selected_files.is_empty() {
            self.status = Some(Status::Error("No files selected".into()));
            return;
        }
        let paths = self.selected_files.clone();
        if self.run(Command::RemoveFiles { group, paths }).is_some() {
            self.selected_files.clear();
        }
    }

    pub fn ask_delete_group(&mut self) {
        if let Some(group) = self.require_group() {
            self.confirm = Some(Confirm::DeleteGroup(group));
        }
    }

    // -- Table actions --

    pub fn preview(&mut self) {
        let Some(group) = self.require_group() else {
            return;
        };
        let policy = self.null_policy;
        if let Some(Response::Preview {
            group,
            policy,
            table,
        }) = self.run(Command::Preview { group, policy })
        {
            self.status = Some(Status::Info(format!("Previewing data from group: {group}")));
            self.preview = Some(Preview {
                group,
                policy,
                table,
            });
        }
    }

    pub fn process_and_save(&mut self) {
        let Some(group) = self.require_group() else {
            return;
        };
        let name = self.table_name_input.trim().to_string();
        let policy = self.null_policy;
        if let Some(Response::Saved(saved)) = self.run(Command::ProcessAndSave {
            group,
            policy,
            name,
        }) {
            self.status = Some(Status::Info(format!(
                "Processed and saved '{}' to {}",
                saved.name,
                saved.path.display()
            )));
            self.table_name_input.clear();
            self.selected_saved = Some(saved.name.clone());
            self.refresh_saved();
            self.snippet = Some(SnippetView {
                name: saved.name,
                language: self.controller.store().language(),
                code: saved.snippet,
            });
        }
    }

    pub fn show_snippet(&mut self, language: SnippetLanguage) {
        if let Some(name) = self.require_saved() {
            self.load_snippet(name, language);
        }
    }

    pub fn load_snippet(&mut self, name: String, language: SnippetLanguage) {
        if let Some(Response::Snippet(code)) = self.run(Command::Snippet {
            name: name.clone(),
            language,
        }) {
            self.status = Some(Status::Info(format!("Prepared code to load: {name}")));
            self.snippet = Some(SnippetView {
                name,
                language,
                code,
            });
        }
    }

    pub fn ask_delete_saved(&mut self) {
        if let Some(name) = self.require_saved() {
            self.confirm = Some(Confirm::DeleteSaved(name));
        }
    }

    /// Carry out a confirmed action.
    pub fn confirmed(&mut self, confirm: Confirm) {
        match confirm {
            Confirm::DeleteGroup(name) => {
                if self.run(Command::DeleteGroup { name }).is_some() {
                    self.selected_group = None;
                    self.selected_files.clear();
                }
            }
            Confirm::DeleteSaved(name) => {
                self.run(Command::DeleteSaved { name });
                self.refresh_saved();
            }
        }
    }
}
