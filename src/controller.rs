use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::data::{apply_null_policy, NullPolicy, Table};
use crate::error::Result;
use crate::snippet::SnippetLanguage;
use crate::store::{SavedTable, TableStore};

// ---------------------------------------------------------------------------
// Commands and responses
// ---------------------------------------------------------------------------

/// A user action, as issued by the shell.
#[derive(Debug, Clone)]
pub enum Command {
    CreateGroup { name: String },
    DeleteGroup { name: String },
    AddFiles { group: String, paths: Vec<PathBuf> },
    RemoveFiles { group: String, paths: Vec<PathBuf> },
    Preview { group: String, policy: NullPolicy },
    ProcessAndSave { group: String, policy: NullPolicy, name: String },
    Snippet { name: String, language: SnippetLanguage },
    DeleteSaved { name: String },
    ListSaved,
}

/// Result of a successful [`Command`].
#[derive(Debug, Clone)]
pub enum Response {
    /// A mutation succeeded; the text is meant for the status bar.
    Done(String),
    Preview {
        group: String,
        policy: NullPolicy,
        table: Table,
    },
    Saved(SavedTable),
    Snippet(String),
    SavedList(Vec<String>),
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Owns the catalog and the table store for the lifetime of the app.
#[derive(Debug)]
pub struct Controller {
    catalog: Catalog,
    store: TableStore,
    settings: Settings,
}

impl Controller {
    pub fn open(settings: Settings) -> Result<Self> {
        let store = TableStore::open(&settings.storage_dir, settings.snippet_language)?;
        Ok(Controller {
            catalog: Catalog::new(),
            store,
            settings,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one command. Failed commands leave all state unchanged.
    pub fn dispatch(&mut self, command: Command) -> Result<Response> {
        let label = format!("{command:?}");
        let result = self.run(command);
        match &result {
            Ok(_) => log::debug!("{label}: ok"),
            Err(e) => log::error!("{label}: {e}"),
        }
        result
    }

    fn run(&mut self, command: Command) -> Result<Response> {
        match command {
            Command::CreateGroup { name } => {
                self.catalog.create_group(&name)?;
                Ok(Response::Done(format!("Created group: {}", name.trim())))
            }
            Command::DeleteGroup { name } => {
                self.catalog.delete_group(&name)?;
                Ok(Response::Done(format!("Deleted group: {name}")))
            }
            Command::AddFiles { group, paths } => {
                self.catalog.add_files(&group, &paths)?;
                Ok(Response::Done(format!(
                    "Added {} file(s) to {group}",
                    paths.len()
                )))
            }
            Command::RemoveFiles { group, paths } => {
                let removed = self.catalog.remove_files(&group, &paths)?;
                let message = match removed.as_slice() {
                    [entry] => format!("Removed {} from '{group}'", entry.display_name()),
                    entries => format!("Removed {} files from '{group}'", entries.len()),
                };
                Ok(Response::Done(message))
            }
            Command::Preview { group, policy } => {
                let table = self.process(&group, policy)?;
                Ok(Response::Preview {
                    group,
                    policy,
                    table,
                })
            }
            Command::ProcessAndSave {
                group,
                policy,
                name,
            } => {
                let table = self.process(&group, policy)?;
                let saved = self.store.save(&name, &table)?;
                Ok(Response::Saved(saved))
            }
            Command::Snippet { name, language } => {
                Ok(Response::Snippet(self.store.snippet(&name, language)?))
            }
            Command::DeleteSaved { name } => {
                self.store.delete(&name)?;
                Ok(Response::Done(format!("Deleted saved table: {name}")))
            }
            Command::ListSaved => Ok(Response::SavedList(self.store.list()?)),
        }
    }

    /// Merge a group and apply the null policy.
    fn process(&self, group: &str, policy: NullPolicy) -> Result<Table> {
        let merged = self.catalog.merge_group(group)?;
        let table = apply_null_policy(&merged, policy)?;
        log::info!(
            "Processed '{group}' with policy {policy}: {} -> {} rows",
            merged.num_rows(),
            table.num_rows()
        );
        Ok(table)
    }
}
