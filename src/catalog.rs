use std::path::{Path, PathBuf};

use crate::data::{concat_tables, FileFormat, Table};
use crate::error::{validate_name, Error, Result};

// ---------------------------------------------------------------------------
// FileEntry / Group
// ---------------------------------------------------------------------------

/// One imported file and the table read from it.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub format: FileFormat,
    pub table: Table,
}

impl FileEntry {
    /// Read `path` with the reader its extension selects.
    pub fn read(path: &Path) -> Result<Self> {
        let format = FileFormat::from_path(path)?;
        let table = format.read(path)?;
        Ok(FileEntry {
            path: path.to_path_buf(),
            format,
            table,
        })
    }

    /// File name for display; falls back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A named, ordered collection of imported files.
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub entries: Vec<FileEntry>,
}

impl Group {
    fn position(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.path == path)
    }

    /// Total rows over all entries.
    pub fn row_count(&self) -> usize {
        self.entries.iter().map(|e| e.table.num_rows()).sum()
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Groups in creation order.
#[derive(Debug, Default)]
pub struct Catalog {
    groups: Vec<Group>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }

    pub fn group(&self, name: &str) -> Result<&Group> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| Error::GroupNotFound(name.to_string()))
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut Group> {
        self.groups
            .iter_mut()
            .find(|g| g.name == name)
            .ok_or_else(|| Error::GroupNotFound(name.to_string()))
    }

    /// Create an empty group. Existing names are rejected.
    pub fn create_group(&mut self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        if self.groups.iter().any(|g| g.name == name) {
            return Err(Error::NameConflict { kind: "group", name });
        }
        log::info!("Created group '{name}'");
        self.groups.push(Group {
            name,
            entries: Vec::new(),
        });
        Ok(())
    }

    /// Remove a group and its entries. Saved tables are not affected.
    pub fn delete_group(&mut self, name: &str) -> Result<Group> {
        let idx = self
            .groups
            .iter()
            .position(|g| g.name == name)
            .ok_or_else(|| Error::GroupNotFound(name.to_string()))?;
        log::info!("Deleted group '{name}'");
        Ok(self.groups.remove(idx))
    }

    /// Import one file into a group.
    ///
    /// A path already in the group is read again and replaced in place.
    pub fn add_file(&mut self, group: &str, path: &Path) -> Result<()> {
        self.add_files(group, std::slice::from_ref(&path.to_path_buf()))
    }

    /// Import several files. Either all of them are added or none is.
    pub fn add_files(&mut self, group: &str, paths: &[PathBuf]) -> Result<()> {
        // Fail fast on a missing group before touching any file.
        self.group(group)?;

        let entries = paths
            .iter()
            .map(|p| FileEntry::read(p))
            .collect::<Result<Vec<_>>>()?;

        let group = self.group_mut(group)?;
        for entry in entries {
            log::info!(
                "Added {} to '{}' ({} rows)",
                entry.path.display(),
                group.name,
                entry.table.num_rows()
            );
            match group.position(&entry.path) {
                Some(idx) => group.entries[idx] = entry,
                None => group.entries.push(entry),
            }
        }
        Ok(())
    }

    /// Remove a file from a group. Fails if the path is not in the group.
    pub fn remove_file(&mut self, group: &str, path: &Path) -> Result<FileEntry> {
        let mut removed = self.remove_files(group, std::slice::from_ref(&path.to_path_buf()))?;
        removed.pop().ok_or_else(|| Error::NotFound {
            kind: "file",
            name: path.display().to_string(),
        })
    }

    /// Remove several files. If any path is not in the group nothing is removed.
    pub fn remove_files(&mut self, group: &str, paths: &[PathBuf]) -> Result<Vec<FileEntry>> {
        let group = self.group_mut(group)?;
        if let Some(missing) = paths.iter().find(|p| group.position(p).is_none()) {
            return Err(Error::NotFound {
                kind: "file",
                name: missing.display().to_string(),
            });
        }

        let mut removed = Vec::with_capacity(paths.len());
        for path in paths {
            // Listed twice: already gone.
            let Some(idx) = group.position(path) else {
                continue;
            };
            log::info!("Removed {} from '{}'", path.display(), group.name);
            removed.push(group.entries.remove(idx));
        }
        Ok(removed)
    }

    /// Concatenate every entry of a group into one table.
    pub fn merge_group(&self, name: &str) -> Result<Table> {
        let group = self.group(name)?;
        if group.entries.is_empty() {
            return Err(Error::EmptyGroup(name.to_string()));
        }
        let tables: Vec<&Table> = group.entries.iter().map(|e| &e.table).collect();
        concat_tables(&tables)
    }
}
