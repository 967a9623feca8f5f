use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use arrow::compute::concat_batches;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use tempfile::NamedTempFile;

use crate::data::Table;
use crate::error::{validate_name, Error, Result};
use crate::snippet::{load_snippet, SnippetLanguage};

/// Extension of every saved table.
pub const EXTENSION: &str = "parquet";

/// A table persisted by [`TableStore::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTable {
    pub name: String,
    pub path: PathBuf,
    pub snippet: String,
}

// ---------------------------------------------------------------------------
// TableStore
// ---------------------------------------------------------------------------

/// Saved tables, one Parquet file per name, in a single directory.
#[derive(Debug, Clone)]
pub struct TableStore {
    dir: PathBuf,
    language: SnippetLanguage,
}

impl TableStore {
    /// Open (and create if needed) the storage directory.
    pub fn open(dir: impl Into<PathBuf>, language: SnippetLanguage) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let dir = std::path::absolute(&dir)?;
        log::debug!("Table store at {}", dir.display());
        Ok(TableStore { dir, language })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn language(&self) -> SnippetLanguage {
        self.language
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{EXTENSION}"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Write `table` as `<dir>/<name>.parquet`.
    ///
    /// The data goes to a temporary file first and is renamed into place
    /// without clobbering, so a failure never leaves a partial table behind.
    pub fn save(&self, name: &str, table: &Table) -> Result<SavedTable> {
        let name = validate_name(name)?;
        let path = self.path_for(&name);
        if path.exists() {
            return Err(Error::NameConflict {
                kind: "saved table",
                name,
            });
        }

        self.write_new(&name, &path, table)?;

        log::info!(
            "Saved '{name}' ({} rows x {} columns) to {}",
            table.num_rows(),
            table.num_columns(),
            path.display()
        );
        let snippet = load_snippet(&name, &path, self.language);
        Ok(SavedTable {
            name,
            path,
            snippet,
        })
    }

    /// Read a saved table back, the same way the generated snippet does.
    pub fn load(&self, name: &str) -> Result<Table> {
        let path = self.existing_path(name)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
        let schema = builder.schema().clone();
        let batches = builder.build()?.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(concat_batches(&schema, &batches)?)
    }

    /// Remove a saved table.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.existing_path(name)?;
        fs::remove_file(&path)?;
        log::info!("Deleted saved table '{name}'");
        Ok(())
    }

    /// Names of all saved tables, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load-snippet for an existing saved table.
    pub fn snippet(&self, name: &str, language: SnippetLanguage) -> Result<String> {
        let path = self.existing_path(name)?;
        Ok(load_snippet(name, &path, language))
    }

    /// Write to a temporary file in the store, then rename onto `path`
    /// unless something already sits there. The temporary file is removed
    /// on every failure.
    fn write_new(&self, name: &str, path: &Path, table: &Table) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        let mut writer = ArrowWriter::try_new(tmp.as_file_mut(), table.schema(), None)?;
        writer.write(table)?;
        writer.close()?;

        tmp.persist_noclobber(path).map_err(|e| match e.error.kind() {
            ErrorKind::AlreadyExists => Error::NameConflict {
                kind: "saved table",
                name: name.to_string(),
            },
            _ => Error::Io(e.error),
        })?;
        Ok(())
    }

    fn existing_path(&self, name: &str) -> Result<PathBuf> {
        let path = self.path_for(name);
        if validate_name(name).is_err() || !path.is_file() {
            return Err(Error::NotFound {
                kind: "saved table",
                name: name.to_string(),
            });
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use tempfile::TempDir;

    use super::*;

    fn sample() -> Table {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, true),
            Field::new("value", DataType::Float64, true),
            Field::new("label", DataType::Utf8, true),
            Field::new("ok", DataType::Boolean, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(1), Some(2), None])),
                Arc::new(Float64Array::from(vec![Some(0.25), None, Some(-1.0)])),
                Arc::new(StringArray::from(vec![Some("a"), None, Some("c")])),
                Arc::new(BooleanArray::from(vec![None, Some(true), Some(false)])),
            ],
        )
        .unwrap()
    }

    fn store() -> (TempDir, TableStore) {
        let dir = TempDir::new().unwrap();
        let store = TableStore::open(dir.path().join("saved"), SnippetLanguage::Rust).unwrap();
        (dir, store)
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let table = sample();
        let saved = store.save("runs", &table).unwrap();

        assert_eq!(saved.path, store.path_for("runs"));
        assert!(saved.path.is_absolute());
        assert!(saved.snippet.contains(&saved.path.display().to_string()));

        let loaded = store.load("runs").unwrap();
        assert_eq!(loaded.schema().fields(), table.schema().fields());
        assert_eq!(loaded.columns(), table.columns());
    }

    #[test]
    fn empty_table_round_trips() {
        let (_dir, store) = store();
        let table = sample().slice(0, 0);
        store.save("empty", &table).unwrap();
        let loaded = store.load("empty").unwrap();
        assert_eq!(loaded.num_rows(), 0);
        assert_eq!(loaded.schema().fields(), table.schema().fields());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let (_dir, store) = store();
        store.save("runs", &sample()).unwrap();
        assert!(matches!(
            store.save("runs", &sample()),
            Err(Error::NameConflict { kind: "saved table", .. })
        ));
        assert_eq!(store.list().unwrap(), vec!["runs"]);
    }

    #[test]
    fn invalid_name_writes_nothing() {
        let (_dir, store) = store();
        assert!(matches!(store.save("../escape", &sample()), Err(Error::InvalidName(_))));
        assert!(fs::read_dir(store.dir()).unwrap().next().is_none());
    }

    #[test]
    fn conflict_at_rename_keeps_existing_file_and_leaves_no_temp() {
        let (_dir, store) = store();
        let path = store.path_for("runs");
        // Another writer got there between the existence check and the rename.
        fs::write(&path, b"not ours").unwrap();

        let err = store.write_new("runs", &path, &sample()).unwrap_err();
        assert!(matches!(err, Error::NameConflict { kind: "saved table", .. }), "got {err:?}");
        assert_eq!(fs::read(&path).unwrap(), b"not ours");

        let entries: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("runs.parquet")]);
    }

    #[test]
    fn rejected_save_leaves_only_the_original() {
        let (_dir, store) = store();
        store.save("runs", &sample()).unwrap();
        assert!(store.save("runs", &sample().slice(0, 1)).is_err());

        let count = fs::read_dir(store.dir()).unwrap().count();
        assert_eq!(count, 1);
        assert_eq!(store.load("runs").unwrap().num_rows(), 3);
    }

    #[test]
    fn list_ignores_other_files() {
        let (_dir, store) = store();
        store.save("b", &sample()).unwrap();
        store.save("a", &sample()).unwrap();
        fs::write(store.dir().join("notes.txt"), "x").unwrap();
        assert_eq!(store.list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn delete_removes_file_and_missing_is_not_found() {
        let (_dir, store) = store();
        store.save("runs", &sample()).unwrap();
        store.delete("runs").unwrap();
        assert!(!store.exists("runs"));
        assert!(matches!(store.delete("runs"), Err(Error::NotFound { .. })));
        assert!(matches!(store.load("runs"), Err(Error::NotFound { .. })));
        assert!(matches!(
            store.snippet("runs", SnippetLanguage::Python),
            Err(Error::NotFound { .. })
        ));
    }
}
