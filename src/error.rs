use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Errors surfaced by the catalog, readers and table store.
///
/// Every variant maps to a single user action that failed; none of them
/// leave the catalog or the storage directory half-modified.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("group '{0}' not found")]
    GroupNotFound(String),

    #[error("{kind} '{name}' already exists")]
    NameConflict { kind: &'static str, name: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("invalid name '{0}': names must be non-empty file stems")]
    InvalidName(String),

    #[error("group '{0}' has no files")]
    EmptyGroup(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error(transparent)]
    Parquet(#[from] ParquetError),
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Trim a user-supplied group or table name and make sure it can be used as
/// a file stem.
pub fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if bad {
        return Err(Error::InvalidName(raw.to_string()));
    }
    Ok(name.to_string())
}
