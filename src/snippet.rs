use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Language of the generated load-snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetLanguage {
    /// `parquet` + `arrow` crates.
    #[default]
    Rust,
    /// `pandas.read_parquet`.
    Python,
}

impl SnippetLanguage {
    pub const ALL: [SnippetLanguage; 2] = [SnippetLanguage::Rust, SnippetLanguage::Python];
}

impl fmt::Display for SnippetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnippetLanguage::Rust => f.write_str("Rust"),
            SnippetLanguage::Python => f.write_str("Python"),
        }
    }
}

/// Turn a saved-table name into a variable name.
pub fn identifier(name: &str) -> String {
    let mut ident: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Code that reloads the table saved at `path`.
pub fn load_snippet(name: &str, path: &Path, language: SnippetLanguage) -> String {
    let var = identifier(name);
    let path = path.display();
    match language {
        SnippetLanguage::Rust => format!(
            r###"use std::fs::File;

use arrow::compute::concat_batches;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

// Load the saved table "{name}"
let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(r#"{path}"#)?)?;
let schema = builder.schema().clone();
let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;
let {var}_table = concat_batches(&schema, &batches)?;

println!(
    "{{}}",
    pretty_format_batches(&[{var}_table.slice(0, {var}_table.num_rows().min(5))])?
);
"###
        ),
        SnippetLanguage::Python => format!(
            r###"import pandas as pd

# Load the saved table "{name}"
{var}_df = pd.read_parquet(r"{path}")

print({var}_df.head())
"###
        ),
    }
}
