use std::fmt;
use std::sync::Arc;

use arrow::array::{new_null_array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::Result;

/// An in-memory table. Always a single batch with nullable fields.
pub type Table = RecordBatch;

/// Tokens every reader treats as a missing value.
pub const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

// ---------------------------------------------------------------------------
// Cell – a single parsed value before column typing
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as produced by the format readers.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::String(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => Ok(()),
        }
    }
}

impl Cell {
    /// Guess the type of a text token.
    ///
    /// Surrounding whitespace is ignored when detecting nulls, numbers and
    /// booleans. Text cells keep the token exactly as read.
    pub fn parse(token: &str) -> Cell {
        let s = token.trim();
        if NULL_TOKENS.contains(&s) {
            return Cell::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Some(f) = parse_float(s) {
            return Cell::Float(f);
        }
        match s {
            "true" | "True" | "TRUE" => Cell::Bool(true),
            "false" | "False" | "FALSE" => Cell::Bool(false),
            _ => Cell::String(token.to_string()),
        }
    }
}

/// Parse a float, also accepting Fortran-style `D` exponents (`1.5D+03`).
fn parse_float(s: &str) -> Option<f64> {
    let value = match s.parse::<f64>() {
        Ok(v) => v,
        Err(_) if s.contains(['D', 'd']) => s.replace(['D', 'd'], "E").parse::<f64>().ok()?,
        Err(_) => return None,
    };
    // "inf" and "NaN" spellings are not data in these files.
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Column typing
// ---------------------------------------------------------------------------

/// Pick the Arrow type for a column of cells.
pub fn infer_type(cells: &[Cell]) -> DataType {
    let mut saw_int = false;
    let mut saw_float = false;
    let mut saw_bool = false;
    let mut saw_text = false;
    for cell in cells {
        match cell {
            Cell::Integer(_) => saw_int = true,
            Cell::Float(_) => saw_float = true,
            Cell::Bool(_) => saw_bool = true,
            Cell::String(_) => saw_text = true,
            Cell::Null => {}
        }
    }
    if saw_text || (saw_bool && (saw_int || saw_float)) {
        DataType::Utf8
    } else if saw_bool {
        DataType::Boolean
    } else if saw_int && !saw_float {
        DataType::Int64
    } else {
        // Floats, or an all-null column.
        DataType::Float64
    }
}

/// Build one typed Arrow array from a column of cells.
pub fn build_column(cells: &[Cell]) -> ArrayRef {
    let data_type = infer_type(cells);
    if cells.iter().all(|c| *c == Cell::Null) {
        return new_null_array(&data_type, cells.len());
    }
    match data_type {
        DataType::Int64 => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    Cell::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        DataType::Float64 => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    Cell::Integer(i) => Some(*i as f64),
                    Cell::Float(f) => Some(*f),
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        DataType::Boolean => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    Cell::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<BooleanArray>(),
        ),
        _ => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    Cell::Null => None,
                    other => Some(other.to_string()),
                })
                .collect::<StringArray>(),
        ),
    }
}

/// Make header names unique the way pandas does: `x`, `x.1`, `x.2`, ...
/// Blank headers become `Unnamed: <index>`.
pub fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for (idx, header) in headers.into_iter().enumerate() {
        let header = if header.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header
        };
        let mut candidate = header.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{header}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}

/// Assemble a table from a header row and row-major cells.
///
/// Rows shorter than the header are padded with nulls. Callers reject rows
/// that are longer.
pub fn build_table(headers: Vec<String>, rows: &[Vec<Cell>]) -> Result<Table> {
    let headers = dedupe_headers(headers);
    let n_rows = rows.len();

    let mut fields = Vec::with_capacity(headers.len());
    let mut columns = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let cells: Vec<Cell> = rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or(Cell::Null))
            .collect();
        let array = build_column(&cells);
        fields.push(Field::new(name, array.data_type().clone(), true));
        columns.push(array);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(n_rows));
    let table = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)?;
    Ok(table)
}
