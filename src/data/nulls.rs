use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Int64Array, Scalar, StringArray};
use arrow::compute::kernels::zip::zip;
use arrow::compute::{cast, filter_record_batch, is_not_null};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde::{Deserialize, Serialize};

use super::model::Table;
use crate::error::Result;

// ---------------------------------------------------------------------------
// NullPolicy
// ---------------------------------------------------------------------------

/// How missing values are resolved before a table is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Remove every row that has a null in any column.
    #[default]
    Drop,
    /// Replace every null with zero.
    Zero,
    /// Leave the table untouched.
    Keep,
}

impl NullPolicy {
    pub const ALL: [NullPolicy; 3] = [NullPolicy::Drop, NullPolicy::Zero, NullPolicy::Keep];

    pub fn as_str(self) -> &'static str {
        match self {
            NullPolicy::Drop => "drop",
            NullPolicy::Zero => "zero",
            NullPolicy::Keep => "keep",
        }
    }
}

impl fmt::Display for NullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NullPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        NullPolicy::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown null policy '{s}' (expected drop, zero or keep)"))
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Apply `policy` to `table`, returning a new table.
pub fn apply_null_policy(table: &Table, policy: NullPolicy) -> Result<Table> {
    match policy {
        NullPolicy::Drop => drop_null_rows(table),
        NullPolicy::Zero => fill_zero(table),
        NullPolicy::Keep => Ok(table.clone()),
    }
}

fn drop_null_rows(table: &Table) -> Result<Table> {
    if table.columns().iter().all(|c| c.null_count() == 0) {
        return Ok(table.clone());
    }
    let keep: BooleanArray = (0..table.num_rows())
        .map(|row| Some(table.columns().iter().all(|c| c.is_valid(row))))
        .collect();
    Ok(filter_record_batch(table, &keep)?)
}

/// Numeric columns get a zero of their own type. Boolean columns become
/// Int64 first; every other type becomes text holding `"0"`.
fn fill_zero(table: &Table) -> Result<Table> {
    let schema = table.schema();
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut columns = Vec::with_capacity(table.num_columns());

    for (field, column) in schema.fields().iter().zip(table.columns()) {
        let filled = fill_zero_column(column)?;
        fields.push(Field::new(field.name(), filled.data_type().clone(), true));
        columns.push(filled);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    let filled = RecordBatch::try_new_with_options(
        Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone())),
        columns,
        &options,
    )?;
    Ok(filled)
}

fn fill_zero_column(column: &ArrayRef) -> Result<ArrayRef> {
    if column.null_count() == 0 {
        return Ok(Arc::clone(column));
    }

    let data_type = column.data_type();
    let (target, zero): (DataType, ArrayRef) = if data_type.is_numeric() {
        let zero = cast(&Int64Array::from(vec![0]), data_type)?;
        (data_type.clone(), zero)
    } else if *data_type == DataType::Boolean {
        (DataType::Int64, Arc::new(Int64Array::from(vec![0])))
    } else {
        (DataType::Utf8, Arc::new(StringArray::from(vec!["0"])))
    };

    let values = if *data_type == target {
        Arc::clone(column)
    } else {
        cast(column, &target)?
    };
    let mask = is_not_null(&values)?;
    Ok(zip(&mask, &values, &Scalar::new(zero))?)
}
