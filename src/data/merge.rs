use std::sync::Arc;

use arrow::array::{new_null_array, Array, ArrayRef};
use arrow::compute::{cast, concat};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use super::model::Table;
use crate::error::Result;

/// Common type for a column that appears in several tables.
fn widen(a: &DataType, b: &DataType) -> DataType {
    use DataType::*;
    match (a, b) {
        (x, y) if x == y => x.clone(),
        (Null, other) | (other, Null) => other.clone(),
        (x, y) if x.is_numeric() && y.is_numeric() => Float64,
        _ => Utf8,
    }
}

/// Concatenate tables by column name.
///
/// * Columns: outer union, in the order each name is first seen.
/// * Rows: table order, then row order within each table.
/// * A table lacking a column contributes nulls for it.
pub fn concat_tables(tables: &[&Table]) -> Result<Table> {
    let mut columns: Vec<(String, DataType)> = Vec::new();
    for table in tables {
        for field in table.schema().fields() {
            match columns.iter_mut().find(|(name, _)| name == field.name()) {
                Some((_, data_type)) => *data_type = widen(data_type, field.data_type()),
                None => columns.push((field.name().clone(), field.data_type().clone())),
            }
        }
    }

    let total_rows: usize = tables.iter().map(|t| t.num_rows()).sum();
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays = Vec::with_capacity(columns.len());

    for (name, data_type) in &columns {
        let parts = tables
            .iter()
            .map(|table| match table.column_by_name(name) {
                Some(array) if array.data_type() == data_type => Ok(Arc::clone(array)),
                Some(array) => cast(array, data_type),
                None => Ok(new_null_array(data_type, table.num_rows())),
            })
            .collect::<std::result::Result<Vec<ArrayRef>, _>>()?;
        let refs: Vec<&dyn Array> = parts.iter().map(|a| a.as_ref()).collect();
        let merged = if refs.is_empty() {
            new_null_array(data_type, 0)
        } else {
            concat(&refs)?
        };

        fields.push(Field::new(name, data_type.clone(), true));
        arrays.push(merged);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(total_rows));
    let table = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
    Ok(table)
}
