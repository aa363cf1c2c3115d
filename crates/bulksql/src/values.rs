//! Multi-row `VALUES` lists.
//!
//! [`RowValuesBuilder`] turns a batch of [`Row`]s into the placeholder fragment,
//! flat parameter list and sparse type map of an `INSERT ... VALUES` statement.
//! The first row fixes the column set and order; later rows may list their
//! columns in any order but must carry exactly that set.

use crate::error::{BuildResult, ValidationError};
use crate::row::{ColumnTypes, Row};
use crate::value::{ParamType, Value};
use std::collections::BTreeMap;

/// Most placeholders a single MySQL prepared statement accepts.
pub const MAX_PLACEHOLDERS: usize = 65_535;

/// Output of [`RowValuesBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct RowValues {
    /// `(?, ?), (?, ?)`
    pub fragment: String,
    /// Row-major values, aligned with the placeholders of `fragment`.
    pub params: Vec<Value>,
    /// Declared types by parameter position.
    pub types: BTreeMap<usize, ParamType>,
    /// Column order taken from the first row.
    pub columns: Vec<String>,
}

/// Builds a [`RowValues`] from a row batch.
#[must_use]
pub struct RowValuesBuilder<'a> {
    rows: &'a [Row],
    column_types: Option<&'a ColumnTypes>,
    start_position: usize,
}

impl<'a> RowValuesBuilder<'a> {
    pub fn new(rows: &'a [Row]) -> Self {
        Self {
            rows,
            column_types: None,
            start_position: 0,
        }
    }

    /// Declared types by column name.
    pub fn column_types(mut self, types: &'a ColumnTypes) -> Self {
        self.column_types = Some(types);
        self
    }

    /// Position of the first generated parameter within the final statement.
    ///
    /// Type map keys are offset by this amount; `params` itself always starts
    /// at index 0.
    pub fn start_position(mut self, position: usize) -> Self {
        self.start_position = position;
        self
    }

    pub fn build(self) -> BuildResult<RowValues> {
        let columns = batch_columns(self.rows)?;

        let mut params = Vec::with_capacity(self.rows.len() * columns.len());
        let mut types = BTreeMap::new();
        let mut fragment = String::with_capacity(self.rows.len() * (columns.len() * 3 + 4));

        for (row_idx, row) in self.rows.iter().enumerate() {
            check_row_columns(row_idx, row, &columns)?;

            if row_idx > 0 {
                fragment.push_str(", ");
            }
            fragment.push('(');
            for (col_idx, column) in columns.iter().enumerate() {
                let value = row
                    .get(column)
                    .ok_or_else(|| ValidationError::missing_column(row_idx, column))?;

                if col_idx > 0 {
                    fragment.push_str(", ");
                }
                fragment.push('?');

                let position = self.start_position + params.len();
                params.push(value.clone());
                if let Some(ty) = self.column_types.and_then(|t| t.get(column)) {
                    types.insert(position, *ty);
                }
            }
            fragment.push(')');
        }

        Ok(RowValues {
            fragment,
            params,
            types,
            columns,
        })
    }
}

/// Column set of a batch, in first-row order.
pub(crate) fn batch_columns(rows: &[Row]) -> BuildResult<Vec<String>> {
    let first = rows.first().ok_or(ValidationError::EmptyRows)?;
    if first.is_empty() {
        return Err(ValidationError::InvalidFirstRow);
    }
    Ok(first.columns().map(str::to_string).collect())
}

/// Missing columns are reported first, in batch column order.
fn check_row_columns(row_idx: usize, row: &Row, columns: &[String]) -> BuildResult<()> {
    if let Some(missing) = columns.iter().find(|c| !row.contains(c)) {
        return Err(ValidationError::missing_column(row_idx, missing));
    }
    if row.len() != columns.len() {
        if let Some(extra) = row.columns().find(|c| !columns.iter().any(|col| col == c)) {
            return Err(ValidationError::unexpected_column(row_idx, extra));
        }
    }
    Ok(())
}

/// Split a batch into consecutive chunks that each bind at most
/// `max_placeholders` parameters.
///
/// Only the first row's width is used for sizing; per-row column checks happen
/// when each chunk is built.
pub fn split_batch(rows: &[Row], max_placeholders: usize) -> BuildResult<Vec<&[Row]>> {
    let width = batch_columns(rows)?.len();
    if width > max_placeholders {
        return Err(ValidationError::TooManyColumns {
            columns: width,
            max: max_placeholders,
        });
    }
    let rows_per_chunk = max_placeholders / width;
    Ok(rows.chunks(rows_per_chunk).collect())
}
