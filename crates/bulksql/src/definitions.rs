//! Per-column `CASE` branches for multi-row updates.

use crate::error::{BuildResult, ValidationError};
use crate::row::Row;
use crate::value::Value;

/// The `(identifier, value)` branches for one updated column, in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub column: String,
    pub cases: Vec<(Value, Value)>,
}

/// Rows regrouped by target column.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDefinitions {
    /// One identifier per row, in row order. Duplicates are kept.
    pub identifiers: Vec<Value>,
    /// One entry per update column, in the order columns were first named.
    pub columns: Vec<ColumnDefinition>,
}

/// Groups per-row `(identifier, value)` pairs by update column.
#[must_use]
pub struct UpdateDefinitionsBuilder<'a> {
    rows: &'a [Row],
    identifier_column: &'a str,
    update_columns: &'a [String],
}

impl<'a> UpdateDefinitionsBuilder<'a> {
    pub fn new(rows: &'a [Row], identifier_column: &'a str, update_columns: &'a [String]) -> Self {
        Self {
            rows,
            identifier_column,
            update_columns,
        }
    }

    pub fn build(self) -> BuildResult<UpdateDefinitions> {
        if self.rows.is_empty() {
            return Err(ValidationError::EmptyRows);
        }
        if self.update_columns.is_empty() {
            return Err(ValidationError::EmptyUpdateColumns);
        }

        let mut columns: Vec<ColumnDefinition> = Vec::with_capacity(self.update_columns.len());
        for column in self.update_columns {
            if !columns.iter().any(|d| d.column == *column) {
                columns.push(ColumnDefinition {
                    column: column.clone(),
                    cases: Vec::with_capacity(self.rows.len()),
                });
            }
        }

        let mut identifiers = Vec::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            let id = row
                .get(self.identifier_column)
                .ok_or_else(|| ValidationError::missing_column(row_idx, self.identifier_column))?;

            for def in &mut columns {
                let value = row
                    .get(&def.column)
                    .ok_or_else(|| ValidationError::missing_column(row_idx, &def.column))?;
                def.cases.push((id.clone(), value.clone()));
            }
            identifiers.push(id.clone());
        }

        Ok(UpdateDefinitions {
            identifiers,
            columns,
        })
    }
}
