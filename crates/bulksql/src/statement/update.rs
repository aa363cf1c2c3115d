//! UPDATE statements: one value set for many rows, or per-row values via CASE.

use super::{Transaction, push_identifier_list, traced};
use crate::definitions::UpdateDefinitionsBuilder;
use crate::error::{BuildResult, ValidationError};
use crate::ident::IdentifierQuoter;
use crate::query::{Query, ReuseHint};
use crate::row::{ColumnTypes, Row};
use crate::value::{ParamType, Value};
use std::collections::BTreeMap;

/// `UPDATE t SET a = ?, b = ? WHERE id IN (?, ?, ...)`
///
/// Every matched row receives the same values.
#[derive(Debug, Clone)]
#[must_use]
pub struct UpdateByIds {
    table: String,
    identifier_column: String,
    identifiers: Vec<Value>,
    identifier_type: Option<ParamType>,
    values: Row,
    column_types: ColumnTypes,
    idempotent: bool,
    pub(super) reuse_hint: ReuseHint,
    pub(super) quoter: IdentifierQuoter,
}

impl UpdateByIds {
    pub fn new<I, V>(
        table: impl Into<String>,
        identifier_column: impl Into<String>,
        identifiers: I,
        values: Row,
        idempotent: bool,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            table: table.into(),
            identifier_column: identifier_column.into(),
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            identifier_type: None,
            values,
            column_types: ColumnTypes::new(),
            idempotent,
            reuse_hint: ReuseHint::None,
            quoter: IdentifierQuoter::default(),
        }
    }

    /// Type every identifier parameter with `ty`.
    pub fn identifier_type(mut self, ty: ParamType) -> Self {
        self.identifier_type = Some(ty);
        self
    }

    /// Declared types for the SET values, by column name.
    pub fn column_types(mut self, types: ColumnTypes) -> Self {
        self.column_types = types;
        self
    }
}

impl Transaction for UpdateByIds {
    fn build(&self) -> BuildResult<Query> {
        traced("update_by_ids", Some(self.table.as_str()), || {
            if self.identifiers.is_empty() {
                return Err(ValidationError::EmptyIdentifiers);
            }
            if self.values.is_empty() {
                return Err(ValidationError::EmptyColumnValues);
            }

            let mut sql = String::from("UPDATE ");
            self.quoter.write_quoted(&self.table, &mut sql);
            sql.push_str(" SET ");

            let mut params = Vec::with_capacity(self.values.len() + self.identifiers.len());
            let mut types = BTreeMap::new();
            for (i, (column, value)) in self.values.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                self.quoter.write_quoted(column, &mut sql);
                sql.push_str(" = ?");
                if let Some(ty) = self.column_types.get(column) {
                    types.insert(params.len(), *ty);
                }
                params.push(value.clone());
            }

            sql.push_str(" WHERE ");
            self.quoter.write_quoted(&self.identifier_column, &mut sql);
            sql.push_str(" IN (");
            push_identifier_list(
                &mut sql,
                &mut params,
                &mut types,
                &self.identifiers,
                self.identifier_type,
            );
            sql.push(')');

            Ok(Query::new(sql, params, types).with_reuse_hint(self.reuse_hint))
        })
    }

    fn is_idempotent(&self) -> bool {
        self.idempotent
    }
}

/// Per-row values in a single statement:
///
/// ```text
/// UPDATE t SET
///   a = CASE WHEN id = ? THEN ? WHEN id = ? THEN ? ELSE a END,
///   b = CASE WHEN id = ? THEN ? WHEN id = ? THEN ? ELSE b END
/// WHERE id IN (?, ?)
/// ```
///
/// Parameters run column by column, each column interleaving `(id, value)` in
/// row order, followed by every identifier again for the `IN` list. Duplicate
/// identifiers are kept; with duplicates the first matching `WHEN` wins.
#[derive(Debug, Clone)]
#[must_use]
pub struct BulkUpdate {
    table: String,
    identifier_column: String,
    identifier_type: Option<ParamType>,
    rows: Vec<Row>,
    update_columns: Vec<String>,
    column_types: ColumnTypes,
    idempotent: bool,
    pub(super) reuse_hint: ReuseHint,
    pub(super) quoter: IdentifierQuoter,
}

impl BulkUpdate {
    pub fn new<I, S>(
        table: impl Into<String>,
        identifier_column: impl Into<String>,
        rows: Vec<Row>,
        update_columns: I,
        idempotent: bool,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            identifier_column: identifier_column.into(),
            identifier_type: None,
            rows,
            update_columns: update_columns.into_iter().map(Into::into).collect(),
            column_types: ColumnTypes::new(),
            idempotent,
            reuse_hint: ReuseHint::None,
            quoter: IdentifierQuoter::default(),
        }
    }

    /// Type every identifier parameter with `ty`.
    pub fn identifier_type(mut self, ty: ParamType) -> Self {
        self.identifier_type = Some(ty);
        self
    }

    /// Declared types for the updated values, by column name.
    pub fn column_types(mut self, types: ColumnTypes) -> Self {
        self.column_types = types;
        self
    }
}

impl Transaction for BulkUpdate {
    fn build(&self) -> BuildResult<Query> {
        traced("bulk_update", Some(self.table.as_str()), || {
            let defs = UpdateDefinitionsBuilder::new(
                &self.rows,
                &self.identifier_column,
                &self.update_columns,
            )
            .build()?;

            let id_col = self.quoter.quote(&self.identifier_column);
            let param_count = defs.identifiers.len() * (defs.columns.len() * 2 + 1);
            let mut params = Vec::with_capacity(param_count);
            let mut types = BTreeMap::new();

            let mut sql = String::from("UPDATE ");
            self.quoter.write_quoted(&self.table, &mut sql);
            sql.push_str(" SET ");

            for (i, def) in defs.columns.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                let column = self.quoter.quote(&def.column);
                let value_type = self.column_types.get(&def.column).copied();

                sql.push_str(&column);
                sql.push_str(" = CASE");
                for (id, value) in &def.cases {
                    sql.push_str(" WHEN ");
                    sql.push_str(&id_col);
                    sql.push_str(" = ? THEN ?");

                    if let Some(ty) = self.identifier_type {
                        types.insert(params.len(), ty);
                    }
                    params.push(id.clone());
                    if let Some(ty) = value_type {
                        types.insert(params.len(), ty);
                    }
                    params.push(value.clone());
                }
                sql.push_str(" ELSE ");
                sql.push_str(&column);
                sql.push_str(" END");
            }

            sql.push_str(" WHERE ");
            sql.push_str(&id_col);
            sql.push_str(" IN (");
            push_identifier_list(
                &mut sql,
                &mut params,
                &mut types,
                &defs.identifiers,
                self.identifier_type,
            );
            sql.push(')');

            Ok(Query::new(sql, params, types).with_reuse_hint(self.reuse_hint))
        })
    }

    fn is_idempotent(&self) -> bool {
        self.idempotent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[test]
    fn update_by_ids_sql() {
        let values = row! { "status" => "archived", "score" => 0 };
        let q = UpdateByIds::new("t", "id", [5, 6], values, true)
            .identifier_type(ParamType::Integer)
            .column_types(ColumnTypes::from([("score".to_string(), ParamType::Integer)]))
            .build()
            .unwrap();
        assert_eq!(
            q.sql(),
            "UPDATE `t` SET `status` = ?, `score` = ? WHERE `id` IN (?, ?)"
        );
        assert_eq!(
            q.params(),
            &[Value::from("archived"), Value::from(0), Value::from(5), Value::from(6)]
        );
        assert_eq!(q.type_at(0), None);
        assert_eq!(q.type_at(1), Some(ParamType::Integer));
        assert_eq!(q.type_at(2), Some(ParamType::Integer));
        assert_eq!(q.type_at(3), Some(ParamType::Integer));
    }

    #[test]
    fn update_by_ids_validation() {
        let err = UpdateByIds::new("t", "id", Vec::<i64>::new(), row! { "a" => 1 }, true)
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyIdentifiers);

        let err = UpdateByIds::new("t", "id", [1], Row::new(), true)
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyColumnValues);
    }

    #[test]
    fn bulk_update_case_expressions() {
        let rows = vec![
            row! { "id" => 1, "status" => "new", "score" => 10 },
            row! { "id" => 2, "status" => "ready", "score" => 20 },
        ];
        let q = BulkUpdate::new("items", "id", rows, ["status", "score"], true)
            .build()
            .unwrap();
        assert_eq!(
            q.sql(),
            "UPDATE `items` SET \
             `status` = CASE WHEN `id` = ? THEN ? WHEN `id` = ? THEN ? ELSE `status` END, \
             `score` = CASE WHEN `id` = ? THEN ? WHEN `id` = ? THEN ? ELSE `score` END \
             WHERE `id` IN (?, ?)"
        );
        let expected: Vec<Value> = vec![
            1.into(),
            "new".into(),
            2.into(),
            "ready".into(),
            1.into(),
            10.into(),
            2.into(),
            20.into(),
            1.into(),
            2.into(),
        ];
        assert_eq!(q.params(), expected.as_slice());
        assert!(q.is_aligned());
    }

    #[test]
    fn bulk_update_types_use_positions() {
        let rows = vec![
            row! { "id" => 1, "flag" => false },
            row! { "id" => 2, "flag" => true },
        ];
        let q = BulkUpdate::new("t", "id", rows, ["flag"], true)
            .identifier_type(ParamType::Integer)
            .column_types(ColumnTypes::from([("flag".to_string(), ParamType::Boolean)]))
            .build()
            .unwrap();
        let expected: BTreeMap<usize, ParamType> = [
            (0, ParamType::Integer),
            (1, ParamType::Boolean),
            (2, ParamType::Integer),
            (3, ParamType::Boolean),
            (4, ParamType::Integer),
            (5, ParamType::Integer),
        ]
        .into();
        assert_eq!(q.types(), &expected);
    }

    #[test]
    fn bulk_update_null_type_tag_is_kept() {
        let rows = vec![row! { "id" => 1, "deleted_at" => Value::Null }];
        let q = BulkUpdate::new("t", "id", rows, ["deleted_at"], true)
            .column_types(ColumnTypes::from([("deleted_at".to_string(), ParamType::Null)]))
            .build()
            .unwrap();
        assert_eq!(q.type_at(1), Some(ParamType::Null));
        assert_eq!(q.types().len(), 1);
    }

    #[test]
    fn bulk_update_missing_column() {
        let rows = vec![
            row! { "id" => 1, "status" => "a" },
            row! { "id" => 2 },
        ];
        let err = BulkUpdate::new("t", "id", rows, ["status"], true)
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::missing_column(1, "status"));
    }
}
