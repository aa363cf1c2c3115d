//! Multi-row INSERT statements.

use super::{Transaction, traced};
use crate::error::{BuildResult, ValidationError};
use crate::ident::IdentifierQuoter;
use crate::query::{Query, ReuseHint};
use crate::row::{ColumnTypes, Row};
use crate::values::{RowValues, RowValuesBuilder};

/// Render `<keyword> <table> (<cols>) VALUES <fragment>` into a new buffer.
fn insert_sql(quoter: IdentifierQuoter, keyword: &str, table: &str, values: &RowValues) -> String {
    let mut sql = String::with_capacity(keyword.len() + table.len() + values.fragment.len() + 32);
    sql.push_str(keyword);
    sql.push(' ');
    quoter.write_quoted(table, &mut sql);
    sql.push_str(" (");
    sql.push_str(&quoter.quote_list(&values.columns));
    sql.push_str(") VALUES ");
    sql.push_str(&values.fragment);
    sql
}

/// `INSERT INTO t (...) VALUES (...), (...)`
#[derive(Debug, Clone)]
#[must_use]
pub struct Insert {
    table: String,
    rows: Vec<Row>,
    column_types: ColumnTypes,
    idempotent: bool,
    pub(super) reuse_hint: ReuseHint,
    pub(super) quoter: IdentifierQuoter,
}

impl Insert {
    pub fn new(table: impl Into<String>, rows: Vec<Row>, idempotent: bool) -> Self {
        Self {
            table: table.into(),
            rows,
            column_types: ColumnTypes::new(),
            idempotent,
            reuse_hint: ReuseHint::None,
            quoter: IdentifierQuoter::default(),
        }
    }

    /// Declared parameter types by column name.
    pub fn column_types(mut self, types: ColumnTypes) -> Self {
        self.column_types = types;
        self
    }
}

impl Transaction for Insert {
    fn build(&self) -> BuildResult<Query> {
        traced("insert", Some(self.table.as_str()), || {
            let values = RowValuesBuilder::new(&self.rows)
                .column_types(&self.column_types)
                .build()?;
            let sql = insert_sql(self.quoter, "INSERT INTO", &self.table, &values);
            Ok(Query::new(sql, values.params, values.types).with_reuse_hint(self.reuse_hint))
        })
    }

    fn is_idempotent(&self) -> bool {
        self.idempotent
    }
}

/// `INSERT IGNORE INTO t (...) VALUES ...`
///
/// Rows that would violate a unique or primary key are skipped instead of
/// failing the statement.
#[derive(Debug, Clone)]
#[must_use]
pub struct InsertIgnore {
    table: String,
    rows: Vec<Row>,
    column_types: ColumnTypes,
    idempotent: bool,
    pub(super) reuse_hint: ReuseHint,
    pub(super) quoter: IdentifierQuoter,
}

impl InsertIgnore {
    pub fn new(table: impl Into<String>, rows: Vec<Row>, idempotent: bool) -> Self {
        Self {
            table: table.into(),
            rows,
            column_types: ColumnTypes::new(),
            idempotent,
            reuse_hint: ReuseHint::None,
            quoter: IdentifierQuoter::default(),
        }
    }

    /// Declared parameter types by column name.
    pub fn column_types(mut self, types: ColumnTypes) -> Self {
        self.column_types = types;
        self
    }
}

impl Transaction for InsertIgnore {
    fn build(&self) -> BuildResult<Query> {
        traced("insert_ignore", Some(self.table.as_str()), || {
            let values = RowValuesBuilder::new(&self.rows)
                .column_types(&self.column_types)
                .build()?;
            let sql = insert_sql(self.quoter, "INSERT IGNORE INTO", &self.table, &values);
            Ok(Query::new(sql, values.params, values.types).with_reuse_hint(self.reuse_hint))
        })
    }

    fn is_idempotent(&self) -> bool {
        self.idempotent
    }
}

/// `INSERT INTO t (...) VALUES ... ON DUPLICATE KEY UPDATE c = VALUES(c), ...`
///
/// On a key conflict each update column takes the value the conflicting row
/// tried to insert.
#[derive(Debug, Clone)]
#[must_use]
pub struct Upsert {
    table: String,
    rows: Vec<Row>,
    update_columns: Vec<String>,
    column_types: ColumnTypes,
    idempotent: bool,
    pub(super) reuse_hint: ReuseHint,
    pub(super) quoter: IdentifierQuoter,
}

impl Upsert {
    pub fn new<I, S>(
        table: impl Into<String>,
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
            rows,
            update_columns: update_columns.into_iter().map(Into::into).collect(),
            column_types: ColumnTypes::new(),
            idempotent,
            reuse_hint: ReuseHint::None,
            quoter: IdentifierQuoter::default(),
        }
    }

    /// Declared parameter types by column name.
    pub fn column_types(mut self, types: ColumnTypes) -> Self {
        self.column_types = types;
        self
    }
}

impl Transaction for Upsert {
    fn build(&self) -> BuildResult<Query> {
        traced("upsert", Some(self.table.as_str()), || {
            if self.update_columns.is_empty() {
                return Err(ValidationError::EmptyUpdateColumns);
            }

            let values = RowValuesBuilder::new(&self.rows)
                .column_types(&self.column_types)
                .build()?;

            let unknown: Vec<String> = self
                .update_columns
                .iter()
                .filter(|c| !values.columns.contains(*c))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                return Err(ValidationError::UnknownUpdateColumns(unknown));
            }

            let mut sql = insert_sql(self.quoter, "INSERT INTO", &self.table, &values);
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            for (i, column) in self.update_columns.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                let quoted = self.quoter.quote(column);
                sql.push_str(&quoted);
                sql.push_str(" = VALUES(");
                sql.push_str(&quoted);
                sql.push(')');
            }

            Ok(Query::new(sql, values.params, values.types).with_reuse_hint(self.reuse_hint))
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
    use crate::value::Value;

    #[test]
    fn insert_sql_quotes_table_and_columns() {
        let rows = vec![row! { "na`me" => "x" }];
        let q = Insert::new("my`table", rows, true).build().unwrap();
        assert_eq!(q.sql(), "INSERT INTO `my``table` (`na``me`) VALUES (?)");
        assert_eq!(q.params(), &[Value::from("x")]);
    }

    #[test]
    fn insert_ignore_keyword() {
        let rows = vec![row! { "id" => 1 }, row! { "id" => 2 }];
        let q = InsertIgnore::new("t", rows, true).build().unwrap();
        assert_eq!(q.sql(), "INSERT IGNORE INTO `t` (`id`) VALUES (?), (?)");
    }

    #[test]
    fn upsert_assigns_values_of_inserted_row() {
        let rows = vec![row! { "id" => 1, "name" => "a", "score" => 3 }];
        let q = Upsert::new("t", rows, ["name", "score"], true).build().unwrap();
        assert_eq!(
            q.sql(),
            "INSERT INTO `t` (`id`, `name`, `score`) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE `name` = VALUES(`name`), `score` = VALUES(`score`)"
        );
        assert!(q.is_aligned());
    }

    #[test]
    fn upsert_requires_update_columns() {
        let rows = vec![row! { "id" => 1 }];
        let err = Upsert::new("t", rows, Vec::<String>::new(), true)
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyUpdateColumns);
    }

    #[test]
    fn upsert_lists_unknown_update_columns() {
        let rows = vec![row! { "id" => 1, "name" => "a" }];
        let err = Upsert::new("t", rows, ["missing", "name", "other"], true)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownUpdateColumns(vec!["missing".into(), "other".into()])
        );
    }
}
