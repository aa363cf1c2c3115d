//! DELETE by identifier list.

use super::{Transaction, push_identifier_list, traced};
use crate::error::{BuildResult, ValidationError};
use crate::ident::IdentifierQuoter;
use crate::query::{Query, ReuseHint};
use crate::value::{ParamType, Value};
use std::collections::BTreeMap;

fn delete_sql(
    quoter: IdentifierQuoter,
    table: &str,
    identifier_column: &str,
    identifiers: &[Value],
    identifier_type: Option<ParamType>,
) -> BuildResult<(String, Vec<Value>, BTreeMap<usize, ParamType>)> {
    if identifiers.is_empty() {
        return Err(ValidationError::EmptyIdentifiers);
    }

    let mut sql = String::from("DELETE FROM ");
    quoter.write_quoted(table, &mut sql);
    sql.push_str(" WHERE ");
    quoter.write_quoted(identifier_column, &mut sql);
    sql.push_str(" IN (");

    let mut params = Vec::with_capacity(identifiers.len());
    let mut types = BTreeMap::new();
    push_identifier_list(&mut sql, &mut params, &mut types, identifiers, identifier_type);
    sql.push(')');

    Ok((sql, params, types))
}

/// `DELETE FROM t WHERE id IN (?, ?, ...)`
#[derive(Debug, Clone)]
#[must_use]
pub struct DeleteByIds {
    table: String,
    identifier_column: String,
    identifiers: Vec<Value>,
    identifier_type: Option<ParamType>,
    idempotent: bool,
    pub(super) reuse_hint: ReuseHint,
    pub(super) quoter: IdentifierQuoter,
}

impl DeleteByIds {
    pub fn new<I, V>(
        table: impl Into<String>,
        identifier_column: impl Into<String>,
        identifiers: I,
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
}

impl Transaction for DeleteByIds {
    fn build(&self) -> BuildResult<Query> {
        traced("delete_by_ids", Some(self.table.as_str()), || {
            let (sql, params, types) = delete_sql(
                self.quoter,
                &self.table,
                &self.identifier_column,
                &self.identifiers,
                self.identifier_type,
            )?;
            Ok(Query::new(sql, params, types).with_reuse_hint(self.reuse_hint))
        })
    }

    fn is_idempotent(&self) -> bool {
        self.idempotent
    }
}

/// `DELETE FROM t WHERE id IN (?, ...) LIMIT n`
///
/// The cap is rendered literally. When it is smaller than the number of
/// identifiers, a repeated execution may delete rows the first one left behind,
/// so such a statement should not be declared idempotent.
#[derive(Debug, Clone)]
#[must_use]
pub struct DeleteByIdsWithLimit {
    table: String,
    identifier_column: String,
    identifiers: Vec<Value>,
    identifier_type: Option<ParamType>,
    limit: i64,
    idempotent: bool,
    pub(super) reuse_hint: ReuseHint,
    pub(super) quoter: IdentifierQuoter,
}

impl DeleteByIdsWithLimit {
    pub fn new<I, V>(
        table: impl Into<String>,
        identifier_column: impl Into<String>,
        identifiers: I,
        limit: i64,
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
            limit,
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
}

impl Transaction for DeleteByIdsWithLimit {
    fn build(&self) -> BuildResult<Query> {
        traced("delete_by_ids_with_limit", Some(self.table.as_str()), || {
            let (mut sql, params, types) = delete_sql(
                self.quoter,
                &self.table,
                &self.identifier_column,
                &self.identifiers,
                self.identifier_type,
            )?;
            if self.limit <= 0 {
                return Err(ValidationError::InvalidLimit(self.limit));
            }
            sql.push_str(" LIMIT ");
            sql.push_str(&self.limit.to_string());
            Ok(Query::new(sql, params, types).with_reuse_hint(self.reuse_hint))
        })
    }

    fn is_idempotent(&self) -> bool {
        self.idempotent
    }
}
