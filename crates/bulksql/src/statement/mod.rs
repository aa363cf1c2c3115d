//! Bulk write statements.
//!
//! Every statement kind is its own type implementing [`Transaction`]: build the
//! [`Query`] on demand, and report the caller's idempotency hint.
//!
//! ## Design
//!
//! - Identifiers are always quoted; values are always bound as `?` parameters.
//! - Structural problems surface as [`ValidationError`](crate::ValidationError)
//!   from `build()`, before any SQL reaches a database.
//! - `is_idempotent()` is a pass-through of what the caller declared. It is not
//!   derived from the statement.
//!
//! # Example
//! ```
//! use bulksql::{row, Insert, Transaction};
//!
//! let rows = vec![row! { "id" => 1, "name" => "alice" }, row! { "id" => 2, "name" => "bob" }];
//! let query = Insert::new("users", rows, false).build()?;
//! assert_eq!(query.sql(), "INSERT INTO `users` (`id`, `name`) VALUES (?, ?), (?, ?)");
//! assert_eq!(query.params().len(), 4);
//! # Ok::<(), bulksql::ValidationError>(())
//! ```

pub mod delete;
pub mod insert;
pub mod raw;
pub mod update;

pub use delete::{DeleteByIds, DeleteByIdsWithLimit};
pub use insert::{Insert, InsertIgnore, Upsert};
pub use raw::RawStatement;
pub use update::{BulkUpdate, UpdateByIds};

use crate::error::BuildResult;
use crate::query::Query;
use crate::value::{ParamType, Value};
use std::collections::BTreeMap;

/// A unit of work handed to the transaction orchestrator.
pub trait Transaction {
    /// Compile the statement.
    fn build(&self) -> BuildResult<Query>;

    /// Whether repeating this exact statement is harmless, as declared by the
    /// caller.
    fn is_idempotent(&self) -> bool;
}

impl<T: Transaction + ?Sized> Transaction for &T {
    fn build(&self) -> BuildResult<Query> {
        (**self).build()
    }

    fn is_idempotent(&self) -> bool {
        (**self).is_idempotent()
    }
}

impl<T: Transaction + ?Sized> Transaction for Box<T> {
    fn build(&self) -> BuildResult<Query> {
        (**self).build()
    }

    fn is_idempotent(&self) -> bool {
        (**self).is_idempotent()
    }
}

/// Run a build step and log its outcome. Raw statements have no `table`.
pub(crate) fn traced(
    statement: &'static str,
    table: Option<&str>,
    build: impl FnOnce() -> BuildResult<Query>,
) -> BuildResult<Query> {
    let result = build();
    match &result {
        Ok(query) => tracing::debug!(
            target: "bulksql.build",
            statement,
            table,
            param_count = query.params().len(),
            reuse_hint = ?query.reuse_hint(),
            "statement built"
        ),
        Err(err) => tracing::debug!(
            target: "bulksql.build",
            statement,
            table,
            error = %err,
            "statement rejected"
        ),
    }
    result
}

/// Setters shared by every statement type.
macro_rules! impl_statement_options {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $ty {
                /// Advisory statement reuse hint for the executor.
                pub fn reuse_hint(mut self, hint: $crate::query::ReuseHint) -> Self {
                    self.reuse_hint = hint;
                    self
                }

                /// Override identifier quoting (defaults to backticks).
                pub fn quoter(mut self, quoter: $crate::ident::IdentifierQuoter) -> Self {
                    self.quoter = quoter;
                    self
                }
            }
        )*
    };
}

impl_statement_options!(
    Insert,
    InsertIgnore,
    Upsert,
    DeleteByIds,
    DeleteByIdsWithLimit,
    UpdateByIds,
    BulkUpdate,
);

/// Append `?, ?, ...` for `values`, typing each position with `ty` when given.
pub(crate) fn push_identifier_list(
    sql: &mut String,
    params: &mut Vec<Value>,
    types: &mut BTreeMap<usize, ParamType>,
    values: &[Value],
    ty: Option<ParamType>,
) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('?');
        if let Some(ty) = ty {
            types.insert(params.len(), ty);
        }
        params.push(value.clone());
    }
}
