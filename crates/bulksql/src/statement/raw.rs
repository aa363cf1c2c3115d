//! Escape hatch for hand-written SQL.

use super::{Transaction, traced};
use crate::error::BuildResult;
use crate::query::{Query, ReuseHint};
use crate::value::{ParamType, Value};
use std::collections::BTreeMap;

/// Caller-supplied SQL, parameters and types, passed through verbatim.
///
/// **Warning**: nothing is validated or quoted. The caller is responsible for
/// placeholder alignment and for the idempotency hint being truthful.
#[derive(Debug, Clone)]
#[must_use]
pub struct RawStatement {
    sql: String,
    params: Vec<Value>,
    types: BTreeMap<usize, ParamType>,
    idempotent: bool,
    reuse_hint: ReuseHint,
}

impl RawStatement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>, idempotent: bool) -> Self {
        Self {
            sql: sql.into(),
            params,
            types: BTreeMap::new(),
            idempotent,
            reuse_hint: ReuseHint::None,
        }
    }

    /// Declared types by 0-based parameter position.
    pub fn types(mut self, types: BTreeMap<usize, ParamType>) -> Self {
        self.types = types;
        self
    }

    /// Advisory statement reuse hint for the executor.
    pub fn reuse_hint(mut self, hint: ReuseHint) -> Self {
        self.reuse_hint = hint;
        self
    }
}

impl Transaction for RawStatement {
    fn build(&self) -> BuildResult<Query> {
        traced("raw", None, || {
            Ok(
                Query::new(self.sql.clone(), self.params.clone(), self.types.clone())
                    .with_reuse_hint(self.reuse_hint),
            )
        })
    }

    fn is_idempotent(&self) -> bool {
        self.idempotent
    }
}
