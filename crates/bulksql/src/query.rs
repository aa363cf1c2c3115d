//! The compiled statement handed to an executor.

use crate::value::{ParamType, Value};
use std::collections::BTreeMap;

/// Advisory hint on whether a prepared statement object may be cached.
///
/// Executors are free to ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReuseHint {
    /// Prepare per execution.
    #[default]
    None,
    /// May be reused within the current transaction.
    PerTransaction,
    /// May be reused for the lifetime of the connection.
    PerConnection,
}

/// An immutable, fully-parameterized SQL statement.
///
/// `sql` uses `?` positional placeholders. `params[i]` binds the `i`-th
/// placeholder, and `types` maps 0-based parameter positions to declared types;
/// positions without an entry bind with the executor's default strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    sql: String,
    params: Vec<Value>,
    types: BTreeMap<usize, ParamType>,
    reuse_hint: ReuseHint,
}

impl Query {
    pub fn new(
        sql: impl Into<String>,
        params: Vec<Value>,
        types: BTreeMap<usize, ParamType>,
    ) -> Self {
        Self {
            sql: sql.into(),
            params,
            types,
            reuse_hint: ReuseHint::None,
        }
    }

    pub fn with_reuse_hint(mut self, hint: ReuseHint) -> Self {
        self.reuse_hint = hint;
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn types(&self) -> &BTreeMap<usize, ParamType> {
        &self.types
    }

    /// Declared type for a parameter position, if any.
    pub fn type_at(&self, position: usize) -> Option<ParamType> {
        self.types.get(&position).copied()
    }

    pub fn reuse_hint(&self) -> ReuseHint {
        self.reuse_hint
    }

    /// Split into `(sql, params, types)`.
    pub fn into_parts(self) -> (String, Vec<Value>, BTreeMap<usize, ParamType>) {
        (self.sql, self.params, self.types)
    }

    /// Count `?` placeholders in the SQL text.
    ///
    /// Question marks inside quoted strings, quoted identifiers and comments
    /// are not placeholders.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql)
    }

    /// Whether the parameter list lines up with the SQL text and every typed
    /// position refers to an existing parameter.
    pub fn is_aligned(&self) -> bool {
        self.params.len() == self.placeholder_count()
            && self.types.keys().all(|&pos| pos < self.params.len())
    }
}

#[derive(Clone, Copy)]
enum State {
    Normal,
    Quoted(u8),
    LineComment,
    BlockComment,
}

pub(crate) fn count_placeholders(sql: &str) -> usize {
    let bytes = sql.as_bytes();
    let mut state = State::Normal;
    let mut count = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'?' => count += 1,
                b'\'' | b'"' | b'`' => state = State::Quoted(b),
                b'-' if bytes.get(idx + 1) == Some(&b'-') => {
                    state = State::LineComment;
                    idx += 1;
                }
                b'#' => state = State::LineComment,
                b'/' if bytes.get(idx + 1) == Some(&b'*') => {
                    state = State::BlockComment;
                    idx += 1;
                }
                _ => {}
            },
            // A doubled quote closes and immediately reopens, which is equivalent.
            State::Quoted(q) => {
                if b == b'\\' && q != b'`' {
                    idx += 1;
                } else if b == q {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if b == b'*' && bytes.get(idx + 1) == Some(&b'/') {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    count
}
