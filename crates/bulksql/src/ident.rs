//! SQL identifier quoting.
//!
//! [`IdentifierQuoter`] wraps table and column names in the dialect delimiter,
//! doubling any embedded delimiter first:
//!
//! - `users` -> `` `users` ``
//! - ``na`me`` -> `` `na``me` ``
//!
//! Names are not otherwise validated. An empty name renders as an empty quoted
//! identifier and is left to the database to reject.

/// Quotes identifiers for one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierQuoter {
    delimiter: char,
}

impl Default for IdentifierQuoter {
    fn default() -> Self {
        Self::BACKTICK
    }
}

impl IdentifierQuoter {
    /// MySQL/MariaDB style: `` `name` ``.
    pub const BACKTICK: Self = Self { delimiter: '`' };

    /// ANSI style: `"name"`.
    pub const DOUBLE_QUOTE: Self = Self { delimiter: '"' };

    pub const fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub const fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Quote a single identifier.
    pub fn quote(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.write_quoted(name, &mut out);
        out
    }

    /// Quote every identifier, preserving order.
    pub fn quote_all<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.quote(name.as_ref()))
            .collect()
    }

    /// Quote every identifier and join them with `", "`.
    pub(crate) fn quote_list<I, S>(&self, names: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_quoted(name.as_ref(), &mut out);
        }
        out
    }

    pub(crate) fn write_quoted(&self, name: &str, out: &mut String) {
        out.push(self.delimiter);
        for ch in name.chars() {
            if ch == self.delimiter {
                out.push(ch);
            }
            out.push(ch);
        }
        out.push(self.delimiter);
    }
}

/// Quote an identifier with the default (backtick) quoter.
pub fn quote(name: &str) -> String {
    IdentifierQuoter::default().quote(name)
}
