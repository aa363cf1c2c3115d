//! # bulksql
//!
//! Bulk write statements for MySQL-style databases, and a classifier for the
//! errors executing them produces.
//!
//! ## Features
//!
//! - **Bulk writes**: multi-row `INSERT`, `INSERT IGNORE`, upsert
//!   (`ON DUPLICATE KEY UPDATE`), `DELETE ... IN`, `UPDATE ... IN` and
//!   `CASE`-based bulk updates
//! - **Always parameterized**: identifiers are quoted, values are bound as `?`
//! - **Validated up front**: ragged rows, empty inputs and bad limits are
//!   rejected before any SQL is produced
//! - **Error classification**: tell a lost connection from a deadlock from a
//!   real failure, by walking the error's cause chain
//!
//! ## Statements
//!
//! ```
//! use bulksql::{row, BulkUpdate, Transaction};
//!
//! let rows = vec![
//!     row! { "id" => 1, "status" => "active" },
//!     row! { "id" => 2, "status" => "banned" },
//! ];
//! let query = BulkUpdate::new("users", "id", rows, ["status"], true).build()?;
//! assert_eq!(
//!     query.sql(),
//!     "UPDATE `users` SET `status` = CASE WHEN `id` = ? THEN ? WHEN `id` = ? THEN ? \
//!      ELSE `status` END WHERE `id` IN (?, ?)"
//! );
//! # Ok::<(), bulksql::ValidationError>(())
//! ```
//!
//! ## Classification
//!
//! ```
//! use bulksql::{DriverError, ErrorClassifier, ErrorType};
//!
//! let err = DriverError::new("Lock wait timeout exceeded").with_code(1205);
//! assert_eq!(ErrorClassifier::new().classify(&err), ErrorType::Transient);
//! ```

pub mod classify;
pub mod definitions;
pub mod error;
pub mod ident;
pub mod query;
pub mod row;
pub mod statement;
pub mod value;
pub mod values;

pub use error::{BuildResult, ValidationError};
pub use ident::{IdentifierQuoter, quote};
pub use query::{Query, ReuseHint};
pub use row::{ColumnTypes, Row};
pub use value::{ParamType, Value};

pub use definitions::{ColumnDefinition, UpdateDefinitions, UpdateDefinitionsBuilder};
pub use values::{MAX_PLACEHOLDERS, RowValues, RowValuesBuilder, split_batch};

pub use statement::{
    BulkUpdate, DeleteByIds, DeleteByIdsWithLimit, Insert, InsertIgnore, RawStatement,
    Transaction, UpdateByIds, Upsert,
};

pub use classify::{
    Classification, DriverError, DriverSignals, ErrorClassifier, ErrorType, HeuristicsConfig,
};
