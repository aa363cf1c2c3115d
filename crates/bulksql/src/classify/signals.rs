//! Signal extraction from driver errors.
//!
//! Errors reach the classifier as `&dyn Error`. Anything beyond the message is
//! optional and comes from [`DriverSignals`], a capability an error type may or
//! may not implement. The classifier finds it by downcasting each error in the
//! chain against a list of registered [`SignalProbe`]s.

use std::error::Error as StdError;
use thiserror::Error;

/// Structured `(state code, driver code, driver message)` triple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    pub sql_state: Option<String>,
    pub driver_code: Option<i64>,
    pub message: Option<String>,
}

/// A bare error code, numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    Int(i64),
    Text(String),
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        Self::Int(code)
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        Self::Int(code.into())
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        Self::Text(code.to_string())
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        Self::Text(code)
    }
}

/// Optional classification signals an error type can expose.
pub trait DriverSignals {
    /// Structured error triple. Preferred over everything else when present.
    fn error_info(&self) -> Option<ErrorInfo> {
        None
    }

    /// Generic code. A non-zero integer is a driver code; text of at least five
    /// characters carries a state code in its first five.
    fn code(&self) -> Option<ErrorCode> {
        None
    }

    /// Dedicated state-code accessor, consulted last.
    fn sql_state(&self) -> Option<String> {
        None
    }
}

/// Finds the [`DriverSignals`] of one concrete error type.
pub type SignalProbe = for<'a> fn(&'a (dyn StdError + 'static)) -> Option<&'a dyn DriverSignals>;

/// Probe for errors of type `T`.
pub fn probe<'a, T>(err: &'a (dyn StdError + 'static)) -> Option<&'a dyn DriverSignals>
where
    T: StdError + DriverSignals + 'static,
{
    err.downcast_ref::<T>().map(|e| e as &dyn DriverSignals)
}

/// Probes installed in every new classifier.
pub(crate) fn default_probes() -> Vec<SignalProbe> {
    #[allow(unused_mut)]
    let mut probes = vec![probe::<DriverError> as SignalProbe];
    #[cfg(feature = "postgres")]
    {
        probes.push(probe::<tokio_postgres::Error>);
        probes.push(probe::<tokio_postgres::error::DbError>);
    }
    probes
}

/// Signals extracted from one error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    /// 5-character state code.
    pub sql_state: Option<String>,
    /// Non-zero engine-specific code.
    pub driver_code: Option<i64>,
    /// Always present, possibly empty.
    pub message: String,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

impl Signals {
    /// Extract signals from `err`, using the first probe that recognizes it.
    pub fn extract(err: &(dyn StdError + 'static), probes: &[SignalProbe]) -> Self {
        let mut signals = Signals::default();
        let mut message = None;

        if let Some(caps) = probes.iter().find_map(|probe| probe(err)) {
            if let Some(info) = caps.error_info() {
                signals.sql_state = non_empty(info.sql_state);
                signals.driver_code = info.driver_code.filter(|c| *c != 0);
                message = non_empty(info.message);
            } else {
                match caps.code() {
                    Some(ErrorCode::Int(code)) if code != 0 => signals.driver_code = Some(code),
                    Some(ErrorCode::Text(code)) if code.chars().count() >= 5 => {
                        signals.sql_state = Some(code.chars().take(5).collect());
                    }
                    _ => {}
                }
            }

            if signals.sql_state.is_none() {
                signals.sql_state = non_empty(caps.sql_state());
            }
        }

        signals.message = message.unwrap_or_else(|| err.to_string());
        signals
    }
}

/// A driver-agnostic error carrying classification signals.
///
/// Executors that wrap a client library without built-in support can convert
/// its errors into this type, keeping the original as `source`.
///
/// ```
/// use bulksql::classify::{DriverError, ErrorClassifier, ErrorType};
///
/// let err = DriverError::new("Deadlock found when trying to get lock").with_code(1213);
/// assert_eq!(ErrorClassifier::new().classify(&err), ErrorType::Transient);
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DriverError {
    message: String,
    info: Option<ErrorInfo>,
    code: Option<ErrorCode>,
    sql_state: Option<String>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            info: None,
            code: None,
            sql_state: None,
            source: None,
        }
    }

    /// Attach a structured error triple.
    pub fn with_error_info(mut self, info: ErrorInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Attach a generic code.
    pub fn with_code(mut self, code: impl Into<ErrorCode>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach a state code.
    pub fn with_sql_state(mut self, state: impl Into<String>) -> Self {
        self.sql_state = Some(state.into());
        self
    }

    /// Record the error that caused this one.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl DriverSignals for DriverError {
    fn error_info(&self) -> Option<ErrorInfo> {
        self.info.clone()
    }

    fn code(&self) -> Option<ErrorCode> {
        self.code.clone()
    }

    fn sql_state(&self) -> Option<String> {
        self.sql_state.clone()
    }
}

#[cfg(feature = "postgres")]
impl DriverSignals for tokio_postgres::error::DbError {
    fn error_info(&self) -> Option<ErrorInfo> {
        Some(ErrorInfo {
            sql_state: Some(tokio_postgres::error::DbError::code(self).code().to_string()),
            driver_code: None,
            message: Some(self.message().to_string()),
        })
    }
}

#[cfg(feature = "postgres")]
impl DriverSignals for tokio_postgres::Error {
    fn error_info(&self) -> Option<ErrorInfo> {
        self.as_db_error().and_then(|db| db.error_info())
    }

    fn sql_state(&self) -> Option<String> {
        match tokio_postgres::Error::code(self) {
            Some(state) => Some(state.code().to_string()),
            // connection_does_not_exist
            None if self.is_closed() => Some("08003".to_string()),
            None => None,
        }
    }
}
