//! Driver error classification.
//!
//! [`ErrorClassifier`] walks an error's cause chain and decides whether a
//! failed statement lost its connection, hit a retryable conflict, or failed
//! for good. Classification is best-effort and based on state codes, driver
//! codes and message text; see [`DefaultHeuristics`] for the tiers.
//!
//! # Example
//! ```
//! use bulksql::classify::{DriverError, ErrorClassifier, ErrorType};
//!
//! let classifier = ErrorClassifier::new();
//! let inner = DriverError::new("Lost connection to MySQL server during query").with_code(2013);
//! let outer = DriverError::new("statement failed").with_source(inner);
//! assert_eq!(classifier.classify(&outer), ErrorType::Connection);
//! ```

pub mod config;
pub mod heuristics;
pub mod signals;

pub use config::HeuristicsConfig;
pub use heuristics::{DefaultHeuristics, Heuristics, MatchReason};
pub use signals::{DriverError, DriverSignals, ErrorCode, ErrorInfo, SignalProbe, Signals, probe};

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

/// Maximum number of errors inspected in one cause chain.
pub const MAX_CHAIN_DEPTH: usize = 32;

/// Outcome of classifying a driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The session is unusable; reconnect before retrying.
    Connection,
    /// Retryable conflict (deadlock, lock timeout, serialization failure).
    Transient,
    /// Anything else.
    Fatal,
}

impl ErrorType {
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorType::Fatal)
    }

    pub fn requires_reconnect(self) -> bool {
        matches!(self, ErrorType::Connection)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorType::Connection => "connection",
            ErrorType::Transient => "transient",
            ErrorType::Fatal => "fatal",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classification with the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub error_type: ErrorType,
    /// Position of the deciding error in the chain, outermost = 0.
    /// `None` for [`ErrorType::Fatal`].
    pub depth: Option<usize>,
    pub reason: Option<MatchReason>,
}

impl Classification {
    fn fatal() -> Self {
        Self {
            error_type: ErrorType::Fatal,
            depth: None,
            reason: None,
        }
    }
}

/// `err` and its causes, outermost first, at most [`MAX_CHAIN_DEPTH`] entries.
///
/// Errors are not deduplicated: a cyclic chain runs into the bound.
pub fn cause_chain<'a>(err: &'a (dyn StdError + 'static)) -> Vec<&'a (dyn StdError + 'static)> {
    let mut chain: Vec<&'a (dyn StdError + 'static)> = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        if chain.len() >= MAX_CHAIN_DEPTH {
            break;
        }
        chain.push(e);
        current = e.source();
    }
    chain
}

/// Classifies errors raised while executing statements.
///
/// Holds no mutable state; one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct ErrorClassifier<H = DefaultHeuristics> {
    heuristics: H,
    probes: Vec<SignalProbe>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorClassifier {
    /// Classifier with the default heuristic lists.
    pub fn new() -> Self {
        Self::with_heuristics(DefaultHeuristics::default())
    }

    /// Classifier with custom heuristic lists.
    pub fn with_config(config: HeuristicsConfig) -> Self {
        Self::with_heuristics(DefaultHeuristics::new(config))
    }
}

impl<H: Heuristics> ErrorClassifier<H> {
    pub fn with_heuristics(heuristics: H) -> Self {
        Self {
            heuristics,
            probes: signals::default_probes(),
        }
    }

    /// Recognize errors of type `T` and read their [`DriverSignals`].
    pub fn register<T>(mut self) -> Self
    where
        T: StdError + DriverSignals + 'static,
    {
        self.probes.push(probe::<T>);
        self
    }

    pub fn heuristics(&self) -> &H {
        &self.heuristics
    }

    pub fn classify(&self, err: &(dyn StdError + 'static)) -> ErrorType {
        self.classify_detailed(err).error_type
    }

    /// Like [`classify`](Self::classify), also reporting which error in the
    /// chain decided and why.
    pub fn classify_detailed(&self, err: &(dyn StdError + 'static)) -> Classification {
        let chain = cause_chain(err);
        let classification = chain
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, e)| self.inspect(depth, *e))
            .unwrap_or_else(Classification::fatal);

        tracing::debug!(
            target: "bulksql.classify",
            error_type = %classification.error_type,
            depth = ?classification.depth,
            reason = ?classification.reason,
            chain_len = chain.len(),
            "classified error"
        );
        classification
    }

    fn inspect(&self, depth: usize, err: &(dyn StdError + 'static)) -> Option<Classification> {
        let signals = Signals::extract(err, &self.probes);
        tracing::trace!(
            target: "bulksql.classify",
            depth,
            sql_state = ?signals.sql_state,
            driver_code = ?signals.driver_code,
            message = %signals.message,
            "inspecting error"
        );

        if let Some(reason) = self.heuristics.connection_issue(&signals) {
            return Some(Classification {
                error_type: ErrorType::Connection,
                depth: Some(depth),
                reason: Some(reason),
            });
        }
        self.heuristics
            .transient_issue(&signals)
            .map(|reason| Classification {
                error_type: ErrorType::Transient,
                depth: Some(depth),
                reason: Some(reason),
            })
    }
}

#[cfg(test)]
mod tests;
