//! Heuristic lists for the classifier, with serde defaults.
//!
//! Any list left out of a config file keeps its default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// State-code classes that mean the session itself is gone.
pub const DEFAULT_CONNECTION_STATE_PREFIXES: &[&str] = &["08"];

/// MySQL client/server codes for a lost or refused connection:
/// 2002 can't connect, 2006 server has gone away, 2013 lost connection during
/// query, 4031 disconnected by the server for inactivity.
pub const DEFAULT_CONNECTION_CODES: &[i64] = &[2002, 2006, 2013, 4031];

/// Transport-failure phrasings seen across client libraries. Matched
/// case-insensitively as substrings of the error message.
pub const DEFAULT_CONNECTION_MESSAGES: &[&str] = &[
    "server has gone away",
    "gone away",
    "lost connection",
    "broken pipe",
    "connection reset",
    "reset by peer",
    "connection refused",
    "connection timed out",
    "no route to host",
    "network is unreachable",
    "is dead or not enabled",
    "error while sending",
    "error writing data to the connection",
    "server closed the connection unexpectedly",
    "ssl connection has been closed unexpectedly",
    "decryption failed or bad record mac",
    "physical connection is not usable",
    "communication link failure",
    "connection is no longer usable",
    "packets out of order",
    "connection was killed",
    "temporary failure in name resolution",
    "php_network_getaddresses",
    "login timeout expired",
];

/// Serialization failure.
pub const DEFAULT_TRANSIENT_STATES: &[&str] = &["40001"];

/// MySQL 1205 lock wait timeout, 1213 deadlock.
pub const DEFAULT_TRANSIENT_CODES: &[i64] = &[1205, 1213];

pub const DEFAULT_TRANSIENT_MESSAGES: &[&str] = &[
    "deadlock",
    "lock wait timeout",
    "try restarting transaction",
    "serialization failure",
    "could not serialize access",
];

/// Signal lists used by [`DefaultHeuristics`](super::DefaultHeuristics).
///
/// Every list can be replaced independently. With serde, fields left out of a
/// document keep their defaults:
///
/// ```
/// # use bulksql::classify::HeuristicsConfig;
/// let json = r#"{ "transient_codes": [1205] }"#;
/// let config: HeuristicsConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.transient_codes.len(), 1);
/// assert!(config.connection_codes.contains(&2006));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// A state code starting with one of these is a connection issue.
    pub connection_state_prefixes: Vec<String>,
    /// Driver codes meaning the connection is unusable.
    pub connection_codes: BTreeSet<i64>,
    /// Message substrings meaning the connection is unusable.
    pub connection_messages: Vec<String>,
    /// State codes (exact match) for a retryable conflict.
    pub transient_states: Vec<String>,
    /// Driver codes for a retryable conflict.
    pub transient_codes: BTreeSet<i64>,
    /// Message substrings for a retryable conflict.
    pub transient_messages: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            connection_state_prefixes: strings(DEFAULT_CONNECTION_STATE_PREFIXES),
            connection_codes: DEFAULT_CONNECTION_CODES.iter().copied().collect(),
            connection_messages: strings(DEFAULT_CONNECTION_MESSAGES),
            transient_states: strings(DEFAULT_TRANSIENT_STATES),
            transient_codes: DEFAULT_TRANSIENT_CODES.iter().copied().collect(),
            transient_messages: strings(DEFAULT_TRANSIENT_MESSAGES),
        }
    }
}

impl HeuristicsConfig {
    /// Create a new configuration with the default lists.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection_state_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.connection_state_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_connection_codes(mut self, codes: impl IntoIterator<Item = i64>) -> Self {
        self.connection_codes = codes.into_iter().collect();
        self
    }

    pub fn with_connection_messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.connection_messages = messages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_transient_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transient_states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_transient_codes(mut self, codes: impl IntoIterator<Item = i64>) -> Self {
        self.transient_codes = codes.into_iter().collect();
        self
    }

    pub fn with_transient_messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transient_messages = messages.into_iter().map(Into::into).collect();
        self
    }

    /// Add connection-failure phrasings on top of the current list.
    pub fn extend_connection_messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.connection_messages
            .extend(messages.into_iter().map(Into::into));
        self
    }

    /// Add transient phrasings on top of the current list.
    pub fn extend_transient_messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transient_messages
            .extend(messages.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HeuristicsConfig::default();
        assert_eq!(config.connection_state_prefixes, ["08"]);
        assert_eq!(
            config.connection_codes.iter().copied().collect::<Vec<_>>(),
            [2002, 2006, 2013, 4031]
        );
        assert_eq!(config.transient_states, ["40001"]);
        assert!(config.transient_codes.contains(&1213));
        assert!(config.connection_messages.iter().any(|m| m == "broken pipe"));
    }

    #[test]
    fn overrides_are_independent() {
        let config = HeuristicsConfig::new()
            .with_transient_codes([40])
            .extend_connection_messages(["link is down"]);
        assert_eq!(config.transient_codes.len(), 1);
        assert_eq!(config.transient_states, ["40001"]);
        assert!(config.connection_messages.iter().any(|m| m == "link is down"));
        assert!(config.connection_messages.iter().any(|m| m == "gone away"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: HeuristicsConfig = toml::from_str(
            r#"
            connection_state_prefixes = ["08", "HY"]
            transient_messages = ["busy"]
            "#,
        )
        .unwrap();
        assert_eq!(config.connection_state_prefixes, ["08", "HY"]);
        assert_eq!(config.transient_messages, ["busy"]);
        assert_eq!(config.connection_codes, HeuristicsConfig::default().connection_codes);
    }
}
