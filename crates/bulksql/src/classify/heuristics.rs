//! Rules deciding whether one error's signals mean a lost connection or a
//! retryable conflict.

use super::config::HeuristicsConfig;
use super::signals::Signals;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Which signal decided a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchReason {
    ConnectionState,
    ConnectionCode,
    ConnectionCodeInMessage,
    ConnectionMessage,
    TransientState,
    TransientCode,
    TransientCodeInMessage,
    TransientMessage,
}

/// Decides whether one error's signals describe a connection or transient issue.
///
/// The classifier asks for a connection issue first and only asks for a
/// transient issue when there is none.
pub trait Heuristics {
    fn connection_issue(&self, signals: &Signals) -> Option<MatchReason>;

    fn transient_issue(&self, signals: &Signals) -> Option<MatchReason>;

    fn is_connection_issue(&self, signals: &Signals) -> bool {
        self.connection_issue(signals).is_some()
    }

    fn is_transient_issue(&self, signals: &Signals) -> bool {
        self.transient_issue(signals).is_some()
    }
}

/// List-driven heuristics over state codes, driver codes and message text.
///
/// Each tier is tried in order: state code, then driver code (or, when the
/// error has no driver code, numeric tokens in its message), then message
/// substrings. Empty prefixes and substrings are dropped at construction since
/// they would match everything.
#[derive(Debug, Clone)]
pub struct DefaultHeuristics {
    connection_state_prefixes: Vec<String>,
    connection_codes: BTreeSet<i64>,
    connection_messages: Vec<String>,
    transient_states: Vec<String>,
    transient_codes: BTreeSet<i64>,
    transient_messages: Vec<String>,
}

impl Default for DefaultHeuristics {
    fn default() -> Self {
        Self::new(HeuristicsConfig::default())
    }
}

fn lowercase_non_empty(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

fn non_empty(items: Vec<String>) -> Vec<String> {
    items.into_iter().filter(|s| !s.is_empty()).collect()
}

/// Standalone integers in `message`, e.g. `2006` in `"[2006] MySQL server has gone away"`.
fn message_codes(message: &str) -> impl Iterator<Item = i64> + '_ {
    static CODE_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re =
        CODE_RE.get_or_init(|| regex::Regex::new(r"\b\d+\b").expect("invalid built-in code regex"));
    re.find_iter(message).filter_map(|m| m.as_str().parse().ok())
}

impl DefaultHeuristics {
    pub fn new(config: HeuristicsConfig) -> Self {
        Self {
            connection_state_prefixes: non_empty(config.connection_state_prefixes),
            connection_codes: config.connection_codes,
            connection_messages: lowercase_non_empty(config.connection_messages),
            transient_states: non_empty(config.transient_states),
            transient_codes: config.transient_codes,
            transient_messages: lowercase_non_empty(config.transient_messages),
        }
    }

    fn code_match(
        codes: &BTreeSet<i64>,
        signals: &Signals,
        direct: MatchReason,
        in_message: MatchReason,
    ) -> Option<MatchReason> {
        match signals.driver_code {
            Some(code) => codes.contains(&code).then_some(direct),
            None => message_codes(&signals.message)
                .any(|code| codes.contains(&code))
                .then_some(in_message),
        }
    }

    fn message_match(
        needles: &[String],
        signals: &Signals,
        reason: MatchReason,
    ) -> Option<MatchReason> {
        if needles.is_empty() || signals.message.is_empty() {
            return None;
        }
        let haystack = signals.message.to_lowercase();
        needles
            .iter()
            .any(|needle| haystack.contains(needle.as_str()))
            .then_some(reason)
    }
}

impl Heuristics for DefaultHeuristics {
    fn connection_issue(&self, signals: &Signals) -> Option<MatchReason> {
        if let Some(state) = &signals.sql_state {
            if self
                .connection_state_prefixes
                .iter()
                .any(|prefix| state.starts_with(prefix.as_str()))
            {
                return Some(MatchReason::ConnectionState);
            }
        }

        Self::code_match(
            &self.connection_codes,
            signals,
            MatchReason::ConnectionCode,
            MatchReason::ConnectionCodeInMessage,
        )
        .or_else(|| {
            Self::message_match(
                &self.connection_messages,
                signals,
                MatchReason::ConnectionMessage,
            )
        })
    }

    fn transient_issue(&self, signals: &Signals) -> Option<MatchReason> {
        if let Some(state) = &signals.sql_state {
            if self.transient_states.iter().any(|s| s == state) {
                return Some(MatchReason::TransientState);
            }
        }

        Self::code_match(
            &self.transient_codes,
            signals,
            MatchReason::TransientCode,
            MatchReason::TransientCodeInMessage,
        )
        .or_else(|| {
            Self::message_match(
                &self.transient_messages,
                signals,
                MatchReason::TransientMessage,
            )
        })
    }
}
