use super::*;
use std::io;

#[derive(Debug, thiserror::Error)]
#[error("{context}")]
struct Wrapped {
    context: String,
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

fn wrap(context: &str, source: impl StdError + Send + Sync + 'static) -> Wrapped {
    Wrapped {
        context: context.to_string(),
        source: Box::new(source),
    }
}

#[test]
fn test_connection_beats_transient_on_same_error() {
    let err = DriverError::new("x").with_code(2013).with_sql_state("40001");
    let c = ErrorClassifier::new().classify_detailed(&err);
    assert_eq!(c.error_type, ErrorType::Connection);
    assert_eq!(c.reason, Some(MatchReason::ConnectionCode));
    assert_eq!(c.depth, Some(0));
}

#[test]
fn test_inner_cause_decides() {
    let inner = DriverError::new("serialization failure").with_sql_state("40001");
    let err = wrap("commit failed", wrap("statement 3 of 5", inner));
    let c = ErrorClassifier::new().classify_detailed(&err);
    assert_eq!(c.error_type, ErrorType::Transient);
    assert_eq!(c.depth, Some(2));
    assert_eq!(c.reason, Some(MatchReason::TransientState));
}

#[test]
fn test_innermost_match_wins() {
    // Outer says connection, inner says deadlock: inner is visited first.
    let inner = DriverError::new("deadlock").with_code(1213);
    let err = DriverError::new("MySQL server has gone away").with_source(inner);
    let c = ErrorClassifier::new().classify_detailed(&err);
    assert_eq!(c.error_type, ErrorType::Transient);
    assert_eq!(c.depth, Some(1));
}

#[test]
fn test_outer_error_used_when_inner_is_unknown() {
    let err = wrap("Lost connection to MySQL server", io::Error::other("eof"));
    assert_eq!(ErrorClassifier::new().classify(&err), ErrorType::Connection);
}

#[test]
fn test_fatal() {
    let err = DriverError::new("You have an error in your SQL syntax")
        .with_code(1064)
        .with_sql_state("42000");
    let c = ErrorClassifier::new().classify_detailed(&err);
    assert_eq!(
        c,
        Classification {
            error_type: ErrorType::Fatal,
            depth: None,
            reason: None,
        }
    );
}

#[test]
fn test_plain_errors_use_message() {
    let classifier = ErrorClassifier::new();
    assert_eq!(
        classifier.classify(&io::Error::other("write: Broken pipe")),
        ErrorType::Connection
    );
    assert_eq!(
        classifier.classify(&io::Error::other("Deadlock found when trying to get lock")),
        ErrorType::Transient
    );
    assert_eq!(classifier.classify(&io::Error::other("duplicate entry")), ErrorType::Fatal);
}

#[test]
fn test_code_in_message() {
    let err = io::Error::other("SQLSTATE[HY000] [2002] Connection attempt failed");
    let c = ErrorClassifier::new().classify_detailed(&err);
    assert_eq!(c.reason, Some(MatchReason::ConnectionCodeInMessage));
}

#[test]
fn test_deterministic() {
    let classifier = ErrorClassifier::new();
    let err = wrap("a", DriverError::new("b").with_code(1205));
    let first = classifier.classify_detailed(&err);
    for _ in 0..10 {
        assert_eq!(classifier.classify_detailed(&err), first);
    }
}

#[test]
fn test_custom_config() {
    let classifier = ErrorClassifier::with_config(
        HeuristicsConfig::new()
            .with_connection_codes(Vec::new())
            .with_connection_messages(Vec::<String>::new()),
    );
    let err = DriverError::new("MySQL server has gone away").with_code(2006);
    assert_eq!(classifier.classify(&err), ErrorType::Fatal);
}

#[derive(Debug, thiserror::Error)]
#[error("vendor failure {0}")]
struct VendorError(i32);

impl DriverSignals for VendorError {
    fn code(&self) -> Option<ErrorCode> {
        Some(self.0.into())
    }
}

#[test]
fn test_register_custom_type() {
    let err = VendorError(1213);
    // Without a probe only the message "vendor failure 1213" is seen, which
    // still yields the code by token scan.
    let c = ErrorClassifier::new().classify_detailed(&err);
    assert_eq!(c.reason, Some(MatchReason::TransientCodeInMessage));

    let c = ErrorClassifier::new()
        .register::<VendorError>()
        .classify_detailed(&err);
    assert_eq!(c.reason, Some(MatchReason::TransientCode));
}

struct AlwaysTransient;

impl Heuristics for AlwaysTransient {
    fn connection_issue(&self, _: &Signals) -> Option<MatchReason> {
        None
    }

    fn transient_issue(&self, _: &Signals) -> Option<MatchReason> {
        Some(MatchReason::TransientMessage)
    }
}

#[test]
fn test_custom_heuristics() {
    let classifier = ErrorClassifier::with_heuristics(AlwaysTransient);
    assert_eq!(classifier.classify(&io::Error::other("anything")), ErrorType::Transient);
}

#[derive(Debug)]
struct Looping;

impl fmt::Display for Looping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("loop")
    }
}

impl StdError for Looping {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self)
    }
}

#[test]
fn test_cycle_runs_into_bound() {
    let chain = cause_chain(&Looping);
    assert_eq!(chain.len(), MAX_CHAIN_DEPTH);
    assert_eq!(ErrorClassifier::new().classify(&Looping), ErrorType::Fatal);
}

#[derive(Debug, thiserror::Error)]
#[error("statement failed")]
struct Newtype(#[source] DriverError);

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("database error")]
    Db(#[from] DriverError),
}

#[test]
fn test_newtype_wrapper_keeps_source() {
    let err = Newtype(DriverError::new("could not serialize").with_sql_state("40001"));
    assert_eq!(cause_chain(&err).len(), 2);

    let c = ErrorClassifier::new().classify_detailed(&err);
    assert_eq!(c.error_type, ErrorType::Transient);
    assert_eq!(c.depth, Some(1));
    assert_eq!(c.reason, Some(MatchReason::TransientState));
}

#[test]
fn test_from_variant_keeps_source() {
    let err = AppError::from(DriverError::new("deadlock victim").with_code(1213));
    assert_eq!(cause_chain(&err).len(), 2);

    let c = ErrorClassifier::new().classify_detailed(&err);
    assert_eq!(c.error_type, ErrorType::Transient);
    assert_eq!(c.reason, Some(MatchReason::TransientCode));
}

#[test]
fn test_nested_newtypes_reach_innermost() {
    let err = Newtype(
        DriverError::new("wrapped").with_source(Newtype(DriverError::new("x").with_code(2006))),
    );
    let c = ErrorClassifier::new().classify_detailed(&err);
    assert_eq!(c.error_type, ErrorType::Connection);
    assert_eq!(c.depth, Some(3));
}

#[test]
fn test_chain_is_bounded() {
    let mut err = DriverError::new("deadlock");
    for _ in 0..MAX_CHAIN_DEPTH + 5 {
        err = DriverError::new("wrapper").with_source(err);
    }
    assert_eq!(cause_chain(&err).len(), MAX_CHAIN_DEPTH);
    // The deadlock sits past the bound and is never seen.
    assert_eq!(ErrorClassifier::new().classify(&err), ErrorType::Fatal);
}

#[test]
fn test_error_type_helpers() {
    assert!(ErrorType::Connection.is_retryable());
    assert!(ErrorType::Connection.requires_reconnect());
    assert!(ErrorType::Transient.is_retryable());
    assert!(!ErrorType::Transient.requires_reconnect());
    assert!(!ErrorType::Fatal.is_retryable());
    assert_eq!(ErrorType::Transient.to_string(), "transient");
    assert_eq!(serde_json::to_string(&ErrorType::Fatal).unwrap(), "\"fatal\"");
}

#[test]
fn test_classifier_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ErrorClassifier>();
}
