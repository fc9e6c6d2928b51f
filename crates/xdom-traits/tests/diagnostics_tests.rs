//! Tests for the diagnostic log and error taxonomy

use xdom_traits::{
    CollectMode, Error, ErrorLog, ErrorRecord, Location, NodeType, Origin, Severity,
};

fn record(msg: &str) -> ErrorRecord {
    ErrorRecord::new(Severity::Error, Origin::Parser, msg)
}

#[test]
fn test_log_slices_from_offset() {
    let mut log = ErrorLog::new();
    log.push(record("first"));
    let mark = log.len();
    log.push(record("second"));
    log.push(record("third"));

    let fresh: Vec<_> = log.since(mark).iter().map(|r| r.message.as_str()).collect();
    assert_eq!(fresh, vec!["second", "third"]);
    assert_eq!(log.since(10).len(), 0);
    assert_eq!(log.last().unwrap().message, "third");
}

#[test]
fn test_log_is_only_cleared_explicitly() {
    let mut log = ErrorLog::new();
    log.push(record("kept"));
    log.set_mode(CollectMode::Collect);
    log.set_mode(CollectMode::Surface);
    assert_eq!(log.len(), 1);

    log.clear();
    assert!(log.is_empty());
}

#[test]
fn test_set_mode_returns_previous() {
    let mut log = ErrorLog::new();
    assert_eq!(log.mode(), CollectMode::Surface);
    assert_eq!(log.set_mode(CollectMode::Collect), CollectMode::Surface);
    assert_eq!(log.set_mode(CollectMode::Collect), CollectMode::Collect);
}

#[test]
fn test_record_serializes_to_json() {
    let rec = ErrorRecord::new(Severity::Fatal, Origin::Fragment, "unclosed tag")
        .at(Location { line: 1, column: 12 });
    let json = serde_json::to_value(&rec).unwrap();

    assert_eq!(json["severity"], "Fatal");
    assert_eq!(json["origin"], "Fragment");
    assert_eq!(json["location"]["column"], 12);

    let back: ErrorRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, rec);
    assert!(back.is_failure());
    assert!(!ErrorRecord::new(Severity::Warning, Origin::Parser, "w").is_failure());
}

#[test]
fn test_error_messages_name_the_operation() {
    let err = Error::UnsupportedOperation("getNodePath".to_string());
    assert_eq!(err.to_string(), "DOM operation getNodePath() is not supported");

    let err = Error::invalid_expression("//[", "unexpected token");
    assert!(err.to_string().contains("//["));
}

#[test]
fn test_dom_codes() {
    assert_eq!(NodeType::Element.dom_code(), 1);
    assert_eq!(NodeType::Text.dom_code(), 3);
    assert_eq!(NodeType::Document.dom_code(), 9);
    assert!(NodeType::CData.is_textual());
    assert!(NodeType::Comment.is_leaf());
    assert!(!NodeType::Element.is_leaf());
}
