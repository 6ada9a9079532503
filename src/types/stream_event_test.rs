//! Tests for `StreamEvent`.

use serde_json::json;

use super::StreamEvent;

#[test]
fn deserializes_full_event() {
  let e: StreamEvent =
    serde_json::from_str(r#"{"id":"2","result":"HELLO","complete":true}"#).unwrap();
  assert_eq!(e, StreamEvent::complete("2", json!("HELLO")));
  assert!(e.is_terminal());
}

#[test]
fn missing_fields_default() {
  let e: StreamEvent = serde_json::from_str(r#"{"id":"3","result":{"progress":0.5}}"#).unwrap();
  assert!(!e.complete);
  assert!(e.error.is_none());
  assert!(!e.is_terminal());
}

#[test]
fn is_final_is_accepted_for_complete() {
  let e: StreamEvent = serde_json::from_str(r#"{"id":"4","result":"x","is_final":true}"#).unwrap();
  assert!(e.complete);
}

#[test]
fn error_event_is_terminal() {
  let e: StreamEvent = serde_json::from_str(r#"{"id":"5","error":"bad key"}"#).unwrap();
  assert_eq!(e.error.as_deref(), Some("bad key"));
  assert!(e.is_terminal());
}

#[test]
fn serialization_skips_absent_fields() {
  let json = serde_json::to_value(StreamEvent::failed("1", "nope")).unwrap();
  assert_eq!(json, json!({"id": "1", "complete": false, "error": "nope"}));
}
