//! Tests for `EventLog`.

use serde_json::json;

use super::{EventLog, StreamEvent};

#[test]
fn record_assigns_increasing_sequence() {
  let mut log = EventLog::new();
  log.record("1", StreamEvent::complete("1", json!("hello")));
  log.record("2", StreamEvent::partial("2", json!("HE")));
  log.record("2", StreamEvent::complete("2", json!("HELLO")));
  let seqs: Vec<u64> = log.entries().iter().map(|e| e.sequence).collect();
  assert_eq!(seqs, vec![1, 2, 3]);
  assert_eq!(log.len(), 3);
  assert_eq!(log.for_node("2").count(), 2);
}

#[test]
fn entries_keep_arrival_order_of_timestamps() {
  let mut log = EventLog::new();
  log.record("1", StreamEvent::complete("1", json!(1)));
  log.record("1", StreamEvent::complete("1", json!(2)));
  assert!(log.entries()[0].received_at <= log.entries()[1].received_at);
}

#[test]
fn serializes_to_json() {
  let mut log = EventLog::new();
  log.record("7", StreamEvent::failed("7", "boom"));
  let parsed = serde_json::to_value(&log).unwrap();
  assert_eq!(parsed["entries"][0]["sequence"], 1);
  assert_eq!(parsed["entries"][0]["node_id"], "7");
  assert_eq!(parsed["entries"][0]["event"]["error"], "boom");
  assert!(parsed["entries"][0]["received_at"].is_string());
}

#[test]
fn clear_empties_log() {
  let mut log = EventLog::new();
  log.record("1", StreamEvent::complete("1", json!(null)));
  log.clear();
  assert!(log.is_empty());
}
