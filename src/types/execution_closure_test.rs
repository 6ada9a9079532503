//! Tests for `ExecutionClosure`.

use super::ExecutionClosure;

#[test]
fn from_ids_keeps_first_occurrence_order() {
  let c = ExecutionClosure::from_ids(["a", "b", "a", "c", "b"]);
  assert_eq!(c.as_slice(), ["a", "b", "c"]);
  assert_eq!(c.len(), 3);
}

#[test]
fn lookup_helpers() {
  let c = ExecutionClosure::from_ids(["x", "y"]);
  assert!(c.contains("y"));
  assert!(!c.contains("z"));
  assert_eq!(c.position("y"), Some(1));
  assert_eq!(c.get(0).map(String::as_str), Some("x"));
  assert!(c.get(2).is_none());
}

#[test]
fn default_is_empty() {
  let c = ExecutionClosure::default();
  assert!(c.is_empty());
  assert_eq!(c.iter().count(), 0);
}

#[test]
fn serializes_as_plain_array() {
  let c = ExecutionClosure::from_ids(["1", "2"]);
  assert_eq!(serde_json::to_value(&c).unwrap(), serde_json::json!(["1", "2"]));
}

#[test]
fn from_ids_dedupes_long_inputs_in_order() {
  let ids = (0..2000).map(|i| (i % 500).to_string());
  let c = ExecutionClosure::from_ids(ids);
  assert_eq!(c.len(), 500);
  assert_eq!(c.get(0).map(String::as_str), Some("0"));
  assert_eq!(c.get(499).map(String::as_str), Some("499"));
}
