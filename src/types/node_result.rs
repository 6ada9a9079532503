//! Last result recorded on a node.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a node's most recent execution.
///
/// Serializes to the `{"success": value}` / `{"error": message}` wrapper shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeResult {
  Success(Value),
  Error(String),
}

impl NodeResult {
  /// Normalises a result payload received from the backend.
  ///
  /// A single-key `{"success": v}` or `{"error": "msg"}` object is unwrapped; any other
  /// value is taken as a successful raw result.
  pub fn from_payload(payload: Value) -> Self {
    if let Value::Object(map) = &payload {
      if map.len() == 1 {
        if let Some(inner) = map.get("success") {
          return NodeResult::Success(inner.clone());
        }
        if let Some(Value::String(message)) = map.get("error") {
          return NodeResult::Error(message.clone());
        }
      }
    }
    NodeResult::Success(payload)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, NodeResult::Success(_))
  }

  /// Raw value to feed downstream, or `None` for an error result.
  pub fn input_value(&self) -> Option<&Value> {
    match self {
      NodeResult::Success(value) => Some(value),
      NodeResult::Error(_) => None,
    }
  }
}
