//! One event delivered on the result stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::NodeId;

/// Event pushed by the backend for the node currently executing.
///
/// A run's per-node exchange ends at the first event with `complete` set or an
/// `error` present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
  #[serde(default)]
  pub id: NodeId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub result: Option<Value>,
  #[serde(default, alias = "is_final")]
  pub complete: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl StreamEvent {
  /// Intermediate event carrying a partial result.
  pub fn partial(id: impl Into<NodeId>, result: Value) -> Self {
    Self {
      id: id.into(),
      result: Some(result),
      complete: false,
      error: None,
    }
  }

  /// Final event for a node.
  pub fn complete(id: impl Into<NodeId>, result: Value) -> Self {
    Self {
      id: id.into(),
      result: Some(result),
      complete: true,
      error: None,
    }
  }

  /// Error event for a node.
  pub fn failed(id: impl Into<NodeId>, message: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      result: None,
      complete: false,
      error: Some(message.into()),
    }
  }

  pub fn is_terminal(&self) -> bool {
    self.complete || self.error.is_some()
  }
}
