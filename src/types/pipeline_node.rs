//! A node on the pipeline canvas.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{INPUT_VALUE_OPTION, NodeId, NodeKind, NodeOptions, NodeResult, NodeStatus};

/// Canvas position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

impl Position {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// A configurable unit of computation in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineNode {
  pub id: NodeId,
  pub kind: NodeKind,
  pub options: NodeOptions,
  pub position: Position,
  /// Result of the most recent execution; cleared when the node is queued for a new run.
  pub last_result: Option<NodeResult>,
  pub status: NodeStatus,
  /// Whether the node renders as in-flight.
  pub loading: bool,
}

impl PipelineNode {
  pub fn new(id: impl Into<NodeId>, kind: NodeKind, position: Position) -> Self {
    Self {
      id: id.into(),
      kind,
      options: NodeOptions::new(),
      position,
      last_result: None,
      status: NodeStatus::Idle,
      loading: false,
    }
  }

  /// Value an Input Node hands downstream; empty string when unset.
  pub fn input_value(&self) -> Value {
    self
      .options
      .get(INPUT_VALUE_OPTION)
      .cloned()
      .unwrap_or_else(|| Value::String(String::new()))
  }

  /// Merges `patch` into the options; keys in `patch` win.
  pub fn merge_options(&mut self, patch: NodeOptions) {
    self.options.extend(patch);
  }
}
