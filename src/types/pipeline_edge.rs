//! A directed edge between two pipeline nodes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EdgeId, NodeId};

/// Directed dependency: `source`'s result is `target`'s input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEdge {
  pub id: EdgeId,
  pub source: NodeId,
  pub target: NodeId,
}

impl PipelineEdge {
  /// Creates an edge with a fresh random id.
  pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      source: source.into(),
      target: target.into(),
    }
  }
}
