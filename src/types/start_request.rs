//! Body of the execution submission request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{NodeId, NodeKind, NodeOptions, PipelineNode};

/// One node as submitted to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRequest {
  pub id: NodeId,
  #[serde(rename = "type")]
  pub kind: NodeKind,
  pub options: NodeOptions,
  pub input: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRequest {
  pub source: NodeId,
  pub target: NodeId,
}

/// `POST /start-pipeline` body. Acknowledged only; results arrive on the result stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPipelineRequest {
  pub nodes: Vec<NodeRequest>,
  #[serde(default)]
  pub edges: Vec<EdgeRequest>,
  pub start_node_id: NodeId,
}

impl StartPipelineRequest {
  /// Request that executes exactly `node` with an already-resolved input.
  pub fn single_node(node: &PipelineNode, input: Value) -> Self {
    Self {
      nodes: vec![NodeRequest {
        id: node.id.clone(),
        kind: node.kind.clone(),
        options: node.options.clone(),
        input,
      }],
      edges: vec![],
      start_node_id: node.id.clone(),
    }
  }
}
