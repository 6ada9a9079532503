//! Error types for graph edits, planning, transport and runs.

use thiserror::Error;

use crate::types::NodeId;

/// Why a proposed edge was refused. The graph is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectRejection {
  /// The target already has its one allowed incoming edge.
  #[error("node {target} already has an input connection")]
  DuplicateInput { target: NodeId },

  #[error("unknown node: {0}")]
  UnknownNode(NodeId),

  /// Input Nodes expose no input handle.
  #[error("node {0} is an Input Node and cannot receive a connection")]
  InputNodeTarget(NodeId),
}

/// Failure to compute an execution closure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
  #[error("start node not found: {0}")]
  UnknownStartNode(NodeId),

  #[error("graph has no nodes to execute")]
  EmptyGraph,
}

/// Invalid backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("invalid backend URL: {0}")]
  InvalidUrl(String),

  #[error("invalid value for {key}: {value}")]
  InvalidValue { key: String, value: String },
}

/// Failure talking to the execution backend.
#[derive(Debug, Error)]
pub enum BackendError {
  #[error("HTTP request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// Backend answered with a non-success status.
  #[error("backend error (status {status}): {message}")]
  Status { status: u16, message: String },

  #[error("failed to decode stream payload: {0}")]
  Decode(#[from] serde_json::Error),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("result stream failed: {0}")]
  Stream(String),
}

/// Run-time failures. Every variant is terminal for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
  /// A run is active; the request was dropped without any state change.
  #[error("a pipeline run is already in progress")]
  AlreadyRunning,

  #[error(transparent)]
  Plan(#[from] PlanError),

  #[error("node not found: {0}")]
  UnknownNode(NodeId),

  /// The submission request was rejected or the backend was unreachable.
  #[error("failed to submit node {node_id}: {message}")]
  SubmissionFailure { node_id: NodeId, message: String },

  /// The result channel failed or closed before a terminal event.
  #[error("result stream failed while running node {node_id}: {message}")]
  StreamFailure { node_id: NodeId, message: String },

  /// The backend reported an error for the node.
  #[error("node {node_id} failed: {message}")]
  NodeExecutionError { node_id: NodeId, message: String },

  /// The node's upstream has no usable result to feed it.
  #[error("node {node_id} has no result from upstream node {upstream_id}")]
  MissingUpstreamResult { node_id: NodeId, upstream_id: NodeId },

  #[error("no run is in progress")]
  NotRunning,
}

impl RunError {
  /// Node the failure is attributed to, if any.
  pub fn node_id(&self) -> Option<&str> {
    match self {
      RunError::SubmissionFailure { node_id, .. }
      | RunError::StreamFailure { node_id, .. }
      | RunError::NodeExecutionError { node_id, .. }
      | RunError::MissingUpstreamResult { node_id, .. } => Some(node_id),
      RunError::UnknownNode(id) => Some(id),
      _ => None,
    }
  }
}
