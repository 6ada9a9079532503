//! Drives one node at a time through the backend's submit / stream exchange.
//!
//! For the node at the cursor: resolve its input, submit a single-node request, open
//! the result channel after the acknowledgment, and feed every event into the
//! [RunController] until a terminal event. The channel is dropped before the next
//! node starts, so at most one is ever open.

use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::backend::ExecutionBackend;
use crate::error::RunError;
use crate::graph::PipelineGraph;
use crate::state_machine::RunController;
use crate::types::{EventLog, NodeId, NodeResult, RunStatus, StartPipelineRequest, StreamEvent};

/// Resolves the input value for `node_id`.
///
/// - no incoming edge: empty string
/// - upstream Input Node: its entered value
/// - any other upstream: its last successful result, unwrapped
///
/// An upstream without a successful result is [RunError::MissingUpstreamResult].
#[instrument(level = "trace", skip(graph))]
pub fn resolve_input(graph: &PipelineGraph, node_id: &str) -> Result<Value, RunError> {
  if !graph.contains_node(node_id) {
    return Err(RunError::UnknownNode(node_id.to_string()));
  }
  let Some(edge) = graph.incoming_edge(node_id) else {
    return Ok(Value::String(String::new()));
  };
  let missing = || RunError::MissingUpstreamResult {
    node_id: node_id.to_string(),
    upstream_id: edge.source.clone(),
  };
  let source = graph.node(&edge.source).ok_or_else(missing)?;
  if source.kind.is_input() {
    return Ok(source.input_value());
  }
  source
    .last_result
    .as_ref()
    .and_then(NodeResult::input_value)
    .cloned()
    .ok_or_else(missing)
}

/// Executes closure nodes against a backend.
#[derive(Debug, Clone)]
pub struct StreamingExecutor<B> {
  backend: B,
}

impl<B: ExecutionBackend> StreamingExecutor<B> {
  pub fn new(backend: B) -> Self {
    Self { backend }
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  /// Runs the node at the cursor to a terminal state.
  ///
  /// Returns the run status afterwards. On failure the node is already `Failed` and the
  /// run `Aborted` when the error is returned.
  pub async fn step(
    &self,
    graph: &mut PipelineGraph,
    run: &mut RunController,
    log: &mut EventLog,
  ) -> Result<RunStatus, RunError> {
    let node_id = run.begin_current(graph)?;
    match self.execute(graph, run, log, &node_id).await {
      Ok(status) => Ok(status),
      Err(failure) => {
        run.fail_current(graph, &failure);
        Err(failure)
      }
    }
  }

  /// Steps until the run leaves `Running`.
  pub async fn drain(
    &self,
    graph: &mut PipelineGraph,
    run: &mut RunController,
    log: &mut EventLog,
  ) -> Result<RunStatus, RunError> {
    let mut status = run.status();
    while status.is_running() {
      status = self.step(graph, run, log).await?;
    }
    Ok(status)
  }

  async fn execute(
    &self,
    graph: &mut PipelineGraph,
    run: &mut RunController,
    log: &mut EventLog,
    node_id: &NodeId,
  ) -> Result<RunStatus, RunError> {
    let input = resolve_input(graph, node_id)?;
    let node = graph
      .node(node_id)
      .ok_or_else(|| RunError::UnknownNode(node_id.clone()))?;
    let request = StartPipelineRequest::single_node(node, input);
    debug!(node_id = %node_id, kind = %node.kind, input = %request.nodes[0].input, "submitting node");

    self
      .backend
      .submit(&request)
      .await
      .map_err(|e| RunError::SubmissionFailure {
        node_id: node_id.clone(),
        message: e.to_string(),
      })?;

    let mut events = self
      .backend
      .open_results()
      .await
      .map_err(|e| RunError::StreamFailure {
        node_id: node_id.clone(),
        message: e.to_string(),
      })?;

    while let Some(item) = events.next().await {
      let event = item.map_err(|e| RunError::StreamFailure {
        node_id: node_id.clone(),
        message: e.to_string(),
      })?;
      if let Some(status) = self.apply_event(graph, run, log, node_id, event)? {
        return Ok(status);
      }
    }
    Err(RunError::StreamFailure {
      node_id: node_id.clone(),
      message: "result stream closed before a terminal event".to_string(),
    })
  }

  /// Applies one event; `Some(status)` once the node has settled successfully.
  fn apply_event(
    &self,
    graph: &mut PipelineGraph,
    run: &mut RunController,
    log: &mut EventLog,
    node_id: &NodeId,
    event: StreamEvent,
  ) -> Result<Option<RunStatus>, RunError> {
    debug!(node_id = %node_id, event = ?event, "stream event");
    if !event.id.is_empty() && event.id != *node_id {
      warn!(running = %node_id, event_id = %event.id, "event id does not match running node");
    }
    log.record(node_id.clone(), event.clone());

    let terminal = event.is_terminal();
    if let Some(message) = event.error {
      return Err(RunError::NodeExecutionError {
        node_id: node_id.clone(),
        message,
      });
    }
    let result = event.result.map(NodeResult::from_payload);
    if let Some(NodeResult::Error(message)) = result {
      return Err(RunError::NodeExecutionError {
        node_id: node_id.clone(),
        message,
      });
    }
    if terminal {
      return run.succeed_current(graph, result).map(Some);
    }
    if let Some(partial) = result {
      run.record_progress(graph, partial);
    }
    Ok(None)
  }
}
