//! Run state machine: the only place per-node and global run status change.
//!
//! Transitions: [RunController::start] queues the closure, [RunController::begin_current]
//! marks the node at the cursor running, then exactly one of
//! [RunController::succeed_current] or [RunController::fail_current] settles it.
//! Every transition publishes a [RunSnapshot] on a watch channel.

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{error, info, instrument};

use crate::error::RunError;
use crate::graph::PipelineGraph;
use crate::types::{
  ExecutionClosure, NodeId, NodeResult, NodeStatus, PipelineNode, RunSnapshot, RunState,
  RunStatus,
};

/// Owner of the session's single run slot.
#[derive(Debug)]
pub struct RunController {
  state: RunState,
  snapshots: watch::Sender<RunSnapshot>,
}

impl Default for RunController {
  fn default() -> Self {
    Self::new()
  }
}

impl RunController {
  pub fn new() -> Self {
    let (snapshots, _) = watch::channel(RunSnapshot::default());
    Self {
      state: RunState::default(),
      snapshots,
    }
  }

  pub fn state(&self) -> &RunState {
    &self.state
  }

  pub fn status(&self) -> RunStatus {
    self.state.status
  }

  pub fn is_running(&self) -> bool {
    self.state.status.is_running()
  }

  /// Receiver that always holds the latest snapshot.
  pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
    self.snapshots.subscribe()
  }

  /// Snapshots as a stream: the latest one first, then one per observed change.
  pub fn snapshot_stream(&self) -> WatchStream<RunSnapshot> {
    WatchStream::new(self.snapshots.subscribe())
  }

  pub fn snapshot(&self, graph: &PipelineGraph) -> RunSnapshot {
    RunSnapshot {
      run: self.state.clone(),
      nodes: graph.node_views(),
    }
  }

  fn publish(&self, graph: &PipelineGraph) {
    self.snapshots.send_replace(self.snapshot(graph));
  }

  /// Begins a run over `closure`.
  ///
  /// Every closure node becomes `Queued` and loses its previous result; other nodes are
  /// untouched. An empty closure is already exhausted, so the run goes straight to
  /// `Completed`. Fails with [RunError::AlreadyRunning] and changes nothing while a run is
  /// active.
  #[instrument(level = "trace", skip(self, graph))]
  pub fn start(
    &mut self,
    graph: &mut PipelineGraph,
    closure: ExecutionClosure,
  ) -> Result<(), RunError> {
    if self.is_running() {
      return Err(RunError::AlreadyRunning);
    }
    if let Some(missing) = closure.iter().find(|id| !graph.contains_node(id)) {
      return Err(RunError::UnknownNode(missing.clone()));
    }
    for id in &closure {
      if let Some(node) = graph.node_mut(id) {
        node.status = NodeStatus::Queued;
        node.last_result = None;
        node.loading = true;
      }
    }
    info!(closure = ?closure, "run started");
    let status = if closure.is_empty() {
      RunStatus::Completed
    } else {
      RunStatus::Running
    };
    self.state = RunState {
      status,
      closure,
      cursor: 0,
      abort_reason: None,
    };
    self.publish(graph);
    Ok(())
  }

  /// Marks the node at the cursor `Running` and returns its id.
  ///
  /// A node removed from the graph since the run started aborts the run.
  pub fn begin_current(&mut self, graph: &mut PipelineGraph) -> Result<NodeId, RunError> {
    let id = self
      .state
      .current_node()
      .cloned()
      .ok_or(RunError::NotRunning)?;
    let Some(node) = graph.node_mut(&id) else {
      let failure = RunError::UnknownNode(id);
      self.abort(graph, failure.to_string());
      return Err(failure);
    };
    node.status = NodeStatus::Running;
    node.loading = true;
    self.publish(graph);
    Ok(id)
  }

  /// Stores a partial result on the running node; it stays `Running`.
  pub fn record_progress(&mut self, graph: &mut PipelineGraph, result: NodeResult) {
    if let Some(node) = self.running_node(graph) {
      node.last_result = Some(result);
      self.publish(graph);
    }
  }

  /// Settles the running node as `Succeeded` and advances the cursor.
  ///
  /// `result` of `None` keeps whatever partial result was recorded. Returns the run status
  /// after the transition: `Completed` once the closure is exhausted.
  #[instrument(level = "trace", skip(self, graph, result))]
  pub fn succeed_current(
    &mut self,
    graph: &mut PipelineGraph,
    result: Option<NodeResult>,
  ) -> Result<RunStatus, RunError> {
    let node = self.running_node(graph).ok_or(RunError::NotRunning)?;
    node.status = NodeStatus::Succeeded;
    node.loading = false;
    if result.is_some() {
      node.last_result = result;
    }
    self.state.cursor += 1;
    if self.state.cursor >= self.state.closure.len() {
      self.state.status = RunStatus::Completed;
      info!(nodes = self.state.closure.len(), "run completed");
    }
    self.publish(graph);
    Ok(self.state.status)
  }

  /// Settles the running node as `Failed` and aborts the run.
  ///
  /// Nodes after it stay `Queued` but stop rendering as loading; nodes already
  /// `Succeeded` keep their results.
  pub fn fail_current(&mut self, graph: &mut PipelineGraph, failure: &RunError) {
    let message = failure_message(failure);
    if let Some(node) = self.running_node(graph) {
      node.status = NodeStatus::Failed {
        error: message.clone(),
      };
      node.last_result = Some(NodeResult::Error(message.clone()));
      node.loading = false;
    }
    self.abort(graph, message);
  }

  /// Aborts the active run: clears every loading flag in the closure and frees the slot.
  pub fn abort(&mut self, graph: &mut PipelineGraph, reason: impl Into<String>) {
    let reason = reason.into();
    for id in &self.state.closure {
      if let Some(node) = graph.node_mut(id) {
        if matches!(node.status, NodeStatus::Queued | NodeStatus::Running) {
          node.loading = false;
        }
      }
    }
    error!(reason = %reason, cursor = self.state.cursor, "run aborted");
    self.state.status = RunStatus::Aborted;
    self.state.abort_reason = Some(reason);
    self.publish(graph);
  }

  fn running_node<'g>(
    &self,
    graph: &'g mut PipelineGraph,
  ) -> Option<&'g mut PipelineNode> {
    let id = self.state.current_node()?;
    graph.node_mut(id).filter(|n| n.status.is_running())
  }
}

/// Text recorded on a failed node: the backend's own message for node errors.
fn failure_message(failure: &RunError) -> String {
  match failure {
    RunError::NodeExecutionError { message, .. } => message.clone(),
    other => other.to_string(),
  }
}
