//! Global run state and the snapshot published to observers.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::{ExecutionClosure, NodeId, NodeResult, NodeStatus};

/// Global status of the session's single run slot.
///
/// `Idle -> Running -> Completed | Aborted`. Only `Running` blocks a new run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
  #[default]
  Idle,
  Running,
  Completed,
  Aborted,
}

impl RunStatus {
  pub fn is_running(self) -> bool {
    self == RunStatus::Running
  }

  pub fn is_finished(self) -> bool {
    matches!(self, RunStatus::Completed | RunStatus::Aborted)
  }
}

impl fmt::Display for RunStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunStatus::Idle => write!(f, "idle"),
      RunStatus::Running => write!(f, "running"),
      RunStatus::Completed => write!(f, "completed"),
      RunStatus::Aborted => write!(f, "aborted"),
    }
  }
}

/// State of the current (or last) run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunState {
  pub status: RunStatus,
  pub closure: ExecutionClosure,
  /// Index into `closure` of the node being (or next to be) executed.
  pub cursor: usize,
  pub abort_reason: Option<String>,
}

impl RunState {
  /// Node at the cursor while the run is active.
  pub fn current_node(&self) -> Option<&NodeId> {
    if self.status.is_running() {
      self.closure.get(self.cursor)
    } else {
      None
    }
  }

  /// Nodes from the cursor to the end of the closure.
  pub fn remaining(&self) -> &[NodeId] {
    let slice = self.closure.as_slice();
    &slice[self.cursor.min(slice.len())..]
  }
}

/// Display-relevant state of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
  pub status: NodeStatus,
  pub loading: bool,
  pub last_result: Option<NodeResult>,
}

/// Point-in-time view of a run, as seen by observers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RunSnapshot {
  pub run: RunState,
  pub nodes: BTreeMap<NodeId, NodeView>,
}

impl RunSnapshot {
  pub fn running_count(&self) -> usize {
    self
      .nodes
      .values()
      .filter(|n| n.status.is_running())
      .count()
  }

  pub fn loading_count(&self) -> usize {
    self.nodes.values().filter(|n| n.loading).count()
  }
}
