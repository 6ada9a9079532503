//! Per-node execution status.

use std::fmt;

use serde::Serialize;

/// Where a node is in the current (or last) run.
///
/// `Idle -> Queued -> Running -> Succeeded | Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NodeStatus {
  #[default]
  Idle,
  Queued,
  Running,
  Succeeded,
  Failed {
    error: String,
  },
}

impl NodeStatus {
  pub fn is_terminal(&self) -> bool {
    matches!(self, NodeStatus::Succeeded | NodeStatus::Failed { .. })
  }

  pub fn is_running(&self) -> bool {
    matches!(self, NodeStatus::Running)
  }
}

impl fmt::Display for NodeStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NodeStatus::Idle => write!(f, "idle"),
      NodeStatus::Queued => write!(f, "queued"),
      NodeStatus::Running => write!(f, "running"),
      NodeStatus::Succeeded => write!(f, "succeeded"),
      NodeStatus::Failed { error } => write!(f, "failed: {}", error),
    }
  }
}
