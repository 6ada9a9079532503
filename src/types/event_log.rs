//! Raw log of result-stream events, kept for diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NodeId, StreamEvent};

/// One received event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
  /// 1-based position in the log.
  pub sequence: u64,
  /// Node that was running when the event arrived.
  pub node_id: NodeId,
  pub received_at: DateTime<Utc>,
  pub event: StreamEvent,
}

/// Ordered sequence of received events across runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventLog {
  pub entries: Vec<EventLogEntry>,
}

impl EventLog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends `event` as received while `node_id` was running.
  pub fn record(&mut self, node_id: impl Into<NodeId>, event: StreamEvent) -> &EventLogEntry {
    let sequence = self.entries.len() as u64 + 1;
    self.entries.push(EventLogEntry {
      sequence,
      node_id: node_id.into(),
      received_at: Utc::now(),
      event,
    });
    &self.entries[self.entries.len() - 1]
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn entries(&self) -> &[EventLogEntry] {
    &self.entries
  }

  /// Entries received while `node_id` was running.
  pub fn for_node<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a EventLogEntry> + 'a {
    self.entries.iter().filter(move |e| e.node_id == node_id)
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}
