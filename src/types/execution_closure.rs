//! Ordered set of node ids planned for one run.

use std::collections::HashSet;

use serde::Serialize;

use super::NodeId;

/// Which nodes a run executes, and in what order. Each id appears once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ExecutionClosure(Vec<NodeId>);

impl ExecutionClosure {
  /// Builds a closure from ids, dropping repeats after the first occurrence.
  pub fn from_ids<I, S>(ids: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<NodeId>,
  {
    let mut seen: HashSet<NodeId> = HashSet::new();
    let out = ids
      .into_iter()
      .map(Into::into)
      .filter(|id: &NodeId| seen.insert(id.clone()))
      .collect();
    Self(out)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&NodeId> {
    self.0.get(index)
  }

  pub fn contains(&self, id: &str) -> bool {
    self.0.iter().any(|n| n == id)
  }

  pub fn position(&self, id: &str) -> Option<usize> {
    self.0.iter().position(|n| n == id)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
    self.0.iter()
  }

  pub fn as_slice(&self) -> &[NodeId] {
    &self.0
  }
}

impl<'a> IntoIterator for &'a ExecutionClosure {
  type Item = &'a NodeId;
  type IntoIter = std::slice::Iter<'a, NodeId>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}
