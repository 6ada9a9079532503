//! Execution planning: which nodes a run executes, and in what order.
//!
//! The closure is everything reachable from the start node over outgoing edges,
//! each node once. [TraversalOrder::Discovery] keeps breadth-first discovery order;
//! [TraversalOrder::Topological] reorders the same set so every node follows its
//! in-closure upstream, breaking cycles in discovery order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use tracing::{debug, instrument};

use crate::error::PlanError;
use crate::graph::PipelineGraph;
use crate::types::{ExecutionClosure, NodeId};

/// Ordering policy for the execution closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
  /// Breadth-first discovery order.
  #[default]
  Discovery,
  /// Kahn's algorithm over the reachable sub-graph, ties broken by discovery order.
  Topological,
}

/// Computes the execution closure for a run starting at `start`.
#[instrument(level = "trace", skip(graph))]
pub fn plan(
  graph: &PipelineGraph,
  start: &str,
  order: TraversalOrder,
) -> Result<ExecutionClosure, PlanError> {
  let start = &graph
    .node(start)
    .ok_or_else(|| PlanError::UnknownStartNode(start.to_string()))?
    .id;
  let discovered = discovery_order(graph, start);
  let ids = match order {
    TraversalOrder::Discovery => discovered,
    TraversalOrder::Topological => topological_order(graph, discovered),
  };
  debug!(start = %start, ?order, closure = ?ids, "planned execution closure");
  Ok(ExecutionClosure::from_ids(ids))
}

/// Closure for "Execute Pipeline": starts at [PipelineGraph::entry_node].
pub fn plan_from_entry(
  graph: &PipelineGraph,
  order: TraversalOrder,
) -> Result<ExecutionClosure, PlanError> {
  let entry = graph.entry_node().ok_or(PlanError::EmptyGraph)?;
  plan(graph, entry, order)
}

/// Breadth-first walk; a node is visited once no matter how many paths reach it.
fn discovery_order<'g>(graph: &'g PipelineGraph, start: &'g str) -> Vec<NodeId> {
  let mut visited: HashSet<&'g str> = HashSet::new();
  let mut queue: VecDeque<&'g str> = VecDeque::new();
  let mut order = Vec::new();

  visited.insert(start);
  queue.push_back(start);
  while let Some(id) = queue.pop_front() {
    order.push(id.to_string());
    for edge in graph.outgoing_edges(id) {
      if visited.insert(edge.target.as_str()) {
        queue.push_back(edge.target.as_str());
      }
    }
  }
  order
}

fn topological_order(graph: &PipelineGraph, discovered: Vec<NodeId>) -> Vec<NodeId> {
  let n = discovered.len();
  let rank: HashMap<&str, usize> = discovered
    .iter()
    .enumerate()
    .map(|(i, id)| (id.as_str(), i))
    .collect();

  let mut in_degree = vec![0usize; n];
  let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
  for edge in graph.edges() {
    if let (Some(&s), Some(&t)) = (
      rank.get(edge.source.as_str()),
      rank.get(edge.target.as_str()),
    ) {
      successors[s].push(t);
      in_degree[t] += 1;
    }
  }

  let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
    .filter(|&i| in_degree[i] == 0)
    .map(Reverse)
    .collect();
  let mut done = vec![false; n];
  let mut order = Vec::with_capacity(n);

  loop {
    let next = match ready.pop() {
      Some(Reverse(i)) => i,
      None => match (0..n).find(|&i| !done[i]) {
        Some(i) => {
          debug!(node_id = %discovered[i], "breaking cycle at earliest discovered node");
          i
        }
        None => break,
      },
    };
    if done[next] {
      continue;
    }
    done[next] = true;
    order.push(discovered[next].clone());
    for &t in &successors[next] {
      if !done[t] {
        in_degree[t] = in_degree[t].saturating_sub(1);
        if in_degree[t] == 0 {
          ready.push(Reverse(t));
        }
      }
    }
  }
  order
}
