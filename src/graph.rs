//! In-memory pipeline graph and the edit-time invariant check.
//!
//! A node may have at most one incoming edge. The check happens in
//! [PipelineGraph::try_connect] only; cycles are allowed, so anything that walks
//! the graph has to be cycle-safe on its own.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::ConnectRejection;
use crate::types::{
  INPUT_VALUE_OPTION, NodeId, NodeKind, NodeOptions, NodeTypeCatalog, NodeView,
  PipelineEdge, PipelineNode, Position,
};

/// All nodes and edges of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineGraph {
  nodes: HashMap<NodeId, PipelineNode>,
  edges: Vec<PipelineEdge>,
  /// Next id handed out by [PipelineGraph::add_node]; never reused.
  next_id: u64,
}

impl PipelineGraph {
  pub fn new() -> Self {
    Self::default()
  }

  fn allocate_id(&mut self) -> NodeId {
    loop {
      self.next_id += 1;
      let id = self.next_id.to_string();
      if !self.nodes.contains_key(&id) {
        return id;
      }
    }
  }

  /// Adds a node with empty options and returns its generated id.
  pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
    let id = self.allocate_id();
    debug!(node_id = %id, kind = %kind, "adding node");
    self
      .nodes
      .insert(id.clone(), PipelineNode::new(id.clone(), kind, position));
    id
  }

  /// Adds a node whose options are seeded from the catalog's field defaults.
  pub fn add_node_with_defaults(
    &mut self,
    catalog: &NodeTypeCatalog,
    kind: NodeKind,
    position: Position,
  ) -> NodeId {
    let defaults = catalog
      .get(kind.type_name())
      .map(|schema| schema.default_options())
      .unwrap_or_default();
    let id = self.add_node(kind, position);
    if let Some(node) = self.nodes.get_mut(&id) {
      node.merge_options(defaults);
    }
    id
  }

  /// Inserts a fully built node, replacing any node with the same id.
  pub fn insert_node(&mut self, node: PipelineNode) -> Option<PipelineNode> {
    self.nodes.insert(node.id.clone(), node)
  }

  /// Removes a node together with every edge touching it.
  pub fn remove_node(&mut self, id: &str) -> Option<PipelineNode> {
    let removed = self.nodes.remove(id)?;
    self.edges.retain(|e| e.source != id && e.target != id);
    debug!(node_id = %id, "removed node and its edges");
    Some(removed)
  }

  pub fn node(&self, id: &str) -> Option<&PipelineNode> {
    self.nodes.get(id)
  }

  pub fn node_mut(&mut self, id: &str) -> Option<&mut PipelineNode> {
    self.nodes.get_mut(id)
  }

  pub fn contains_node(&self, id: &str) -> bool {
    self.nodes.contains_key(id)
  }

  pub fn nodes(&self) -> impl Iterator<Item = &PipelineNode> {
    self.nodes.values()
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn edges(&self) -> &[PipelineEdge] {
    &self.edges
  }

  /// Merges `patch` into a node's options. Returns the updated node, or `None` if unknown.
  pub fn update_options(&mut self, id: &str, patch: NodeOptions) -> Option<&PipelineNode> {
    let node = self.nodes.get_mut(id)?;
    node.merge_options(patch);
    Some(node)
  }

  /// Sets the user-entered value of a node (the `value` option).
  pub fn set_input_value(&mut self, id: &str, value: impl Into<Value>) -> Option<&PipelineNode> {
    let mut patch = NodeOptions::new();
    patch.insert(INPUT_VALUE_OPTION.to_string(), value.into());
    self.update_options(id, patch)
  }

  /// Adds `source -> target` unless it would break the single-input invariant.
  ///
  /// Rejections leave the graph untouched.
  #[instrument(level = "trace", skip(self))]
  pub fn try_connect(
    &mut self,
    source: &str,
    target: &str,
  ) -> Result<PipelineEdge, ConnectRejection> {
    if !self.nodes.contains_key(source) {
      return Err(ConnectRejection::UnknownNode(source.to_string()));
    }
    let target_node = self
      .nodes
      .get(target)
      .ok_or_else(|| ConnectRejection::UnknownNode(target.to_string()))?;
    if !target_node.kind.accepts_input() {
      warn!(target, "rejected connection into Input Node");
      return Err(ConnectRejection::InputNodeTarget(target.to_string()));
    }
    if self.incoming_edge(target).is_some() {
      warn!(source, target, "rejected second input connection");
      return Err(ConnectRejection::DuplicateInput {
        target: target.to_string(),
      });
    }
    let edge = PipelineEdge::new(source, target);
    debug!(edge_id = %edge.id, source, target, "connected");
    self.edges.push(edge.clone());
    Ok(edge)
  }

  pub fn remove_edge(&mut self, edge_id: &str) -> Option<PipelineEdge> {
    let index = self.edges.iter().position(|e| e.id == edge_id)?;
    Some(self.edges.remove(index))
  }

  pub fn edge(&self, edge_id: &str) -> Option<&PipelineEdge> {
    self.edges.iter().find(|e| e.id == edge_id)
  }

  /// The unique edge into `target`, if connected.
  pub fn incoming_edge(&self, target: &str) -> Option<&PipelineEdge> {
    self.edges.iter().find(|e| e.target == target)
  }

  /// Edges leaving `source`, in the order they were created.
  pub fn outgoing_edges(&self, source: &str) -> Vec<&PipelineEdge> {
    self.edges.iter().filter(|e| e.source == source).collect()
  }

  /// Node that "Execute Pipeline" starts from.
  ///
  /// The top-left-most node without an incoming edge (smallest `y`, then `x`, then id).
  /// If every node has an input (a pure cycle) the top-left-most node overall.
  pub fn entry_node(&self) -> Option<&NodeId> {
    let roots = self
      .nodes
      .values()
      .filter(|n| self.incoming_edge(&n.id).is_none());
    top_left(roots).or_else(|| top_left(self.nodes.values()))
  }

  /// Per-node display state for observers.
  pub fn node_views(&self) -> BTreeMap<NodeId, NodeView> {
    self
      .nodes
      .values()
      .map(|n| {
        (
          n.id.clone(),
          NodeView {
            status: n.status.clone(),
            loading: n.loading,
            last_result: n.last_result.clone(),
          },
        )
      })
      .collect()
  }
}

fn top_left<'a>(nodes: impl Iterator<Item = &'a PipelineNode>) -> Option<&'a NodeId> {
  nodes
    .min_by(|a, b| {
      a.position
        .y
        .partial_cmp(&b.position.y)
        .unwrap_or(Ordering::Equal)
        .then(
          a.position
            .x
            .partial_cmp(&b.position.x)
            .unwrap_or(Ordering::Equal),
        )
        .then_with(|| a.id.cmp(&b.id))
    })
    .map(|n| &n.id)
}
