//! Node-type field schemas served by the backend's `/node-types` endpoint.
//!
//! The orchestrator treats these as a lookup table; it only reads field names
//! and defaults to seed a new node's options.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::NodeOptions;

/// One configurable field of a node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
  pub name: String,
  #[serde(rename = "type")]
  pub field_type: String,
  #[serde(default)]
  pub label: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub condition: Option<Value>,
  #[serde(default, alias = "choices", skip_serializing_if = "Option::is_none")]
  pub options: Option<Vec<Value>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub placeholder: Option<String>,
  /// Rendering hints the orchestrator does not interpret (`min`, `max`, `step`, ...).
  #[serde(flatten)]
  pub extra: BTreeMap<String, Value>,
}

/// Field list for one node type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeTypeSchema {
  #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
  pub type_name: Option<String>,
  #[serde(default, alias = "options")]
  pub fields: Vec<FieldSchema>,
}

impl NodeTypeSchema {
  pub fn field(&self, name: &str) -> Option<&FieldSchema> {
    self.fields.iter().find(|f| f.name == name)
  }

  /// Options pre-filled from every field that declares a default.
  pub fn default_options(&self) -> NodeOptions {
    self
      .fields
      .iter()
      .filter_map(|f| f.default.clone().map(|d| (f.name.clone(), d)))
      .collect()
  }
}

/// Catalog of node types keyed by type name.
pub type NodeTypeCatalog = HashMap<String, NodeTypeSchema>;
