//! Behaviour tag of a pipeline node.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire name of the source node type that carries a user-entered value.
pub const INPUT_NODE_TYPE: &str = "Input Node";

/// Option key holding an Input Node's value.
pub const INPUT_VALUE_OPTION: &str = "value";

/// What a node is: the distinguished Input Node, or a node computed by the backend.
///
/// Serialized as the backend's type name (`"Input Node"`, `"Text Transformation"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
  /// Source with no upstream; its value is the `value` option.
  Input,
  /// Node whose work is done by the execution backend, keyed by type name.
  Compute(String),
}

impl NodeKind {
  /// Maps a backend type name to a kind.
  pub fn from_type_name(name: impl Into<String>) -> Self {
    let name = name.into();
    if name == INPUT_NODE_TYPE {
      NodeKind::Input
    } else {
      NodeKind::Compute(name)
    }
  }

  pub fn type_name(&self) -> &str {
    match self {
      NodeKind::Input => INPUT_NODE_TYPE,
      NodeKind::Compute(name) => name,
    }
  }

  pub fn is_input(&self) -> bool {
    matches!(self, NodeKind::Input)
  }

  /// Input Nodes expose no input handle, so nothing may connect into them.
  pub fn accepts_input(&self) -> bool {
    !self.is_input()
  }
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.type_name())
  }
}

impl Serialize for NodeKind {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.type_name())
  }
}

impl<'de> Deserialize<'de> for NodeKind {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let name = String::deserialize(deserializer)?;
    Ok(NodeKind::from_type_name(name))
  }
}
