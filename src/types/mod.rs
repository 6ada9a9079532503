//! Pipeline graph and run types.
//!
//! Nodes and edges make up the editable graph. The remaining types describe one
//! run against the execution backend and what goes over the wire.

use std::collections::BTreeMap;

mod event_log;
#[cfg(test)]
mod event_log_test;
mod execution_closure;
#[cfg(test)]
mod execution_closure_test;
mod field_schema;
mod node_kind;
mod node_result;
mod node_status;
mod pipeline_edge;
mod pipeline_node;
mod run_state;
mod start_request;
mod stream_event;
#[cfg(test)]
mod stream_event_test;

pub use event_log::{EventLog, EventLogEntry};
pub use execution_closure::ExecutionClosure;
pub use field_schema::{FieldSchema, NodeTypeCatalog, NodeTypeSchema};
pub use node_kind::{INPUT_NODE_TYPE, INPUT_VALUE_OPTION, NodeKind};
pub use node_result::NodeResult;
pub use node_status::NodeStatus;
pub use pipeline_edge::PipelineEdge;
pub use pipeline_node::{PipelineNode, Position};
pub use run_state::{NodeView, RunSnapshot, RunState, RunStatus};
pub use start_request::{EdgeRequest, NodeRequest, StartPipelineRequest};
pub use stream_event::StreamEvent;

/// Opaque node identifier, stable for the node's lifetime.
pub type NodeId = String;

/// Opaque edge identifier.
pub type EdgeId = String;

/// Node configuration: option name to scalar or string value.
pub type NodeOptions = BTreeMap<String, serde_json::Value>;
