//! # streamweave-orchestrator
//!
//! Sequential execution of node pipelines against a streaming remote backend.
//!
//! ## Architecture
//!
//! - [graph]: nodes and edges, with the one-input-per-node rule enforced on connect
//! - [planner]: the execution closure reachable from a start node
//! - [state_machine]: per-node and run status, published as watch snapshots
//! - [executor]: input resolution and the submit / result-stream exchange per node
//! - [http_backend] and [sse]: the HTTP transport
//! - [session]: the user-facing actions tying it all together
//!
//! Nodes run strictly one at a time, and at most one result channel is open at once.

pub mod backend;
pub mod config;
pub mod error;
pub mod event_log_io;
pub mod executor;
pub mod graph;
pub mod http_backend;
pub mod planner;
pub mod session;
pub mod sse;
pub mod state_machine;
pub mod testing;
pub mod types;

pub use backend::{ExecutionBackend, ResultStream};
pub use config::BackendConfig;
pub use error::{BackendError, ConfigError, ConnectRejection, PlanError, RunError};
pub use executor::{StreamingExecutor, resolve_input};
pub use graph::PipelineGraph;
pub use http_backend::HttpBackend;
pub use planner::{TraversalOrder, plan, plan_from_entry};
pub use session::PipelineSession;
pub use state_machine::RunController;
pub use types::{
  ExecutionClosure, NodeKind, NodeResult, NodeStatus, PipelineEdge, PipelineNode, Position,
  RunSnapshot, RunState, RunStatus, StreamEvent,
};
