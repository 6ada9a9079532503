//! One editing session: the graph, its run slot, the event log and a backend.
//!
//! The user-facing actions map onto:
//! - "Execute Pipeline": [PipelineSession::execute_pipeline]
//! - per-node play: [PipelineSession::run_from]
//! - event log toggle: [PipelineSession::toggle_event_log]

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{info, instrument, warn};

use crate::backend::ExecutionBackend;
use crate::error::{BackendError, ConnectRejection, RunError};
use crate::executor::StreamingExecutor;
use crate::graph::PipelineGraph;
use crate::planner::{TraversalOrder, plan, plan_from_entry};
use crate::state_machine::RunController;
use crate::types::{
  EventLog, ExecutionClosure, NodeTypeCatalog, PipelineEdge, RunSnapshot, RunState, RunStatus,
};

/// Graph plus everything needed to run it.
#[derive(Debug)]
pub struct PipelineSession<B> {
  graph: PipelineGraph,
  run: RunController,
  executor: StreamingExecutor<B>,
  event_log: EventLog,
  order: TraversalOrder,
  show_event_log: bool,
}

impl<B: ExecutionBackend> PipelineSession<B> {
  pub fn new(backend: B) -> Self {
    Self::with_graph(PipelineGraph::new(), backend)
  }

  pub fn with_graph(graph: PipelineGraph, backend: B) -> Self {
    Self {
      graph,
      run: RunController::new(),
      executor: StreamingExecutor::new(backend),
      event_log: EventLog::new(),
      order: TraversalOrder::default(),
      show_event_log: false,
    }
  }

  pub fn with_traversal_order(mut self, order: TraversalOrder) -> Self {
    self.order = order;
    self
  }

  pub fn traversal_order(&self) -> TraversalOrder {
    self.order
  }

  pub fn graph(&self) -> &PipelineGraph {
    &self.graph
  }

  /// Mutable graph access for edits. Status fields should only change through runs.
  pub fn graph_mut(&mut self) -> &mut PipelineGraph {
    &mut self.graph
  }

  pub fn backend(&self) -> &B {
    self.executor.backend()
  }

  /// Connects two nodes, see [PipelineGraph::try_connect].
  pub fn try_connect(
    &mut self,
    source: &str,
    target: &str,
  ) -> Result<PipelineEdge, ConnectRejection> {
    self.graph.try_connect(source, target)
  }

  pub fn run_state(&self) -> &RunState {
    self.run.state()
  }

  pub fn run_status(&self) -> RunStatus {
    self.run.status()
  }

  pub fn snapshot(&self) -> RunSnapshot {
    self.run.snapshot(&self.graph)
  }

  /// Watch channel carrying a snapshot after every run transition.
  pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
    self.run.subscribe()
  }

  pub fn snapshot_stream(&self) -> WatchStream<RunSnapshot> {
    self.run.snapshot_stream()
  }

  pub fn event_log(&self) -> &EventLog {
    &self.event_log
  }

  pub fn show_event_log(&self) -> bool {
    self.show_event_log
  }

  /// Flips event log visibility and returns the new setting.
  pub fn toggle_event_log(&mut self) -> bool {
    self.show_event_log = !self.show_event_log;
    self.show_event_log
  }

  /// The event log while visible.
  pub fn visible_event_log(&self) -> Option<&EventLog> {
    self.show_event_log.then_some(&self.event_log)
  }

  /// Fetches the node-type registry from the backend.
  pub async fn load_node_types(&self) -> Result<NodeTypeCatalog, BackendError> {
    self.executor.backend().fetch_node_types().await
  }

  /// Plans and starts a run from `start` without executing anything yet.
  ///
  /// While a run is active this is rejected with [RunError::AlreadyRunning] before any
  /// planning, leaving session state untouched.
  #[instrument(level = "trace", skip(self))]
  pub fn start_run(&mut self, start: &str) -> Result<ExecutionClosure, RunError> {
    self.guard()?;
    let closure = plan(&self.graph, start, self.order)?;
    self.run.start(&mut self.graph, closure.clone())?;
    Ok(closure)
  }

  /// Like [PipelineSession::start_run] from the graph's entry node.
  pub fn start_pipeline(&mut self) -> Result<ExecutionClosure, RunError> {
    self.guard()?;
    let closure = plan_from_entry(&self.graph, self.order)?;
    self.run.start(&mut self.graph, closure.clone())?;
    Ok(closure)
  }

  /// Executes the next node of the active run.
  pub async fn step(&mut self) -> Result<RunStatus, RunError> {
    self
      .executor
      .step(&mut self.graph, &mut self.run, &mut self.event_log)
      .await
  }

  /// Per-node play: runs `start` and everything downstream of it.
  pub async fn run_from(&mut self, start: &str) -> Result<RunStatus, RunError> {
    let closure = self.start_run(start)?;
    info!(start, nodes = closure.len(), "running from node");
    self.drain().await
  }

  /// "Execute Pipeline": runs from [PipelineGraph::entry_node].
  pub async fn execute_pipeline(&mut self) -> Result<RunStatus, RunError> {
    let closure = self.start_pipeline()?;
    info!(nodes = closure.len(), "executing pipeline");
    self.drain().await
  }

  async fn drain(&mut self) -> Result<RunStatus, RunError> {
    self
      .executor
      .drain(&mut self.graph, &mut self.run, &mut self.event_log)
      .await
  }

  fn guard(&self) -> Result<(), RunError> {
    if self.run.is_running() {
      warn!("run requested while another is in progress; ignored");
      return Err(RunError::AlreadyRunning);
    }
    Ok(())
  }
}
