//! Seam between the orchestrator and the remote execution backend.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;

use crate::error::BackendError;
use crate::types::{NodeTypeCatalog, StartPipelineRequest, StreamEvent};

/// Events of one result channel, in arrival order. The channel closes when dropped.
pub type ResultStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, BackendError>> + Send>>;

/// A backend that executes nodes and pushes their results.
///
/// A submission is acknowledged without results; results arrive on a channel opened
/// afterwards with [ExecutionBackend::open_results].
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
  /// Submits one execution request and waits for the acknowledgment.
  async fn submit(&self, request: &StartPipelineRequest) -> Result<(), BackendError>;

  /// Opens the push channel carrying results of the outstanding request.
  async fn open_results(&self) -> Result<ResultStream, BackendError>;

  /// Fetches the node-type field-schema registry.
  async fn fetch_node_types(&self) -> Result<NodeTypeCatalog, BackendError>;
}

#[async_trait]
impl<B: ExecutionBackend + ?Sized> ExecutionBackend for Arc<B> {
  async fn submit(&self, request: &StartPipelineRequest) -> Result<(), BackendError> {
    (**self).submit(request).await
  }

  async fn open_results(&self) -> Result<ResultStream, BackendError> {
    (**self).open_results().await
  }

  async fn fetch_node_types(&self) -> Result<NodeTypeCatalog, BackendError> {
    (**self).fetch_node_types().await
  }
}
