//! In-memory [ExecutionBackend] for tests.
//!
//! [ScriptedBackend] answers each submission with a [Reply] computed from the submitted
//! node, records every request, and tracks how many result channels are open at once.
//!
//! ```
//! use streamweave_orchestrator::testing::{Reply, ScriptedBackend};
//!
//! let backend = ScriptedBackend::new(|node| {
//!   let text = node.input.as_str().unwrap_or_default().to_uppercase();
//!   Reply::success(&node.id, text)
//! });
//! assert!(backend.requests().is_empty());
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::{ExecutionBackend, ResultStream};
use crate::error::BackendError;
use crate::types::{
  INPUT_VALUE_OPTION, NodeKind, NodeRequest, NodeTypeCatalog, StartPipelineRequest, StreamEvent,
};

/// Scripted answer to one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
  /// Acknowledge, then deliver these events and close the channel.
  Events(Vec<StreamEvent>),
  /// Refuse the submission with this HTTP-like status.
  Reject { status: u16, message: String },
  /// Acknowledge, deliver `events`, then fail the channel with `message`.
  Broken {
    events: Vec<StreamEvent>,
    message: String,
  },
}

impl Reply {
  /// A single complete event carrying `value`.
  pub fn success(id: &str, value: impl Into<Value>) -> Self {
    Reply::Events(vec![StreamEvent::complete(id, value.into())])
  }

  /// A single error event.
  pub fn error(id: &str, message: impl Into<String>) -> Self {
    Reply::Events(vec![StreamEvent::failed(id, message)])
  }
}

type Responder = dyn Fn(&NodeRequest) -> Reply + Send + Sync;

#[derive(Debug, Default)]
struct Ledger {
  requests: Vec<StartPipelineRequest>,
  pending: Option<Reply>,
  open_channels: usize,
  max_open_channels: usize,
}

/// Backend driven by a responder closure.
#[derive(Clone)]
pub struct ScriptedBackend {
  responder: Arc<Responder>,
  event_delay: Option<Duration>,
  open_failure: Option<String>,
  catalog: NodeTypeCatalog,
  ledger: Arc<Mutex<Ledger>>,
}

impl std::fmt::Debug for ScriptedBackend {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ScriptedBackend")
      .field("event_delay", &self.event_delay)
      .field("open_failure", &self.open_failure)
      .field("catalog", &self.catalog)
      .finish_non_exhaustive()
  }
}

impl ScriptedBackend {
  pub fn new<F>(responder: F) -> Self
  where
    F: Fn(&NodeRequest) -> Reply + Send + Sync + 'static,
  {
    Self {
      responder: Arc::new(responder),
      event_delay: None,
      open_failure: None,
      catalog: NodeTypeCatalog::new(),
      ledger: Arc::new(Mutex::new(Ledger::default())),
    }
  }

  /// Input Nodes echo their `value` option; every other node upper-cases its string input.
  pub fn uppercase() -> Self {
    Self::new(|node| match node.kind {
      NodeKind::Input => {
        let value = node
          .options
          .get(INPUT_VALUE_OPTION)
          .cloned()
          .unwrap_or_else(|| Value::String(String::new()));
        Reply::success(&node.id, value)
      }
      NodeKind::Compute(_) => {
        let text = node.input.as_str().unwrap_or_default().to_uppercase();
        Reply::success(&node.id, text)
      }
    })
  }

  /// Sleeps before delivering each event.
  pub fn with_event_delay(mut self, delay: Duration) -> Self {
    self.event_delay = Some(delay);
    self
  }

  /// Makes every `open_results` call fail after an acknowledged submission.
  pub fn with_open_failure(mut self, message: impl Into<String>) -> Self {
    self.open_failure = Some(message.into());
    self
  }

  pub fn with_catalog(mut self, catalog: NodeTypeCatalog) -> Self {
    self.catalog = catalog;
    self
  }

  /// Every submission received, in order.
  pub fn requests(&self) -> Vec<StartPipelineRequest> {
    self.ledger().requests.clone()
  }

  /// Ids of submitted start nodes, in order.
  pub fn submitted_ids(&self) -> Vec<String> {
    self
      .ledger()
      .requests
      .iter()
      .map(|r| r.start_node_id.clone())
      .collect()
  }

  pub fn open_channels(&self) -> usize {
    self.ledger().open_channels
  }

  /// Highest number of channels that were open at the same time.
  pub fn max_open_channels(&self) -> usize {
    self.ledger().max_open_channels
  }

  fn ledger(&self) -> MutexGuard<'_, Ledger> {
    self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

/// Counts a channel as open until the stream holding it is dropped.
struct ChannelGuard {
  ledger: Arc<Mutex<Ledger>>,
}

impl ChannelGuard {
  fn open(ledger: Arc<Mutex<Ledger>>) -> Self {
    {
      let mut l = ledger.lock().unwrap_or_else(|p| p.into_inner());
      l.open_channels += 1;
      l.max_open_channels = l.max_open_channels.max(l.open_channels);
    }
    Self { ledger }
  }
}

impl Drop for ChannelGuard {
  fn drop(&mut self) {
    let mut l = self.ledger.lock().unwrap_or_else(|p| p.into_inner());
    l.open_channels = l.open_channels.saturating_sub(1);
  }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
  async fn submit(&self, request: &StartPipelineRequest) -> Result<(), BackendError> {
    let reply = request
      .nodes
      .iter()
      .find(|n| n.id == request.start_node_id)
      .map(|node| (self.responder)(node))
      .unwrap_or_else(|| Reply::Reject {
        status: 400,
        message: format!("start node {} not in request", request.start_node_id),
      });
    let mut ledger = self.ledger();
    ledger.requests.push(request.clone());
    match reply {
      Reply::Reject { status, message } => Err(BackendError::Status { status, message }),
      other => {
        ledger.pending = Some(other);
        Ok(())
      }
    }
  }

  async fn open_results(&self) -> Result<ResultStream, BackendError> {
    if let Some(message) = &self.open_failure {
      return Err(BackendError::Stream(message.clone()));
    }
    let pending = self
      .ledger()
      .pending
      .take()
      .ok_or_else(|| BackendError::Stream("no outstanding submission".to_string()))?;
    let (events, failure) = match pending {
      Reply::Events(events) => (events, None),
      Reply::Broken { events, message } => (events, Some(message)),
      Reply::Reject { .. } => (Vec::new(), None),
    };
    let guard = ChannelGuard::open(Arc::clone(&self.ledger));
    let delay = self.event_delay;
    let stream = async_stream::stream! {
      let _guard = guard;
      for event in events {
        if let Some(delay) = delay {
          tokio::time::sleep(delay).await;
        }
        yield Ok(event);
      }
      if let Some(message) = failure {
        yield Err(BackendError::Stream(message));
      }
    };
    Ok(Box::pin(stream))
  }

  async fn fetch_node_types(&self) -> Result<NodeTypeCatalog, BackendError> {
    Ok(self.catalog.clone())
  }
}
