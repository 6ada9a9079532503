//! End-to-end tests of `HttpBackend` and `PipelineSession` against an axum mock backend.

mod common;

use futures::StreamExt;
use serde_json::json;
use streamweave_orchestrator::types::{NodeResult, NodeStatus, StartPipelineRequest, StreamEvent};
use streamweave_orchestrator::{
  BackendConfig, BackendError, ExecutionBackend, HttpBackend, NodeKind, PipelineNode,
  PipelineSession, Position, RunError, RunStatus,
};

fn backend(base_url: &str) -> HttpBackend {
  HttpBackend::new(BackendConfig::new(base_url)).unwrap()
}

fn compute() -> NodeKind {
  NodeKind::Compute("Text Transform".to_string())
}

#[tokio::test]
async fn submit_then_stream_delivers_events_in_order() {
  let (url, state) = common::spawn_mock().await;
  let backend = backend(&url);
  let node = PipelineNode::new("5", compute(), Position::default());

  backend
    .submit(&StartPipelineRequest::single_node(&node, json!("abcd")))
    .await
    .unwrap();
  let events: Vec<StreamEvent> = backend
    .open_results()
    .await
    .unwrap()
    .map(|e| e.unwrap())
    .collect()
    .await;

  assert_eq!(
    events,
    vec![
      StreamEvent::partial("5", json!("AB")),
      StreamEvent::complete("5", json!({ "success": "ABCD" })),
    ]
  );
  let s = state.lock().unwrap();
  assert_eq!(s.requests[0].start_node_id, "5");
  assert_eq!(s.streams_opened, 1);
}

#[tokio::test]
async fn rejected_submission_is_status_error() {
  let (url, _) = common::spawn_mock().await;
  let node = PipelineNode::new("1", compute(), Position::default());
  let err = backend(&url)
    .submit(&StartPipelineRequest::single_node(&node, json!("reject")))
    .await
    .unwrap_err();
  match err {
    BackendError::Status { status, message } => {
      assert_eq!(status, 500);
      assert_eq!(message, "executor crashed");
    }
    other => panic!("expected status error, got {other:?}"),
  }
}

#[tokio::test]
async fn node_types_are_fetched() {
  let (url, _) = common::spawn_mock().await;
  let catalog = backend(&url).fetch_node_types().await.unwrap();
  let schema = &catalog["Text Transform"];
  assert_eq!(schema.default_options()["mode"], json!("upper"));
  assert!(schema.field("suffix").unwrap().condition.is_some());
}

#[tokio::test]
async fn unreachable_backend_fails_submission() {
  let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
  let url = format!("http://{}", listener.local_addr().unwrap());
  drop(listener);

  let mut session = PipelineSession::new(backend(&url));
  let a = session.graph_mut().add_node(compute(), Position::default());
  let err = session.run_from(&a).await.unwrap_err();
  assert!(matches!(err, RunError::SubmissionFailure { .. }));
  assert_eq!(session.run_status(), RunStatus::Aborted);
  assert!(!session.graph().node(&a).unwrap().loading);
}

#[tokio::test]
async fn hello_pipeline_runs_over_http() {
  let (url, state) = common::spawn_mock().await;
  let mut session = PipelineSession::new(backend(&url));
  let g = session.graph_mut();
  let a = g.add_node(NodeKind::Input, Position::new(250.0, 125.0));
  g.set_input_value(&a, "hello");
  let b = g.add_node(compute(), Position::new(250.0, 250.0));
  let c = g.add_node(compute(), Position::new(250.0, 375.0));
  g.try_connect(&a, &b).unwrap();
  g.try_connect(&b, &c).unwrap();

  let status = session.execute_pipeline().await.unwrap();
  assert_eq!(status, RunStatus::Completed);

  let graph = session.graph();
  assert_eq!(
    graph.node(&b).unwrap().last_result,
    Some(NodeResult::Success(json!("HELLO")))
  );
  assert_eq!(graph.node(&c).unwrap().status, NodeStatus::Succeeded);
  // Input: 1 event, B and C: partial + complete each.
  assert_eq!(session.event_log().len(), 5);

  let s = state.lock().unwrap();
  let inputs: Vec<_> = s.requests.iter().map(|r| r.nodes[0].input.clone()).collect();
  assert_eq!(inputs, vec![json!(""), json!("hello"), json!("HELLO")]);
  assert_eq!(s.streams_opened, 3);
}

#[tokio::test]
async fn error_event_aborts_over_http() {
  let (url, state) = common::spawn_mock().await;
  let mut session = PipelineSession::new(backend(&url));
  let g = session.graph_mut();
  let a = g.add_node(NodeKind::Input, Position::default());
  g.set_input_value(&a, "boom");
  let b = g.add_node(compute(), Position::new(0.0, 1.0));
  let c = g.add_node(compute(), Position::new(0.0, 2.0));
  g.try_connect(&a, &b).unwrap();
  g.try_connect(&b, &c).unwrap();

  let err = session.execute_pipeline().await.unwrap_err();
  assert!(matches!(err, RunError::NodeExecutionError { ref node_id, .. } if *node_id == b));

  let graph = session.graph();
  assert_eq!(graph.node(&a).unwrap().status, NodeStatus::Succeeded);
  assert!(matches!(graph.node(&b).unwrap().status, NodeStatus::Failed { .. }));
  let queued = graph.node(&c).unwrap();
  assert_eq!(queued.status, NodeStatus::Queued);
  assert!(!queued.loading);
  assert_eq!(state.lock().unwrap().requests.len(), 2);
}
