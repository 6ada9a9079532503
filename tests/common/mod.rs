//! Mock execution backend served over HTTP with axum.
//!
//! - `POST /start-pipeline`: records the request and queues its events; input `"reject"` gets a 500
//! - `GET /stream`: replays the queued events as SSE `data:` frames, then closes
//! - `GET /node-types`: a small fixed catalog
//!
//! Compute nodes upper-case their input; input containing `"boom"` yields an error event.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::Stream;
use serde_json::{Value, json};
use streamweave_orchestrator::types::{INPUT_VALUE_OPTION, NodeKind, StartPipelineRequest, StreamEvent};

#[derive(Debug, Default)]
pub struct MockState {
  pub requests: Vec<StartPipelineRequest>,
  pending: VecDeque<Vec<StreamEvent>>,
  pub streams_opened: usize,
}

pub type Shared = Arc<Mutex<MockState>>;

/// Starts the mock on an ephemeral port and returns its base URL.
pub async fn spawn_mock() -> (String, Shared) {
  let state: Shared = Arc::default();
  let app = Router::new()
    .route("/start-pipeline", post(start_pipeline))
    .route("/stream", get(stream))
    .route("/node-types", get(node_types))
    .with_state(state.clone());
  let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
    .await
    .unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  (format!("http://{}", addr), state)
}

fn events_for(request: &StartPipelineRequest) -> Vec<StreamEvent> {
  let node = &request.nodes[0];
  match &node.kind {
    NodeKind::Input => {
      let value = node
        .options
        .get(INPUT_VALUE_OPTION)
        .cloned()
        .unwrap_or(json!(""));
      vec![StreamEvent::complete(&node.id, value)]
    }
    NodeKind::Compute(_) => {
      let text = node.input.as_str().unwrap_or_default();
      if text.contains("boom") {
        return vec![StreamEvent::failed(&node.id, format!("cannot process {text:?}"))];
      }
      let upper = text.to_uppercase();
      let half: String = upper.chars().take(upper.chars().count() / 2).collect();
      vec![
        StreamEvent::partial(&node.id, json!(half)),
        StreamEvent::complete(&node.id, json!({ "success": upper })),
      ]
    }
  }
}

async fn start_pipeline(
  State(state): State<Shared>,
  Json(request): Json<StartPipelineRequest>,
) -> Response {
  let rejected = request.nodes[0].input == json!("reject");
  let events = events_for(&request);
  let mut s = state.lock().unwrap();
  s.requests.push(request);
  if rejected {
    return (StatusCode::INTERNAL_SERVER_ERROR, "executor crashed").into_response();
  }
  s.pending.push_back(events);
  Json(json!({ "status": "started" })).into_response()
}

async fn stream(
  State(state): State<Shared>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
  let events = {
    let mut s = state.lock().unwrap();
    s.streams_opened += 1;
    s.pending.pop_front().unwrap_or_default()
  };
  let frames = events
    .into_iter()
    .map(|e| Ok(Event::default().data(serde_json::to_string(&e).unwrap())));
  Sse::new(futures::stream::iter(frames))
}

async fn node_types() -> Json<Value> {
  Json(json!({
    "Input Node": {
      "fields": [{ "name": "value", "type": "text", "label": "Input", "default": "" }]
    },
    "Text Transform": {
      "fields": [
        { "name": "mode", "type": "select", "label": "Mode", "default": "upper",
          "options": ["upper", "lower"] },
        { "name": "suffix", "type": "text", "label": "Suffix", "condition": { "mode": "upper" } }
      ]
    }
  }))
}
