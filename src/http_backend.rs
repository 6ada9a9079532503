//! HTTP implementation of [ExecutionBackend].
//!
//! - submission: `POST {base}/start-pipeline` with a JSON body, acknowledged by any 2xx
//! - results: `GET {base}/stream`, an event stream decoded by [crate::sse::EventDecoder]
//! - registry: `GET {base}/node-types`

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client as HttpClient, Response};
use tracing::{debug, instrument};

use crate::backend::{ExecutionBackend, ResultStream};
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::sse::EventDecoder;
use crate::types::{NodeTypeCatalog, StartPipelineRequest};

/// Backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
  config: BackendConfig,
  http: HttpClient,
}

impl HttpBackend {
  /// Builds a client for `config`.
  ///
  /// No overall request timeout is set on the client, since the result stream stays open
  /// for as long as a node runs; submissions use [BackendConfig::submit_timeout].
  pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
    config.validate()?;
    let http = HttpClient::builder()
      .connect_timeout(config.connect_timeout)
      .build()?;
    Ok(Self { config, http })
  }

  pub fn config(&self) -> &BackendConfig {
    &self.config
  }
}

/// Passes 2xx responses through; anything else becomes [BackendError::Status].
async fn check_status(response: Response) -> Result<Response, BackendError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  let message = response
    .text()
    .await
    .unwrap_or_else(|_| "Unknown error".to_string());
  Err(BackendError::Status {
    status: status.as_u16(),
    message,
  })
}

#[async_trait]
impl ExecutionBackend for HttpBackend {
  #[instrument(level = "trace", skip(self, request), fields(start_node_id = %request.start_node_id))]
  async fn submit(&self, request: &StartPipelineRequest) -> Result<(), BackendError> {
    let url = self.config.url(&self.config.start_path);
    let response = self
      .http
      .post(&url)
      .timeout(self.config.submit_timeout)
      .json(request)
      .send()
      .await?;
    check_status(response).await?;
    debug!(url = %url, "submission acknowledged");
    Ok(())
  }

  #[instrument(level = "trace", skip(self))]
  async fn open_results(&self) -> Result<ResultStream, BackendError> {
    let url = self.config.url(&self.config.stream_path);
    let response = self
      .http
      .get(&url)
      .header(ACCEPT, "text/event-stream")
      .send()
      .await?;
    let response = check_status(response).await?;
    debug!(url = %url, "result stream opened");

    let mut chunks = response.bytes_stream();
    let events = async_stream::stream! {
      let mut decoder = EventDecoder::new();
      loop {
        match chunks.next().await {
          Some(Ok(bytes)) => {
            for item in decoder.feed(&bytes) {
              yield item;
            }
          }
          Some(Err(e)) => {
            yield Err(BackendError::Http(e));
            break;
          }
          None => {
            for item in decoder.finish() {
              yield item;
            }
            break;
          }
        }
      }
    };
    Ok(Box::pin(events))
  }

  #[instrument(level = "trace", skip(self))]
  async fn fetch_node_types(&self) -> Result<NodeTypeCatalog, BackendError> {
    let url = self.config.url(&self.config.node_types_path);
    let response = self.http.get(&url).send().await?;
    let response = check_status(response).await?;
    Ok(response.json::<NodeTypeCatalog>().await?)
  }
}
