//! Backend connection settings.
//!
//! Defaults point at a local development backend. Environment variables override
//! values passed in code or on the command line.

use std::time::Duration;

use crate::error::ConfigError;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Overrides [BackendConfig::base_url].
pub const BACKEND_URL_ENV: &str = "PIPELINE_BACKEND_URL";

/// Overrides [BackendConfig::submit_timeout], in whole seconds.
pub const SUBMIT_TIMEOUT_ENV: &str = "PIPELINE_SUBMIT_TIMEOUT_SECS";

/// Where the execution backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
  pub base_url: String,
  /// Execution submission endpoint.
  pub start_path: String,
  /// Result stream endpoint.
  pub stream_path: String,
  /// Field-schema registry endpoint.
  pub node_types_path: String,
  /// Upper bound for the submission request (not applied to the result stream).
  pub submit_timeout: Duration,
  pub connect_timeout: Duration,
}

impl Default for BackendConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BACKEND_URL.to_string(),
      start_path: "/start-pipeline".to_string(),
      stream_path: "/stream".to_string(),
      node_types_path: "/node-types".to_string(),
      submit_timeout: Duration::from_secs(30),
      connect_timeout: Duration::from_secs(5),
    }
  }
}

impl BackendConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      ..Self::default()
    }
  }

  /// Applies overrides from the process environment.
  pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
    self.with_overrides_from(|key| std::env::var(key).ok())
  }

  /// Applies overrides from `lookup` (keyed by the `*_ENV` constants).
  pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(url) = lookup(BACKEND_URL_ENV) {
      self.base_url = url;
    }
    if let Some(raw) = lookup(SUBMIT_TIMEOUT_ENV) {
      let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: SUBMIT_TIMEOUT_ENV.to_string(),
        value: raw.clone(),
      })?;
      self.submit_timeout = Duration::from_secs(secs);
    }
    self.validate()?;
    Ok(self)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
      return Err(ConfigError::InvalidUrl(format!(
        "URL must start with http:// or https://, got: {}",
        self.base_url
      )));
    }
    Ok(())
  }

  /// Joins `path` onto the base URL.
  pub fn url(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }
}
