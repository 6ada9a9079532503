//! Writing and reading the raw event log as pretty JSON.

use std::io::{Error, ErrorKind};
use std::path::Path;

use tracing::{debug, instrument};

use crate::types::EventLog;

/// Default filename for a saved event log.
pub const EVENT_LOG_FILENAME: &str = "events.log.json";

/// Writes `log` to `path`, creating the parent directory if needed.
#[instrument(level = "trace", skip(path, log))]
pub fn save_event_log(path: &Path, log: &EventLog) -> Result<(), Error> {
  let json = serde_json::to_string_pretty(log).map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  debug!(path = %path.display(), entries = log.len(), "event log saved");
  Ok(())
}

/// Reads an event log written by [save_event_log]. Missing files and invalid JSON are errors.
#[instrument(level = "trace", skip(path))]
pub fn load_event_log(path: &Path) -> Result<EventLog, Error> {
  let bytes = std::fs::read(path)?;
  serde_json::from_slice(&bytes).map_err(|e| Error::new(ErrorKind::InvalidData, e))
}
