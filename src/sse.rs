//! Incremental decoder for the result stream body.
//!
//! Accepts Server-Sent Events (`data:` lines, frames ended by a blank line) and bare
//! newline-delimited JSON, in any chunking. Comment lines and the `event:`, `id:` and
//! `retry:` fields are ignored.

use bytes::{Buf, BytesMut};

use crate::error::BackendError;
use crate::types::StreamEvent;

/// Turns arbitrary byte chunks into [StreamEvent]s.
#[derive(Debug, Default)]
pub struct EventDecoder {
  buffer: BytesMut,
  data_lines: Vec<String>,
}

impl EventDecoder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Consumes a chunk and returns every event completed by it.
  pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<StreamEvent, BackendError>> {
    self.buffer.extend_from_slice(chunk);
    let mut out = Vec::new();
    while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
      let line = self.buffer.split_to(pos);
      self.buffer.advance(1);
      let line = String::from_utf8_lossy(&line);
      if let Some(item) = self.process_line(line.trim_end_matches('\r')) {
        out.push(item);
      }
    }
    out
  }

  /// Flushes whatever is left once the body has ended.
  pub fn finish(&mut self) -> Vec<Result<StreamEvent, BackendError>> {
    let mut out = Vec::new();
    if !self.buffer.is_empty() {
      let rest = self.buffer.split();
      let line = String::from_utf8_lossy(&rest);
      if let Some(item) = self.process_line(line.trim_end_matches('\r')) {
        out.push(item);
      }
    }
    if let Some(item) = self.flush_frame() {
      out.push(item);
    }
    out
  }

  fn process_line(&mut self, line: &str) -> Option<Result<StreamEvent, BackendError>> {
    if line.is_empty() {
      return self.flush_frame();
    }
    if line.starts_with(':') {
      return None;
    }
    if let Some(rest) = line.strip_prefix("data:") {
      self
        .data_lines
        .push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
      return None;
    }
    let trimmed = line.trim_start();
    if trimmed.starts_with('{') {
      return Some(parse_event(trimmed));
    }
    None
  }

  fn flush_frame(&mut self) -> Option<Result<StreamEvent, BackendError>> {
    if self.data_lines.is_empty() {
      return None;
    }
    let data = self.data_lines.join("\n");
    self.data_lines.clear();
    if data.trim().is_empty() {
      return None;
    }
    Some(parse_event(&data))
  }
}

fn parse_event(data: &str) -> Result<StreamEvent, BackendError> {
  serde_json::from_str(data.trim()).map_err(BackendError::Decode)
}
