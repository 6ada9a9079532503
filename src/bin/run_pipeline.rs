//! CLI: build a linear pipeline and run it against an execution backend.
//!
//! Usage:
//!   `run_pipeline node-types`
//!   `run_pipeline run --input <text> --node <TYPE[:k=v,...]>...`
//!
//! The pipeline is `Input Node -> node 1 -> node 2 -> ...`, started with "Execute Pipeline".
//!
//! Set RUST_LOG=streamweave_orchestrator=trace for TRACE-level span enter/exit and events.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde_json::Value;
use streamweave_orchestrator::config::{BACKEND_URL_ENV, DEFAULT_BACKEND_URL, SUBMIT_TIMEOUT_ENV};
use streamweave_orchestrator::event_log_io::save_event_log;
use streamweave_orchestrator::types::{NodeOptions, NodeTypeCatalog};
use streamweave_orchestrator::{
  BackendConfig, HttpBackend, NodeKind, PipelineSession, Position, RunStatus,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Vertical spacing between generated nodes, mirroring a top-to-bottom canvas layout.
const ROW_SPACING: f64 = 125.0;

/// Run node pipelines against an execution backend.
#[derive(Parser, Debug)]
#[command(name = "run_pipeline")]
#[command(after_help = r#"Environment variables (override the matching flags when set):
  PIPELINE_BACKEND_URL           Backend base URL (default: http://localhost:5000).
  PIPELINE_SUBMIT_TIMEOUT_SECS   Timeout for each submission request, in seconds.

Examples:
  run_pipeline node-types
  run_pipeline run --input "hello" --node "Text Transform:mode=upper" --node "Sentiment Analysis""#)]
struct Args {
  /// Backend base URL. Overridden by PIPELINE_BACKEND_URL if set.
  #[arg(long, value_name = "URL", default_value = DEFAULT_BACKEND_URL, global = true)]
  backend: String,

  /// Submission timeout in seconds. Overridden by PIPELINE_SUBMIT_TIMEOUT_SECS if set.
  #[arg(long, value_name = "SECS", global = true)]
  submit_timeout: Option<u64>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the backend's node-type catalog as JSON.
  NodeTypes,
  /// Run `Input Node -> NODE...` from the input node.
  Run {
    /// Value of the Input Node.
    #[arg(long)]
    input: String,

    /// Node to append to the chain, as TYPE or TYPE:key=value,key=value.
    #[arg(long = "node", value_name = "TYPE[:k=v,...]", required = true, value_parser = parse_node_spec)]
    nodes: Vec<NodeSpec>,

    /// Print the raw event log after the run.
    #[arg(long)]
    show_log: bool,

    /// Save the raw event log as JSON.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
  },
}

/// One `--node` argument.
#[derive(Debug, Clone, PartialEq)]
struct NodeSpec {
  type_name: String,
  options: NodeOptions,
}

/// Parses `TYPE[:k=v,...]`. Values that parse as JSON keep their type; others are strings.
fn parse_node_spec(raw: &str) -> Result<NodeSpec, String> {
  let (type_name, rest) = match raw.split_once(':') {
    Some((t, rest)) => (t.trim(), Some(rest)),
    None => (raw.trim(), None),
  };
  if type_name.is_empty() {
    return Err(format!("missing node type in {raw:?}"));
  }
  let mut options = NodeOptions::new();
  for pair in rest.into_iter().flat_map(|r| r.split(',')).filter(|p| !p.trim().is_empty()) {
    let (key, value) = pair
      .split_once('=')
      .ok_or_else(|| format!("expected key=value, got {pair:?}"))?;
    let value = serde_json::from_str::<Value>(value.trim())
      .unwrap_or_else(|_| Value::String(value.trim().to_string()));
    options.insert(key.trim().to_string(), value);
  }
  Ok(NodeSpec {
    type_name: type_name.to_string(),
    options,
  })
}

fn backend_config(args: &Args) -> BackendConfig {
  let mut config = BackendConfig::new(args.backend.clone());
  if let Some(secs) = args.submit_timeout {
    config.submit_timeout = std::time::Duration::from_secs(secs);
  }
  match config.with_env_overrides() {
    Ok(c) => c,
    Err(e) => {
      eprintln!("Invalid configuration: {}", e);
      process::exit(1);
    }
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  info!("run_pipeline starting");
  let args = Args::parse();
  let config = backend_config(&args);
  info!(
    base_url = %config.base_url,
    submit_timeout = ?config.submit_timeout,
    url_env = BACKEND_URL_ENV,
    timeout_env = SUBMIT_TIMEOUT_ENV,
    "options (env or flags)"
  );

  let backend = match HttpBackend::new(config) {
    Ok(b) => b,
    Err(e) => {
      eprintln!("Error creating backend client: {}", e);
      process::exit(1);
    }
  };
  let mut session = PipelineSession::new(backend);

  match args.command {
    Command::NodeTypes => match session.load_node_types().await {
      Ok(catalog) => match serde_json::to_string_pretty(&catalog) {
        Ok(json) => println!("{}", json),
        Err(e) => {
          eprintln!("Error encoding catalog: {}", e);
          process::exit(1);
        }
      },
      Err(e) => {
        eprintln!("Error fetching node types: {}", e);
        process::exit(1);
      }
    },
    Command::Run {
      input,
      nodes,
      show_log,
      log_file,
    } => {
      let catalog = session.load_node_types().await.unwrap_or_else(|e| {
        warn!(error = %e, "node types unavailable; nodes start without defaults");
        NodeTypeCatalog::new()
      });
      let ids = build_chain(&mut session, &catalog, &input, nodes);

      let outcome = session.execute_pipeline().await;
      if show_log {
        session.toggle_event_log();
      }

      println!("Pipeline {}.", session.run_status());
      for id in &ids {
        if let Some(node) = session.graph().node(id) {
          let result = node
            .last_result
            .as_ref()
            .map(|r| serde_json::to_string(r).unwrap_or_default())
            .unwrap_or_else(|| "-".to_string());
          println!("  [{}] {}: {}  {}", id, node.kind, node.status, result);
        }
      }
      if let Some(log) = session.visible_event_log() {
        println!("Event log:");
        for entry in log.entries() {
          let event = serde_json::to_string(&entry.event).unwrap_or_default();
          println!("  #{} {} node={} {}", entry.sequence, entry.received_at.to_rfc3339(), entry.node_id, event);
        }
      }
      if let Some(path) = log_file {
        if let Err(e) = save_event_log(&path, session.event_log()) {
          eprintln!("Error writing {}: {}", path.display(), e);
          process::exit(1);
        }
        info!(path = %path.display(), "event log written");
      }

      if let Err(e) = outcome {
        eprintln!("Pipeline error: {}", e);
        process::exit(1);
      }
      if session.run_status() != RunStatus::Completed {
        process::exit(1);
      }
    }
  }
}

/// Adds `Input Node -> specs...` top to bottom and returns the ids in chain order.
fn build_chain(
  session: &mut PipelineSession<HttpBackend>,
  catalog: &NodeTypeCatalog,
  input: &str,
  specs: Vec<NodeSpec>,
) -> Vec<String> {
  let graph = session.graph_mut();
  let input_id = graph.add_node(NodeKind::Input, Position::new(250.0, ROW_SPACING));
  graph.set_input_value(&input_id, input);
  let mut ids = vec![input_id];
  for (row, spec) in specs.into_iter().enumerate() {
    let position = Position::new(250.0, ROW_SPACING * (row as f64 + 2.0));
    let id = graph.add_node_with_defaults(catalog, NodeKind::from_type_name(spec.type_name), position);
    graph.update_options(&id, spec.options);
    if let Some(prev) = ids.last() {
      if let Err(e) = graph.try_connect(prev, &id) {
        eprintln!("Error connecting nodes: {}", e);
        process::exit(1);
      }
    }
    ids.push(id);
  }
  ids
}

#[cfg(test)]
mod tests {
  use super::parse_node_spec;
  use serde_json::json;

  #[test]
  fn type_only() {
    let spec = parse_node_spec("Sentiment Analysis").unwrap();
    assert_eq!(spec.type_name, "Sentiment Analysis");
    assert!(spec.options.is_empty());
  }

  #[test]
  fn options_keep_json_types() {
    let spec = parse_node_spec("Text Transform:mode=upper, repeat=2,trim=true").unwrap();
    assert_eq!(spec.type_name, "Text Transform");
    assert_eq!(spec.options["mode"], json!("upper"));
    assert_eq!(spec.options["repeat"], json!(2));
    assert_eq!(spec.options["trim"], json!(true));
  }

  #[test]
  fn rejects_malformed() {
    assert!(parse_node_spec(":mode=upper").is_err());
    assert!(parse_node_spec("Text Transform:mode").is_err());
  }
}
