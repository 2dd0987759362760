use thiserror::Error;

use sluice_schema::SchemaError;

/// Errors raised while building or mutating a graph.
///
/// Everything here surfaces synchronously to the graph-building caller;
/// execution-time failures are the engine's concern.
#[derive(Debug, Error)]
pub enum GraphError {
  #[error(transparent)]
  Schema(#[from] SchemaError),

  #[error("task '{0}' not found in graph")]
  TaskNotFound(String),

  #[error("{side} port '{port}' not found on task '{task}'")]
  PortNotFound {
    task: String,
    side: &'static str,
    port: String,
  },

  /// `graph_inputs`, `graph_outputs` and `graph_context` are always present
  /// and cannot be added, replaced, or deleted.
  #[error("task name '{0}' is reserved for the graph boundary")]
  ReservedTaskName(String),

  #[error("link endpoints belong to different graphs ({from_graph} vs {to_graph})")]
  CrossGraphLink {
    from_graph: uuid::Uuid,
    to_graph: uuid::Uuid,
  },

  #[error("type mismatch linking {from} -> {to}: '{from_type}' is not compatible with '{to_type}'")]
  TypeMismatch {
    from: String,
    to: String,
    from_type: String,
    to_type: String,
  },

  #[error("link limit exceeded on {to}: at most {limit} inbound link(s)")]
  LinkLimitExceeded { to: String, limit: u32 },

  #[error("cannot link namespace {from} to leaf {to}")]
  NamespaceToLeafLink { from: String, to: String },

  /// The reserved `_wait` ports carry no data and pair only with each other.
  #[error("wait ports only link to wait ports: {from} -> {to}")]
  WaitPortMismatch { from: String, to: String },

  #[error("graph has a cycle; unresolved tasks: {remaining:?}")]
  CyclicGraph { remaining: Vec<String> },

  #[error("unknown callable '{0}': not present in the registry")]
  UnknownCallable(String),

  #[error("invalid graph definition: {0}")]
  InvalidDefinition(String),
}
