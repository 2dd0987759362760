use thiserror::Error;

use sluice_graph::GraphError;
use sluice_provenance::ProvenanceError;

/// Errors surfaced by a run.
#[derive(Debug, Error)]
pub enum EngineError {
  /// Build-time graph errors, including the fatal pre-execution
  /// `CyclicGraph`.
  #[error(transparent)]
  Graph(#[from] GraphError),

  /// A task's executable raised; re-raised here after its provenance
  /// record was finalized.
  #[error("task '{task}' failed: {message}")]
  TaskFailed { task: String, message: String },

  #[error("invalid graph: {message}")]
  InvalidGraph { message: String },

  #[error(transparent)]
  Provenance(#[from] ProvenanceError),

  #[error("execution cancelled")]
  Cancelled,
}
