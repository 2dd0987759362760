use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of one invocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
  Running,
  Finished,
  Failed,
}

/// Stable id of one invocation attempt: `proc:{task}:{attempt}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub(crate) String);

impl ProcessId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for ProcessId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// One task-invocation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessNode {
  pub id: ProcessId,
  pub task_name: String,
  /// Identifier of the executable (registry id, or subgraph name).
  pub callable_ref: String,
  pub attempt: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent: Option<ProcessId>,
  pub started_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ended_at: Option<DateTime<Utc>>,
  pub state: ProcessState,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

/// One distinct value, keyed by content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataNode {
  pub hash: String,
  pub value: Value,
}

/// Directed edge between provenance nodes.
///
/// `from`/`to` are node ids: process ids or data hashes. Labels are
/// `input:<path>`, `output:<path>`, `return:<path>` (plain `return` for a
/// bare return value), or `call` for subgraph invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvEdge {
  pub from: String,
  pub to: String,
  pub label: String,
}

/// Which label family `record_outputs` writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
  Output,
  Return,
}

impl LabelKind {
  pub(crate) fn prefix(self) -> &'static str {
    match self {
      LabelKind::Output => "output",
      LabelKind::Return => "return",
    }
  }
}
