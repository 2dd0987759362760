use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ProvenanceError;
use crate::hash::content_hash;
use crate::types::{DataNode, LabelKind, ProcessId, ProcessNode, ProcessState, ProvEdge};

pub(crate) struct Inner {
  pub workflow: String,
  pub flow_id: String,
  pub run_id: String,
  attempts: HashMap<String, u32>,
  pub processes: IndexMap<String, ProcessNode>,
  pub data: IndexMap<String, DataNode>,
  pub edges: Vec<ProvEdge>,
}

/// Content-addressed log of process invocations, data snapshots, and the
/// edges between them.
///
/// Cloning is cheap and shares the store; independent task executions may
/// call into their own `pid`'s records concurrently.
#[derive(Clone)]
pub struct ProvenanceRecorder {
  inner: Arc<RwLock<Inner>>,
}

impl ProvenanceRecorder {
  /// Start a recorder for one run of the named workflow.
  pub fn new(workflow: impl Into<String>, flow_id: impl Into<String>) -> Self {
    Self {
      inner: Arc::new(RwLock::new(Inner {
        workflow: workflow.into(),
        flow_id: flow_id.into(),
        run_id: Uuid::new_v4().to_string(),
        attempts: HashMap::new(),
        processes: IndexMap::new(),
        data: IndexMap::new(),
        edges: Vec::new(),
      })),
    }
  }

  pub fn run_id(&self) -> String {
    self.inner.read().unwrap().run_id.clone()
  }

  /// Open a process record for one invocation attempt.
  ///
  /// Attempt numbers are monotonically allocated per task name; the id is
  /// `proc:{name}:{attempt}`. With a parent, a `process→process` edge
  /// labeled `call` records the subgraph call tree.
  pub fn process_start(
    &self,
    task_name: &str,
    callable_ref: &str,
    parent: Option<&ProcessId>,
  ) -> ProcessId {
    let mut inner = self.inner.write().unwrap();
    let attempt = inner
      .attempts
      .entry(task_name.to_string())
      .and_modify(|n| *n += 1)
      .or_insert(1);
    let attempt = *attempt;

    let pid = ProcessId(format!("proc:{task_name}:{attempt}"));
    let node = ProcessNode {
      id: pid.clone(),
      task_name: task_name.to_string(),
      callable_ref: callable_ref.to_string(),
      attempt,
      parent: parent.cloned(),
      started_at: Utc::now(),
      ended_at: None,
      state: ProcessState::Running,
      error: None,
    };
    inner.processes.insert(pid.as_str().to_string(), node);

    if let Some(parent) = parent {
      inner.edges.push(ProvEdge {
        from: parent.as_str().to_string(),
        to: pid.as_str().to_string(),
        label: "call".to_string(),
      });
    }

    pid
  }

  /// Record the resolved input payload: every leaf of the nested mapping
  /// becomes a `data→process` edge labeled `input:<path>`, with the data
  /// node deduplicated by content hash.
  pub fn record_inputs(
    &self,
    pid: &ProcessId,
    values: &serde_json::Map<String, Value>,
  ) -> Result<(), ProvenanceError> {
    let mut inner = self.lock_process(pid)?;
    for (path, leaf) in flatten(values) {
      let hash = intern_data(&mut inner, leaf);
      inner.edges.push(ProvEdge {
        from: hash,
        to: pid.as_str().to_string(),
        label: format!("input:{path}"),
      });
    }
    Ok(())
  }

  /// Record an output payload as `process→data` edges labeled
  /// `output:<path>` or `return:<path>`.
  pub fn record_outputs(
    &self,
    pid: &ProcessId,
    value: &Value,
    kind: LabelKind,
  ) -> Result<(), ProvenanceError> {
    let mut inner = self.lock_process(pid)?;
    let leaves = match value {
      Value::Object(map) => flatten(map),
      other => vec![(String::new(), other)],
    };
    for (path, leaf) in leaves {
      let hash = intern_data(&mut inner, leaf);
      let label = if path.is_empty() {
        kind.prefix().to_string()
      } else {
        format!("{}:{path}", kind.prefix())
      };
      inner.edges.push(ProvEdge {
        from: pid.as_str().to_string(),
        to: hash,
        label,
      });
    }
    Ok(())
  }

  /// Close a process record: end timestamp, final state, error text.
  pub fn process_end(
    &self,
    pid: &ProcessId,
    state: ProcessState,
    error: Option<String>,
  ) -> Result<(), ProvenanceError> {
    let mut inner = self.lock_process(pid)?;
    let node = inner
      .processes
      .get_mut(pid.as_str())
      .ok_or_else(|| ProvenanceError::UnknownProcess(pid.as_str().to_string()))?;
    node.ended_at = Some(Utc::now());
    node.state = state;
    node.error = error;
    Ok(())
  }

  pub fn process(&self, pid: &ProcessId) -> Option<ProcessNode> {
    self.inner.read().unwrap().processes.get(pid.as_str()).cloned()
  }

  fn lock_process(
    &self,
    pid: &ProcessId,
  ) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, ProvenanceError> {
    let inner = self.inner.write().unwrap();
    if !inner.processes.contains_key(pid.as_str()) {
      return Err(ProvenanceError::UnknownProcess(pid.as_str().to_string()));
    }
    Ok(inner)
  }

  pub(crate) fn read_inner(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
    self.inner.read().unwrap()
  }
}

/// Get-or-create the data node for a value; returns its hash.
fn intern_data(inner: &mut Inner, value: &Value) -> String {
  let hash = content_hash(value);
  inner.data.entry(hash.clone()).or_insert_with(|| DataNode {
    hash: hash.clone(),
    value: value.clone(),
  });
  hash
}

/// Flatten a nested mapping into dotted-path leaves, in insertion order.
fn flatten(values: &serde_json::Map<String, Value>) -> Vec<(String, &Value)> {
  let mut out = Vec::new();
  for (name, value) in values {
    flatten_at(name.clone(), value, &mut out);
  }
  out
}

fn flatten_at<'a>(path: String, value: &'a Value, out: &mut Vec<(String, &'a Value)>) {
  match value {
    Value::Object(map) if !map.is_empty() => {
      for (name, child) in map {
        flatten_at(format!("{path}.{name}"), child, out);
      }
    }
    other => out.push((path, other)),
  }
}
