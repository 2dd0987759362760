use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::callable::Callable;
use crate::graph::Graph;
use crate::socket::Socket;

/// Reserved input/output port enforcing execution order without data.
pub const PORT_WAIT: &str = "_wait";

/// Reserved output port aliasing the whole output namespace, for linking a
/// task's outputs as a unit.
pub const PORT_ALL_OUTPUTS: &str = "_outputs";

/// Lifecycle of one task within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
  Created,
  Running,
  Finished,
  Failed,
}

/// The three always-present boundary tasks of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryRole {
  /// Its output namespace mirrors the graph's declared input schema.
  GraphInputs,
  /// Its input namespace mirrors the graph's declared output schema.
  GraphOutputs,
  /// A free-form, always-dynamic scratch namespace.
  GraphContext,
}

/// What a task executes.
pub enum TaskKind {
  /// An in-process executable unit.
  Callable(Arc<dyn Callable>),
  /// A nested graph, run recursively by the engine.
  SubGraph(Box<Graph>),
  /// Identity pass-through at the graph boundary.
  Boundary(BoundaryRole),
}

impl Clone for TaskKind {
  fn clone(&self) -> Self {
    match self {
      TaskKind::Callable(callable) => TaskKind::Callable(Arc::clone(callable)),
      TaskKind::SubGraph(graph) => TaskKind::SubGraph(graph.clone()),
      TaskKind::Boundary(role) => TaskKind::Boundary(*role),
    }
  }
}

impl std::fmt::Debug for TaskKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TaskKind::Callable(callable) => write!(f, "Callable({})", callable.type_id()),
      TaskKind::SubGraph(graph) => write!(f, "SubGraph({})", graph.name),
      TaskKind::Boundary(role) => write!(f, "Boundary({role:?})"),
    }
  }
}

/// One computation unit: an executable reference plus its materialized
/// input and output socket namespaces.
///
/// Beyond the declared data sockets, every task implicitly answers to the
/// reserved ports [`PORT_WAIT`] (unlimited fan-in/fan-out, no value) and
/// [`PORT_ALL_OUTPUTS`] (the whole output namespace as a link source);
/// those are addressed by name and never stored in the namespaces below.
#[derive(Debug, Clone)]
pub struct Task {
  pub name: String,
  pub uuid: Uuid,
  pub kind: TaskKind,
  pub inputs: Socket,
  pub outputs: Socket,
  pub state: TaskState,
  /// Read-only reference carried along by `copy_subset` to preserve input
  /// provenance; the engine serves its stored outputs without invoking it.
  pub reference: bool,
}

impl Task {
  pub(crate) fn new(name: String, kind: TaskKind, inputs: Socket, outputs: Socket) -> Self {
    Self {
      name,
      uuid: Uuid::new_v4(),
      kind,
      inputs,
      outputs,
      state: TaskState::Created,
      reference: false,
    }
  }

  pub fn is_boundary(&self) -> bool {
    matches!(self.kind, TaskKind::Boundary(_))
  }
}
