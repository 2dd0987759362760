use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::PORT_WAIT;

/// Plain-id address of one socket: the owning graph, the task, and a dotted
/// port path into the task's input or output namespace.
///
/// Which side the port names is implied by position: a link's `from` always
/// addresses outputs, its `to` always addresses inputs. The reserved ports
/// `_wait` and `_outputs` are addressed by name like any other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketRef {
  pub graph: Uuid,
  pub task: String,
  pub port: String,
}

impl SocketRef {
  pub fn new(graph: Uuid, task: impl Into<String>, port: impl Into<String>) -> Self {
    Self {
      graph,
      task: task.into(),
      port: port.into(),
    }
  }

  pub fn is_wait(&self) -> bool {
    self.port == PORT_WAIT
  }
}

impl std::fmt::Display for SocketRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if self.port.is_empty() {
      f.write_str(&self.task)
    } else {
      write!(f, "{}.{}", self.task, self.port)
    }
  }
}

/// A directed, type-checked edge from one output socket to one input socket.
///
/// Links are owned centrally by the graph; creation and removal go through
/// [`Graph::add_link`](crate::Graph::add_link) and
/// [`Graph::remove_link`](crate::Graph::remove_link), which enforce the
/// same-graph, type-compatibility and link-limit invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
  pub from: SocketRef,
  pub to: SocketRef,
}

impl Link {
  /// Wait links impose ordering without transferring data.
  pub fn is_wait(&self) -> bool {
    self.to.is_wait()
  }
}
