//! The persisted graph representation.
//!
//! A [`GraphDef`] is the serializable form of a [`Graph`]: graph-level
//! schemas, per-task specs and flattened literal inputs, and the link list
//! as `(from_task, from_socket, to_task, to_socket)` tuples. Executables are
//! persisted by registry identifier and re-attached on load through a
//! [`CallableResolver`].
//!
//! Round-tripping a graph through its def reproduces an equivalent graph:
//! same task names, same link tuples, same resolved literal values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use sluice_schema::{SocketSpec, TaskSchema};

use crate::callable::CallableResolver;
use crate::error::GraphError;
use crate::graph::{Graph, GraphSchema, GRAPH_CONTEXT, GRAPH_INPUTS};
use crate::link::SocketRef;
use crate::task::TaskKind;

/// Graph-level input/output/context schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSpecDef {
  pub inputs: SocketSpec,
  pub outputs: SocketSpec,
  pub context: SocketSpec,
}

/// How a task's executable is re-attached on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProperties {
  /// Registry identifier of an in-process callable.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub callable: Option<String>,
  /// Nested graph definition, for subgraph tasks.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub graph: Option<Box<GraphDef>>,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub reference: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
  pub spec: TaskSchema,
  pub properties: TaskProperties,
  /// Literal (non-linked) input values, flattened to dotted paths.
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub inputs: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDef {
  pub from_task: String,
  pub from_socket: String,
  pub to_task: String,
  pub to_socket: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDef {
  pub name: String,
  pub uuid: Uuid,
  pub spec: GraphSpecDef,
  /// Graph-level literal input values (the `graph_inputs` boundary).
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub inputs: IndexMap<String, Value>,
  /// Scratch context values (the `graph_context` boundary).
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub context: IndexMap<String, Value>,
  pub tasks: IndexMap<String, TaskDef>,
  pub links: Vec<LinkDef>,
}

impl Graph {
  /// Serialize to the persisted representation.
  pub fn to_def(&self) -> GraphDef {
    let boundary_literals = |task: &str| -> IndexMap<String, Value> {
      self
        .task(task)
        .map(|t| {
          t.outputs
            .leaf_entries()
            .into_iter()
            .filter(|(_, datum)| datum.origin.is_none())
            .map(|(path, datum)| (path, datum.value.clone()))
            .collect()
        })
        .unwrap_or_default()
    };

    let tasks = self
      .tasks()
      .filter(|task| !task.is_boundary())
      .map(|task| {
        let properties = match &task.kind {
          TaskKind::Callable(callable) => TaskProperties {
            callable: Some(callable.type_id().to_string()),
            graph: None,
            reference: task.reference,
          },
          TaskKind::SubGraph(graph) => TaskProperties {
            callable: None,
            graph: Some(Box::new(graph.to_def())),
            reference: task.reference,
          },
          TaskKind::Boundary(_) => unreachable!("boundary tasks are filtered out"),
        };
        let inputs = task
          .inputs
          .leaf_entries()
          .into_iter()
          .filter(|(_, datum)| datum.origin.is_none())
          .map(|(path, datum)| (path, datum.value.clone()))
          .collect();
        let def = TaskDef {
          spec: TaskSchema::new(task.inputs.to_spec(), task.outputs.to_spec()),
          properties,
          inputs,
        };
        (task.name.clone(), def)
      })
      .collect();

    let links = self
      .links()
      .iter()
      .map(|link| LinkDef {
        from_task: link.from.task.clone(),
        from_socket: link.from.port.clone(),
        to_task: link.to.task.clone(),
        to_socket: link.to.port.clone(),
      })
      .collect();

    GraphDef {
      name: self.name.clone(),
      uuid: self.uuid,
      spec: GraphSpecDef {
        inputs: self.schema().inputs.clone(),
        outputs: self.schema().outputs.clone(),
        context: self.schema().context.clone(),
      },
      inputs: boundary_literals(GRAPH_INPUTS),
      context: boundary_literals(GRAPH_CONTEXT),
      tasks,
      links,
    }
  }

  /// Rebuild a graph from its persisted representation, resolving callable
  /// identifiers through the registry.
  pub fn from_def(def: &GraphDef, resolver: &dyn CallableResolver) -> Result<Graph, GraphError> {
    let schema = GraphSchema {
      inputs: def.spec.inputs.clone(),
      outputs: def.spec.outputs.clone(),
      context: def.spec.context.clone(),
    };
    let mut graph = Graph::new(def.name.clone(), schema)?;
    graph.uuid = def.uuid;

    for (name, task_def) in &def.tasks {
      let kind = match (&task_def.properties.callable, &task_def.properties.graph) {
        (Some(id), _) => {
          let callable = resolver
            .resolve(id)
            .ok_or_else(|| GraphError::UnknownCallable(id.clone()))?;
          TaskKind::Callable(callable)
        }
        (None, Some(sub)) => TaskKind::SubGraph(Box::new(Graph::from_def(sub, resolver)?)),
        (None, None) => {
          return Err(GraphError::InvalidDefinition(format!(
            "task '{name}' declares neither a callable nor a graph"
          )));
        }
      };
      graph.insert_task_exact(name.clone(), kind, &task_def.spec)?;
      if task_def.properties.reference {
        if let Some(task) = graph.task_mut(name) {
          task.reference = true;
        }
      }
      for (path, value) in &task_def.inputs {
        if let Some(task) = graph.task_mut(name) {
          task.inputs.assign(path, value.clone(), None)?;
        }
      }
    }

    for (path, value) in &def.inputs {
      graph.set_graph_input(path, value.clone())?;
    }
    for (path, value) in &def.context {
      graph.set_context(path, value.clone())?;
    }

    for link in &def.links {
      graph.add_link(
        SocketRef::new(graph.uuid, link.from_task.clone(), link.from_socket.clone()),
        SocketRef::new(graph.uuid, link.to_task.clone(), link.to_socket.clone()),
      )?;
    }

    Ok(graph)
  }
}
