use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use sluice_schema::{SchemaError, SocketSpec, TaskSchema, TypeTag};

use crate::error::GraphError;
use crate::link::{Link, SocketRef};
use crate::socket::Socket;
use crate::task::{BoundaryRole, Task, TaskKind, PORT_ALL_OUTPUTS, PORT_WAIT};

/// Boundary task whose output namespace mirrors the graph's input schema.
pub const GRAPH_INPUTS: &str = "graph_inputs";
/// Boundary task whose input namespace mirrors the graph's output schema.
pub const GRAPH_OUTPUTS: &str = "graph_outputs";
/// Boundary task carrying the always-dynamic scratch namespace.
pub const GRAPH_CONTEXT: &str = "graph_context";

const RESERVED_TASKS: [&str; 3] = [GRAPH_INPUTS, GRAPH_OUTPUTS, GRAPH_CONTEXT];

/// The graph-level input, output and context schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSchema {
  pub inputs: SocketSpec,
  pub outputs: SocketSpec,
  pub context: SocketSpec,
}

impl GraphSchema {
  /// Declared input and output namespaces; the context namespace is always
  /// dynamic.
  pub fn new(inputs: SocketSpec, outputs: SocketSpec) -> Self {
    Self {
      inputs,
      outputs,
      context: SocketSpec::dynamic(None),
    }
  }

  pub fn empty() -> Self {
    Self::new(SocketSpec::empty(), SocketSpec::empty())
  }
}

impl Default for GraphSchema {
  fn default() -> Self {
    Self::empty()
  }
}

/// Cheap, copyable address of a task within one graph, used to mint socket
/// refs for linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
  graph: Uuid,
  name: String,
}

impl TaskHandle {
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Ref to an output port (dotted path into the output namespace).
  pub fn output(&self, port: impl Into<String>) -> SocketRef {
    SocketRef::new(self.graph, self.name.clone(), port)
  }

  /// Ref to an input port (dotted path into the input namespace).
  pub fn input(&self, port: impl Into<String>) -> SocketRef {
    SocketRef::new(self.graph, self.name.clone(), port)
  }

  /// Ref to the whole output namespace, for linking outputs as a unit.
  pub fn outputs(&self) -> SocketRef {
    SocketRef::new(self.graph, self.name.clone(), PORT_ALL_OUTPUTS)
  }

  /// Ref to the ordering-only wait input.
  pub fn wait_in(&self) -> SocketRef {
    SocketRef::new(self.graph, self.name.clone(), PORT_WAIT)
  }

  /// Ref to the ordering-only wait output.
  pub fn wait_out(&self) -> SocketRef {
    SocketRef::new(self.graph, self.name.clone(), PORT_WAIT)
  }
}

/// What feeds an input socket: a literal value, or another socket (which
/// creates a link instead of storing anything).
pub enum InputSource {
  Value(Value),
  Socket(SocketRef),
}

impl From<Value> for InputSource {
  fn from(value: Value) -> Self {
    InputSource::Value(value)
  }
}

impl From<SocketRef> for InputSource {
  fn from(socket: SocketRef) -> Self {
    InputSource::Socket(socket)
  }
}

/// Resolved shape of one link endpoint, for type checking.
enum PortView {
  Wait,
  Leaf(TypeTag),
  Namespace { item: Option<SocketSpec> },
}

/// A named, uniquely-identified container of tasks and links.
///
/// The version counter increments on every structural mutation (task or
/// link added or removed) so dependent analyses can invalidate caches.
#[derive(Debug, Clone)]
pub struct Graph {
  pub name: String,
  pub uuid: Uuid,
  version: u64,
  schema: GraphSchema,
  tasks: IndexMap<String, Task>,
  links: Vec<Link>,
}

impl Graph {
  pub fn new(name: impl Into<String>, schema: GraphSchema) -> Result<Self, GraphError> {
    schema.inputs.validate()?;
    schema.outputs.validate()?;
    schema.context.validate()?;

    let mut graph = Self {
      name: name.into(),
      uuid: Uuid::new_v4(),
      version: 0,
      schema,
      tasks: IndexMap::new(),
      links: Vec::new(),
    };

    let inputs = graph.schema.inputs.clone();
    let outputs = graph.schema.outputs.clone();
    let context = graph.schema.context.clone();

    graph.insert_boundary(GRAPH_INPUTS, BoundaryRole::GraphInputs, SocketSpec::empty(), inputs);
    graph.insert_boundary(GRAPH_OUTPUTS, BoundaryRole::GraphOutputs, outputs.clone(), outputs);
    graph.insert_boundary(GRAPH_CONTEXT, BoundaryRole::GraphContext, SocketSpec::empty(), context);

    Ok(graph)
  }

  fn insert_boundary(&mut self, name: &str, role: BoundaryRole, inputs: SocketSpec, outputs: SocketSpec) {
    let task = Task::new(
      name.to_string(),
      TaskKind::Boundary(role),
      Socket::materialize(&inputs),
      Socket::materialize(&outputs),
    );
    self.tasks.insert(name.to_string(), task);
  }

  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn schema(&self) -> &GraphSchema {
    &self.schema
  }

  pub fn tasks(&self) -> impl Iterator<Item = &Task> {
    self.tasks.values()
  }

  pub fn task_names(&self) -> Vec<&str> {
    self.tasks.keys().map(|name| name.as_str()).collect()
  }

  pub fn task(&self, name: &str) -> Option<&Task> {
    self.tasks.get(name)
  }

  /// Mutable task access for value/state updates. Structural changes must
  /// go through the graph operations so the version counter stays honest.
  pub fn task_mut(&mut self, name: &str) -> Option<&mut Task> {
    self.tasks.get_mut(name)
  }

  pub fn links(&self) -> &[Link] {
    &self.links
  }

  pub fn handle(&self, name: &str) -> Result<TaskHandle, GraphError> {
    if !self.tasks.contains_key(name) {
      return Err(GraphError::TaskNotFound(name.to_string()));
    }
    Ok(TaskHandle {
      graph: self.uuid,
      name: name.to_string(),
    })
  }

  /// Ref to a graph-level input, usable as a link source for internal tasks.
  pub fn input_ref(&self, port: impl Into<String>) -> SocketRef {
    SocketRef::new(self.uuid, GRAPH_INPUTS, port)
  }

  /// Ref to a graph-level output, usable as a link target for internal tasks.
  pub fn output_ref(&self, port: impl Into<String>) -> SocketRef {
    SocketRef::new(self.uuid, GRAPH_OUTPUTS, port)
  }

  /// Ref into the scratch context namespace, usable as a link source.
  pub fn context_ref(&self, port: impl Into<String>) -> SocketRef {
    SocketRef::new(self.uuid, GRAPH_CONTEXT, port)
  }

  fn touch(&mut self) {
    self.version += 1;
  }

  /// Add a task, materializing its input/output namespaces from its schema.
  ///
  /// The name defaults to the executable's identifier; a numeric suffix is
  /// appended on collision. Reserved boundary names are rejected.
  pub fn add_task(&mut self, kind: TaskKind, name: Option<&str>) -> Result<TaskHandle, GraphError> {
    let (base, schema) = match &kind {
      TaskKind::Callable(callable) => (callable.type_id().to_string(), callable.schema()),
      TaskKind::SubGraph(graph) => (
        graph.name.clone(),
        TaskSchema::new(graph.schema.inputs.clone(), graph.schema.outputs.clone()),
      ),
      TaskKind::Boundary(_) => {
        return Err(GraphError::ReservedTaskName(
          name.unwrap_or("<boundary>").to_string(),
        ));
      }
    };
    let base = name.map(str::to_string).unwrap_or(base);
    self.insert_task(base, kind, schema)
  }

  /// Add a task with an explicit schema override (explicit wins over the
  /// executable's own declaration, per the inference contract).
  pub fn add_task_with_schema(
    &mut self,
    kind: TaskKind,
    name: Option<&str>,
    schema: TaskSchema,
  ) -> Result<TaskHandle, GraphError> {
    let base = match (&kind, name) {
      (_, Some(name)) => name.to_string(),
      (TaskKind::Callable(callable), None) => callable.type_id().to_string(),
      (TaskKind::SubGraph(graph), None) => graph.name.clone(),
      (TaskKind::Boundary(_), None) => {
        return Err(GraphError::ReservedTaskName("<boundary>".to_string()));
      }
    };
    self.insert_task(base, kind, schema)
  }

  fn insert_task(
    &mut self,
    base: String,
    kind: TaskKind,
    schema: TaskSchema,
  ) -> Result<TaskHandle, GraphError> {
    if RESERVED_TASKS.contains(&base.as_str()) {
      return Err(GraphError::ReservedTaskName(base));
    }
    if base.is_empty() || base.contains('.') || base.starts_with('_') {
      return Err(GraphError::Schema(SchemaError::ReservedName { name: base }));
    }
    schema.inputs.validate()?;
    schema.outputs.validate()?;

    let name = self.unique_name(base);
    let task = Task::new(
      name.clone(),
      kind,
      Socket::materialize(&schema.inputs),
      Socket::materialize(&schema.outputs),
    );
    self.tasks.insert(name.clone(), task);
    self.touch();

    Ok(TaskHandle {
      graph: self.uuid,
      name,
    })
  }

  fn unique_name(&self, base: String) -> String {
    if !self.tasks.contains_key(&base) {
      return base;
    }
    let mut n = 2;
    loop {
      let candidate = format!("{base}_{n}");
      if !self.tasks.contains_key(&candidate) {
        return candidate;
      }
      n += 1;
    }
  }

  /// Create a directed link between two sockets of this graph.
  ///
  /// The source is normalized first: an empty port means the producer's
  /// whole output namespace (its `_outputs` alias). Idempotent: linking an
  /// identical `(from, to)` pair again returns the existing link. All link
  /// invariants are enforced here, synchronously.
  pub fn add_link(&mut self, from: SocketRef, to: SocketRef) -> Result<&Link, GraphError> {
    let mut from = from;
    if from.port.is_empty() {
      from.port = PORT_ALL_OUTPUTS.to_string();
    }

    if from.graph != self.uuid || to.graph != self.uuid {
      return Err(GraphError::CrossGraphLink {
        from_graph: from.graph,
        to_graph: to.graph,
      });
    }

    if let Some(index) = self.links.iter().position(|l| l.from == from && l.to == to) {
      return Ok(&self.links[index]);
    }

    let from_view = self.resolve_output(&from)?;
    let namespace_source = matches!(from_view, PortView::Namespace { .. });
    let to_view = self.resolve_input(&to, namespace_source)?;
    check_link_types(&from_view, &to_view, &from, &to)?;

    if let Some(limit) = self.input_link_limit(&to)? {
      let inbound = self.links.iter().filter(|l| l.to == to).count() as u32;
      if inbound >= limit {
        return Err(GraphError::LinkLimitExceeded {
          to: to.to_string(),
          limit,
        });
      }
    }

    self.links.push(Link { from, to });
    self.touch();
    Ok(self.links.last().expect("link just pushed"))
  }

  /// Convenience form taking `"task"` or `"task.port.path"` endpoints.
  pub fn add_link_path(&mut self, from: &str, to: &str) -> Result<&Link, GraphError> {
    let from = self.parse_endpoint(from);
    let to = self.parse_endpoint(to);
    self.add_link(from, to)
  }

  /// Ordering-only edge: `from` must finish before `to` starts.
  pub fn add_wait_link(&mut self, from_task: &str, to_task: &str) -> Result<&Link, GraphError> {
    let from = SocketRef::new(self.uuid, from_task, PORT_WAIT);
    let to = SocketRef::new(self.uuid, to_task, PORT_WAIT);
    self.add_link(from, to)
  }

  fn parse_endpoint(&self, endpoint: &str) -> SocketRef {
    match endpoint.split_once('.') {
      Some((task, port)) => SocketRef::new(self.uuid, task, port),
      None => SocketRef::new(self.uuid, endpoint, ""),
    }
  }

  /// Remove a link, symmetrically from both endpoints' views.
  pub fn remove_link(&mut self, from: &SocketRef, to: &SocketRef) -> bool {
    let before = self.links.len();
    self.links.retain(|l| !(l.from == *from && l.to == *to));
    if self.links.len() != before {
      self.touch();
      true
    } else {
      false
    }
  }

  /// Remove the named tasks and every link touching them, in both
  /// directions. Fails atomically: either all names resolve or nothing is
  /// removed.
  pub fn delete_tasks<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), GraphError> {
    for name in names {
      let name = name.as_ref();
      if RESERVED_TASKS.contains(&name) {
        return Err(GraphError::ReservedTaskName(name.to_string()));
      }
      if !self.tasks.contains_key(name) {
        return Err(GraphError::TaskNotFound(name.to_string()));
      }
    }
    for name in names {
      self.tasks.shift_remove(name.as_ref());
    }
    let tasks = &self.tasks;
    self
      .links
      .retain(|l| tasks.contains_key(&l.from.task) && tasks.contains_key(&l.to.task));
    self.touch();
    Ok(())
  }

  /// Feed one input of a task: a literal value is assigned into the socket
  /// tree, a socket source creates a link instead.
  pub fn set_input(
    &mut self,
    task: &str,
    path: &str,
    source: impl Into<InputSource>,
  ) -> Result<(), GraphError> {
    match source.into() {
      InputSource::Value(value) => {
        let target = self
          .tasks
          .get_mut(task)
          .ok_or_else(|| GraphError::TaskNotFound(task.to_string()))?;
        target.inputs.assign(path, value, None)?;
        Ok(())
      }
      InputSource::Socket(from) => {
        let to = SocketRef::new(self.uuid, task, path);
        self.add_link(from, to)?;
        Ok(())
      }
    }
  }

  /// Assign a mapping of literal inputs, in order.
  pub fn set_inputs(
    &mut self,
    task: &str,
    values: &serde_json::Map<String, Value>,
  ) -> Result<(), GraphError> {
    let target = self
      .tasks
      .get_mut(task)
      .ok_or_else(|| GraphError::TaskNotFound(task.to_string()))?;
    target.inputs.assign_map(values, None)?;
    Ok(())
  }

  /// Assign a graph-level input value (into the `graph_inputs` boundary).
  pub fn set_graph_input(&mut self, path: &str, value: Value) -> Result<(), GraphError> {
    let boundary = self
      .tasks
      .get_mut(GRAPH_INPUTS)
      .ok_or_else(|| GraphError::TaskNotFound(GRAPH_INPUTS.to_string()))?;
    boundary.outputs.assign(path, value, None)?;
    Ok(())
  }

  /// Write into the scratch context namespace.
  pub fn set_context(&mut self, path: &str, value: Value) -> Result<(), GraphError> {
    let boundary = self
      .tasks
      .get_mut(GRAPH_CONTEXT)
      .ok_or_else(|| GraphError::TaskNotFound(GRAPH_CONTEXT.to_string()))?;
    boundary.outputs.assign(path, value, None)?;
    Ok(())
  }

  /// The values internal tasks fed into the `graph_outputs` boundary.
  pub fn collect_graph_outputs(&self, raw: bool) -> serde_json::Map<String, Value> {
    self
      .tasks
      .get(GRAPH_OUTPUTS)
      .and_then(|t| t.inputs.collect_values(raw))
      .and_then(|v| match v {
        Value::Object(map) => Some(map),
        _ => None,
      })
      .unwrap_or_default()
  }

  /// Links feeding any socket of the named task (data and wait).
  pub fn links_into_task<'a>(&'a self, task: &'a str) -> impl Iterator<Item = &'a Link> {
    self.links.iter().filter(move |l| l.to.task == task)
  }

  /// Links leaving any socket of the named task (data and wait).
  pub fn links_from_task<'a>(&'a self, task: &'a str) -> impl Iterator<Item = &'a Link> {
    self.links.iter().filter(move |l| l.from.task == task)
  }

  /// Copy the graph: fresh graph and task identities, same names, links and
  /// literal values.
  pub fn copy(&self) -> Graph {
    let mut copy = self.clone();
    copy.uuid = Uuid::new_v4();
    for task in copy.tasks.values_mut() {
      task.uuid = Uuid::new_v4();
    }
    for link in &mut copy.links {
      link.from.graph = copy.uuid;
      link.to.graph = copy.uuid;
    }
    copy
  }

  /// Copy a subset of tasks into a fresh graph.
  ///
  /// Links are recreated only between tasks that both exist in the
  /// destination (boundary tasks always do). With `add_ref`, predecessor
  /// tasks outside the named set are carried along as read-only references
  /// so the copied tasks keep their input provenance.
  pub fn copy_subset<S: AsRef<str>>(&self, names: &[S], add_ref: bool) -> Result<Graph, GraphError> {
    let mut wanted: Vec<&str> = Vec::new();
    for name in names {
      let name = name.as_ref();
      if !self.tasks.contains_key(name) {
        return Err(GraphError::TaskNotFound(name.to_string()));
      }
      if !wanted.contains(&name) {
        wanted.push(name);
      }
    }

    let mut refs: Vec<&str> = Vec::new();
    if add_ref {
      for link in &self.links {
        if wanted.contains(&link.to.task.as_str())
          && !wanted.contains(&link.from.task.as_str())
          && !RESERVED_TASKS.contains(&link.from.task.as_str())
          && !refs.contains(&link.from.task.as_str())
        {
          refs.push(link.from.task.as_str());
        }
      }
    }

    let mut subset = Graph::new(self.name.clone(), self.schema.clone())?;
    // Preserve boundary socket values (graph-level inputs and context).
    for boundary in RESERVED_TASKS {
      if let (Some(src), Some(dst)) = (self.tasks.get(boundary), subset.tasks.get_mut(boundary)) {
        dst.inputs = src.inputs.clone();
        dst.outputs = src.outputs.clone();
      }
    }

    for name in wanted.iter().copied() {
      let mut task = self.tasks[name].clone();
      task.uuid = Uuid::new_v4();
      task.state = crate::task::TaskState::Created;
      subset.tasks.insert(name.to_string(), task);
    }
    for name in refs.iter().copied() {
      let mut task = self.tasks[name].clone();
      task.uuid = Uuid::new_v4();
      task.reference = true;
      subset.tasks.insert(name.to_string(), task);
    }

    for link in &self.links {
      if subset.tasks.contains_key(&link.from.task) && subset.tasks.contains_key(&link.to.task) {
        let mut link = link.clone();
        link.from.graph = subset.uuid;
        link.to.graph = subset.uuid;
        subset.links.push(link);
      }
    }

    subset.touch();
    Ok(subset)
  }

  fn resolve_output(&self, socket: &SocketRef) -> Result<PortView, GraphError> {
    let task = self
      .tasks
      .get(&socket.task)
      .ok_or_else(|| GraphError::TaskNotFound(socket.task.clone()))?;
    if socket.port == PORT_WAIT {
      return Ok(PortView::Wait);
    }
    let port = if socket.port == PORT_ALL_OUTPUTS {
      ""
    } else {
      socket.port.as_str()
    };
    let resolved = task.outputs.get(port).ok_or_else(|| GraphError::PortNotFound {
      task: socket.task.clone(),
      side: "output",
      port: socket.port.clone(),
    })?;
    Ok(view_of(resolved))
  }

  fn resolve_input(&mut self, socket: &SocketRef, namespace_source: bool) -> Result<PortView, GraphError> {
    if socket.port == PORT_WAIT {
      if !self.tasks.contains_key(&socket.task) {
        return Err(GraphError::TaskNotFound(socket.task.clone()));
      }
      return Ok(PortView::Wait);
    }
    self.ensure_input_socket(&socket.task, &socket.port, namespace_source)?;
    let task = self
      .tasks
      .get(&socket.task)
      .ok_or_else(|| GraphError::TaskNotFound(socket.task.clone()))?;
    let resolved = task
      .inputs
      .get(&socket.port)
      .ok_or_else(|| GraphError::PortNotFound {
        task: socket.task.clone(),
        side: "input",
        port: socket.port.clone(),
      })?;
    Ok(view_of(resolved))
  }

  /// Auto-create a link target inside a dynamic input namespace, the same
  /// way assignment would: intermediate children come from the `item`
  /// schema (or a nested dynamic namespace without one), the final child
  /// from `item`, or from the link source's shape when no item is declared.
  fn ensure_input_socket(
    &mut self,
    task: &str,
    port: &str,
    namespace_source: bool,
  ) -> Result<(), GraphError> {
    let task = self
      .tasks
      .get_mut(task)
      .ok_or_else(|| GraphError::TaskNotFound(task.to_string()))?;
    ensure_socket(&mut task.inputs, port, namespace_source);
    Ok(())
  }

  pub(crate) fn insert_task_exact(
    &mut self,
    name: String,
    kind: TaskKind,
    schema: &TaskSchema,
  ) -> Result<(), GraphError> {
    if RESERVED_TASKS.contains(&name.as_str()) || self.tasks.contains_key(&name) {
      return Err(GraphError::ReservedTaskName(name));
    }
    let task = Task::new(
      name.clone(),
      kind,
      Socket::materialize(&schema.inputs),
      Socket::materialize(&schema.outputs),
    );
    self.tasks.insert(name, task);
    self.touch();
    Ok(())
  }

  fn input_link_limit(&self, socket: &SocketRef) -> Result<Option<u32>, GraphError> {
    if socket.port == PORT_WAIT {
      return Ok(None);
    }
    let task = self
      .tasks
      .get(&socket.task)
      .ok_or_else(|| GraphError::TaskNotFound(socket.task.clone()))?;
    let resolved = task
      .inputs
      .get(&socket.port)
      .ok_or_else(|| GraphError::PortNotFound {
        task: socket.task.clone(),
        side: "input",
        port: socket.port.clone(),
      })?;
    Ok(resolved.link_limit())
  }
}

/// Walk a dotted path through a socket tree, creating children of dynamic
/// namespaces on demand. Static namespaces are left untouched; resolution
/// failures surface later as `PortNotFound`. Without an `item` schema the
/// final child's shape follows the link source: namespace sources get a
/// nested dynamic namespace, leaf sources an `any` leaf.
fn ensure_socket(socket: &mut Socket, path: &str, namespace_source: bool) {
  if path.is_empty() {
    return;
  }
  let (head, rest) = crate::socket::split_path(path);
  let Socket::Namespace(ns) = socket else {
    return;
  };
  if !ns.children.contains_key(head) && ns.dynamic {
    let child = match (&ns.item, rest) {
      (Some(item), _) => Socket::materialize(item),
      (None, None) if !namespace_source => Socket::materialize(&SocketSpec::leaf(TypeTag::any())),
      (None, _) => Socket::Namespace(crate::socket::NamespaceSocket {
        children: IndexMap::new(),
        dynamic: true,
        item: None,
        link_limit: None,
      }),
    };
    ns.children.insert(head.to_string(), child);
  }
  if let (Some(child), Some(rest)) = (ns.children.get_mut(head), rest) {
    ensure_socket(child, rest, namespace_source);
  }
}

fn view_of(socket: &Socket) -> PortView {
  match socket {
    Socket::Leaf(leaf) => PortView::Leaf(leaf.type_tag.clone()),
    Socket::Namespace(ns) => PortView::Namespace {
      item: ns.item.clone(),
    },
  }
}

fn check_link_types(
  from_view: &PortView,
  to_view: &PortView,
  from: &SocketRef,
  to: &SocketRef,
) -> Result<(), GraphError> {
  match (from_view, to_view) {
    (PortView::Wait, PortView::Wait) => Ok(()),
    (PortView::Wait, _) | (_, PortView::Wait) => Err(GraphError::WaitPortMismatch {
      from: from.to_string(),
      to: to.to_string(),
    }),
    (PortView::Leaf(a), PortView::Leaf(b)) => {
      if a.compatible_with(b) {
        Ok(())
      } else {
        Err(GraphError::TypeMismatch {
          from: from.to_string(),
          to: to.to_string(),
          from_type: a.to_string(),
          to_type: b.to_string(),
        })
      }
    }
    (PortView::Namespace { .. }, PortView::Leaf(_)) => Err(GraphError::NamespaceToLeafLink {
      from: from.to_string(),
      to: to.to_string(),
    }),
    (PortView::Leaf(tag), PortView::Namespace { item }) => {
      match item.as_ref().and_then(|i| i.type_tag().cloned()) {
        Some(item_tag) if !tag.compatible_with(&item_tag) => Err(GraphError::TypeMismatch {
          from: from.to_string(),
          to: to.to_string(),
          from_type: tag.to_string(),
          to_type: item_tag.to_string(),
        }),
        _ => Ok(()),
      }
    }
    (PortView::Namespace { item: from_item }, PortView::Namespace { item: to_item }) => {
      let from_tag = from_item.as_ref().and_then(|i| i.type_tag().cloned());
      let to_tag = to_item.as_ref().and_then(|i| i.type_tag().cloned());
      match (from_tag, to_tag) {
        (Some(a), Some(b)) if !a.compatible_with(&b) => Err(GraphError::TypeMismatch {
          from: from.to_string(),
          to: to.to_string(),
          from_type: a.to_string(),
          to_type: b.to_string(),
        }),
        _ => Ok(()),
      }
    }
  }
}
