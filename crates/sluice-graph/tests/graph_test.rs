//! Tests for graph construction: tasks, links, deletion, copies, topology,
//! and the persisted representation.

use std::sync::Arc;

use serde_json::json;
use sluice_graph::{
  Callable, CallableError, CallableResolver, FnCallable, Graph, GraphError, GraphSchema, TaskKind,
  Topology, GRAPH_INPUTS, GRAPH_OUTPUTS,
};
use sluice_schema::{SocketSpec, TaskSchema, TypeTag};

fn adder(id: &str) -> Arc<FnCallable> {
  let schema = TaskSchema::new(
    SocketSpec::namespace([
      ("x", SocketSpec::leaf(TypeTag::int())),
      ("y", SocketSpec::leaf(TypeTag::int())),
    ]),
    SocketSpec::namespace([("result", SocketSpec::leaf(TypeTag::int()))]),
  );
  FnCallable::new(id, schema, |args| {
    let x = args.get("x").and_then(|v| v.as_i64()).unwrap_or(0);
    let y = args.get("y").and_then(|v| v.as_i64()).unwrap_or(0);
    Ok(json!({ "result": x + y }))
  })
}

fn labeler(id: &str) -> Arc<FnCallable> {
  let schema = TaskSchema::new(
    SocketSpec::namespace([("text", SocketSpec::leaf(TypeTag::str()))]),
    SocketSpec::namespace([("label", SocketSpec::leaf(TypeTag::str()))]),
  );
  FnCallable::new(id, schema, |args| {
    Ok(json!({ "label": args.get("text").cloned().unwrap_or(json!("")) }))
  })
}

fn empty_graph(name: &str) -> Graph {
  Graph::new(name, GraphSchema::empty()).expect("graph creation failed")
}

struct TestResolver;

impl CallableResolver for TestResolver {
  fn resolve(&self, id: &str) -> Option<Arc<dyn Callable>> {
    match id {
      "add" => Some(adder("add") as Arc<dyn Callable>),
      "label" => Some(labeler("label") as Arc<dyn Callable>),
      _ => None,
    }
  }
}

#[test]
fn test_boundary_tasks_are_always_present() {
  let graph = empty_graph("flow");
  for name in ["graph_inputs", "graph_outputs", "graph_context"] {
    assert!(graph.task(name).is_some(), "missing boundary task {name}");
    assert!(graph.task(name).unwrap().is_boundary());
  }
}

#[test]
fn test_add_task_appends_suffix_on_collision() {
  let mut graph = empty_graph("flow");
  let first = graph.add_task(TaskKind::Callable(adder("add")), None).unwrap();
  let second = graph.add_task(TaskKind::Callable(adder("add")), None).unwrap();
  let third = graph.add_task(TaskKind::Callable(adder("add")), None).unwrap();

  assert_eq!(first.name(), "add");
  assert_eq!(second.name(), "add_2");
  assert_eq!(third.name(), "add_3");
}

#[test]
fn test_reserved_task_names_are_rejected() {
  let mut graph = empty_graph("flow");
  for name in ["graph_inputs", "graph_outputs", "graph_context"] {
    let err = graph.add_task(TaskKind::Callable(adder("add")), Some(name));
    assert!(matches!(err, Err(GraphError::ReservedTaskName(_))), "{name}");
  }
}

#[test]
fn test_type_checked_link_rejects_incompatible_leaves() {
  let mut graph = empty_graph("flow");
  let add = graph.add_task(TaskKind::Callable(adder("add")), None).unwrap();
  let label = graph.add_task(TaskKind::Callable(labeler("label")), None).unwrap();

  let err = graph.add_link(add.output("result"), label.input("text"));
  assert!(matches!(err, Err(GraphError::TypeMismatch { .. })));
  // Nothing recorded on either side.
  assert!(graph.links().is_empty());
}

#[test]
fn test_any_is_compatible_with_everything() {
  let schema = TaskSchema::new(
    SocketSpec::namespace([("value", SocketSpec::leaf(TypeTag::any()))]),
    SocketSpec::namespace([("value", SocketSpec::leaf(TypeTag::any()))]),
  );
  let passthrough = FnCallable::new("pass", schema, |args| Ok(json!(args)));

  let mut graph = empty_graph("flow");
  let add = graph.add_task(TaskKind::Callable(adder("add")), None).unwrap();
  let pass = graph.add_task(TaskKind::Callable(passthrough), None).unwrap();

  graph
    .add_link(add.output("result"), pass.input("value"))
    .expect("any link rejected");
}

#[test]
fn test_link_limit_is_enforced() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();
  let sink = graph.add_task(TaskKind::Callable(adder("add")), Some("sink")).unwrap();

  graph.add_link(a.output("result"), sink.input("x")).expect("first link");
  let err = graph.add_link(b.output("result"), sink.input("x"));

  assert!(matches!(err, Err(GraphError::LinkLimitExceeded { limit: 1, .. })));
  assert_eq!(graph.links().len(), 1);
}

#[test]
fn test_add_link_is_idempotent() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();

  graph.add_link(a.output("result"), b.input("x")).expect("first");
  graph.add_link(a.output("result"), b.input("x")).expect("repeat");

  assert_eq!(graph.links().len(), 1);
}

#[test]
fn test_namespace_to_leaf_link_is_rejected() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();

  let err = graph.add_link(a.outputs(), b.input("x"));
  assert!(matches!(err, Err(GraphError::NamespaceToLeafLink { .. })));
}

#[test]
fn test_cross_graph_links_are_rejected() {
  let mut first = empty_graph("first");
  let mut second = empty_graph("second");
  let a = first.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = second.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();

  let err = second.add_link(a.output("result"), b.input("x"));
  assert!(matches!(err, Err(GraphError::CrossGraphLink { .. })));
}

#[test]
fn test_wait_ports_only_pair_with_wait_ports() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();

  graph.add_wait_link("a", "b").expect("wait link");
  let err = graph.add_link(a.wait_out(), b.input("x"));
  assert!(matches!(err, Err(GraphError::WaitPortMismatch { .. })));
}

#[test]
fn test_version_counter_tracks_structural_mutation() {
  let mut graph = empty_graph("flow");
  let v0 = graph.version();

  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();
  assert!(graph.version() > v0);

  let after_tasks = graph.version();
  graph.add_link(a.output("result"), b.input("x")).unwrap();
  assert!(graph.version() > after_tasks);

  // Value assignment is not structural.
  let after_link = graph.version();
  graph.set_input("a", "x", json!(1)).unwrap();
  assert_eq!(graph.version(), after_link);
}

#[test]
fn test_delete_tasks_removes_touching_links() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();
  let c = graph.add_task(TaskKind::Callable(adder("add")), Some("c")).unwrap();

  graph.add_link(a.output("result"), b.input("x")).unwrap();
  graph.add_link(b.output("result"), c.input("x")).unwrap();

  graph.delete_tasks(&["b"]).expect("delete failed");

  assert!(graph.task("b").is_none());
  assert!(graph.links().is_empty());
  assert!(graph.task("a").is_some());
  assert!(graph.task("c").is_some());
}

#[test]
fn test_delete_tasks_is_atomic() {
  let mut graph = empty_graph("flow");
  graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();

  let err = graph.delete_tasks(&["a", "missing"]);
  assert!(matches!(err, Err(GraphError::TaskNotFound(_))));
  assert!(graph.task("a").is_some());
}

#[test]
fn test_set_input_with_socket_source_creates_link() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();

  graph.set_input("b", "y", a.output("result")).expect("link via set_input");

  assert_eq!(graph.links().len(), 1);
  let link = &graph.links()[0];
  assert_eq!(link.from.task, "a");
  assert_eq!(link.to.port, "y");
}

#[test]
fn test_graph_boundary_refs_link_internal_tasks() {
  let schema = GraphSchema::new(
    SocketSpec::namespace([("seed", SocketSpec::leaf(TypeTag::int()))]),
    SocketSpec::namespace([("total", SocketSpec::leaf(TypeTag::int()))]),
  );
  let mut graph = Graph::new("flow", schema).unwrap();
  let add = graph.add_task(TaskKind::Callable(adder("add")), None).unwrap();

  graph.add_link(graph.input_ref("seed"), add.input("x")).expect("input link");
  graph.add_link(add.output("result"), graph.output_ref("total")).expect("output link");

  let topology = Topology::new(&graph);
  assert!(topology.upstream("add").contains(&GRAPH_INPUTS.to_string()));
  assert!(topology.downstream("add").contains(&GRAPH_OUTPUTS.to_string()));
}

#[test]
fn test_toposort_respects_links() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();
  let c = graph.add_task(TaskKind::Callable(adder("add")), Some("c")).unwrap();
  graph.add_task(TaskKind::Callable(adder("add")), Some("d")).unwrap();

  graph.add_link(a.output("result"), b.input("x")).unwrap();
  graph.add_link(b.output("result"), c.input("x")).unwrap();

  let order = Topology::new(&graph).toposort().expect("toposort failed");
  let index = |name: &str| order.iter().position(|n| n == name).unwrap();

  assert!(index("a") < index("b"));
  assert!(index("b") < index("c"));
  // The isolated task is present but unconstrained.
  assert!(order.iter().any(|n| n == "d"));
}

#[test]
fn test_toposort_detects_cycles() {
  let mut graph = empty_graph("flow");
  let a = graph
    .add_task(TaskKind::Callable(adder("add")), Some("a"))
    .unwrap();
  let b = graph
    .add_task(TaskKind::Callable(adder("add")), Some("b"))
    .unwrap();

  graph.add_link(a.output("result"), b.input("x")).unwrap();
  graph.add_link(b.output("result"), a.input("x")).unwrap();

  let err = Topology::new(&graph).toposort();
  match err {
    Err(GraphError::CyclicGraph { remaining }) => {
      assert!(remaining.contains(&"a".to_string()));
      assert!(remaining.contains(&"b".to_string()));
    }
    other => panic!("expected cycle error, got {other:?}"),
  }
}

#[test]
fn test_copy_gives_fresh_identities() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();
  graph.add_link(a.output("result"), b.input("x")).unwrap();
  graph.set_input("a", "x", json!(1)).unwrap();

  let copy = graph.copy();

  assert_ne!(copy.uuid, graph.uuid);
  assert_ne!(copy.task("a").unwrap().uuid, graph.task("a").unwrap().uuid);
  assert_eq!(copy.links().len(), 1);
  assert_eq!(copy.links()[0].from.graph, copy.uuid);
  assert_eq!(
    copy.task("a").unwrap().inputs.collect_values(true),
    Some(json!({ "x": 1 }))
  );
}

#[test]
fn test_copy_subset_keeps_internal_links_only() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();
  let c = graph.add_task(TaskKind::Callable(adder("add")), Some("c")).unwrap();
  graph.add_link(a.output("result"), b.input("x")).unwrap();
  graph.add_link(b.output("result"), c.input("x")).unwrap();

  let subset = graph.copy_subset(&["b", "c"], false).expect("subset failed");

  assert!(subset.task("a").is_none());
  assert_eq!(subset.links().len(), 1);
  assert_eq!(subset.links()[0].from.task, "b");
}

#[test]
fn test_copy_subset_with_refs_preserves_provenance() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();
  graph.add_link(a.output("result"), b.input("x")).unwrap();

  let subset = graph.copy_subset(&["b"], true).expect("subset failed");

  let a_ref = subset.task("a").expect("reference task missing");
  assert!(a_ref.reference);
  assert_eq!(subset.links().len(), 1);
}

#[test]
fn test_def_round_trip() {
  let mut graph = empty_graph("flow");
  let a = graph.add_task(TaskKind::Callable(adder("add")), Some("a")).unwrap();
  let b = graph.add_task(TaskKind::Callable(adder("add")), Some("b")).unwrap();
  graph.add_link(a.output("result"), b.input("y")).unwrap();
  graph.add_wait_link("a", "b").unwrap();
  graph.set_input("a", "x", json!(1)).unwrap();
  graph.set_input("a", "y", json!(2)).unwrap();
  graph.set_input("b", "x", json!(3)).unwrap();

  let def = graph.to_def();
  let encoded = serde_json::to_string(&def).expect("encode failed");
  let decoded = serde_json::from_str(&encoded).expect("decode failed");
  let rebuilt = Graph::from_def(&decoded, &TestResolver).expect("from_def failed");

  assert_eq!(rebuilt.name, graph.name);
  assert_eq!(rebuilt.uuid, graph.uuid);

  let mut names = rebuilt.task_names();
  let mut expected = graph.task_names();
  names.sort_unstable();
  expected.sort_unstable();
  assert_eq!(names, expected);

  let tuples = |g: &Graph| -> Vec<(String, String, String, String)> {
    g.links()
      .iter()
      .map(|l| {
        (
          l.from.task.clone(),
          l.from.port.clone(),
          l.to.task.clone(),
          l.to.port.clone(),
        )
      })
      .collect()
  };
  assert_eq!(tuples(&rebuilt), tuples(&graph));

  assert_eq!(
    rebuilt.task("a").unwrap().inputs.collect_values(true),
    Some(json!({ "x": 1, "y": 2 }))
  );
  assert_eq!(
    rebuilt.task("b").unwrap().inputs.collect_values(true),
    Some(json!({ "x": 3 }))
  );
}

#[test]
fn test_from_def_rejects_unknown_callable() {
  let mut graph = empty_graph("flow");
  graph
    .add_task(TaskKind::Callable(adder("mystery")), None)
    .unwrap();

  let def = graph.to_def();
  let err = Graph::from_def(&def, &TestResolver);
  assert!(matches!(err, Err(GraphError::UnknownCallable(_))));
}
