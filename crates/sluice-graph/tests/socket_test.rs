//! Tests for socket materialization, assignment, and value collection.

use serde_json::json;
use sluice_graph::Socket;
use sluice_schema::{SchemaError, SocketSpec, TypeTag};

fn point_spec() -> SocketSpec {
  SocketSpec::namespace([
    ("x", SocketSpec::leaf(TypeTag::int())),
    ("y", SocketSpec::leaf(TypeTag::int())),
  ])
}

#[test]
fn test_materialize_fixed_fields() {
  let socket = Socket::materialize(&point_spec());
  assert!(socket.get("x").is_some());
  assert!(socket.get("y").is_some());
  assert!(socket.get("z").is_none());
}

#[test]
fn test_assign_and_collect() {
  let mut socket = Socket::materialize(&point_spec());
  socket.assign("x", json!(2), None).expect("assign x");
  socket.assign("y", json!(3), None).expect("assign y");

  assert_eq!(socket.collect_values(true), Some(json!({ "x": 2, "y": 3 })));
}

#[test]
fn test_unknown_field_on_static_namespace() {
  let mut socket = Socket::materialize(&point_spec());
  let err = socket.assign("z", json!(1), None).expect_err("unknown field accepted");

  match err {
    SchemaError::UnknownField { name, known, .. } => {
      assert_eq!(name, "z");
      assert_eq!(known, vec!["x".to_string(), "y".to_string()]);
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn test_dynamic_namespace_creates_children_from_item() {
  let spec = SocketSpec::dynamic(Some(point_spec()));
  let mut socket = Socket::materialize(&spec);

  socket
    .assign("data", json!({ "x": 2, "y": 3 }), None)
    .expect("assign into dynamic namespace");

  assert_eq!(
    socket.collect_values(true),
    Some(json!({ "data": { "x": 2, "y": 3 } }))
  );

  // The created child enforces the item schema.
  let err = socket.assign("data.z", json!(9), None);
  assert!(matches!(err, Err(SchemaError::UnknownField { .. })));
}

#[test]
fn test_dotted_path_descends_dynamic_namespaces() {
  let mut socket = Socket::materialize(&SocketSpec::dynamic(None));
  socket.assign("a.b.c", json!(7), None).expect("deep assign");

  assert_eq!(
    socket.collect_values(true),
    Some(json!({ "a": { "b": { "c": 7 } } }))
  );
}

#[test]
fn test_mapping_to_leaf_is_shape_mismatch() {
  let mut socket = Socket::materialize(&point_spec());
  let err = socket.assign("x", json!({ "nested": 1 }), None);
  assert!(matches!(err, Err(SchemaError::ShapeMismatch { .. })));
}

#[test]
fn test_scalar_to_namespace_is_shape_mismatch() {
  let spec = SocketSpec::namespace([("point", point_spec())]);
  let mut socket = Socket::materialize(&spec);
  let err = socket.assign("point", json!(5), None);
  assert!(matches!(err, Err(SchemaError::ShapeMismatch { .. })));
}

#[test]
fn test_leaf_type_is_enforced_on_assignment() {
  let mut socket = Socket::materialize(&point_spec());
  let err = socket.assign("x", json!("two"), None);
  assert!(matches!(err, Err(SchemaError::ShapeMismatch { .. })));
}

#[test]
fn test_assignment_is_idempotent() {
  let payload = json!({ "x": 2, "y": 3 });
  let mut socket = Socket::materialize(&SocketSpec::dynamic(Some(point_spec())));

  socket.assign("data", payload.clone(), None).expect("first assign");
  let first = socket.collect_values(true);
  socket.assign("data", payload, None).expect("second assign");
  let second = socket.collect_values(true);

  assert_eq!(first, second);
}

#[test]
fn test_empty_namespaces_are_omitted() {
  let spec = SocketSpec::namespace([
    ("filled", point_spec()),
    ("empty", point_spec()),
  ]);
  let mut socket = Socket::materialize(&spec);
  socket.assign("filled.x", json!(1), None).expect("assign");

  assert_eq!(
    socket.collect_values(true),
    Some(json!({ "filled": { "x": 1 } }))
  );
}

#[test]
fn test_defaults_feed_collection() {
  let spec = SocketSpec::namespace([(
    "n",
    SocketSpec::leaf(TypeTag::int()).with_default(json!(10)),
  )]);
  let socket = Socket::materialize(&spec);

  assert_eq!(socket.collect_values(true), Some(json!({ "n": 10 })));
}

#[test]
fn test_tagged_values_unwrap_with_raw() {
  let mut socket = Socket::materialize(&point_spec());
  socket.assign("x", json!(2), Some("producer.out")).expect("assign");

  assert_eq!(socket.collect_values(true), Some(json!({ "x": 2 })));
  assert_eq!(
    socket.collect_values(false),
    Some(json!({ "x": { "value": 2, "origin": "producer.out" } }))
  );
}

#[test]
fn test_to_spec_reflects_dynamic_children() {
  let mut socket = Socket::materialize(&SocketSpec::dynamic(None));
  socket.assign("a", json!(1), None).expect("assign");

  let spec = socket.to_spec();
  assert!(spec.is_dynamic());
  assert!(spec.fields().unwrap().contains_key("a"));

  // Rebuilding from the reconstructed spec accepts the same assignment.
  let mut rebuilt = Socket::materialize(&spec);
  rebuilt.assign("a", json!(2), None).expect("assign on rebuilt");
}
