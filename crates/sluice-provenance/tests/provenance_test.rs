//! Tests for the provenance recorder: attempt ids, content-hash
//! deduplication, edge labels, and export.

use serde_json::json;
use sluice_provenance::{content_hash, LabelKind, ProcessState, ProvenanceRecorder};

fn as_map(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
  match value {
    serde_json::Value::Object(map) => map,
    other => panic!("expected object, got {other}"),
  }
}

#[test]
fn test_attempt_ids_are_monotonic_per_task() {
  let recorder = ProvenanceRecorder::new("flow", "flow-1");

  let first = recorder.process_start("add", "add", None);
  let second = recorder.process_start("add", "add", None);
  let other = recorder.process_start("mul", "mul", None);

  assert_eq!(first.as_str(), "proc:add:1");
  assert_eq!(second.as_str(), "proc:add:2");
  assert_eq!(other.as_str(), "proc:mul:1");
}

#[test]
fn test_inputs_become_labeled_data_edges() {
  let recorder = ProvenanceRecorder::new("flow", "flow-1");
  let pid = recorder.process_start("add", "add", None);

  recorder
    .record_inputs(&pid, &as_map(json!({ "x": 1, "nested": { "y": 2 } })))
    .expect("record_inputs failed");

  let export = recorder.export();
  let labels: Vec<&str> = export.edges.iter().map(|e| e.label.as_str()).collect();
  assert!(labels.contains(&"input:x"));
  assert!(labels.contains(&"input:nested.y"));

  let x_edge = export
    .edges
    .iter()
    .find(|e| e.label == "input:x")
    .expect("input:x edge missing");
  assert_eq!(x_edge.from, content_hash(&json!(1)));
  assert_eq!(x_edge.to, "proc:add:1");
}

#[test]
fn test_identical_values_share_one_data_node() {
  let recorder = ProvenanceRecorder::new("flow", "flow-1");
  let first = recorder.process_start("a", "a", None);
  let second = recorder.process_start("b", "b", None);

  recorder.record_inputs(&first, &as_map(json!({ "x": 3 }))).unwrap();
  recorder.record_inputs(&second, &as_map(json!({ "y": 3 }))).unwrap();

  let export = recorder.export();
  assert_eq!(export.data_nodes.len(), 1);
  assert_eq!(export.edges.len(), 2);
}

#[test]
fn test_content_hash_ignores_key_order() {
  let a = json!({ "x": 1, "y": { "b": 2, "a": 3 } });
  let b = json!({ "y": { "a": 3, "b": 2 }, "x": 1 });
  assert_eq!(content_hash(&a), content_hash(&b));
  assert_ne!(content_hash(&a), content_hash(&json!({ "x": 1 })));
}

#[test]
fn test_outputs_and_returns_are_labeled() {
  let recorder = ProvenanceRecorder::new("flow", "flow-1");
  let pid = recorder.process_start("add", "add", None);

  recorder
    .record_outputs(&pid, &json!({ "result": 3 }), LabelKind::Output)
    .unwrap();
  recorder.record_outputs(&pid, &json!(3), LabelKind::Return).unwrap();

  let export = recorder.export();
  let labels: Vec<&str> = export.edges.iter().map(|e| e.label.as_str()).collect();
  assert!(labels.contains(&"output:result"));
  assert!(labels.contains(&"return"));

  let out_edge = export.edges.iter().find(|e| e.label == "output:result").unwrap();
  assert_eq!(out_edge.from, "proc:add:1");
}

#[test]
fn test_process_end_stamps_state_and_error() {
  let recorder = ProvenanceRecorder::new("flow", "flow-1");
  let pid = recorder.process_start("add", "add", None);

  recorder
    .process_end(&pid, ProcessState::Failed, Some("boom".to_string()))
    .unwrap();

  let node = recorder.process(&pid).expect("process missing");
  assert_eq!(node.state, ProcessState::Failed);
  assert_eq!(node.error.as_deref(), Some("boom"));
  assert!(node.ended_at.is_some());
  assert!(node.ended_at.unwrap() >= node.started_at);
}

#[test]
fn test_call_edges_thread_the_parent() {
  let recorder = ProvenanceRecorder::new("flow", "flow-1");
  let parent = recorder.process_start("outer", "subflow", None);
  let child = recorder.process_start("inner", "add", Some(&parent));

  let export = recorder.export();
  let call = export.edges.iter().find(|e| e.label == "call").expect("call edge missing");
  assert_eq!(call.from, parent.as_str());
  assert_eq!(call.to, child.as_str());

  let node = recorder.process(&child).unwrap();
  assert_eq!(node.parent, Some(parent));
}

#[test]
fn test_unknown_process_is_rejected() {
  let recorder = ProvenanceRecorder::new("flow", "flow-1");
  let unknown = sluice_provenance::ProcessId::new("proc:ghost:1");

  let err = recorder.record_inputs(&unknown, &as_map(json!({ "x": 1 })));
  assert!(err.is_err());

  let err = recorder.process_end(&unknown, ProcessState::Finished, None);
  assert!(err.is_err());
}

#[test]
fn test_dot_export_shapes() {
  let recorder = ProvenanceRecorder::new("flow", "flow-1");
  let pid = recorder.process_start("add", "add", None);
  recorder.record_inputs(&pid, &as_map(json!({ "x": 1 }))).unwrap();

  let dot = recorder.to_dot();
  assert!(dot.starts_with("digraph provenance {"));
  assert!(dot.contains("shape=box"));
  assert!(dot.contains("shape=ellipse"));
  assert!(dot.contains("input:x"));
}

#[test]
fn test_export_round_trips_through_json() {
  let recorder = ProvenanceRecorder::new("flow", "flow-1");
  let pid = recorder.process_start("add", "add", None);
  recorder.record_inputs(&pid, &as_map(json!({ "x": 1 }))).unwrap();
  recorder.process_end(&pid, ProcessState::Finished, None).unwrap();

  let export = recorder.export();
  let encoded = serde_json::to_string(&export).expect("encode failed");
  let decoded: sluice_provenance::ProvenanceExport =
    serde_json::from_str(&encoded).expect("decode failed");
  assert_eq!(decoded, export);
}
