//! Reconciling a return value against a task's declared output schema.

use serde_json::Value;
use tracing::warn;

use sluice_graph::{Socket, Task};

/// Write a task's return value into its output namespace.
///
/// Shapes accepted:
/// - an array against a multi-field schema fills fields positionally;
/// - a mapping fills fields by name (dynamic output schemas accept
///   arbitrary extra keys);
/// - a bare value against a single-field schema is absorbed under that one
///   field name.
///
/// Mismatches — a declared field without a default that the return did not
/// produce, an unexpected key on a static schema, a value the field's type
/// rejects — are reported as warnings and never fail the run, to tolerate
/// loosely-typed executables.
pub(crate) fn reconcile_outputs(task: &mut Task, value: &Value) {
  let origin_base = task.name.clone();

  let ns = match &task.outputs {
    Socket::Leaf(_) => {
      // Single-leaf output schema: the return value is the output.
      if let Err(err) = task.outputs.assign("", value.clone(), Some(&origin_base)) {
        warn!(task = %task.name, error = %err, "return value does not satisfy output schema");
      }
      return;
    }
    Socket::Namespace(ns) => ns,
  };

  let field_names: Vec<String> = ns.children.keys().cloned().collect();
  let dynamic = ns.dynamic;

  match value {
    Value::Array(items) if field_names.len() > 1 => {
      if items.len() != field_names.len() {
        warn!(
          task = %task.name,
          produced = items.len(),
          declared = field_names.len(),
          "positional return length does not match output schema"
        );
      }
      for (name, item) in field_names.iter().zip(items) {
        assign_output(task, name, item, &origin_base);
      }
    }
    Value::Object(map) => {
      for (name, item) in map {
        if !dynamic && !field_names.iter().any(|f| f == name) {
          warn!(task = %task.name, field = %name, "unexpected output field");
          continue;
        }
        assign_output(task, name, item, &origin_base);
      }
      for name in &field_names {
        if !map.contains_key(name) && !has_default(&task.outputs, name) {
          warn!(task = %task.name, field = %name, "declared output field was not produced");
        }
      }
    }
    other => {
      if field_names.len() == 1 {
        let name = field_names[0].clone();
        assign_output(task, &name, other, &origin_base);
      } else {
        warn!(
          task = %task.name,
          got = %json_kind(other),
          "return value does not match output schema"
        );
      }
    }
  }
}

fn assign_output(task: &mut Task, name: &str, value: &Value, origin_base: &str) {
  let origin = format!("{origin_base}.{name}");
  if let Err(err) = task.outputs.assign(name, value.clone(), Some(&origin)) {
    warn!(task = %task.name, field = %name, error = %err, "output value rejected by schema");
  }
}

fn has_default(outputs: &Socket, name: &str) -> bool {
  outputs
    .get(name)
    .and_then(|s| s.as_leaf())
    .map(|leaf| leaf.default.is_some())
    .unwrap_or(false)
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "mapping",
  }
}
