//! Per-task invocation argument resolution.

use serde_json::{Map, Value};

use sluice_graph::{Graph, Link, SocketRef, Task, PORT_ALL_OUTPUTS};

/// Build a task's invocation arguments.
///
/// Literal (non-linked) socket values come first; every inbound data link
/// then contributes the producer's current output value at the source port
/// (the producer's whole output mapping when the source is the `_outputs`
/// alias). A field fed by exactly one link resolves to that value; a field
/// fed by several links bundles them into a sub-mapping keyed
/// `"{producer}_{port}"`. Wait links are excluded entirely.
///
/// The bundle key concatenation can collide if one producer/port pair
/// legitimately spells another's key; this is a known, unguarded ambiguity.
pub(crate) fn resolve_args(graph: &Graph, task: &Task) -> Map<String, Value> {
  let mut args = match task.inputs.collect_values(true) {
    Some(Value::Object(map)) => map,
    _ => Map::new(),
  };

  for (port, links) in group_links(graph, &task.name) {
    let value = if links.len() == 1 {
      producer_value(graph, &links[0].from).unwrap_or(Value::Null)
    } else {
      let mut bundle = Map::new();
      for link in &links {
        let key = bundle_key(&link.from);
        bundle.insert(key, producer_value(graph, &link.from).unwrap_or(Value::Null));
      }
      Value::Object(bundle)
    };
    if port.is_empty() {
      // Link into the whole input namespace: merge field-by-field.
      if let Value::Object(map) = value {
        for (name, value) in map {
          args.insert(name, value);
        }
      }
    } else {
      insert_at_path(&mut args, &port, value);
    }
  }

  args
}

/// The producer's current value at a source port.
pub(crate) fn producer_value(graph: &Graph, from: &SocketRef) -> Option<Value> {
  let task = graph.task(&from.task)?;
  let port = if from.port == PORT_ALL_OUTPUTS {
    ""
  } else {
    from.port.as_str()
  };
  task.outputs.get(port)?.collect_values(true)
}

/// Inbound data links grouped by target port, in link insertion order.
fn group_links<'a>(graph: &'a Graph, task: &'a str) -> Vec<(String, Vec<&'a Link>)> {
  let mut groups: Vec<(String, Vec<&'a Link>)> = Vec::new();
  for link in graph.links_into_task(task) {
    if link.is_wait() {
      continue;
    }
    match groups.iter_mut().find(|(port, _)| *port == link.to.port) {
      Some((_, links)) => links.push(link),
      None => groups.push((link.to.port.clone(), vec![link])),
    }
  }
  groups
}

fn bundle_key(from: &SocketRef) -> String {
  format!("{}_{}", from.task, from.port.replace('.', "_"))
}

/// Insert a value at a dotted path, creating intermediate objects. A link
/// value at a path wins over a literal stored at the same path.
fn insert_at_path(args: &mut Map<String, Value>, path: &str, value: Value) {
  match path.split_once('.') {
    None => {
      args.insert(path.to_string(), value);
    }
    Some((head, rest)) => {
      let slot = args
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
      if !slot.is_object() {
        *slot = Value::Object(Map::new());
      }
      if let Value::Object(map) = slot {
        insert_at_path(map, rest, value);
      }
    }
  }
}
