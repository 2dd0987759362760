//! Live socket trees.
//!
//! A [`Socket`] is the runtime materialization of a
//! [`SocketSpec`](sluice_schema::SocketSpec): a leaf holding one value slot,
//! or a namespace holding an ordered map of child sockets. Dynamic
//! namespaces create new children on first assignment.
//!
//! All shape and type errors are raised synchronously at assignment time;
//! the typed schema is the single source of truth for safety, so nothing is
//! deferred to execution.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sluice_schema::{SchemaError, SocketSpec, TypeTag};

/// A stored leaf value plus its provenance tag.
///
/// `origin` is the `"task.port"` that produced the value when it arrived
/// over a link; literals assigned directly carry no origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datum {
  pub value: Value,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub origin: Option<String>,
}

impl Datum {
  pub fn literal(value: Value) -> Self {
    Self {
      value,
      origin: None,
    }
  }

  pub fn produced(value: Value, origin: impl Into<String>) -> Self {
    Self {
      value,
      origin: Some(origin.into()),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafSocket {
  pub type_tag: TypeTag,
  pub default: Option<Value>,
  pub link_limit: Option<u32>,
  pub value: Option<Datum>,
}

impl LeafSocket {
  /// The assigned value, falling back to the spec default.
  pub fn effective(&self) -> Option<Datum> {
    self
      .value
      .clone()
      .or_else(|| self.default.clone().map(Datum::literal))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceSocket {
  pub children: IndexMap<String, Socket>,
  pub dynamic: bool,
  pub item: Option<SocketSpec>,
  pub link_limit: Option<u32>,
}

/// A runtime socket: a leaf value slot or a namespace of child sockets.
#[derive(Debug, Clone, PartialEq)]
pub enum Socket {
  Leaf(LeafSocket),
  Namespace(NamespaceSocket),
}

impl Socket {
  /// Build a live socket tree from a spec.
  ///
  /// Fixed namespace fields are materialized recursively; a dynamic
  /// namespace remembers its `item` schema for on-demand child creation.
  pub fn materialize(spec: &SocketSpec) -> Socket {
    match spec {
      SocketSpec::Leaf {
        type_tag,
        default,
        link_limit,
      } => Socket::Leaf(LeafSocket {
        type_tag: type_tag.clone(),
        default: default.clone(),
        link_limit: *link_limit,
        value: None,
      }),
      SocketSpec::Namespace {
        fields,
        dynamic,
        item,
        link_limit,
      } => Socket::Namespace(NamespaceSocket {
        children: fields
          .iter()
          .map(|(name, field)| (name.clone(), Socket::materialize(field)))
          .collect(),
        dynamic: *dynamic,
        item: item.as_deref().cloned(),
        link_limit: *link_limit,
      }),
    }
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self, Socket::Leaf(_))
  }

  pub fn is_namespace(&self) -> bool {
    matches!(self, Socket::Namespace(_))
  }

  pub fn as_leaf(&self) -> Option<&LeafSocket> {
    match self {
      Socket::Leaf(leaf) => Some(leaf),
      Socket::Namespace(_) => None,
    }
  }

  pub fn as_namespace(&self) -> Option<&NamespaceSocket> {
    match self {
      Socket::Leaf(_) => None,
      Socket::Namespace(ns) => Some(ns),
    }
  }

  pub fn link_limit(&self) -> Option<u32> {
    match self {
      Socket::Leaf(leaf) => leaf.link_limit,
      Socket::Namespace(ns) => ns.link_limit,
    }
  }

  /// Resolve a dotted path to a socket. An empty path is the socket itself.
  pub fn get(&self, path: &str) -> Option<&Socket> {
    if path.is_empty() {
      return Some(self);
    }
    let (head, rest) = split_path(path);
    match self {
      Socket::Leaf(_) => None,
      Socket::Namespace(ns) => {
        let child = ns.children.get(head)?;
        match rest {
          Some(rest) => child.get(rest),
          None => Some(child),
        }
      }
    }
  }

  /// Assign a value at a dotted path.
  ///
  /// Descends through namespaces, auto-creating intermediate children only
  /// along dynamic namespaces. Unknown keys on a static namespace raise
  /// [`SchemaError::UnknownField`]; a mapping assigned to a non-`map` leaf
  /// or a scalar assigned to a namespace raise
  /// [`SchemaError::ShapeMismatch`].
  pub fn assign(&mut self, path: &str, value: Value, origin: Option<&str>) -> Result<(), SchemaError> {
    if path.is_empty() {
      return self.assign_self("", value, origin);
    }
    self.assign_at("", path, value, origin)
  }

  /// Assign every entry of a mapping, in order.
  pub fn assign_map(
    &mut self,
    values: &serde_json::Map<String, Value>,
    origin: Option<&str>,
  ) -> Result<(), SchemaError> {
    for (name, value) in values {
      self.assign(name, value.clone(), origin)?;
    }
    Ok(())
  }

  fn assign_at(
    &mut self,
    at: &str,
    path: &str,
    value: Value,
    origin: Option<&str>,
  ) -> Result<(), SchemaError> {
    let (head, rest) = split_path(path);
    let here = join_path(at, head);

    let ns = match self {
      Socket::Leaf(_) => {
        return Err(SchemaError::ShapeMismatch {
          path: at.to_string(),
          expected: "namespace".to_string(),
          got: "leaf".to_string(),
        });
      }
      Socket::Namespace(ns) => ns,
    };

    if !ns.children.contains_key(head) {
      if !ns.dynamic {
        return Err(SchemaError::UnknownField {
          namespace: at.to_string(),
          name: head.to_string(),
          known: ns.children.keys().cloned().collect(),
        });
      }
      let child = new_dynamic_child(ns.item.as_ref(), rest.is_some(), &value, &here)?;
      ns.children.insert(head.to_string(), child);
    }

    let child = ns
      .children
      .get_mut(head)
      .ok_or_else(|| SchemaError::UnknownField {
        namespace: at.to_string(),
        name: head.to_string(),
        known: Vec::new(),
      })?;

    match rest {
      Some(rest) => child.assign_at(&here, rest, value, origin),
      None => child.assign_self(&here, value, origin),
    }
  }

  /// Assign a value to this socket itself: a leaf takes a literal, a
  /// namespace takes a mapping distributed over its entries.
  fn assign_self(&mut self, at: &str, value: Value, origin: Option<&str>) -> Result<(), SchemaError> {
    match self {
      Socket::Leaf(leaf) => {
        if value.is_object() && leaf.type_tag.as_str() != "map" {
          return Err(SchemaError::ShapeMismatch {
            path: at.to_string(),
            expected: format!("leaf value of type '{}'", leaf.type_tag),
            got: "mapping".to_string(),
          });
        }
        if !leaf.type_tag.admits(&value) {
          return Err(SchemaError::ShapeMismatch {
            path: at.to_string(),
            expected: format!("value of type '{}'", leaf.type_tag),
            got: json_type_name(&value).to_string(),
          });
        }
        leaf.value = Some(match origin {
          Some(origin) => Datum::produced(value, origin),
          None => Datum::literal(value),
        });
        Ok(())
      }
      Socket::Namespace(_) => match value {
        Value::Object(entries) => {
          for (name, value) in entries {
            self.assign_at(at, &name, value, origin)?;
          }
          Ok(())
        }
        other => Err(SchemaError::ShapeMismatch {
          path: at.to_string(),
          expected: "mapping".to_string(),
          got: json_type_name(&other).to_string(),
        }),
      },
    }
  }

  /// Recursively gather populated leaf values into a nested mapping.
  ///
  /// Namespaces with no populated children are omitted entirely. With
  /// `raw`, values are unwrapped from the provenance tag; otherwise values
  /// that arrived over a link are returned as `{ "value": …, "origin": … }`
  /// objects.
  pub fn collect_values(&self, raw: bool) -> Option<Value> {
    match self {
      Socket::Leaf(leaf) => leaf.effective().map(|datum| match (&datum.origin, raw) {
        (Some(origin), false) => serde_json::json!({
          "value": datum.value,
          "origin": origin,
        }),
        _ => datum.value,
      }),
      Socket::Namespace(ns) => {
        let mut out = serde_json::Map::new();
        for (name, child) in &ns.children {
          if let Some(value) = child.collect_values(raw) {
            out.insert(name.clone(), value);
          }
        }
        if out.is_empty() {
          None
        } else {
          Some(Value::Object(out))
        }
      }
    }
  }

  /// Reconstruct a spec describing this socket's current shape.
  ///
  /// Children created dynamically since materialization appear as fixed
  /// fields (alongside `dynamic = true`), so a graph rebuilt from the spec
  /// accepts the same assignments and links.
  pub fn to_spec(&self) -> SocketSpec {
    match self {
      Socket::Leaf(leaf) => SocketSpec::Leaf {
        type_tag: leaf.type_tag.clone(),
        default: leaf.default.clone(),
        link_limit: leaf.link_limit,
      },
      Socket::Namespace(ns) => SocketSpec::Namespace {
        fields: ns
          .children
          .iter()
          .map(|(name, child)| (name.clone(), child.to_spec()))
          .collect(),
        dynamic: ns.dynamic,
        item: ns.item.clone().map(Box::new),
        link_limit: ns.link_limit,
      },
    }
  }

  /// Populated leaves as `(dotted path, datum)` pairs, in namespace order.
  ///
  /// Defaults are not included: only values that were actually assigned.
  pub fn leaf_entries(&self) -> Vec<(String, &Datum)> {
    let mut out = Vec::new();
    self.leaf_entries_at("", &mut out);
    out
  }

  fn leaf_entries_at<'a>(&'a self, at: &str, out: &mut Vec<(String, &'a Datum)>) {
    match self {
      Socket::Leaf(leaf) => {
        if let Some(datum) = &leaf.value {
          out.push((at.to_string(), datum));
        }
      }
      Socket::Namespace(ns) => {
        for (name, child) in &ns.children {
          child.leaf_entries_at(&join_path(at, name), out);
        }
      }
    }
  }
}

/// Create a child for a dynamic namespace.
///
/// With an `item` schema the child is materialized from it exactly. Without
/// one, the child's shape is inferred from the assigned value: a mapping
/// (or a deeper path) becomes a nested dynamic namespace, anything else a
/// leaf of type `any`.
fn new_dynamic_child(
  item: Option<&SocketSpec>,
  descending: bool,
  value: &Value,
  at: &str,
) -> Result<Socket, SchemaError> {
  match item {
    Some(spec) => {
      if descending && spec.is_leaf() {
        return Err(SchemaError::ShapeMismatch {
          path: at.to_string(),
          expected: "namespace item".to_string(),
          got: "leaf item".to_string(),
        });
      }
      Ok(Socket::materialize(spec))
    }
    None => {
      if descending || value.is_object() {
        Ok(Socket::Namespace(NamespaceSocket {
          children: IndexMap::new(),
          dynamic: true,
          item: None,
          link_limit: None,
        }))
      } else {
        Ok(Socket::materialize(&SocketSpec::leaf(TypeTag::any())))
      }
    }
  }
}

pub(crate) fn split_path(path: &str) -> (&str, Option<&str>) {
  match path.split_once('.') {
    Some((head, rest)) => (head, Some(rest)),
    None => (path, None),
  }
}

pub(crate) fn join_path(at: &str, name: &str) -> String {
  if at.is_empty() {
    name.to_string()
  } else {
    format!("{at}.{name}")
  }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "mapping",
  }
}
