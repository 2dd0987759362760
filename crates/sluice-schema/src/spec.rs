use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::RESERVED_PREFIX;
use crate::error::SchemaError;
use crate::type_tag::TypeTag;

fn leaf_link_limit() -> Option<u32> {
  Some(1)
}

/// Immutable description of a socket's shape.
///
/// A spec is either a leaf (one typed value slot) or a namespace (an ordered
/// mapping of named child specs, optionally dynamic). Defaults exist only on
/// leaves; `item` exists only on dynamic namespaces and is the schema every
/// dynamically-added child must satisfy.
///
/// `link_limit` caps inbound links on the materialized socket: `Some(n)` for
/// at most `n`, `None` for unlimited. Leaves default to one inbound link,
/// namespaces to unlimited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SocketSpec {
  Leaf {
    #[serde(rename = "type")]
    type_tag: TypeTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<serde_json::Value>,
    #[serde(default = "leaf_link_limit")]
    link_limit: Option<u32>,
  },
  Namespace {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    fields: IndexMap<String, SocketSpec>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    dynamic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item: Option<Box<SocketSpec>>,
    #[serde(default)]
    link_limit: Option<u32>,
  },
}

impl SocketSpec {
  /// A leaf spec with the default inbound link limit of one.
  pub fn leaf(type_tag: impl Into<TypeTag>) -> Self {
    SocketSpec::Leaf {
      type_tag: type_tag.into(),
      default: None,
      link_limit: Some(1),
    }
  }

  /// A static namespace with the given fixed fields, in order.
  pub fn namespace<K, I>(fields: I) -> Self
  where
    K: Into<String>,
    I: IntoIterator<Item = (K, SocketSpec)>,
  {
    SocketSpec::Namespace {
      fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
      dynamic: false,
      item: None,
      link_limit: None,
    }
  }

  /// A static namespace with no fields.
  pub fn empty() -> Self {
    Self::namespace(std::iter::empty::<(String, SocketSpec)>())
  }

  /// A dynamic namespace. New children are created on first assignment;
  /// with an `item` schema they must match it, without one their shape is
  /// inferred from the assigned value.
  pub fn dynamic(item: Option<SocketSpec>) -> Self {
    SocketSpec::Namespace {
      fields: IndexMap::new(),
      dynamic: true,
      item: item.map(Box::new),
      link_limit: None,
    }
  }

  /// Set the leaf default. No effect on namespaces, which cannot carry one.
  pub fn with_default(mut self, value: serde_json::Value) -> Self {
    if let SocketSpec::Leaf { default, .. } = &mut self {
      *default = Some(value);
    }
    self
  }

  /// Override the inbound link limit (`None` = unlimited).
  pub fn with_link_limit(mut self, limit: Option<u32>) -> Self {
    match &mut self {
      SocketSpec::Leaf { link_limit, .. } => *link_limit = limit,
      SocketSpec::Namespace { link_limit, .. } => *link_limit = limit,
    }
    self
  }

  /// Add a fixed field to a namespace spec. No effect on leaves.
  pub fn with_field(mut self, name: impl Into<String>, spec: SocketSpec) -> Self {
    if let SocketSpec::Namespace { fields, .. } = &mut self {
      fields.insert(name.into(), spec);
    }
    self
  }

  pub fn is_leaf(&self) -> bool {
    matches!(self, SocketSpec::Leaf { .. })
  }

  pub fn is_namespace(&self) -> bool {
    matches!(self, SocketSpec::Namespace { .. })
  }

  pub fn is_dynamic(&self) -> bool {
    matches!(self, SocketSpec::Namespace { dynamic: true, .. })
  }

  pub fn link_limit(&self) -> Option<u32> {
    match self {
      SocketSpec::Leaf { link_limit, .. } => *link_limit,
      SocketSpec::Namespace { link_limit, .. } => *link_limit,
    }
  }

  pub fn type_tag(&self) -> Option<&TypeTag> {
    match self {
      SocketSpec::Leaf { type_tag, .. } => Some(type_tag),
      SocketSpec::Namespace { .. } => None,
    }
  }

  pub fn fields(&self) -> Option<&IndexMap<String, SocketSpec>> {
    match self {
      SocketSpec::Leaf { .. } => None,
      SocketSpec::Namespace { fields, .. } => Some(fields),
    }
  }

  pub fn item(&self) -> Option<&SocketSpec> {
    match self {
      SocketSpec::Leaf { .. } => None,
      SocketSpec::Namespace { item, .. } => item.as_deref(),
    }
  }

  /// Validate the spec tree.
  ///
  /// Checks leaf defaults against their type tags, rejects `item` on
  /// non-dynamic namespaces, and rejects field names the runtime reserves
  /// for itself.
  pub fn validate(&self) -> Result<(), SchemaError> {
    self.validate_at(&mut Vec::new())
  }

  fn validate_at(&self, path: &mut Vec<String>) -> Result<(), SchemaError> {
    match self {
      SocketSpec::Leaf {
        type_tag, default, ..
      } => {
        if let Some(value) = default {
          if !type_tag.admits(value) {
            return Err(SchemaError::InvalidDefault {
              path: path.join("."),
              message: format!("default does not satisfy type '{type_tag}'"),
            });
          }
        }
        Ok(())
      }
      SocketSpec::Namespace {
        fields,
        dynamic,
        item,
        ..
      } => {
        if item.is_some() && !dynamic {
          return Err(SchemaError::ItemWithoutDynamic {
            path: path.join("."),
          });
        }
        if let Some(item) = item {
          path.push("<item>".to_string());
          item.validate_at(path)?;
          path.pop();
        }
        for (name, field) in fields {
          if name.is_empty() || name.contains('.') || name.starts_with(RESERVED_PREFIX) {
            return Err(SchemaError::ReservedName { name: name.clone() });
          }
          path.push(name.clone());
          field.validate_at(path)?;
          path.pop();
        }
        Ok(())
      }
    }
  }
}
