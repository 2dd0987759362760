use serde::{Deserialize, Serialize};

/// Leaf type identifier for a socket.
///
/// Tags are plain strings so hosts can introduce their own identifiers; the
/// well-known tags below additionally validate literal values. The `any` tag
/// is universal: it is compatible with every other tag and admits every
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
  pub fn new(tag: impl Into<String>) -> Self {
    Self(tag.into())
  }

  /// The universal type, compatible with everything.
  pub fn any() -> Self {
    Self("any".to_string())
  }

  pub fn bool() -> Self {
    Self("bool".to_string())
  }

  pub fn int() -> Self {
    Self("int".to_string())
  }

  pub fn float() -> Self {
    Self("float".to_string())
  }

  pub fn str() -> Self {
    Self("str".to_string())
  }

  pub fn list() -> Self {
    Self("list".to_string())
  }

  pub fn map() -> Self {
    Self("map".to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_any(&self) -> bool {
    self.0 == "any"
  }

  /// Whether a link between two leaves with these tags is type-correct:
  /// identical identifiers, or either side is `any`.
  pub fn compatible_with(&self, other: &TypeTag) -> bool {
    self.is_any() || other.is_any() || self.0 == other.0
  }

  /// Whether a literal value satisfies this tag.
  ///
  /// Only the well-known tags constrain the value shape; unknown
  /// (host-defined) tags admit any value.
  pub fn admits(&self, value: &serde_json::Value) -> bool {
    match self.0.as_str() {
      "any" => true,
      "bool" => value.is_boolean(),
      "int" => value.is_i64() || value.is_u64(),
      "float" => value.is_number(),
      "str" => value.is_string(),
      "list" => value.is_array(),
      "map" => value.is_object(),
      _ => true,
    }
  }
}

impl From<&str> for TypeTag {
  fn from(tag: &str) -> Self {
    Self(tag.to_string())
  }
}

impl From<String> for TypeTag {
  fn from(tag: String) -> Self {
    Self(tag)
  }
}

impl std::fmt::Display for TypeTag {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}
