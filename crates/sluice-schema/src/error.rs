use thiserror::Error;

/// Errors raised while defining schemas or assigning values against them.
///
/// All of these are synchronous build-time errors; nothing in this taxonomy
/// is deferred to execution.
#[derive(Debug, Error)]
pub enum SchemaError {
  /// A key was assigned into a static namespace that does not declare it.
  #[error("unknown field '{name}' in namespace '{namespace}' (known fields: {known:?})")]
  UnknownField {
    namespace: String,
    name: String,
    known: Vec<String>,
  },

  /// A mapping was assigned to a leaf, a scalar to a namespace, or a leaf
  /// literal does not satisfy the leaf's type tag.
  #[error("shape mismatch at '{path}': expected {expected}, got {got}")]
  ShapeMismatch {
    path: String,
    expected: String,
    got: String,
  },

  /// A leaf default does not satisfy the leaf's type tag.
  #[error("invalid default at '{path}': {message}")]
  InvalidDefault { path: String, message: String },

  /// A field name is empty, contains a path separator, or starts with the
  /// reserved bookkeeping prefix.
  #[error("invalid field name '{name}': must be non-empty, contain no '.', and not start with '_'")]
  ReservedName { name: String },

  /// An `item` schema was declared on a namespace that is not dynamic.
  #[error("item schema at '{path}' requires a dynamic namespace")]
  ItemWithoutDynamic { path: String },
}
