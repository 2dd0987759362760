//! The schema-inference collaborator seam.
//!
//! Sluice does not inspect callables itself. A host that can reflect over a
//! callable's signature implements [`SchemaSource`] and hands back a
//! [`TaskSchema`]; hosts without reflection construct the schema explicitly.
//! The expected mapping for reflective hosts: positional-only parameter
//! groups become an `args` namespace, keyword parameters a `kwargs`
//! namespace, and variadic groups dynamic namespaces.

use serde::{Deserialize, Serialize};

use crate::spec::SocketSpec;

/// The input and output schemas of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSchema {
  pub inputs: SocketSpec,
  pub outputs: SocketSpec,
}

impl TaskSchema {
  pub fn new(inputs: SocketSpec, outputs: SocketSpec) -> Self {
    Self { inputs, outputs }
  }

  /// Apply explicit overrides to an inferred schema.
  ///
  /// An explicit schema always wins over inference for its side; a `None`
  /// override keeps the inferred side.
  pub fn with_overrides(
    self,
    inputs: Option<SocketSpec>,
    outputs: Option<SocketSpec>,
  ) -> Self {
    Self {
      inputs: inputs.unwrap_or(self.inputs),
      outputs: outputs.unwrap_or(self.outputs),
    }
  }
}

/// Black box that produces a schema for a callable.
pub trait SchemaSource {
  fn infer_schema(&self) -> TaskSchema;
}
