use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use sluice_schema::TaskSchema;

/// Resolved invocation arguments: top-level input field name → value.
pub type CallableArgs = serde_json::Map<String, Value>;

/// Failure of one callable invocation.
///
/// The engine stamps this text on the provenance record before re-raising.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct CallableError(pub String);

impl CallableError {
  pub fn new(message: impl Into<String>) -> Self {
    Self(message.into())
  }
}

impl From<serde_json::Error> for CallableError {
  fn from(err: serde_json::Error) -> Self {
    Self(err.to_string())
  }
}

/// An executable unit a task can reference.
///
/// `type_id` is the stable registry identifier persisted in a
/// [`GraphDef`](crate::GraphDef); `schema` declares the input and output
/// socket trees the graph materializes for the task.
#[async_trait]
pub trait Callable: Send + Sync + std::fmt::Debug {
  fn type_id(&self) -> &str;

  fn schema(&self) -> TaskSchema;

  async fn call(&self, args: CallableArgs) -> Result<Value, CallableError>;
}

/// Resolves a persisted callable identifier back to an executable.
///
/// Implemented by the registry crate; kept here so graph loading does not
/// depend on any particular registry implementation.
pub trait CallableResolver {
  fn resolve(&self, id: &str) -> Option<Arc<dyn Callable>>;
}

type BoxedFn = dyn Fn(CallableArgs) -> Result<Value, CallableError> + Send + Sync;

/// Adapts a plain closure plus an explicit schema into a [`Callable`].
pub struct FnCallable {
  id: String,
  schema: TaskSchema,
  func: Arc<BoxedFn>,
}

impl FnCallable {
  pub fn new<F>(id: impl Into<String>, schema: TaskSchema, func: F) -> Arc<Self>
  where
    F: Fn(CallableArgs) -> Result<Value, CallableError> + Send + Sync + 'static,
  {
    Arc::new(Self {
      id: id.into(),
      schema,
      func: Arc::new(func),
    })
  }
}

#[async_trait]
impl Callable for FnCallable {
  fn type_id(&self) -> &str {
    &self.id
  }

  fn schema(&self) -> TaskSchema {
    self.schema.clone()
  }

  async fn call(&self, args: CallableArgs) -> Result<Value, CallableError> {
    (self.func)(args)
  }
}

impl std::fmt::Debug for FnCallable {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FnCallable").field("id", &self.id).finish()
  }
}
