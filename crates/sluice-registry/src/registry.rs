use std::collections::BTreeMap;
use std::sync::Arc;

use sluice_graph::{Callable, CallableResolver};

use crate::error::RegistryError;

/// Factory producing a fresh executable for one registered identifier.
pub type CallableFactory = Arc<dyn Fn() -> Arc<dyn Callable> + Send + Sync>;

/// Registry of executable units, keyed by stable string identifier.
pub trait CallableRegistry: Send + Sync {
  fn get(&self, id: &str) -> Result<Arc<dyn Callable>, RegistryError>;

  fn list(&self) -> Vec<String>;
}

/// In-memory registry populated once at process start.
#[derive(Default)]
pub struct StaticCallableRegistry {
  factories: BTreeMap<String, CallableFactory>,
}

impl StaticCallableRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a factory under an identifier. Duplicate registration is an
  /// error so configuration mistakes surface at startup.
  pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> Result<(), RegistryError>
  where
    F: Fn() -> Arc<dyn Callable> + Send + Sync + 'static,
  {
    let id = id.into();
    if self.factories.contains_key(&id) {
      return Err(RegistryError::DuplicateCallable(id));
    }
    self.factories.insert(id, Arc::new(factory));
    Ok(())
  }

  /// Register a single shared callable under its own `type_id`.
  pub fn register_callable(&mut self, callable: Arc<dyn Callable>) -> Result<(), RegistryError> {
    let id = callable.type_id().to_string();
    self.register(id, move || Arc::clone(&callable))
  }
}

impl CallableRegistry for StaticCallableRegistry {
  fn get(&self, id: &str) -> Result<Arc<dyn Callable>, RegistryError> {
    match self.factories.get(id) {
      Some(factory) => Ok(factory()),
      None => Err(RegistryError::UnknownCallable {
        id: id.to_string(),
        known: self.list(),
      }),
    }
  }

  fn list(&self) -> Vec<String> {
    self.factories.keys().cloned().collect()
  }
}

impl CallableResolver for StaticCallableRegistry {
  fn resolve(&self, id: &str) -> Option<Arc<dyn Callable>> {
    self.factories.get(id).map(|factory| factory())
  }
}
