use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("unknown callable '{id}' (registered: {known:?})")]
  UnknownCallable { id: String, known: Vec<String> },

  #[error("callable '{0}' is already registered")]
  DuplicateCallable(String),
}
