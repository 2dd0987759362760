use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvenanceError {
  #[error("unknown process id '{0}'")]
  UnknownProcess(String),
}
