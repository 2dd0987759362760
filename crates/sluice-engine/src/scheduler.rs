//! The scheduler collaborator seam.
//!
//! The engine hands a batch of ready, independent tasks to a [`Scheduler`]
//! and expects one result per invocation, keyed by task name. Any substrate
//! (thread pool, process pool, remote workers) may implement this, as long
//! as it reports every completion so provenance can be finalized exactly
//! once per attempt. Cancellation and timeouts live in the substrate, not
//! in the graph model.

use async_trait::async_trait;
use futures::future::{join_all, BoxFuture};
use serde_json::Value;

use sluice_graph::CallableError;

/// One ready task: its name plus the prepared invocation future.
pub struct TaskInvocation {
  pub name: String,
  pub future: BoxFuture<'static, Result<Value, CallableError>>,
}

/// Concurrency substrate executing one batch of independent tasks.
#[async_trait]
pub trait Scheduler: Send + Sync {
  async fn run_batch(
    &self,
    batch: Vec<TaskInvocation>,
  ) -> Vec<(String, Result<Value, CallableError>)>;
}

/// Default substrate: every invocation spawned onto the tokio runtime,
/// awaited together.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalScheduler;

#[async_trait]
impl Scheduler for LocalScheduler {
  async fn run_batch(
    &self,
    batch: Vec<TaskInvocation>,
  ) -> Vec<(String, Result<Value, CallableError>)> {
    let handles: Vec<_> = batch
      .into_iter()
      .map(|invocation| {
        let name = invocation.name;
        let handle = tokio::spawn(invocation.future);
        (name, handle)
      })
      .collect();

    let (names, joins): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
    let joined = join_all(joins).await;

    names
      .into_iter()
      .zip(joined)
      .map(|(name, joined)| {
        let result = match joined {
          Ok(result) => result,
          Err(err) => Err(CallableError::new(format!("task join error: {err}"))),
        };
        (name, result)
      })
      .collect()
  }
}
