use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use sluice_graph::{
  BoundaryRole, CallableError, Graph, TaskKind, TaskState, Topology, GRAPH_INPUTS,
};
use sluice_provenance::{LabelKind, ProcessId, ProcessState, ProvenanceRecorder};

use crate::error::EngineError;
use crate::reconcile::reconcile_outputs;
use crate::resolve::resolve_args;
use crate::scheduler::{LocalScheduler, Scheduler, TaskInvocation};

/// Executes graphs over a pluggable scheduler substrate.
#[derive(Clone)]
pub struct Engine {
  scheduler: Arc<dyn Scheduler>,
}

impl Engine {
  pub fn new() -> Self {
    Self {
      scheduler: Arc::new(LocalScheduler),
    }
  }

  pub fn with_scheduler(scheduler: Arc<dyn Scheduler>) -> Self {
    Self { scheduler }
  }

  /// Prepare a run of the graph. Call `.wait()` to execute it.
  ///
  /// The graph is mutated in place: task states advance and produced values
  /// land in the tasks' output namespaces.
  pub fn execute<'a>(
    &self,
    graph: &'a mut Graph,
    recorder: &ProvenanceRecorder,
    cancel: CancellationToken,
  ) -> RunExecution<'a> {
    RunExecution {
      scheduler: Arc::clone(&self.scheduler),
      graph,
      recorder: recorder.clone(),
      parent: None,
      cancel,
    }
  }
}

impl Default for Engine {
  fn default() -> Self {
    Self::new()
  }
}

/// Result of one graph run.
#[derive(Debug, Clone)]
pub struct RunResult {
  pub run_id: String,
  /// What internal tasks fed into the `graph_outputs` boundary.
  pub outputs: Map<String, Value>,
  /// Reconciled output mapping of every executed task, keyed by name.
  pub task_results: HashMap<String, Value>,
}

/// A handle to one run. Call `.wait()` to drive it to completion.
pub struct RunExecution<'a> {
  scheduler: Arc<dyn Scheduler>,
  graph: &'a mut Graph,
  recorder: ProvenanceRecorder,
  parent: Option<ProcessId>,
  cancel: CancellationToken,
}

impl RunExecution<'_> {
  #[instrument(name = "graph_run", skip(self), fields(graph = %self.graph.name))]
  pub async fn wait(mut self) -> Result<RunResult, EngineError> {
    info!(
      graph = %self.graph.name,
      run_id = %self.recorder.run_id(),
      "run_started"
    );

    let result = self.run_loop().await;

    match &result {
      Ok(_) => info!(graph = %self.graph.name, "run_completed"),
      Err(err) => error!(graph = %self.graph.name, error = %err, "run_failed"),
    }

    result
  }

  async fn run_loop(&mut self) -> Result<RunResult, EngineError> {
    // Topology pass: both data and wait links order the run; a cycle is
    // fatal before any task executes.
    let topology = Topology::new(self.graph);
    topology.toposort()?;

    let total = self.graph.tasks().count();
    let mut completed: HashSet<String> = HashSet::new();
    let mut task_results: HashMap<String, Value> = HashMap::new();

    while completed.len() < total {
      if self.cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
      }

      let ready: Vec<String> = self
        .graph
        .tasks()
        .filter(|t| !completed.contains(&t.name))
        .filter(|t| {
          topology
            .upstream(&t.name)
            .iter()
            .all(|up| completed.contains(up))
        })
        .map(|t| t.name.clone())
        .collect();

      if ready.is_empty() {
        // Unreachable after a successful toposort; guards against a stall.
        return Err(EngineError::InvalidGraph {
          message: "no ready tasks but the run is incomplete".to_string(),
        });
      }

      // Boundary and reference tasks carry no executable: they complete
      // inline and get no process record.
      let mut batch: Vec<String> = Vec::new();
      for name in ready {
        let trivial = self
          .graph
          .task(&name)
          .map(|t| t.is_boundary() || t.reference)
          .unwrap_or(false);
        if trivial {
          self.finish_trivial(&name, &mut task_results);
          completed.insert(name);
        } else {
          batch.push(name);
        }
      }
      if batch.is_empty() {
        continue;
      }

      info!(tasks = ?batch, "executing batch of ready tasks");

      let mut pids: HashMap<String, ProcessId> = HashMap::new();
      let mut invocations = Vec::with_capacity(batch.len());
      for name in &batch {
        let (pid, invocation) = self.prepare(name)?;
        pids.insert(name.clone(), pid);
        invocations.push(invocation);
      }

      let results = tokio::select! {
        results = self.scheduler.run_batch(invocations) => results,
        _ = self.cancel.cancelled() => {
          warn!("run cancelled during task execution");
          return Err(EngineError::Cancelled);
        }
      };

      for (name, result) in results {
        let pid = &pids[&name];
        match result {
          Ok(value) => {
            self.finish_success(&name, pid, &value, &mut task_results)?;
            completed.insert(name);
          }
          Err(err) => {
            // Finalize provenance for the attempt, then re-raise: a run
            // has no retry and no partial-success result.
            self
              .recorder
              .process_end(pid, ProcessState::Failed, Some(err.to_string()))?;
            if let Some(task) = self.graph.task_mut(&name) {
              task.state = TaskState::Failed;
            }
            error!(task = %name, error = %err, "task_failed");
            return Err(EngineError::TaskFailed {
              task: name,
              message: err.to_string(),
            });
          }
        }
      }
    }

    Ok(RunResult {
      run_id: self.recorder.run_id(),
      outputs: self.graph.collect_graph_outputs(true),
      task_results,
    })
  }

  /// Resolve arguments, open the provenance record, and build the
  /// invocation future for one ready task.
  fn prepare(&mut self, name: &str) -> Result<(ProcessId, TaskInvocation), EngineError> {
    let task = self
      .graph
      .task(name)
      .ok_or_else(|| EngineError::InvalidGraph {
        message: format!("ready task '{name}' not found"),
      })?;
    let kind = task.kind.clone();
    let args = resolve_args(self.graph, task);

    let callable_ref = match &kind {
      TaskKind::Callable(callable) => callable.type_id().to_string(),
      TaskKind::SubGraph(graph) => graph.name.clone(),
      TaskKind::Boundary(_) => {
        return Err(EngineError::InvalidGraph {
          message: format!("boundary task '{name}' cannot be invoked"),
        });
      }
    };

    let pid = self
      .recorder
      .process_start(name, &callable_ref, self.parent.as_ref());
    self.recorder.record_inputs(&pid, &args)?;

    if let Some(task) = self.graph.task_mut(name) {
      task.state = TaskState::Running;
    }
    info!(task = %name, pid = %pid, "task_started");

    let future: BoxFuture<'static, Result<Value, CallableError>> = match kind {
      TaskKind::Callable(callable) => Box::pin(async move { callable.call(args).await }),
      TaskKind::SubGraph(sub) => {
        let scheduler = Arc::clone(&self.scheduler);
        let recorder = self.recorder.clone();
        let cancel = self.cancel.clone();
        let parent = pid.clone();
        let mut sub = (*sub).clone();
        Box::pin(async move {
          if let Some(inputs) = sub.task_mut(GRAPH_INPUTS) {
            inputs
              .outputs
              .assign_map(&args, None)
              .map_err(|err| CallableError::new(err.to_string()))?;
          }
          let execution = RunExecution {
            scheduler,
            graph: &mut sub,
            recorder,
            parent: Some(parent),
            cancel,
          };
          let result = execution
            .wait()
            .await
            .map_err(|err| CallableError::new(err.to_string()))?;
          Ok(Value::Object(result.outputs))
        })
      }
      TaskKind::Boundary(_) => unreachable!("rejected above"),
    };

    Ok((
      pid,
      TaskInvocation {
        name: name.to_string(),
        future,
      },
    ))
  }

  /// Complete a boundary or reference task: no invocation, no process
  /// record. `graph_outputs` absorbs what its links deliver; the others
  /// serve their stored output values.
  fn finish_trivial(&mut self, name: &str, task_results: &mut HashMap<String, Value>) {
    let Some(task) = self.graph.task(name) else {
      return;
    };
    let role = match &task.kind {
      TaskKind::Boundary(role) => Some(*role),
      _ => None,
    };

    let value = match role {
      Some(BoundaryRole::GraphOutputs) => {
        let args = resolve_args(self.graph, task);
        if let Some(task) = self.graph.task_mut(name) {
          for (field, value) in &args {
            if let Err(err) = task.inputs.assign(field, value.clone(), None) {
              warn!(field = %field, error = %err, "graph output rejected by schema");
              continue;
            }
            // Mirror on the output side so the namespace can source links.
            let _ = task.outputs.assign(field, value.clone(), None);
          }
        }
        Value::Object(args)
      }
      _ => task
        .outputs
        .collect_values(true)
        .unwrap_or(Value::Object(Map::new())),
    };

    if let Some(task) = self.graph.task_mut(name) {
      task.state = TaskState::Finished;
    }
    task_results.insert(name.to_string(), value);
  }

  /// Reconcile a successful return value, record provenance, and finish
  /// the task.
  fn finish_success(
    &mut self,
    name: &str,
    pid: &ProcessId,
    value: &Value,
    task_results: &mut HashMap<String, Value>,
  ) -> Result<(), EngineError> {
    if let Some(task) = self.graph.task_mut(name) {
      reconcile_outputs(task, value);
    }

    let outputs = self
      .graph
      .task(name)
      .and_then(|t| t.outputs.collect_values(true))
      .unwrap_or(Value::Object(Map::new()));

    self.recorder.record_outputs(pid, &outputs, LabelKind::Output)?;
    if !value.is_object() {
      self.recorder.record_outputs(pid, value, LabelKind::Return)?;
    }
    self.recorder.process_end(pid, ProcessState::Finished, None)?;

    if let Some(task) = self.graph.task_mut(name) {
      task.state = TaskState::Finished;
    }
    info!(task = %name, "task_completed");
    task_results.insert(name.to_string(), outputs);
    Ok(())
  }
}
