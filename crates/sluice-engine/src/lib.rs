//! Sluice Engine
//!
//! This crate executes a built graph: a topology pass validates the order
//! (a cycle is fatal before anything runs), then tasks execute in
//! ready-batches — a task becomes ready once every predecessor reachable
//! over a data or wait link has finished. Independent tasks in one batch
//! run concurrently; the link-induced partial order is the only ordering
//! guarantee.
//!
//! # Architecture
//!
//! ```text
//! Engine
//! ├── new() / with_scheduler(...) - pick the concurrency substrate
//! └── execute(graph, recorder, cancel) -> RunExecution
//!
//! RunExecution
//! └── wait() - topology pass, then resolve inputs / invoke / reconcile
//!              per ready batch, recording provenance throughout
//! ```
//!
//! Value resolution per task: literal socket values first, then one value
//! per inbound data link (the whole output mapping when the source is the
//! `_outputs` alias); multiple links into the same field bundle into a
//! `{producer}_{port}` keyed sub-mapping. Wait links contribute nothing.
//!
//! A task failure stamps its provenance record `failed` and aborts the run;
//! there is no retry and no partial-success result at this layer.

mod engine;
mod error;
mod reconcile;
mod resolve;
mod scheduler;

pub use engine::{Engine, RunExecution, RunResult};
pub use error::EngineError;
pub use scheduler::{LocalScheduler, Scheduler, TaskInvocation};
