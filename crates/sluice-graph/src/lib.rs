//! Sluice Graph
//!
//! This crate provides the dataflow graph model for Sluice: live socket
//! trees materialized from schemas, type-checked links, tasks, and the
//! [`Graph`] container that owns them.
//!
//! Ownership is arena-style: the graph owns its tasks and links, and
//! endpoints are addressed by plain `(task, port)` ids ([`SocketRef`])
//! resolved through the owning graph, never by back-pointers. Link records
//! live in one central store on the graph; per-socket link lists are views
//! over it.
//!
//! Every graph carries three boundary tasks: `graph_inputs` (its output
//! namespace mirrors the graph's declared input schema), `graph_outputs`
//! (its input namespace mirrors the declared output schema), and
//! `graph_context` (an always-dynamic scratch namespace). Internal tasks
//! consume from the first and feed the second like any other producer.
//!
//! Graph construction is single-threaded and synchronous; all schema, shape
//! and link errors are raised here, at build time, never during execution.

mod callable;
mod def;
mod error;
mod graph;
mod link;
mod socket;
mod task;
mod topology;

pub use callable::{Callable, CallableArgs, CallableError, CallableResolver, FnCallable};
pub use def::{GraphDef, GraphSpecDef, LinkDef, TaskDef, TaskProperties};
pub use error::GraphError;
pub use graph::{Graph, GraphSchema, InputSource, TaskHandle, GRAPH_CONTEXT, GRAPH_INPUTS, GRAPH_OUTPUTS};
pub use link::{Link, SocketRef};
pub use socket::{Datum, LeafSocket, NamespaceSocket, Socket};
pub use task::{BoundaryRole, Task, TaskKind, TaskState, PORT_ALL_OUTPUTS, PORT_WAIT};
pub use topology::Topology;
