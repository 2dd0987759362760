//! Sluice — typed dataflow graphs.
//!
//! Build a graph of tasks connected by type-checked links, run it in
//! topological order, and get a content-addressed provenance record of
//! what consumed what.
//!
//! The pieces:
//! - [`schema`] — socket specs (leaf types, nested and dynamic namespaces)
//! - [`graph`] — live sockets, links, tasks, graphs, and the persisted
//!   [`GraphDef`](graph::GraphDef) representation
//! - [`registry`] — explicit callable registry for re-attaching executables
//! - [`engine`] — topological execution over a pluggable scheduler
//! - [`provenance`] — the per-run process/data/edge record
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sluice::engine::Engine;
//! use sluice::graph::{FnCallable, Graph, GraphSchema, TaskKind};
//! use sluice::provenance::ProvenanceRecorder;
//! use sluice::schema::{SocketSpec, TaskSchema, TypeTag};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let add = FnCallable::new(
//!   "add",
//!   TaskSchema::new(
//!     SocketSpec::namespace([
//!       ("x", SocketSpec::leaf(TypeTag::int())),
//!       ("y", SocketSpec::leaf(TypeTag::int())),
//!     ]),
//!     SocketSpec::namespace([("result", SocketSpec::leaf(TypeTag::int()))]),
//!   ),
//!   |args| {
//!     let x = args.get("x").and_then(|v| v.as_i64()).unwrap_or(0);
//!     let y = args.get("y").and_then(|v| v.as_i64()).unwrap_or(0);
//!     Ok(json!({ "result": x + y }))
//!   },
//! );
//!
//! let mut graph = Graph::new("arith", GraphSchema::empty()).unwrap();
//! let add1 = graph.add_task(TaskKind::Callable(add.clone()), Some("add1")).unwrap();
//! let add2 = graph.add_task(TaskKind::Callable(add), Some("add2")).unwrap();
//! graph.set_input("add1", "x", json!(1)).unwrap();
//! graph.set_input("add1", "y", json!(2)).unwrap();
//! graph.set_input("add2", "x", json!(3)).unwrap();
//! graph.add_link(add1.output("result"), add2.input("y")).unwrap();
//!
//! let recorder = ProvenanceRecorder::new("arith", "example");
//! let result = Engine::new()
//!   .execute(&mut graph, &recorder, CancellationToken::new())
//!   .wait()
//!   .await
//!   .unwrap();
//!
//! assert_eq!(result.task_results["add2"], json!({ "result": 6 }));
//! # }
//! ```

pub use sluice_engine as engine;
pub use sluice_graph as graph;
pub use sluice_provenance as provenance;
pub use sluice_registry as registry;
pub use sluice_schema as schema;
