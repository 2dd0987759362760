//! Sluice Provenance
//!
//! This crate records what ran and what it consumed: one process node per
//! task-invocation attempt, one data node per distinct value (keyed by
//! content hash, so identical values across tasks collapse onto the same
//! node), and labeled edges between them.
//!
//! The recorder is the one object mutated from concurrent task executions;
//! every operation only touches its own process record plus the shared,
//! append-only node/edge store, behind an internal lock. Within one run the
//! store is append-only: nothing is rewritten in place.
//!
//! Content hashes use a precise canonicalization contract — JSON with
//! object keys sorted recursively at every level, hashed with sha256 —
//! so equal values hash equally across runs and processes.

mod error;
mod export;
mod hash;
mod recorder;
mod types;

pub use error::ProvenanceError;
pub use export::ProvenanceExport;
pub use hash::content_hash;
pub use recorder::ProvenanceRecorder;
pub use types::{DataNode, LabelKind, ProcessId, ProcessNode, ProcessState, ProvEdge};
