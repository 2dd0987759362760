//! Sluice Registry
//!
//! This crate provides the explicit callable registry: a map from a string
//! identifier to a factory producing the executable unit. The registry is
//! populated at process start from static configuration; there is no
//! runtime package discovery.
//!
//! [`Graph::from_def`](sluice_graph::Graph::from_def) uses a registry to
//! re-attach executables when loading a persisted graph, through the
//! [`CallableResolver`] seam defined in the graph crate.

mod error;
mod registry;

pub use error::RegistryError;
pub use registry::{CallableFactory, CallableRegistry, StaticCallableRegistry};
