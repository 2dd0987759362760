//! Sluice Schema
//!
//! This crate contains the socket schema types for Sluice. A [`SocketSpec`]
//! is an immutable description of a socket's shape: either a leaf carrying a
//! single typed value, or a namespace of named child sockets (optionally
//! dynamic, accepting new children at assignment time).
//!
//! Schemas are created at task/graph definition time and later materialized
//! into live socket trees by the graph crate. All schema validation is
//! synchronous: a spec that passes [`SocketSpec::validate`] can always be
//! materialized.
//!
//! The [`SchemaSource`] trait is the seam for hosts that infer schemas from
//! callable signatures; an explicit schema always wins over inference.

mod error;
mod infer;
mod spec;
mod type_tag;

pub use error::SchemaError;
pub use infer::{SchemaSource, TaskSchema};
pub use spec::SocketSpec;
pub use type_tag::TypeTag;

/// Prefix reserved for the runtime's own bookkeeping ports.
///
/// Field names in a namespace spec must never start with this prefix; the
/// graph layer uses it for the built-in wait and all-outputs ports.
pub const RESERVED_PREFIX: &str = "_";
