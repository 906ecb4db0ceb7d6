//! # vitrine-core
//!
//! Container introspection over debuggee memory.
//!
//! This crate decodes the in-memory layout of the standard libc++
//! containers (dynamic arrays, linked lists, ordered maps, and
//! small-string-optimized strings) belonging to an inspected process,
//! without that process's cooperation and without trusting anything beyond
//! field names and declared template parameters. It is a binary layout
//! parser pointed at live, possibly-corrupt, possibly-uninitialized memory.
//!
//! ## Architecture
//!
//! - [`value::Value`] is the accessor boundary: a read-only handle to a
//!   typed value in debuggee memory. Everything else consumes only it.
//! - [`views`] holds one decoding adapter per container layout. Each owns a
//!   generation-scoped cache cleared by `update()` and degrades to
//!   "unknown" when memory is unmapped or corrupt; a detected cycle or an
//!   exhausted step budget can never hang or fault the host.
//! - [`registry::Registry`] dispatches by declared type name at attach
//!   time, yielding a [`registry::ContainerView`].
//! - [`snapshot::Snapshot`] is a byte-image-backed implementation of the
//!   accessor boundary for post-mortem inspection and tests, with
//!   [`layouts`] describing the libc++ type layouts such images lack.
//!
//! ## Safety model
//!
//! Nothing here mutates debuggee memory, and nothing panics on bad input:
//! every traversal carries an explicit step budget, and every failure is a
//! local degradation (a `None` child, a count of zero).

pub mod config;
pub mod error;
pub mod layouts;
pub mod registry;
pub mod snapshot;
pub mod types;
pub mod value;
pub mod views;

pub use config::{ViewConfig, DEFAULT_DISPLAY_CAP};
pub use error::{VitrineError, VitrineResult};
pub use registry::{child_index_from_name, default_registry, ContainerKind, ContainerView, Registry, TypePattern};
pub use snapshot::{Snapshot, SnapshotValue};
pub use types::Address;
pub use value::{Field, TypeInfo, Value};
