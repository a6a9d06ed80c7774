//! The union schema tree and the schema-set map
//!
//! See [`tree::SchemaTree`] for the growing per-run catalog of
//! `(parent, key, type)` tuples, and [`map::SchemaMap`] for the interning
//! table of distinct per-record field-id sets.

mod map;
mod tree;

pub use map::{Schema, SchemaId, SchemaMap};
pub use tree::{NodeId, NodeType, SchemaNode, SchemaTree, ValueState};
