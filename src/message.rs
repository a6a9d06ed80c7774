//! The per-record ordered list of (node, value) pairs produced by the walker

use crate::{
	schema::{NodeId, SchemaId},
	value::ColumnValue,
};

/// An ordered list of `(node_id, typed value)` pairs in the order they were
/// encountered during the record walk, plus the record's `schema_id`
///
/// The order must match the column order of the schema's group.
#[derive(Debug, Default)]
pub struct ParsedMessage {
	content: Vec<(NodeId, ColumnValue)>,
	schema_id: SchemaId,
}

impl ParsedMessage {
	/// Construct an empty message
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a leaf value in walk order
	pub fn push(&mut self, node_id: NodeId, value: ColumnValue) {
		self.content.push((node_id, value));
	}

	/// The `(node_id, value)` pairs in walk order
	pub fn content(&self) -> &[(NodeId, ColumnValue)] {
		&self.content
	}

	/// Set the record's schema id, once it is known (after the full walk)
	pub fn set_schema_id(&mut self, schema_id: SchemaId) {
		self.schema_id = schema_id;
	}

	/// The record's schema id
	pub fn schema_id(&self) -> SchemaId {
		self.schema_id
	}

	/// Reset to an empty state for reuse across records
	pub fn clear(&mut self) {
		self.content.clear();
		self.schema_id = 0;
	}
}
