//! A per-schema_id column group: one typed [`ColumnWriter`] per leaf node,
//! in ascending node-id order

use std::collections::HashMap;
use std::io::Write as _;
use std::path::Path;

use integer_encoding::VarIntWriter;

use crate::column::{ColumnWriter, DictionaryBundle};
use crate::compression::{compress_to_writer, CompressionLevel};
use crate::error::{ArchiveError, Result};
use crate::message::ParsedMessage;
use crate::schema::{NodeId, Schema, SchemaId, SchemaTree};

/// The column group for every record sharing one `schema_id`
pub struct SchemaWriter {
	columns: Vec<ColumnWriter>,
	index: HashMap<NodeId, usize>,
	row_count: u64,
}

impl SchemaWriter {
	/// Instantiate one column writer per leaf node in `schema`, in ascending
	/// node-id order — this order is the file's canonical column order and is
	/// never stored explicitly, since both writer and reader derive it the
	/// same way from the schema's node ids
	pub fn initialize(schema: &Schema, tree: &SchemaTree) -> Self {
		let mut node_ids: Vec<NodeId> = schema.iter().copied().filter(|&id| tree.node(id).node_type().is_leaf()).collect();
		node_ids.sort_unstable();

		let mut columns = Vec::with_capacity(node_ids.len());
		let mut index = HashMap::with_capacity(node_ids.len());
		for (pos, id) in node_ids.into_iter().enumerate() {
			columns.push(ColumnWriter::new(tree.node(id).node_type(), id));
			index.insert(id, pos);
		}
		Self { columns, index, row_count: 0 }
	}

	/// Forward every `(node_id, value)` pair in `message` to its matching
	/// column, returning the total bytes appended
	pub fn append_message(&mut self, message: &ParsedMessage, tree: &mut SchemaTree, dicts: &mut DictionaryBundle<'_>) -> Result<usize> {
		let mut bytes = 0;
		for (node_id, value) in message.content() {
			let col_idx = *self
				.index
				.get(node_id)
				.ok_or(ArchiveError::InvariantViolation("message referenced a node outside its own schema"))?;
			bytes += self.columns[col_idx].append(value.clone(), tree, dicts)?;
		}
		self.row_count += 1;
		Ok(bytes)
	}

	/// Drop every column whose node id was collapsed by the close-time
	/// rewrite; its values are already captured as the VarValue node's key
	pub fn update_schema(&mut self, rewrites: &[(NodeId, NodeId)]) {
		let dropped: std::collections::HashSet<NodeId> = rewrites.iter().map(|(old, _)| *old).collect();
		let mut new_columns = Vec::with_capacity(self.columns.len());
		let mut new_index = HashMap::with_capacity(self.columns.len());
		for col in self.columns.drain(..) {
			if dropped.contains(&col.node_id()) {
				continue;
			}
			new_index.insert(col.node_id(), new_columns.len());
			new_columns.push(col);
		}
		self.columns = new_columns;
		self.index = new_index;
	}

	/// Number of rows appended so far
	pub fn row_count(&self) -> u64 {
		self.row_count
	}

	/// Write `row_count` then every surviving column's raw bytes, compressed
	/// once as a single frame, to `<dir>/<schema_id>`
	pub fn store(&self, dir: &Path, schema_id: SchemaId, level: CompressionLevel) -> Result<()> {
		for col in &self.columns {
			if col.len() as u64 != self.row_count {
				return Err(ArchiveError::InvariantViolation(
					"column row count does not match the schema group's row count at flush time",
				));
			}
		}

		let mut buf = Vec::new();
		buf.write_varint(self.row_count)?;
		for col in &self.columns {
			col.write_to(&mut buf)?;
		}

		let path = dir.join(schema_id.to_string());
		let file = std::fs::File::create(&path)?;
		compress_to_writer(file, &buf, level)?;
		Ok(())
	}
}
