//! `DateString` / `FloatDateString` columns
//!
//! Both variants ultimately store one timestamp-dictionary id per row; they
//! differ only in which [`TimestampToken`] shape feeds the dictionary.

use std::io::{self, Read, Write};

use integer_encoding::{VarIntReader, VarIntWriter};

use super::RawCell;
use crate::dictionary::{DictId, TimestampDictionary, TimestampToken};
use crate::schema::{NodeId, SchemaTree};

pub struct TimestampColumn {
	node_id: NodeId,
	ids: Vec<DictId>,
}

impl TimestampColumn {
	pub fn new(node_id: NodeId) -> Self {
		Self { node_id, ids: Vec::new() }
	}

	pub fn node_id(&self) -> NodeId {
		self.node_id
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	fn push(&mut self, id: DictId, tree: &mut SchemaTree, string_repr: &str) -> usize {
		tree.mark_value(self.node_id, id as u64, string_repr);
		self.ids.push(id);
		std::mem::size_of::<DictId>()
	}

	/// A string leaf on the timestamp path that did not parse as a plain
	/// number (`NodeType::DateString`)
	pub fn append_text(&mut self, value: &str, tree: &mut SchemaTree, dict: &mut TimestampDictionary) -> usize {
		let key = tree.node(self.node_id).key_name().to_owned();
		let id = dict.ingest_entry(&key, TimestampToken::Text(value));
		self.push(id, tree, value)
	}

	/// A string leaf on the timestamp path that parsed as a double
	/// (`NodeType::FloatDateString`)
	pub fn append_float(&mut self, value: f64, tree: &mut SchemaTree, dict: &mut TimestampDictionary) -> usize {
		let key = tree.node(self.node_id).key_name().to_owned();
		let id = dict.ingest_entry(&key, TimestampToken::Float(value));
		self.push(id, tree, &value.to_string())
	}

	pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
		for &id in &self.ids {
			writer.write_varint(id)?;
		}
		Ok(())
	}

	pub fn read(reader: &mut impl Read, row_count: usize) -> io::Result<Vec<RawCell>> {
		let mut out = Vec::with_capacity(row_count);
		for _ in 0..row_count {
			let id: DictId = reader.read_varint()?;
			out.push(RawCell::TimestampId(id));
		}
		Ok(out)
	}
}
