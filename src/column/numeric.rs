//! Fixed-width numeric and boolean columns: packed arrays of raw values

use std::io::{self, Read, Write};

use super::RawCell;
use crate::schema::{NodeId, SchemaTree};

/// Packed signed 64-bit integer column
pub struct Int64Column {
	node_id: NodeId,
	values: Vec<i64>,
}

impl Int64Column {
	pub fn new(node_id: NodeId) -> Self {
		Self { node_id, values: Vec::new() }
	}

	pub fn node_id(&self) -> NodeId {
		self.node_id
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Append a row, marking the owning schema node's cardinality with the
	/// integer's own bit pattern as the stable numeric representation
	pub fn append(&mut self, value: i64, tree: &mut SchemaTree) -> usize {
		tree.mark_value(self.node_id, value as u64, &value.to_string());
		self.values.push(value);
		std::mem::size_of::<i64>()
	}

	pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
		for v in &self.values {
			writer.write_all(&v.to_le_bytes())?;
		}
		Ok(())
	}

	pub fn read(reader: &mut impl Read, row_count: usize) -> io::Result<Vec<RawCell>> {
		let mut out = Vec::with_capacity(row_count);
		let mut buf = [0u8; 8];
		for _ in 0..row_count {
			reader.read_exact(&mut buf)?;
			out.push(RawCell::Int64(i64::from_le_bytes(buf)));
		}
		Ok(out)
	}
}

/// Packed IEEE-754 double column
pub struct FloatColumn {
	node_id: NodeId,
	values: Vec<f64>,
}

impl FloatColumn {
	pub fn new(node_id: NodeId) -> Self {
		Self { node_id, values: Vec::new() }
	}

	pub fn node_id(&self) -> NodeId {
		self.node_id
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// `f64` has no total order, so cardinality is tracked on its bit pattern
	pub fn append(&mut self, value: f64, tree: &mut SchemaTree) -> usize {
		tree.mark_value(self.node_id, value.to_bits(), &value.to_string());
		self.values.push(value);
		std::mem::size_of::<f64>()
	}

	pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
		for v in &self.values {
			writer.write_all(&v.to_le_bytes())?;
		}
		Ok(())
	}

	pub fn read(reader: &mut impl Read, row_count: usize) -> io::Result<Vec<RawCell>> {
		let mut out = Vec::with_capacity(row_count);
		let mut buf = [0u8; 8];
		for _ in 0..row_count {
			reader.read_exact(&mut buf)?;
			out.push(RawCell::Float(f64::from_le_bytes(buf)));
		}
		Ok(out)
	}
}

/// Packed single-byte boolean column
pub struct BooleanColumn {
	node_id: NodeId,
	values: Vec<bool>,
}

impl BooleanColumn {
	pub fn new(node_id: NodeId) -> Self {
		Self { node_id, values: Vec::new() }
	}

	pub fn node_id(&self) -> NodeId {
		self.node_id
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn append(&mut self, value: bool, tree: &mut SchemaTree) -> usize {
		tree.mark_value(self.node_id, value as u64, if value { "true" } else { "false" });
		self.values.push(value);
		1
	}

	pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
		for &v in &self.values {
			writer.write_all(&[v as u8])?;
		}
		Ok(())
	}

	pub fn read(reader: &mut impl Read, row_count: usize) -> io::Result<Vec<RawCell>> {
		let mut out = Vec::with_capacity(row_count);
		let mut buf = [0u8; 1];
		for _ in 0..row_count {
			reader.read_exact(&mut buf)?;
			out.push(RawCell::Boolean(buf[0] != 0));
		}
		Ok(out)
	}
}
