//! Typed per-leaf column writers and readers
//!
//! One variant per leaf [`NodeType`](crate::schema::NodeType). The original
//! dispatches through a virtual `append`/`store`/`id` trio; since the set of
//! leaf kinds is closed, this is modeled as a plain enum rather than a trait
//! object.

mod numeric;
mod strings;
mod timestamp;

pub use numeric::{BooleanColumn, FloatColumn, Int64Column};
pub use strings::{detokenize_log_type, TemplatedStringColumn, VarStringColumn};
pub use timestamp::TimestampColumn;

use std::io::{self, Read, Write};

use crate::dictionary::{DictId, StringDictionary, TimestampDictionary};
use crate::error::{ArchiveError, Result};
use crate::schema::{NodeId, NodeType, SchemaTree};
use crate::value::ColumnValue;

/// Mutable access to the four dictionaries a column writer may need
pub struct DictionaryBundle<'a> {
	pub var: &'a mut StringDictionary,
	pub log_type: &'a mut StringDictionary,
	pub array: &'a mut StringDictionary,
	pub timestamp: &'a mut TimestampDictionary,
}

/// A column's raw stored cell, before any dictionary resolution
///
/// What a reader gets back from a column's on-disk bytes; turning a
/// `RawCell` into a displayable value requires looking `DictId`s up in the
/// matching dictionary, which is the reader's job, not the column's.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
	Int64(i64),
	Float(f64),
	Boolean(bool),
	VarStringId(DictId),
	Templated { skeleton_id: DictId, var_ids: Vec<DictId> },
	TimestampId(DictId),
}

/// One typed column buffer, owned by a [`SchemaWriter`](crate::writer::SchemaWriter)
pub enum ColumnWriter {
	Int64(Int64Column),
	Float(FloatColumn),
	Boolean(BooleanColumn),
	ClpString(TemplatedStringColumn),
	VarString(VarStringColumn),
	Array(TemplatedStringColumn),
	DateString(TimestampColumn),
	FloatDateString(TimestampColumn),
}

impl ColumnWriter {
	/// Construct the writer variant matching `node_type`; panics if `node_type`
	/// is not a leaf kind a column can represent (`Object`/`NullValue`/`VarValue`
	/// never reach this point — callers filter those out beforehand)
	pub fn new(node_type: NodeType, node_id: NodeId) -> Self {
		match node_type {
			NodeType::Integer => ColumnWriter::Int64(Int64Column::new(node_id)),
			NodeType::Float => ColumnWriter::Float(FloatColumn::new(node_id)),
			NodeType::Boolean => ColumnWriter::Boolean(BooleanColumn::new(node_id)),
			NodeType::ClpString => ColumnWriter::ClpString(TemplatedStringColumn::new(node_id)),
			NodeType::VarString => ColumnWriter::VarString(VarStringColumn::new(node_id)),
			NodeType::Array => ColumnWriter::Array(TemplatedStringColumn::new(node_id)),
			NodeType::DateString => ColumnWriter::DateString(TimestampColumn::new(node_id)),
			NodeType::FloatDateString => ColumnWriter::FloatDateString(TimestampColumn::new(node_id)),
			other => unreachable!("{other:?} is not a column-bearing leaf type"),
		}
	}

	pub fn node_id(&self) -> NodeId {
		match self {
			ColumnWriter::Int64(c) => c.node_id(),
			ColumnWriter::Float(c) => c.node_id(),
			ColumnWriter::Boolean(c) => c.node_id(),
			ColumnWriter::ClpString(c) => c.node_id(),
			ColumnWriter::VarString(c) => c.node_id(),
			ColumnWriter::Array(c) => c.node_id(),
			ColumnWriter::DateString(c) => c.node_id(),
			ColumnWriter::FloatDateString(c) => c.node_id(),
		}
	}

	/// Rows appended so far; used to check every column in a group stays in
	/// lockstep
	pub fn len(&self) -> usize {
		match self {
			ColumnWriter::Int64(c) => c.len(),
			ColumnWriter::Float(c) => c.len(),
			ColumnWriter::Boolean(c) => c.len(),
			ColumnWriter::ClpString(c) => c.len(),
			ColumnWriter::VarString(c) => c.len(),
			ColumnWriter::Array(c) => c.len(),
			ColumnWriter::DateString(c) => c.len(),
			ColumnWriter::FloatDateString(c) => c.len(),
		}
	}

	/// Append one row's value, failing if `value`'s tag does not match the
	/// column's own kind
	pub fn append(&mut self, value: ColumnValue, tree: &mut SchemaTree, dicts: &mut DictionaryBundle<'_>) -> Result<usize> {
		match (self, value) {
			(ColumnWriter::Int64(c), ColumnValue::Int64(v)) => Ok(c.append(v, tree)),
			(ColumnWriter::Float(c), ColumnValue::Float(v)) => Ok(c.append(v, tree)),
			(ColumnWriter::Boolean(c), ColumnValue::Boolean(v)) => Ok(c.append(v, tree)),
			(ColumnWriter::ClpString(c), ColumnValue::Str(v)) => Ok(c.append(&v, tree, dicts.log_type, dicts.var)),
			(ColumnWriter::VarString(c), ColumnValue::Str(v)) => Ok(c.append(&v, tree, dicts.var)),
			(ColumnWriter::Array(c), ColumnValue::ArrayText(v)) => Ok(c.append(&v, tree, dicts.array, dicts.var)),
			(ColumnWriter::DateString(c), ColumnValue::TextTimestamp(v)) => Ok(c.append_text(&v, tree, dicts.timestamp)),
			(ColumnWriter::FloatDateString(c), ColumnValue::FloatTimestamp(v)) => {
				Ok(c.append_float(v, tree, dicts.timestamp))
			}
			(_, _) => Err(ArchiveError::InvariantViolation("column/value tag mismatch")),
		}
	}

	/// Serialize this column's raw (uncompressed) body; the owning
	/// `SchemaWriter` concatenates every column's bytes and compresses them
	/// as a single frame
	pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
		match self {
			ColumnWriter::Int64(c) => c.write_to(writer),
			ColumnWriter::Float(c) => c.write_to(writer),
			ColumnWriter::Boolean(c) => c.write_to(writer),
			ColumnWriter::ClpString(c) => c.write_to(writer),
			ColumnWriter::VarString(c) => c.write_to(writer),
			ColumnWriter::Array(c) => c.write_to(writer),
			ColumnWriter::DateString(c) => c.write_to(writer),
			ColumnWriter::FloatDateString(c) => c.write_to(writer),
		}
	}
}

/// Read `row_count` raw cells for a single column of type `node_type` from
/// `reader`, in the same format [`ColumnWriter::write_to`] produced
pub fn read_column(node_type: NodeType, reader: &mut impl Read, row_count: usize) -> io::Result<Vec<RawCell>> {
	match node_type {
		NodeType::Integer => Int64Column::read(reader, row_count),
		NodeType::Float => FloatColumn::read(reader, row_count),
		NodeType::Boolean => BooleanColumn::read(reader, row_count),
		NodeType::ClpString | NodeType::Array => TemplatedStringColumn::read(reader, row_count),
		NodeType::VarString => VarStringColumn::read(reader, row_count),
		NodeType::DateString | NodeType::FloatDateString => TimestampColumn::read(reader, row_count),
		other => Err(io::Error::new(
			io::ErrorKind::InvalidData,
			format!("{other:?} is not a column-bearing leaf type"),
		)),
	}
}
