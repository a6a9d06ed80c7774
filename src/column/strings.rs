//! Variable-string and templated (CLP-string / array) columns

use std::io::{self, Read, Write};

use integer_encoding::{VarIntReader, VarIntWriter};

use super::RawCell;
use crate::dictionary::{DictId, StringDictionary};
use crate::schema::{NodeId, SchemaTree};

/// A single variable dictionary id per row
pub struct VarStringColumn {
	node_id: NodeId,
	ids: Vec<DictId>,
}

impl VarStringColumn {
	pub fn new(node_id: NodeId) -> Self {
		Self { node_id, ids: Vec::new() }
	}

	pub fn node_id(&self) -> NodeId {
		self.node_id
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn append(&mut self, value: &str, tree: &mut SchemaTree, var_dict: &mut StringDictionary) -> usize {
		let id = var_dict.intern(value);
		tree.mark_value(self.node_id, id as u64, value);
		self.ids.push(id);
		std::mem::size_of::<DictId>()
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
			out.push(RawCell::VarStringId(id));
		}
		Ok(out)
	}
}

const PLACEHOLDER: char = '\u{1}';

/// Split a templated string into a skeleton (with each digit-bearing token
/// replaced by a placeholder) and the extracted tokens themselves, in order
///
/// Used for both `ClpString` (backed by the log-type dictionary) and `Array`
/// (backed by the array dictionary) node columns — same tokenization, a
/// different skeleton dictionary is passed in by the caller.
pub(crate) fn tokenize_log_type(s: &str) -> (String, Vec<String>) {
	let mut skeleton = String::with_capacity(s.len());
	let mut vars = Vec::new();
	for run in split_runs(s) {
		let is_variable = run.chars().next().is_some_and(|c| !c.is_whitespace()) && run.chars().any(|c| c.is_ascii_digit());
		if is_variable {
			vars.push(run.to_owned());
			skeleton.push(PLACEHOLDER);
		} else {
			skeleton.push_str(run);
		}
	}
	(skeleton, vars)
}

/// A stable numeric representation of a templated value's *full* identity —
/// skeleton plus every extracted variable — for cardinality tracking
///
/// The skeleton id alone isn't enough: two rows can share a skeleton (e.g.
/// `"a <N>"`) while differing in their variable tokens, and the schema node
/// must still see that as two distinct values rather than collapsing to
/// `CardinalityOne` on the first row observed.
fn templated_cardinality_key(skeleton_id: DictId, var_ids: &[DictId]) -> u64 {
	use std::hash::{Hash, Hasher};
	let mut hasher = std::collections::hash_map::DefaultHasher::new();
	skeleton_id.hash(&mut hasher);
	var_ids.hash(&mut hasher);
	hasher.finish()
}

/// Rebuild the original string from a skeleton and its extracted tokens
pub fn detokenize_log_type(skeleton: &str, vars: &[String]) -> String {
	let mut out = String::with_capacity(skeleton.len());
	let mut var_iter = vars.iter();
	for c in skeleton.chars() {
		if c == PLACEHOLDER {
			if let Some(v) = var_iter.next() {
				out.push_str(v);
			}
		} else {
			out.push(c);
		}
	}
	out
}

fn split_runs(s: &str) -> Vec<&str> {
	let mut runs = Vec::new();
	let mut start = 0;
	let mut in_ws: Option<bool> = None;
	for (i, c) in s.char_indices() {
		let is_ws = c.is_whitespace();
		match in_ws {
			None => in_ws = Some(is_ws),
			Some(prev) if prev != is_ws => {
				runs.push(&s[start..i]);
				start = i;
				in_ws = Some(is_ws);
			}
			_ => {}
		}
	}
	runs.push(&s[start..]);
	runs
}

/// A per-row (skeleton id, variable ids) pair; shared by `ClpString` and
/// `Array` node columns
pub struct TemplatedStringColumn {
	node_id: NodeId,
	skeleton_ids: Vec<DictId>,
	var_ids: Vec<Vec<DictId>>,
}

impl TemplatedStringColumn {
	pub fn new(node_id: NodeId) -> Self {
		Self { node_id, skeleton_ids: Vec::new(), var_ids: Vec::new() }
	}

	pub fn node_id(&self) -> NodeId {
		self.node_id
	}

	pub fn len(&self) -> usize {
		self.skeleton_ids.len()
	}

	pub fn append(
		&mut self,
		value: &str,
		tree: &mut SchemaTree,
		skeleton_dict: &mut StringDictionary,
		var_dict: &mut StringDictionary,
	) -> usize {
		let (skeleton, vars) = tokenize_log_type(value);
		let skeleton_id = skeleton_dict.intern(&skeleton);
		let var_ids: Vec<DictId> = vars.iter().map(|v| var_dict.intern(v)).collect();
		let bytes = std::mem::size_of::<DictId>() * (1 + var_ids.len());
		tree.mark_value(self.node_id, templated_cardinality_key(skeleton_id, &var_ids), value);
		self.skeleton_ids.push(skeleton_id);
		self.var_ids.push(var_ids);
		bytes
	}

	pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
		for (skeleton_id, vars) in self.skeleton_ids.iter().zip(&self.var_ids) {
			writer.write_varint(*skeleton_id)?;
			writer.write_varint(vars.len() as u64)?;
			for &v in vars {
				writer.write_varint(v)?;
			}
		}
		Ok(())
	}

	pub fn read(reader: &mut impl Read, row_count: usize) -> io::Result<Vec<RawCell>> {
		let mut out = Vec::with_capacity(row_count);
		for _ in 0..row_count {
			let skeleton_id: DictId = reader.read_varint()?;
			let var_count: u64 = reader.read_varint()?;
			let mut var_ids = Vec::with_capacity(var_count as usize);
			for _ in 0..var_count {
				var_ids.push(reader.read_varint()?);
			}
			out.push(RawCell::Templated { skeleton_id, var_ids });
		}
		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenize_round_trips_through_detokenize() {
		let (skeleton, vars) = tokenize_log_type("request 42 took 17ms from host1");
		assert_eq!(detokenize_log_type(&skeleton, &vars), "request 42 took 17ms from host1");
		assert_eq!(vars, vec!["42", "17ms"]);
	}

	#[test]
	fn tokenize_leaves_plain_text_untouched() {
		let (skeleton, vars) = tokenize_log_type("hello world");
		assert_eq!(skeleton, "hello world");
		assert!(vars.is_empty());
	}

	#[test]
	fn same_skeleton_different_variables_marks_node_cardinality_many() {
		let mut tree = SchemaTree::new();
		let root = tree.add_node(None, crate::schema::NodeType::Object, "root");
		let node = tree.add_node(Some(root), crate::schema::NodeType::ClpString, "m");
		let mut skeleton_dict = StringDictionary::new();
		let mut var_dict = StringDictionary::new();
		let mut col = TemplatedStringColumn::new(node);

		col.append("a 1", &mut tree, &mut skeleton_dict, &mut var_dict);
		assert_eq!(tree.node(node).value_state(), crate::schema::ValueState::CardinalityOne);
		col.append("a 2", &mut tree, &mut skeleton_dict, &mut var_dict);
		assert_eq!(tree.node(node).value_state(), crate::schema::ValueState::CardinalityMany);
	}
}
