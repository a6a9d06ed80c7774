//! Row reconstruction: rebuilds a JSON document per row from a schema
//! group's column file, re-materializing the tree shape the writer walked
//!
//! Builds just enough of the schema tree's ancestor chains to turn each
//! referenced node into a JSON-pointer-style path (escaping `~` before `/`),
//! then fills it in per row from the column values. Null leaves and empty
//! objects carry no per-row column, so they're pre-populated into a shared
//! template once up front instead of being read per row.
//!
//! A `VarValue` node (the close-time rewrite's collapsed-constant marker)
//! has no column at all, so its value is synthesized from the node's own
//! stored key text, typed by its collapsed owner's node type, rather than
//! read from the column file.

use std::fs::File;
use std::path::{Path, PathBuf};

use integer_encoding::VarIntReader;
use serde_json::{Map, Value};

use crate::column::{detokenize_log_type, read_column, RawCell};
use crate::compression::decompress_from_reader;
use crate::dictionary::{StringDictionary, TimestampDictionary};
use crate::error::{ArchiveError, Result};
use crate::schema::{NodeId, NodeType, Schema, SchemaId, SchemaMap, SchemaTree};

use super::predicate::RowPredicate;

/// Escape one path segment for inclusion in a JSON-pointer-style string:
/// `~` first, then `/`, per RFC 6901
pub fn escape_pointer_segment(key: &str) -> String {
	key.replace('~', "~0").replace('/', "~1")
}

/// Join already-unescaped path segments into a JSON-pointer-style string,
/// escaping each segment on the way
pub fn format_json_pointer(segments: &[String]) -> String {
	let mut out = String::new();
	for seg in segments {
		out.push('/');
		out.push_str(&escape_pointer_segment(seg));
	}
	out
}

/// An archive split opened for reading: the shared (process-wide) schema
/// tree and schema-set map, plus this split's own local dictionaries
pub struct ArchiveReader {
	tree: SchemaTree,
	schema_map: SchemaMap,
	var_dict: StringDictionary,
	log_type_dict: StringDictionary,
	array_dict: StringDictionary,
	timestamp_dict: TimestampDictionary,
	encoded_dir: PathBuf,
}

impl ArchiveReader {
	/// Open one archive split directory (`<archive_root>/<uuid>`); the
	/// shared `schema_tree`/`schema_map` files are expected one level up, at
	/// `archive_dir`'s parent
	pub fn open(archive_dir: &Path) -> Result<Self> {
		let root = archive_dir
			.parent()
			.ok_or_else(|| ArchiveError::MalformedInput("archive directory has no parent to read schema_tree/schema_map from".to_owned()))?;

		let tree = SchemaTree::load(File::open(root.join("schema_tree"))?)?;
		let schema_map = SchemaMap::load(File::open(root.join("schema_map"))?)?;
		let var_dict = StringDictionary::load(File::open(archive_dir.join("var.dict"))?)?;
		let log_type_dict = StringDictionary::load(File::open(archive_dir.join("log.dict"))?)?;
		let array_dict = StringDictionary::load(File::open(archive_dir.join("array.dict"))?)?;
		let timestamp_dict = TimestampDictionary::load(File::open(archive_dir.join("timestamp.dict"))?)?;

		Ok(Self {
			tree,
			schema_map,
			var_dict,
			log_type_dict,
			array_dict,
			timestamp_dict,
			encoded_dir: archive_dir.join("encoded_messages"),
		})
	}

	/// The union schema tree loaded for this split (shared with its siblings)
	pub fn tree(&self) -> &SchemaTree {
		&self.tree
	}

	/// The variable dictionary, for callers (e.g. the `search` CLI) that need
	/// to resolve a literal to a `DictId` without going through a row
	pub fn var_dict(&self) -> &StringDictionary {
		&self.var_dict
	}

	/// Every schema id with a column file in this split, ascending
	pub fn schema_ids(&self) -> Result<Vec<SchemaId>> {
		let mut ids = Vec::new();
		for entry in std::fs::read_dir(&self.encoded_dir)? {
			let entry = entry?;
			let name = entry.file_name();
			let name = name.to_string_lossy();
			let id: SchemaId = name
				.parse()
				.map_err(|_| ArchiveError::MalformedInput(format!("non-numeric schema file name: {name}")))?;
			ids.push(id);
		}
		ids.sort_unstable();
		Ok(ids)
	}

	/// Read and reconstruct every row of one schema group, in the order they
	/// were written, skipping rows the predicate rejects
	pub fn read_schema_group(&self, schema_id: SchemaId, predicate: &mut dyn RowPredicate) -> Result<Vec<Value>> {
		let full_schema = self.schema_map.schema(schema_id);

		let mut leaf_ids = Vec::new();
		let mut const_ids = Vec::new();
		let mut null_ids = Vec::new();
		let mut object_ids = Vec::new();
		for &id in full_schema {
			match self.tree.node(id).node_type() {
				NodeType::Object => object_ids.push(id),
				NodeType::NullValue => null_ids.push(id),
				NodeType::VarValue => const_ids.push(id),
				_ => leaf_ids.push(id),
			}
		}
		leaf_ids.sort_unstable();

		let path = self.encoded_dir.join(schema_id.to_string());
		let decompressed = decompress_from_reader(File::open(&path)?)?;
		let mut cursor = &decompressed[..];
		let row_count: u64 = cursor.read_varint()?;

		let mut columns: Vec<(NodeId, Vec<RawCell>)> = Vec::with_capacity(leaf_ids.len());
		for &id in &leaf_ids {
			let node_type = self.tree.node(id).node_type();
			let cells = read_column(node_type, &mut cursor, row_count as usize)?;
			columns.push((id, cells));
		}

		let template = self.build_template(full_schema, &null_ids, &object_ids);
		let const_fixups: Vec<(Vec<String>, Value)> = const_ids
			.iter()
			.map(|&id| {
				let node = self.tree.node(id);
				let owner = self.tree.node(node.parent_id().expect("VarValue always has a parent"));
				(self.path_segments(id), varvalue_to_json(owner.node_type(), node.key_name()))
			})
			.collect();
		// A folded field has no live column, so a predicate that wants to
		// filter on it needs the owning node's id and its collapsed
		// constant's textual form instead.
		let folded: Vec<(NodeId, &str)> = const_ids
			.iter()
			.map(|&id| {
				let node = self.tree.node(id);
				let owner_id = node.parent_id().expect("VarValue always has a parent");
				(owner_id, node.key_name())
			})
			.collect();

		let mut rows = Vec::with_capacity(row_count as usize);
		for row in 0..row_count as usize {
			let raw_values: Vec<RawCell> = columns.iter().map(|(_, cells)| cells[row].clone()).collect();
			if !predicate.accept(schema_id, &leaf_ids, &raw_values, &folded) {
				continue;
			}

			let mut doc = template.clone();
			for ((id, _), raw) in columns.iter().zip(&raw_values) {
				let node_type = self.tree.node(*id).node_type();
				let value = self.resolve_cell(node_type, raw)?;
				set_at_path(&mut doc, &self.path_segments(*id), value);
			}
			for (segments, value) in &const_fixups {
				set_at_path(&mut doc, segments, value.clone());
			}
			rows.push(doc);
		}
		Ok(rows)
	}

	/// Read every schema group in this split, in ascending schema id order
	pub fn read_all(&self, predicate: &mut dyn RowPredicate) -> Result<Vec<Value>> {
		let mut out = Vec::new();
		for schema_id in self.schema_ids()? {
			out.extend(self.read_schema_group(schema_id, predicate)?);
		}
		Ok(out)
	}

	/// Empty document pre-populated with nulls for every `NullValue` leaf and
	/// empty objects for every `Object` node with no descendant in this
	/// schema (a genuinely empty sub-object in the source record)
	fn build_template(&self, full_schema: &Schema, null_ids: &[NodeId], object_ids: &[NodeId]) -> Value {
		let mut template = Value::Object(Map::new());
		let root_id = self.tree.nodes()[0].id();
		for &id in object_ids {
			if id == root_id {
				continue;
			}
			let has_descendant = full_schema.iter().any(|&other| other != id && self.is_ancestor(id, other));
			if !has_descendant {
				set_at_path(&mut template, &self.path_segments(id), Value::Object(Map::new()));
			}
		}
		for &id in null_ids {
			set_at_path(&mut template, &self.path_segments(id), Value::Null);
		}
		template
	}

	fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
		let mut cur = self.tree.node(node).parent_id();
		while let Some(id) = cur {
			if id == ancestor {
				return true;
			}
			cur = self.tree.node(id).parent_id();
		}
		false
	}

	/// A node's identity for path-building purposes: a `VarValue` node
	/// borrows its collapsed owner's key and parent, since the owner (not
	/// the synthetic value node) is the field that appears in the document
	fn leaf_identity(&self, id: NodeId) -> (Option<NodeId>, String) {
		let node = self.tree.node(id);
		if node.node_type() == NodeType::VarValue {
			let owner = self.tree.node(node.parent_id().expect("VarValue always has a parent"));
			(owner.parent_id(), owner.key_name().to_owned())
		} else {
			(node.parent_id(), node.key_name().to_owned())
		}
	}

	/// Unescaped path segments from just below the root down to (and
	/// including) `id`
	fn path_segments(&self, id: NodeId) -> Vec<String> {
		let (parent_id, key) = self.leaf_identity(id);
		let mut segments = self.ancestor_segments(parent_id);
		segments.push(key);
		segments
	}

	fn ancestor_segments(&self, parent_id: Option<NodeId>) -> Vec<String> {
		match parent_id {
			None => Vec::new(),
			Some(pid) => {
				let node = self.tree.node(pid);
				if node.parent_id().is_none() {
					// `pid` is the root: it contributes no path segment of its own
					Vec::new()
				} else {
					let mut segments = self.ancestor_segments(node.parent_id());
					segments.push(node.key_name().to_owned());
					segments
				}
			}
		}
	}

	fn resolve_cell(&self, node_type: NodeType, raw: &RawCell) -> Result<Value> {
		Ok(match (node_type, raw) {
			(NodeType::Integer, RawCell::Int64(v)) => Value::from(*v),
			(NodeType::Float, RawCell::Float(v)) => number_or_null(*v),
			(NodeType::Boolean, RawCell::Boolean(b)) => Value::Bool(*b),
			(NodeType::VarString, RawCell::VarStringId(id)) => Value::String(self.var_dict.get(*id).to_owned()),
			(NodeType::ClpString, RawCell::Templated { skeleton_id, var_ids }) => {
				let skeleton = self.log_type_dict.get(*skeleton_id);
				let vars: Vec<String> = var_ids.iter().map(|&v| self.var_dict.get(v).to_owned()).collect();
				Value::String(detokenize_log_type(skeleton, &vars))
			}
			(NodeType::Array, RawCell::Templated { skeleton_id, var_ids }) => {
				let skeleton = self.array_dict.get(*skeleton_id);
				let vars: Vec<String> = var_ids.iter().map(|&v| self.var_dict.get(v).to_owned()).collect();
				let text = detokenize_log_type(skeleton, &vars);
				serde_json::from_str(&text).unwrap_or(Value::String(text))
			}
			(NodeType::DateString, RawCell::TimestampId(id)) => Value::String(self.timestamp_dict.get(*id).to_owned()),
			(NodeType::FloatDateString, RawCell::TimestampId(id)) => {
				let text = self.timestamp_dict.get(*id);
				match text.parse::<f64>() {
					Ok(v) => number_or_null(v),
					Err(_) => Value::String(text.to_owned()),
				}
			}
			_ => return Err(ArchiveError::InvariantViolation("column cell tag does not match its node's type")),
		})
	}
}

/// Reconstruct the JSON value a collapsed constant node represented, typed
/// by the node it replaced
fn varvalue_to_json(owner_type: NodeType, constant: &str) -> Value {
	match owner_type {
		NodeType::Integer => constant.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
		NodeType::Float => constant.parse::<f64>().ok().map(number_or_null).unwrap_or(Value::Null),
		NodeType::Boolean => Value::Bool(constant == "true"),
		NodeType::Array => serde_json::from_str(constant).unwrap_or_else(|_| Value::String(constant.to_owned())),
		_ => Value::String(constant.to_owned()),
	}
}

fn number_or_null(v: f64) -> Value {
	serde_json::Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

/// Assign `value` at `segments` within `doc`, creating intermediate objects
/// as needed — the `Value`-tree equivalent of `yyjson_mut_doc_ptr_set`
fn set_at_path(doc: &mut Value, segments: &[String], value: Value) {
	let Some((last, ancestors)) = segments.split_last() else { return };
	let mut cur = doc;
	for seg in ancestors {
		cur = cur
			.as_object_mut()
			.expect("ancestor path segments are always objects")
			.entry(seg.clone())
			.or_insert_with(|| Value::Object(Map::new()));
	}
	cur.as_object_mut()
		.expect("ancestor path segments are always objects")
		.insert(last.clone(), value);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::column::RawCell as RC;

	#[test]
	fn pointer_escapes_tilde_before_slash() {
		let segments = vec!["a/b".to_owned(), "c~d".to_owned()];
		assert_eq!(format_json_pointer(&segments), "/a~1b/c~0d");
	}

	#[test]
	fn set_at_path_creates_intermediate_objects() {
		let mut doc = Value::Object(Map::new());
		set_at_path(&mut doc, &["a".to_owned(), "b".to_owned()], Value::from(1));
		assert_eq!(doc, serde_json::json!({"a": {"b": 1}}));
	}

	#[test]
	fn varvalue_reconstructs_typed_constant() {
		assert_eq!(varvalue_to_json(NodeType::Integer, "42"), Value::from(42));
		assert_eq!(varvalue_to_json(NodeType::Boolean, "true"), Value::Bool(true));
		assert_eq!(varvalue_to_json(NodeType::VarString, "x"), Value::String("x".to_owned()));
	}

	#[test]
	fn resolve_cell_rejects_tag_mismatch() {
		let tree = SchemaTree::new();
		let reader = ArchiveReader {
			tree,
			schema_map: SchemaMap::new(),
			var_dict: StringDictionary::new(),
			log_type_dict: StringDictionary::new(),
			array_dict: StringDictionary::new(),
			timestamp_dict: TimestampDictionary::new(),
			encoded_dir: PathBuf::new(),
		};
		let err = reader.resolve_cell(NodeType::Integer, &RC::Boolean(true)).unwrap_err();
		assert!(matches!(err, ArchiveError::InvariantViolation(_)));
	}
}
