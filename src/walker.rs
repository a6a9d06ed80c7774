//! The record walker: turns one [`FieldValue`] tree into schema-tree updates
//! plus a [`ParsedMessage`]
//!
//! Traversal is iterative, using an explicit stack of open `Object` frames,
//! so document nesting depth never grows the call stack. Arrays need no
//! stack frame of their own since [`FieldValue::Array`] already carries its
//! body pre-serialized as a leaf string.
//!
//! Timestamp-path matching is threaded through as a `path_ok` flag carried
//! per frame rather than the `may_match`/`longest_prefix` pair the design
//! notes describe: each frame's `path_ok` is derived once, from its
//! parent's, at the point the child edge is taken, so re-arming on pop
//! falls out for free instead of needing a separate bookkeeping variable.

use chrono::DateTime;

use crate::dictionary::{TimestampDictionary, TimestampToken};
use crate::message::ParsedMessage;
use crate::schema::{NodeId, NodeType, Schema, SchemaTree};
use crate::value::{ColumnValue, FieldValue};

struct Frame<'a> {
	fields: &'a [(String, FieldValue)],
	idx: usize,
	node_id: NodeId,
	depth: usize,
	path_ok: bool,
}

/// Walk `record`, updating `tree` and `timestamp_dict` in place, and return
/// the record's touched-node schema set together with its [`ParsedMessage`]
///
/// `timestamp_path` is the configured key sequence identifying the
/// designated timestamp leaf; pass an empty slice to disable timestamp
/// matching entirely.
pub fn walk_record(
	record: &FieldValue,
	tree: &mut SchemaTree,
	timestamp_dict: &mut TimestampDictionary,
	timestamp_path: &[String],
) -> (Schema, ParsedMessage) {
	let mut schema = Schema::new();
	let mut message = ParsedMessage::new();
	let can_match = !timestamp_path.is_empty();

	let root_id = tree.add_node(None, NodeType::Object, "");
	schema.insert(root_id);

	let mut stack: Vec<Frame<'_>> = Vec::new();
	if let FieldValue::Object(fields) = record {
		if !fields.is_empty() {
			stack.push(Frame { fields, idx: 0, node_id: root_id, depth: 0, path_ok: can_match });
		}
	}

	// Once a leaf at the configured path's full depth has been evaluated
	// (whether or not it turned out to be timestamp-shaped), no other leaf
	// in this record can match the same fixed key sequence, so disarm.
	let mut timestamp_slot_evaluated = false;

	while let Some(frame) = stack.last_mut() {
		if frame.idx >= frame.fields.len() {
			stack.pop();
			continue;
		}
		let (key, value) = &frame.fields[frame.idx];
		frame.idx += 1;
		let parent_id = frame.node_id;
		let child_depth = frame.depth + 1;
		let child_path_ok = frame.path_ok
			&& !timestamp_slot_evaluated
			&& child_depth <= timestamp_path.len()
			&& key == &timestamp_path[child_depth - 1];

		match value {
			FieldValue::Object(children) => {
				let node_id = tree.add_node(Some(parent_id), NodeType::Object, key);
				schema.insert(node_id);
				if !children.is_empty() {
					stack.push(Frame { fields: children, idx: 0, node_id, depth: child_depth, path_ok: child_path_ok });
				}
			}
			leaf => {
				let is_ts_candidate = child_path_ok && child_depth == timestamp_path.len();
				if is_ts_candidate {
					timestamp_slot_evaluated = true;
				}
				ingest_leaf(tree, timestamp_dict, &mut schema, &mut message, parent_id, key, leaf, is_ts_candidate);
			}
		}
	}

	(schema, message)
}

fn ingest_leaf(
	tree: &mut SchemaTree,
	timestamp_dict: &mut TimestampDictionary,
	schema: &mut Schema,
	message: &mut ParsedMessage,
	parent_id: NodeId,
	key: &str,
	value: &FieldValue,
	is_ts_candidate: bool,
) {
	let (node_type, column_value) = classify(key, value, is_ts_candidate, timestamp_dict);
	let node_id = tree.add_node(Some(parent_id), node_type, key);
	schema.insert(node_id);
	if let Some(value) = column_value {
		message.push(node_id, value);
	}
}

/// Decide a leaf's schema node type and, if it carries one, its typed column
/// value — applying the timestamp side-channel where it is supposed to fire
fn classify(
	key: &str,
	value: &FieldValue,
	is_ts_candidate: bool,
	timestamp_dict: &mut TimestampDictionary,
) -> (NodeType, Option<ColumnValue>) {
	if is_ts_candidate {
		match value {
			FieldValue::Integer(v) => {
				timestamp_dict.ingest_entry(key, TimestampToken::Int(*v));
				return (NodeType::Integer, Some(ColumnValue::Int64(*v)));
			}
			FieldValue::Float(v) => {
				timestamp_dict.ingest_entry(key, TimestampToken::Float(*v));
				return (NodeType::Float, Some(ColumnValue::Float(*v)));
			}
			FieldValue::String(s) => {
				if let Ok(as_float) = s.parse::<f64>() {
					return (NodeType::FloatDateString, Some(ColumnValue::FloatTimestamp(as_float)));
				}
				if looks_like_date(s) {
					return (NodeType::DateString, Some(ColumnValue::TextTimestamp(s.clone())));
				}
				// Neither numeric nor date-parseable: fall through and
				// classify as a plain string, per the resolved open
				// question on non-matching timestamp leaves.
			}
			_ => {}
		}
	}

	match value {
		FieldValue::Object(_) => unreachable!("objects are dispatched by the caller before reaching classify"),
		FieldValue::Array(s) => (NodeType::Array, Some(ColumnValue::ArrayText(s.clone()))),
		FieldValue::Integer(v) => (NodeType::Integer, Some(ColumnValue::Int64(*v))),
		FieldValue::Float(v) => (NodeType::Float, Some(ColumnValue::Float(*v))),
		FieldValue::Boolean(b) => (NodeType::Boolean, Some(ColumnValue::Boolean(*b))),
		FieldValue::String(s) if s.contains(' ') => (NodeType::ClpString, Some(ColumnValue::Str(s.clone()))),
		FieldValue::String(s) => (NodeType::VarString, Some(ColumnValue::Str(s.clone()))),
		FieldValue::Null => (NodeType::NullValue, None),
	}
}

/// A minimal date-parseability probe: RFC 3339 plus a couple of common
/// literal formats. Not a full grammar — good enough to tell "this is a
/// timestamp-shaped string" from "this is unrelated text".
fn looks_like_date(s: &str) -> bool {
	if DateTime::parse_from_rfc3339(s).is_ok() {
		return true;
	}
	const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d", "%Y/%m/%d %H:%M:%S"];
	FORMATS
		.iter()
		.any(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).is_ok() || chrono::NaiveDate::parse_from_str(s, fmt).is_ok())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn obj(fields: Vec<(&str, FieldValue)>) -> FieldValue {
		FieldValue::Object(fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
	}

	#[test]
	fn constants_collapse_candidate_is_tracked_via_cardinality() {
		let mut tree = SchemaTree::new();
		let mut ts_dict = TimestampDictionary::new();
		let record = obj(vec![("a", FieldValue::Integer(1)), ("b", FieldValue::String("x".into()))]);
		for _ in 0..100 {
			walk_record(&record, &mut tree, &mut ts_dict, &[]);
		}
		let a_node = tree.nodes().iter().find(|n| n.key_name() == "a").unwrap();
		assert_eq!(a_node.value_state(), crate::schema::ValueState::CardinalityOne);
		assert_eq!(a_node.count(), 100);
	}

	#[test]
	fn type_divergence_creates_distinct_nodes() {
		let mut tree = SchemaTree::new();
		let mut ts_dict = TimestampDictionary::new();
		let (schema1, _) = walk_record(&obj(vec![("x", FieldValue::Integer(1))]), &mut tree, &mut ts_dict, &[]);
		let (schema2, _) = walk_record(&obj(vec![("x", FieldValue::String("1".into()))]), &mut tree, &mut ts_dict, &[]);
		assert_ne!(schema1, schema2);
	}

	#[test]
	fn numeric_timestamp_leaf_keeps_its_column_and_side_channels_into_dictionary() {
		let mut tree = SchemaTree::new();
		let mut ts_dict = TimestampDictionary::new();
		let timestamp_path = vec!["ts".to_owned()];
		let record = obj(vec![("ts", FieldValue::Integer(1710000000)), ("v", FieldValue::Integer(1))]);
		let (_, message) = walk_record(&record, &mut tree, &mut ts_dict, &timestamp_path);

		let ts_node = tree.nodes().iter().find(|n| n.key_name() == "ts").unwrap();
		assert_eq!(ts_node.node_type(), NodeType::Integer);
		assert_eq!(ts_dict.data_size() > 0, true);
		assert!(message.content().iter().any(|(id, v)| *id == ts_node.id() && *v == ColumnValue::Int64(1710000000)));
	}

	#[test]
	fn string_timestamp_leaf_is_retyped_as_date_string() {
		let mut tree = SchemaTree::new();
		let mut ts_dict = TimestampDictionary::new();
		let timestamp_path = vec!["ts".to_owned()];
		let record = obj(vec![("ts", FieldValue::String("2024-01-01T00:00:00Z".into()))]);
		let (_, message) = walk_record(&record, &mut tree, &mut ts_dict, &timestamp_path);

		let ts_node = tree.nodes().iter().find(|n| n.key_name() == "ts").unwrap();
		assert_eq!(ts_node.node_type(), NodeType::DateString);
		assert!(matches!(message.content()[0].1, ColumnValue::TextTimestamp(_)));
	}

	#[test]
	fn non_date_non_numeric_timestamp_leaf_is_classified_normally() {
		let mut tree = SchemaTree::new();
		let mut ts_dict = TimestampDictionary::new();
		let timestamp_path = vec!["ts".to_owned()];
		let record = obj(vec![("ts", FieldValue::Boolean(true))]);
		let (_, _) = walk_record(&record, &mut tree, &mut ts_dict, &timestamp_path);

		let ts_node = tree.nodes().iter().find(|n| n.key_name() == "ts").unwrap();
		assert_eq!(ts_node.node_type(), NodeType::Boolean);
	}

	#[test]
	fn empty_object_leaf_is_recorded_without_descending() {
		let mut tree = SchemaTree::new();
		let mut ts_dict = TimestampDictionary::new();
		let record = obj(vec![("nested", obj(vec![]))]);
		let (schema, _) = walk_record(&record, &mut tree, &mut ts_dict, &[]);
		let nested_node = tree.nodes().iter().find(|n| n.key_name() == "nested").unwrap();
		assert_eq!(nested_node.node_type(), NodeType::Object);
		assert!(schema.contains(&nested_node.id()));
	}
}
