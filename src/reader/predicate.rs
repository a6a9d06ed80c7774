//! The external row-filtering collaborator's interface
//!
//! The query/filter expression language itself lives outside this crate;
//! all the reader needs is something that can look at a row's already
//! column-extracted values and say yes or no.

use crate::column::RawCell;
use crate::schema::{NodeId, SchemaId};

/// Gates row emission during a reader scan
///
/// Implementors see the row's raw, not-yet-dictionary-resolved cells,
/// indexed in parallel with the node ids that own them — resolving a
/// `RawCell::VarStringId` etc. back to text is the implementor's job if it
/// needs to compare against text; numeric comparisons need no dictionary at
/// all.
///
/// `folded` carries the fields the close-time rewrite collapsed into a
/// constant: each entry is the *owning* node id (not the synthetic
/// `VarValue` node) together with the constant's textual form, for schemas
/// where that field no longer has a live column to look up in `values`.
pub trait RowPredicate {
	/// Called once per row; `true` emits the row, `false` skips it
	fn accept(&mut self, schema_id: SchemaId, node_ids: &[NodeId], values: &[RawCell], folded: &[(NodeId, &str)]) -> bool;
}

/// Always emits every row — the default when no filter is requested
pub struct AcceptAll;

impl RowPredicate for AcceptAll {
	fn accept(&mut self, _schema_id: SchemaId, _node_ids: &[NodeId], _values: &[RawCell], _folded: &[(NodeId, &str)]) -> bool {
		true
	}
}

/// A minimal built-in predicate: exact equality of a single top-level
/// scalar field against a literal, standing in for the CLI's `search`
/// subcommand until a real expression engine is wired in externally
pub struct EqualsPredicate {
	node_id: NodeId,
	expected: RawCell,
	/// The literal's canonical textual form, used only to match against a
	/// constant-folded field (see `folded` on [`RowPredicate::accept`]),
	/// since a folded field carries no live `RawCell` to compare against.
	expected_text: String,
}

impl EqualsPredicate {
	pub fn new(node_id: NodeId, expected: RawCell, expected_text: String) -> Self {
		Self { node_id, expected, expected_text }
	}
}

impl RowPredicate for EqualsPredicate {
	fn accept(&mut self, _schema_id: SchemaId, node_ids: &[NodeId], values: &[RawCell], folded: &[(NodeId, &str)]) -> bool {
		if let Some(idx) = node_ids.iter().position(|&id| id == self.node_id) {
			return values[idx] == self.expected;
		}
		folded.iter().any(|&(id, text)| id == self.node_id && text == self.expected_text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn matches_a_folded_constant_by_text_when_no_live_column_is_present() {
		let mut predicate = EqualsPredicate::new(7, RawCell::VarStringId(0), "ok".to_owned());
		assert!(predicate.accept(0, &[], &[], &[(7, "ok")]));
		assert!(!predicate.accept(0, &[], &[], &[(7, "not-ok")]));
		assert!(!predicate.accept(0, &[], &[], &[]));
	}
}
