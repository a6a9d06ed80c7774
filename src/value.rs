//! The typed tree the record walker consumes, and the typed scalar it
//! produces for column writers

/// One semi-structured input record, as the typed tree handed down by the
/// (external) streaming parser
///
/// This is the interface boundary the walker needs: a parser collaborator
/// only has to produce this shape, whatever its own internal representation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
	/// An object, with fields in source order
	Object(Vec<(String, FieldValue)>),
	/// An array, already serialized verbatim as its source text
	Array(String),
	/// An integer literal (including unsigned values reinterpreted into the
	/// signed 64-bit range)
	Integer(i64),
	/// A floating point literal
	Float(f64),
	/// A string literal
	String(String),
	/// A boolean literal
	Boolean(bool),
	/// A null literal
	Null,
}

/// A polymorphic scalar value as handed to a column writer
///
/// Column writers accept only the tag they expect; a mismatch is an
/// [`ArchiveError::InvariantViolation`](crate::error::ArchiveError::InvariantViolation),
/// since the schema tree and the message's column order are supposed to keep
/// these in lockstep.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
	Int64(i64),
	Float(f64),
	Boolean(bool),
	/// A string to be tokenized (CLP string) or interned whole (var string)
	Str(String),
	/// A serialized array body, treated as an opaque string
	ArrayText(String),
	/// A timestamp literal that parsed as a float
	FloatTimestamp(f64),
	/// A timestamp literal that did not parse as a float (kept as its raw
	/// textual form)
	TextTimestamp(String),
}
