//! The timestamp dictionary
//!
//! Entries may originate either from a numeric leaf matched against the
//! configured timestamp path (ingested directly by the walker, as a
//! side-channel that does not affect the leaf's own column) or from a
//! `DateString`/`FloatDateString` leaf (ingested by the owning column
//! writer). Both are interned through the same append-only table, keyed on
//! their canonical textual form.

use std::io::{self, Read, Write};

use super::{DictId, StringDictionary};
use crate::compression::CompressionLevel;

/// A value to be ingested into the timestamp dictionary
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampToken<'a> {
	/// An integer timestamp (epoch seconds/millis, as provided by the source)
	Int(i64),
	/// A floating point timestamp
	Float(f64),
	/// A textual date representation that did not parse as a plain number
	Text(&'a str),
}

impl TimestampToken<'_> {
	fn canonical(&self) -> String {
		match self {
			TimestampToken::Int(v) => v.to_string(),
			TimestampToken::Float(v) => v.to_string(),
			TimestampToken::Text(s) => (*s).to_owned(),
		}
	}
}

/// Append-only table of encoded timestamp tokens
#[derive(Default)]
pub struct TimestampDictionary {
	inner: StringDictionary,
	/// The key name the timestamp was observed under; retained for
	/// diagnostics only (not required to reconstruct a record)
	keys: Vec<String>,
}

impl TimestampDictionary {
	/// Construct an empty dictionary
	pub fn new() -> Self {
		Self::default()
	}

	/// Intern a timestamp token observed under `key`, returning its dense id
	pub fn ingest_entry(&mut self, key: &str, token: TimestampToken<'_>) -> DictId {
		let id = self.inner.intern(&token.canonical());
		if id as usize == self.keys.len() {
			self.keys.push(key.to_owned());
		}
		id
	}

	/// The canonical textual form of a previously-ingested entry
	pub fn get(&self, id: DictId) -> &str {
		self.inner.get(id)
	}

	/// Total size in bytes of the interned entries
	pub fn data_size(&self) -> usize {
		self.inner.data_size()
	}

	/// Serialize, see [`StringDictionary::store`]
	pub fn store<W: Write>(&self, writer: W, level: CompressionLevel) -> io::Result<()> {
		self.inner.store(writer, level)
	}

	/// Deserialize, see [`StringDictionary::load`]
	pub fn load<R: Read>(reader: R) -> io::Result<Self> {
		Ok(Self {
			inner: StringDictionary::load(reader)?,
			keys: Vec::new(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dedups_on_canonical_form() {
		let mut dict = TimestampDictionary::new();
		let a = dict.ingest_entry("ts", TimestampToken::Int(1710000000));
		let b = dict.ingest_entry("ts", TimestampToken::Int(1710000000));
		assert_eq!(a, b);
		let c = dict.ingest_entry("ts", TimestampToken::Float(1710000000.5));
		assert_ne!(a, c);
	}
}
