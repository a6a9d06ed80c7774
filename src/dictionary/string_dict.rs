//! A plain append-only string-interning table
//!
//! Used directly for the `var`, `log_type` and `array` dictionaries (only
//! the file name differs between them).

use std::collections::HashMap;
use std::io::{self, Read, Write};

use integer_encoding::{VarIntReader, VarIntWriter};

use super::DictId;
use crate::compression::{compress_to_writer, decompress_from_reader, CompressionLevel};

/// Append-only table assigning dense ids to distinct strings on first
/// insertion
#[derive(Default)]
pub struct StringDictionary {
	entries: Vec<String>,
	index: HashMap<String, DictId>,
}

impl StringDictionary {
	/// Construct an empty dictionary
	pub fn new() -> Self {
		Self::default()
	}

	/// Intern `s`, returning its existing id if already present or a freshly
	/// assigned one otherwise
	pub fn intern(&mut self, s: &str) -> DictId {
		if let Some(&id) = self.index.get(s) {
			return id;
		}
		let id = self.entries.len() as DictId;
		self.entries.push(s.to_owned());
		self.index.insert(s.to_owned(), id);
		id
	}

	/// Look up a previously-interned entry by id
	pub fn get(&self, id: DictId) -> &str {
		&self.entries[id as usize]
	}

	/// Look up a string's id without interning it, for callers (e.g. the
	/// `search` CLI) that need to match an existing entry rather than add one
	pub fn find(&self, s: &str) -> Option<DictId> {
		self.index.get(s).copied()
	}

	/// Number of distinct entries interned so far
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether no entry has been interned yet
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Total size in bytes of the interned entries, used to drive archive
	/// split decisions
	pub fn data_size(&self) -> usize {
		self.entries.iter().map(|e| e.len()).sum()
	}

	/// Serialize as `entry_count` followed by length-prefixed entries (entry
	/// id is position), compressed as a single frame
	pub fn store<W: Write>(&self, writer: W, level: CompressionLevel) -> io::Result<()> {
		let mut buf = Vec::new();
		buf.write_varint(self.entries.len() as u64)?;
		for entry in &self.entries {
			buf.write_varint(entry.len() as u64)?;
			buf.write_all(entry.as_bytes())?;
		}
		compress_to_writer(writer, &buf, level)
	}

	/// Deserialize the format written by [`Self::store`]
	pub fn load<R: Read>(reader: R) -> io::Result<Self> {
		let decompressed = decompress_from_reader(reader)?;
		let mut cursor = &decompressed[..];
		let entry_count: u64 = cursor.read_varint()?;
		let mut entries = Vec::with_capacity(entry_count as usize);
		let mut index = HashMap::with_capacity(entry_count as usize);
		for id in 0..entry_count {
			let len: u64 = cursor.read_varint()?;
			let mut buf = vec![0u8; len as usize];
			cursor.read_exact(&mut buf)?;
			let s = String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
			index.insert(s.clone(), id as DictId);
			entries.push(s);
		}
		Ok(Self { entries, index })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interning_dedups_and_assigns_dense_ids() {
		let mut dict = StringDictionary::new();
		let a = dict.intern("hello");
		let b = dict.intern("world");
		let a2 = dict.intern("hello");
		assert_eq!(a, a2);
		assert_ne!(a, b);
		assert_eq!(dict.len(), 2);
	}

	#[test]
	fn store_load_round_trips() {
		let mut dict = StringDictionary::new();
		dict.intern("foo");
		dict.intern("bar");
		let mut buf = Vec::new();
		dict.store(&mut buf, CompressionLevel::default()).unwrap();
		let loaded = StringDictionary::load(&buf[..]).unwrap();
		assert_eq!(loaded.len(), dict.len());
		assert_eq!(loaded.get(0), "foo");
		assert_eq!(loaded.get(1), "bar");
	}
}
