//! The schema-set map: interning table of distinct per-record field-id sets

use std::collections::{BTreeSet, HashMap};

use super::NodeId;
use crate::compression::{compress_to_writer, decompress_from_reader, CompressionLevel};

/// Dense identifier of an interned [`Schema`](type@Schema) within a
/// [`SchemaMap`]
pub type SchemaId = u32;

/// An unordered set of node ids touched while walking one record
///
/// Represented as a `BTreeSet` for a canonical iteration order and cheap
/// hashing/equality, even though the set itself is conceptually unordered.
pub type Schema = BTreeSet<NodeId>;

/// Interning table: [`Schema`](type@Schema) -> dense integer `schema_id`
///
/// The sole authority for translating a persisted `schema_id` back to its
/// field set.
#[derive(Default)]
pub struct SchemaMap {
	schemas: Vec<Schema>,
	schema_to_id: HashMap<Schema, SchemaId>,
}

impl SchemaMap {
	/// Construct an empty map
	pub fn new() -> Self {
		Self::default()
	}

	/// Return the existing id for an equal set, or assign and store the next
	/// dense id
	pub fn add(&mut self, schema: Schema) -> SchemaId {
		if let Some(&id) = self.schema_to_id.get(&schema) {
			return id;
		}
		let id = self.schemas.len() as SchemaId;
		self.schema_to_id.insert(schema.clone(), id);
		self.schemas.push(schema);
		id
	}

	/// Look up a previously-interned schema by id
	pub fn schema(&self, id: SchemaId) -> &Schema {
		&self.schemas[id as usize]
	}

	/// Iterate over all interned `(schema, schema_id)` pairs
	pub fn iter(&self) -> impl Iterator<Item = (&Schema, SchemaId)> {
		self.schemas.iter().enumerate().map(|(id, s)| (s, id as SchemaId))
	}

	/// Number of distinct schemas interned so far
	pub fn len(&self) -> usize {
		self.schemas.len()
	}

	/// Whether no schema has been interned yet
	pub fn is_empty(&self) -> bool {
		self.schemas.is_empty()
	}

	/// Serialize as: count of schemas; for each schema, schema_id, count of
	/// node ids, then the ids in ascending order — compressed as a single frame
	pub fn store<W: std::io::Write>(&self, writer: W, level: CompressionLevel) -> std::io::Result<()> {
		use integer_encoding::VarIntWriter;
		let mut buf = Vec::new();
		buf.write_varint(self.schemas.len() as u64)?;
		for (schema, id) in self.iter() {
			buf.write_varint(id)?;
			buf.write_varint(schema.len() as u64)?;
			for &node_id in schema {
				buf.write_varint(node_id)?;
			}
		}
		compress_to_writer(writer, &buf, level)
	}

	/// Deserialize the format written by [`Self::store`]
	pub fn load<R: std::io::Read>(reader: R) -> std::io::Result<Self> {
		use integer_encoding::VarIntReader;
		let decompressed = decompress_from_reader(reader)?;
		let mut reader = &decompressed[..];
		let schema_count: u64 = reader.read_varint()?;
		let mut map = Self::default();
		for _ in 0..schema_count {
			let id: SchemaId = reader.read_varint()?;
			let field_count: u64 = reader.read_varint()?;
			let mut schema = Schema::new();
			for _ in 0..field_count {
				let node_id: NodeId = reader.read_varint()?;
				schema.insert(node_id);
			}
			if id as usize >= map.schemas.len() {
				map.schemas.resize_with(id as usize + 1, Schema::new);
			}
			map.schemas[id as usize] = schema.clone();
			map.schema_to_id.insert(schema, id);
		}
		Ok(map)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interning_is_keyed_on_unordered_set_equality() {
		let mut map = SchemaMap::new();
		let a = map.add(Schema::from([1, 2, 3]));
		let b = map.add(Schema::from([3, 2, 1]));
		assert_eq!(a, b);
		let c = map.add(Schema::from([1, 2]));
		assert_ne!(a, c);
	}

	#[test]
	fn store_load_round_trips() {
		let mut map = SchemaMap::new();
		map.add(Schema::from([1, 2, 3]));
		map.add(Schema::from([4]));
		let mut buf = Vec::new();
		map.store(&mut buf, crate::compression::CompressionLevel::default()).unwrap();
		let loaded = SchemaMap::load(&buf[..]).unwrap();
		assert_eq!(loaded.len(), map.len());
		for (schema, id) in map.iter() {
			assert_eq!(loaded.schema(id), schema);
		}
	}
}
