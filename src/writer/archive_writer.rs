//! Owns the per-archive `SchemaWriter`s and the output directory lifecycle;
//! the schema tree, schema-set map and dictionaries are shared with sibling
//! archives across a split via `Rc<RefCell<..>>`

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::column::DictionaryBundle;
use crate::compression::CompressionLevel;
use crate::dictionary::{StringDictionary, TimestampDictionary};
use crate::error::Result;
use crate::message::ParsedMessage;
use crate::schema::{NodeId, SchemaId, SchemaMap, SchemaTree};

use super::schema_writer::SchemaWriter;

/// Shared, process-wide state handed down from the orchestrator and lent to
/// each `ArchiveWriter` in turn
#[derive(Clone)]
pub struct SharedState {
	pub tree: Rc<RefCell<SchemaTree>>,
	pub schema_map: Rc<RefCell<SchemaMap>>,
	pub var_dict: Rc<RefCell<StringDictionary>>,
	pub log_type_dict: Rc<RefCell<StringDictionary>>,
	pub array_dict: Rc<RefCell<StringDictionary>>,
	pub timestamp_dict: Rc<RefCell<TimestampDictionary>>,
}

/// One archive directory's worth of column groups, open for writing
pub struct ArchiveWriter {
	dir: PathBuf,
	shared: SharedState,
	writers: HashMap<SchemaId, SchemaWriter>,
	payload_size: usize,
	level: CompressionLevel,
}

impl ArchiveWriter {
	/// Create `<archive_root>/<uuid>/encoded_messages`, failing with
	/// [`ArchiveError::PathConflict`](crate::error::ArchiveError::PathConflict)
	/// if the generated directory already exists
	pub fn open(archive_root: &Path, shared: SharedState, level: CompressionLevel) -> Result<Self> {
		let id = uuid::Uuid::new_v4();
		let dir = archive_root.join(id.to_string());
		if dir.exists() {
			return Err(crate::error::ArchiveError::PathConflict(dir));
		}
		std::fs::create_dir_all(dir.join("encoded_messages"))?;
		tracing::info!(archive = %dir.display(), "opened archive");
		Ok(Self { dir, shared, writers: HashMap::new(), payload_size: 0, level })
	}

	/// The archive directory this writer is populating
	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Intern `schema` (the record's touched-node set) and append `message`
	/// to the matching (possibly newly created) schema group
	pub fn append_message(&mut self, schema: crate::schema::Schema, mut message: ParsedMessage) -> Result<()> {
		let schema_id = self.shared.schema_map.borrow_mut().add(schema);
		message.set_schema_id(schema_id);

		let writer = match self.writers.get_mut(&schema_id) {
			Some(w) => w,
			None => {
				let schema = self.shared.schema_map.borrow().schema(schema_id).clone();
				let tree = self.shared.tree.borrow();
				let writer = SchemaWriter::initialize(&schema, &tree);
				drop(tree);
				self.writers.entry(schema_id).or_insert(writer)
			}
		};

		let mut tree = self.shared.tree.borrow_mut();
		let mut var_dict = self.shared.var_dict.borrow_mut();
		let mut log_type_dict = self.shared.log_type_dict.borrow_mut();
		let mut array_dict = self.shared.array_dict.borrow_mut();
		let mut timestamp_dict = self.shared.timestamp_dict.borrow_mut();
		let mut dicts = DictionaryBundle {
			var: &mut var_dict,
			log_type: &mut log_type_dict,
			array: &mut array_dict,
			timestamp: &mut timestamp_dict,
		};
		let bytes = writer.append_message(&message, &mut tree, &mut dicts)?;
		self.payload_size += bytes;
		Ok(())
	}

	/// Sum of dictionary byte sizes and the accumulated payload counter,
	/// used by the orchestrator to decide when to split
	pub fn get_data_size(&self) -> usize {
		self.payload_size
			+ self.shared.var_dict.borrow().data_size()
			+ self.shared.log_type_dict.borrow().data_size()
			+ self.shared.array_dict.borrow().data_size()
			+ self.shared.timestamp_dict.borrow().data_size()
	}

	/// Write dictionary snapshots, apply the close-time schema rewrite to
	/// every open schema group, and flush each to its column file
	pub fn close(mut self) -> Result<PathBuf> {
		self.shared.var_dict.borrow().store(std::fs::File::create(self.dir.join("var.dict"))?, self.level)?;
		self.shared.log_type_dict.borrow().store(std::fs::File::create(self.dir.join("log.dict"))?, self.level)?;
		self.shared.array_dict.borrow().store(std::fs::File::create(self.dir.join("array.dict"))?, self.level)?;
		self.shared.timestamp_dict.borrow().store(std::fs::File::create(self.dir.join("timestamp.dict"))?, self.level)?;

		let rewrites = self.shared.tree.borrow_mut().rewrite_by_frequency();
		let rewrite_map: HashMap<NodeId, NodeId> = rewrites.iter().copied().collect();

		let encoded_dir = self.dir.join("encoded_messages");
		for (schema_id, mut writer) in self.writers.drain() {
			let original = self.shared.schema_map.borrow().schema(schema_id).clone();
			let effective: crate::schema::Schema = original.iter().map(|id| rewrite_map.get(id).copied().unwrap_or(*id)).collect();
			let effective_id = if effective == original {
				schema_id
			} else {
				self.shared.schema_map.borrow_mut().add(effective)
			};
			writer.update_schema(&rewrites);
			writer.store(&encoded_dir, effective_id, self.level)?;
		}

		tracing::info!(archive = %self.dir.display(), "closed archive");
		Ok(self.dir)
	}
}
