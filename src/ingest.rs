//! The ingestion orchestrator: owns the process-wide shared state, drives
//! the walker, and decides when to split to a fresh archive

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::compression::CompressionLevel;
use crate::dictionary::{StringDictionary, TimestampDictionary};
use crate::error::Result;
use crate::schema::{SchemaMap, SchemaTree};
use crate::value::FieldValue;
use crate::walker::walk_record;
use crate::writer::{ArchiveWriter, SharedState};

/// Drives one ingestion run: walks records, groups them by schema, and
/// splits to a new archive directory whenever the running payload exceeds
/// `max_encoding_size`
pub struct Ingestor {
	archive_root: PathBuf,
	shared: SharedState,
	timestamp_path: Vec<String>,
	max_encoding_size: usize,
	level: CompressionLevel,
	current: Option<ArchiveWriter>,
	records_ingested: u64,
	splits: u32,
}

impl Ingestor {
	/// Create `archive_root` if it does not exist yet and open the first
	/// archive writer under it
	pub fn new(archive_root: PathBuf, timestamp_path: Vec<String>, max_encoding_size: usize, level: CompressionLevel) -> Result<Self> {
		std::fs::create_dir_all(&archive_root)?;
		let shared = SharedState {
			tree: Rc::new(RefCell::new(SchemaTree::new())),
			schema_map: Rc::new(RefCell::new(SchemaMap::new())),
			var_dict: Rc::new(RefCell::new(StringDictionary::new())),
			log_type_dict: Rc::new(RefCell::new(StringDictionary::new())),
			array_dict: Rc::new(RefCell::new(StringDictionary::new())),
			timestamp_dict: Rc::new(RefCell::new(TimestampDictionary::new())),
		};
		let current = ArchiveWriter::open(&archive_root, shared.clone(), level)?;
		Ok(Self {
			archive_root,
			shared,
			timestamp_path,
			max_encoding_size,
			level,
			current: Some(current),
			records_ingested: 0,
			splits: 0,
		})
	}

	/// Walk one record, append it to the current archive, and split if the
	/// running payload now exceeds the configured threshold
	pub fn ingest_record(&mut self, record: &FieldValue) -> Result<()> {
		let (schema, message) = {
			let mut tree = self.shared.tree.borrow_mut();
			let mut timestamp_dict = self.shared.timestamp_dict.borrow_mut();
			walk_record(record, &mut tree, &mut timestamp_dict, &self.timestamp_path)
		};

		let current = self.current.as_mut().expect("an archive writer is always open between ingest calls");
		current.append_message(schema, message)?;
		self.records_ingested += 1;

		if current.get_data_size() > self.max_encoding_size {
			self.split()?;
		}
		Ok(())
	}

	fn split(&mut self) -> Result<()> {
		let finished = self.current.take().expect("split is only called while an archive is open");
		let dir = finished.close()?;
		tracing::info!(archive = %dir.display(), records = self.records_ingested, "split archive");
		self.splits += 1;
		self.current = Some(ArchiveWriter::open(&self.archive_root, self.shared.clone(), self.level)?);
		Ok(())
	}

	/// Number of records ingested so far
	pub fn records_ingested(&self) -> u64 {
		self.records_ingested
	}

	/// Number of splits performed so far (archives closed, not counting the
	/// still-open one)
	pub fn splits(&self) -> u32 {
		self.splits
	}

	/// Close the current archive, then persist the process-wide schema tree,
	/// schema-set map, and a consolidated timestamp dictionary at the
	/// archive root, returning the root path
	pub fn finalize(mut self) -> Result<PathBuf> {
		if let Some(current) = self.current.take() {
			current.close()?;
		}
		self.shared
			.tree
			.borrow()
			.store(std::fs::File::create(self.archive_root.join("schema_tree"))?, self.level)?;
		self.shared
			.schema_map
			.borrow()
			.store(std::fs::File::create(self.archive_root.join("schema_map"))?, self.level)?;
		self.shared
			.timestamp_dict
			.borrow()
			.store(std::fs::File::create(self.archive_root.join("timestamp.dict"))?, self.level)?;
		tracing::info!(archive_root = %self.archive_root.display(), records = self.records_ingested, splits = self.splits, "ingestion finalized");
		Ok(self.archive_root)
	}
}
