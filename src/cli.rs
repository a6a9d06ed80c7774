//! The `compress`/`decompress`/`search` command-line surface
//!
//! A thin `clap` derive wrapper that wires the library's [`crate::Ingestor`]
//! and [`crate::reader::ArchiveReader`] end to end. The `search` grammar
//! (`field=value`) is a placeholder for the out-of-scope expression engine,
//! not a general query language.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::column::RawCell;
use crate::compression::CompressionLevel;
use crate::error::{ArchiveError, Result};
use crate::ingest::Ingestor;
use crate::reader::{AcceptAll, ArchiveReader, EqualsPredicate};
use crate::schema::NodeType;

#[derive(Parser)]
#[command(name = "schema-archive", about = "Columnar archive encoding for semi-structured records")]
pub struct Cli {
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Ingest newline-delimited JSON files into a fresh archive
	Compress {
		/// Input JSON-lines files, read in order
		inputs: Vec<PathBuf>,
		/// Directory the archive is written under (created if missing)
		#[arg(long)]
		output: PathBuf,
		/// zstd compression level for every on-disk artifact
		#[arg(long, default_value_t = 3)]
		compression_level: i32,
		/// Dotted key path identifying the designated timestamp leaf, repeatable
		/// for nested keys (e.g. `--timestamp-key meta --timestamp-key ts`)
		#[arg(long = "timestamp-key")]
		timestamp_keys: Vec<String>,
		/// Running payload size, in bytes, that triggers a new archive split
		#[arg(long, default_value_t = 64 * 1024 * 1024)]
		max_encoding_size: usize,
	},
	/// Reconstruct every record from an archive split and print it as JSON lines
	Decompress {
		/// The archive split directory (the `<archive_root>/<uuid>` directory,
		/// not the archive root itself)
		archive_dir: PathBuf,
	},
	/// Reconstruct only the records matching a `field=value` equality filter
	Search {
		/// The archive split directory
		archive_dir: PathBuf,
		/// A `field=value` filter over one top-level scalar field
		filter: String,
	},
}

impl Cli {
	pub fn run(self) -> Result<()> {
		match self.command {
			Command::Compress { inputs, output, compression_level, timestamp_keys, max_encoding_size } => {
				run_compress(inputs, output, compression_level, timestamp_keys, max_encoding_size)
			}
			Command::Decompress { archive_dir } => run_decompress(archive_dir),
			Command::Search { archive_dir, filter } => run_search(archive_dir, filter),
		}
	}
}

fn run_compress(inputs: Vec<PathBuf>, output: PathBuf, compression_level: i32, timestamp_keys: Vec<String>, max_encoding_size: usize) -> Result<()> {
	let level = CompressionLevel::new(compression_level);
	let mut ingestor = Ingestor::new(output, timestamp_keys, max_encoding_size, level)?;

	for input in &inputs {
		let file = std::fs::File::open(input)?;
		for line in std::io::BufReader::new(file).lines() {
			let line = line?;
			if line.trim().is_empty() {
				continue;
			}
			match crate::json_source::parse_line(&line) {
				Ok(record) => ingestor.ingest_record(&record)?,
				Err(err) => tracing::warn!(input = %input.display(), %err, "skipping malformed record"),
			}
		}
	}

	let root = ingestor.finalize()?;
	println!("{}", root.display());
	Ok(())
}

fn run_decompress(archive_dir: PathBuf) -> Result<()> {
	let reader = ArchiveReader::open(&archive_dir)?;
	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	for document in reader.read_all(&mut AcceptAll)? {
		writeln!(out, "{document}")?;
	}
	Ok(())
}

fn run_search(archive_dir: PathBuf, filter: String) -> Result<()> {
	let reader = ArchiveReader::open(&archive_dir)?;
	let (field, value) = filter
		.split_once('=')
		.ok_or_else(|| ArchiveError::MalformedInput(format!("expected field=value, got {filter:?}")))?;

	let root_id = reader.tree().nodes()[0].id();
	let node = reader
		.tree()
		.nodes()
		.iter()
		.find(|n| n.parent_id() == Some(root_id) && n.key_name() == field)
		.ok_or_else(|| ArchiveError::MalformedInput(format!("no top-level field named {field:?}")))?;

	// `expected_text` is the literal's canonical textual form — the same form
	// a constant-folded node stores as its `VarValue` key — so the predicate
	// can still match a field the close-time rewrite collapsed, even though
	// such a field keeps no live column to compare `expected` against.
	let (expected, expected_text) = match node.node_type() {
		NodeType::Integer => {
			let parsed: i64 = value.parse().map_err(|_| ArchiveError::MalformedInput(format!("{value:?} is not an integer")))?;
			(RawCell::Int64(parsed), parsed.to_string())
		}
		NodeType::Float => {
			let parsed: f64 = value.parse().map_err(|_| ArchiveError::MalformedInput(format!("{value:?} is not a float")))?;
			(RawCell::Float(parsed), parsed.to_string())
		}
		NodeType::Boolean => {
			let parsed = value == "true";
			(RawCell::Boolean(parsed), parsed.to_string())
		}
		NodeType::VarString => {
			// A literal with no matching dictionary entry can never equal any live
			// row; u32::MAX is never assigned by `StringDictionary::intern`, so it is
			// a safe "matches nothing" sentinel rather than a special-cased branch.
			// The folded-constant path below never consults this id, only
			// `expected_text`, so a folded match still works even then.
			(RawCell::VarStringId(reader.var_dict().find(value).unwrap_or(u32::MAX)), value.to_owned())
		}
		other => return Err(ArchiveError::UnsupportedOperation(unsupported_search_field_kind(other))),
	};

	let mut predicate = EqualsPredicate::new(node.id(), expected, expected_text);
	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	for schema_id in reader.schema_ids()? {
		for document in reader.read_schema_group(schema_id, &mut predicate)? {
			writeln!(out, "{document}")?;
		}
	}
	Ok(())
}

fn unsupported_search_field_kind(node_type: NodeType) -> &'static str {
	match node_type {
		NodeType::ClpString | NodeType::Array => "search does not support templated (ClpString/Array) fields",
		NodeType::DateString | NodeType::FloatDateString => "search does not support timestamp fields",
		_ => "field type is not a scalar the search grammar can filter on",
	}
}
