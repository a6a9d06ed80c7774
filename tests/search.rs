//! `EqualsPredicate` against a field the close-time rewrite folded into a
//! constant — the scenario `run_search` in `cli.rs` drives end to end

use std::path::PathBuf;

use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use schema_archive::column::RawCell;
use schema_archive::compression::CompressionLevel;
use schema_archive::json_source::parse_line;
use schema_archive::reader::{ArchiveReader, EqualsPredicate};
use schema_archive::Ingestor;

fn split_dirs(archive_root: &std::path::Path) -> Result<Vec<PathBuf>> {
	let mut dirs = Vec::new();
	for entry in std::fs::read_dir(archive_root)? {
		let entry = entry?;
		if entry.file_type()?.is_dir() {
			dirs.push(entry.path());
		}
	}
	Ok(dirs)
}

#[test]
fn searching_a_constant_folded_field_still_matches_every_row() -> Result<()> {
	let dir = tempfile::tempdir()?;
	let archive_root = dir.path().to_path_buf();
	let mut ingestor = Ingestor::new(archive_root.clone(), Vec::new(), usize::MAX, CompressionLevel::default())?;
	for i in 0..5 {
		let record = parse_line(&format!(r#"{{"status":"ok","n":{i}}}"#))?;
		ingestor.ingest_record(&record)?;
	}
	ingestor.finalize()?;

	let splits = split_dirs(&archive_root)?;
	assert_eq!(splits.len(), 1);
	let reader = ArchiveReader::open(&splits[0])?;

	let root_id = reader.tree().nodes()[0].id();
	let status_node = reader
		.tree()
		.nodes()
		.iter()
		.find(|n| n.parent_id() == Some(root_id) && n.key_name() == "status")
		.expect("status field node");

	// `status` is constant across every record, so by now its column has been
	// folded away and only a `VarValue` node carries "ok".
	assert_eq!(status_node.node_type(), schema_archive::schema::NodeType::VarString);
	assert!(reader
		.tree()
		.node(status_node.id())
		.children()
		.iter()
		.any(|&c| reader.tree().node(c).node_type() == schema_archive::schema::NodeType::VarValue));

	let mut predicate = EqualsPredicate::new(status_node.id(), RawCell::VarStringId(u32::MAX), "ok".to_owned());
	let mut matched = Vec::new();
	for schema_id in reader.schema_ids()? {
		matched.extend(reader.read_schema_group(schema_id, &mut predicate)?);
	}
	assert_eq!(matched.len(), 5, "every row shares the folded constant and should match");

	let mut mismatch = EqualsPredicate::new(status_node.id(), RawCell::VarStringId(u32::MAX), "not-ok".to_owned());
	let mut none_matched = Vec::new();
	for schema_id in reader.schema_ids()? {
		none_matched.extend(reader.read_schema_group(schema_id, &mut mismatch)?);
	}
	assert!(none_matched.is_empty());

	assert_eq!(matched[0]["status"], json!("ok"));
	Ok(())
}
