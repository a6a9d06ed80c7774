//! S6 — archive splitting at a payload-size threshold

use std::path::PathBuf;

use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use schema_archive::compression::CompressionLevel;
use schema_archive::json_source::parse_line;
use schema_archive::reader::{AcceptAll, ArchiveReader};
use schema_archive::Ingestor;

fn split_dirs(archive_root: &std::path::Path) -> Result<Vec<PathBuf>> {
	let mut dirs = Vec::new();
	for entry in std::fs::read_dir(archive_root)? {
		let entry = entry?;
		if entry.file_type()?.is_dir() {
			dirs.push(entry.path());
		}
	}
	dirs.sort();
	Ok(dirs)
}

#[test]
fn s6_split_boundary_yields_expected_row_counts_per_archive() -> Result<()> {
	let dir = tempfile::tempdir()?;
	let archive_root = dir.path().to_path_buf();
	// Each `{"a": <int>}` record's single Int64 column append returns 8 bytes;
	// a 15-byte threshold crosses it on every second record.
	let mut ingestor = Ingestor::new(archive_root.clone(), Vec::new(), 15, CompressionLevel::default())?;
	for i in 0..5 {
		let record = parse_line(&format!(r#"{{"a":{i}}}"#))?;
		ingestor.ingest_record(&record)?;
	}
	assert_eq!(ingestor.splits(), 2, "two mid-stream splits, plus the final close on finalize");
	ingestor.finalize()?;

	let dirs = split_dirs(&archive_root)?;
	assert_eq!(dirs.len(), 3, "expected 3 archive splits for 5 records at this threshold");

	let mut row_counts = Vec::new();
	let mut all_records = Vec::new();
	for split in &dirs {
		let reader = ArchiveReader::open(split)?;
		let mut rows = 0;
		for schema_id in reader.schema_ids()? {
			let records = reader.read_schema_group(schema_id, &mut AcceptAll)?;
			rows += records.len();
			all_records.extend(records);
		}
		row_counts.push(rows);
	}
	assert_eq!(row_counts, vec![2, 2, 1]);
	assert_eq!(all_records, (0..5).map(|i| json!({"a": i})).collect::<Vec<_>>());
	Ok(())
}
