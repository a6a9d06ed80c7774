//! Error types for the archive core

/// Any error that may happen while writing to or reading from an archive
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
	/// The target archive directory already exists
	#[error("archive path already exists: {0}")]
	PathConflict(std::path::PathBuf),

	/// An I/O operation failed
	#[error("I/O failure: {0}")]
	IoFailure(#[from] std::io::Error),

	/// The parser-layer collaborator rejected or truncated a record
	///
	/// This is non-fatal: the orchestrator skips the offending record and
	/// continues.
	#[error("malformed input: {0}")]
	MalformedInput(String),

	/// A code path that the design does not yet permit was reached
	#[error("unsupported operation: {0}")]
	UnsupportedOperation(&'static str),

	/// A column-count mismatch was detected while flushing a schema group
	///
	/// Indicates a bug in the ingester, not a problem with user input.
	#[error("invariant violation: {0}")]
	InvariantViolation(&'static str),
}

/// Convenience alias for fallible core operations
pub type Result<T> = std::result::Result<T, ArchiveError>;
