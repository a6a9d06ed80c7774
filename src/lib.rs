//! Columnar archive encoding for semi-structured records with evolving schemas
//!
//! The core pipeline: a [`walker`] turns one record into a [`schema`] update
//! plus a [`message::ParsedMessage`], an [`Ingestor`](ingest::Ingestor) groups
//! records by schema id and hands them to per-schema [`column`] writers via
//! a [`writer::ArchiveWriter`], and [`reader::ArchiveReader`] mirrors the
//! process to reconstruct rows, optionally gated by a [`reader::RowPredicate`].
//!
//! [`json_source`] is the ambient JSON-document adapter standing in for the
//! out-of-scope streaming record parser; [`cli`] wires the whole pipeline
//! behind a `compress`/`decompress`/`search` command-line surface.

pub mod cli;
pub mod column;
pub mod compression;
pub mod dictionary;
pub mod error;
pub mod ingest;
pub mod json_source;
pub mod message;
pub mod reader;
pub mod schema;
pub mod value;
pub mod walker;
pub mod writer;

pub use error::{ArchiveError, Result};
pub use ingest::Ingestor;
