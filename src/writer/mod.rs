//! The per-schema column group writer and the owning archive writer

mod archive_writer;
mod schema_writer;

pub use archive_writer::ArchiveWriter;
pub use schema_writer::SchemaWriter;
