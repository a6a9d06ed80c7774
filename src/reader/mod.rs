//! Row reconstruction: mirrors the writer, turning compressed column files
//! back into documents under an optional predicate

mod archive_reader;
mod predicate;

pub use archive_reader::ArchiveReader;
pub use predicate::{AcceptAll, EqualsPredicate, RowPredicate};
