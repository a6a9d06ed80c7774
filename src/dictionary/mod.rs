//! The four append-only token tables shared across column writers
//!
//! `var`, `log_type` and `array` are plain string-interning tables (see
//! [`StringDictionary`]); `timestamp` wraps the same machinery behind a
//! domain-specific API (see [`timestamp::TimestampDictionary`]) since its
//! entries may originate from either a number or a string leaf.

mod string_dict;
mod timestamp;

pub use string_dict::StringDictionary;
pub use timestamp::{TimestampDictionary, TimestampToken};

/// Dense identifier of a dictionary entry
pub type DictId = u32;
